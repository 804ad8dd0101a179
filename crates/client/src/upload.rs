//! Upload drivers: strategy dispatch, direct POST, chunked transfer.

use std::path::{Path, PathBuf};

use reqwest::header::CONTENT_RANGE;
use reqwest::multipart::{Form, Part};
use tracing::{debug, info, warn};

use aceup_archive::{archive_directory, split_file};
use aceup_transfer::{RangePlan, RangeReader};

use crate::client::{Client, UPLOAD_TIMEOUT};
use crate::error::ClientError;
use crate::strategy::{Payload, Strategy, select};
use crate::types::{TransferSource, TransferTask, UploadOutcome};

impl Client {
    /// Runs one transfer task to completion.
    pub async fn run(&mut self, task: TransferTask) -> Result<Vec<UploadOutcome>, ClientError> {
        match task.source {
            TransferSource::Path(path) => self.upload(&path, task.password.as_deref()).await,
            TransferSource::RemoteUrl(url) => {
                let outcome = self.upload_remote(&url, task.password.as_deref()).await?;
                Ok(vec![outcome])
            }
        }
    }

    /// Uploads a file or directory, picking the strategy from its size.
    ///
    /// Directories are archived into a single tar file under the client's
    /// working directory before classification. Returns one outcome per
    /// transfer unit: a single entry for direct and chunked uploads, one per
    /// volume for split uploads.
    pub async fn upload(
        &mut self,
        path: &Path,
        password: Option<&str>,
    ) -> Result<Vec<UploadOutcome>, ClientError> {
        let file = match Payload::resolve(path)? {
            Payload::File(file) => file,
            Payload::Directory(dir) => {
                info!(directory = %dir.display(), "archiving directory before upload");
                self.blocking_archive(dir).await?
            }
        };

        let size = tokio::fs::metadata(&file).await?.len();
        let session = self.current_session()?;
        let chunk_threshold = session.chunk_threshold();
        let file_threshold = session.file_threshold();
        if chunk_threshold == 0 || file_threshold == 0 {
            return Err(ClientError::UnusableSession(format!(
                "thresholds {:?}/{:?}",
                session.max_chunk_size, session.max_file_size
            )));
        }

        match select(size, chunk_threshold, file_threshold) {
            Strategy::Direct => {
                let outcome = self.upload_direct(&file, password).await?;
                Ok(vec![outcome])
            }
            Strategy::Chunked => {
                let outcome = self.upload_chunked(&file, password).await?;
                Ok(vec![outcome])
            }
            Strategy::Split => {
                info!(
                    file = %file.display(),
                    size,
                    volume_size = file_threshold,
                    "splitting oversized file into volumes"
                );
                let volumes = self.blocking_split(file, file_threshold).await?;
                self.upload_volumes(&volumes, password).await
            }
        }
    }

    /// Uploads a whole file in one POST, without `Content-Range`.
    pub async fn upload_direct(
        &mut self,
        path: &Path,
        password: Option<&str>,
    ) -> Result<UploadOutcome, ClientError> {
        let name = display_name(path);
        let data = tokio::fs::read(path).await?;
        let size = data.len() as u64;
        debug!(file = %name, size, "direct upload");

        let mut form = self.form_with_fields(password)?;
        let part = Part::bytes(data)
            .file_name(name.clone())
            .mime_str(guess_media_type(path))?;
        form = form.part("files", part);

        let endpoint = self.current_session()?.server_file.clone();
        let response = self
            .http
            .post(&endpoint)
            .multipart(form)
            .timeout(UPLOAD_TIMEOUT)
            .send()
            .await?;
        let body = response.text().await?;

        let outcome = UploadOutcome::from_body(&name, size, body);
        if outcome.success {
            info!(file = %name, url = outcome.url.as_deref().unwrap_or(""), "uploaded");
            self.negotiate().await?;
        } else {
            warn!(file = %name, "upload rejected");
        }
        Ok(outcome)
    }

    /// Uploads one file as a sequence of byte-range chunk POSTs.
    ///
    /// Ranges are issued strictly in ascending order, each waiting for the
    /// previous response. All ranges of one transfer carry the same session
    /// parameters — the upload key identifies the logical transfer — and the
    /// session is re-negotiated once the final range is acknowledged. A
    /// rejected range aborts the remainder; there is no resume, a retried
    /// transfer restarts from the first range.
    pub async fn upload_chunked(
        &mut self,
        path: &Path,
        password: Option<&str>,
    ) -> Result<UploadOutcome, ClientError> {
        let name = display_name(path);
        let mut reader = self.blocking_open(path.to_path_buf()).await?;
        let total = reader.file_size();

        let session = self.current_session()?;
        let chunk_size = session.chunk_threshold();
        if chunk_size == 0 {
            return Err(ClientError::UnusableSession(format!(
                "chunk size {:?}",
                session.max_chunk_size
            )));
        }
        let endpoint = session.server_file.clone();

        let plan = RangePlan::new(total, chunk_size);
        let chunk_count = plan.chunk_count();
        info!(file = %name, size = total, chunks = chunk_count, "chunked upload");

        let mut final_body = String::new();
        for (index, range) in plan.iter().enumerate() {
            if self.cancel.is_cancelled() {
                return Err(ClientError::Cancelled);
            }

            let (returned, data) = tokio::task::spawn_blocking(move || {
                let mut reader = reader;
                let data = reader.read_range(&range);
                (reader, data)
            })
            .await
            .map_err(|e| ClientError::Worker(format!("task join error: {e}")))?;
            reader = returned;
            let data = data?;

            let mut form = self.form_with_fields(password)?;
            form = form.part("files", Part::bytes(data).file_name(name.clone()));

            let response = self
                .http
                .post(&endpoint)
                .header(CONTENT_RANGE, range.content_range())
                .multipart(form)
                .timeout(UPLOAD_TIMEOUT)
                .send()
                .await?;
            let body = response.text().await?;

            if !aceup_protocol::ApiResponse::<serde_json::Value>::parse(&body).is_success() {
                warn!(
                    file = %name,
                    chunk = index + 1,
                    chunks = chunk_count,
                    "chunk rejected, aborting transfer"
                );
                return Ok(UploadOutcome::rejected(&name, body));
            }
            debug!(file = %name, chunk = index + 1, chunks = chunk_count, "chunk accepted");
            final_body = body;
        }

        let outcome = UploadOutcome::from_body(&name, total, final_body);
        if outcome.success {
            info!(file = %name, url = outcome.url.as_deref().unwrap_or(""), "uploaded");
            self.negotiate().await?;
        }
        Ok(outcome)
    }

    fn form_with_fields(&self, password: Option<&str>) -> Result<Form, ClientError> {
        let mut form = Form::new();
        for (key, value) in self.upload_fields(password)? {
            form = form.text(key, value);
        }
        Ok(form)
    }

    async fn blocking_archive(&self, dir: PathBuf) -> Result<PathBuf, ClientError> {
        let work_dir = self.work_dir.clone();
        tokio::task::spawn_blocking(move || archive_directory(&dir, &work_dir))
            .await
            .map_err(|e| ClientError::Worker(format!("task join error: {e}")))?
            .map_err(ClientError::Archive)
    }

    async fn blocking_split(
        &self,
        file: PathBuf,
        volume_size: u64,
    ) -> Result<Vec<aceup_archive::ArchiveVolume>, ClientError> {
        let work_dir = self.work_dir.clone();
        tokio::task::spawn_blocking(move || split_file(&file, volume_size, &work_dir))
            .await
            .map_err(|e| ClientError::Worker(format!("task join error: {e}")))?
            .map_err(ClientError::Archive)
    }

    async fn blocking_open(&self, path: PathBuf) -> Result<RangeReader, ClientError> {
        tokio::task::spawn_blocking(move || RangeReader::open(&path))
            .await
            .map_err(|e| ClientError::Worker(format!("task join error: {e}")))?
            .map_err(ClientError::Transfer)
    }
}

/// File name used in multipart parts and outcome fallbacks.
fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Guesses the media type of a direct upload from its extension.
fn guess_media_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    match ext.as_deref() {
        Some("tar") => "application/x-tar",
        Some("zip") => "application/zip",
        Some("gz") => "application/gzip",
        Some("7z") => "application/x-7z-compressed",
        Some("txt") => "text/plain",
        Some("json") => "application/json",
        Some("pdf") => "application/pdf",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("mp3") => "audio/mpeg",
        Some("mp4") => "video/mp4",
        Some("mkv") => "video/x-matroska",
        _ => "application/octet-stream",
    }
}
