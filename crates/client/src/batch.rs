//! Multi-part coordinator: uploads archive volumes independently.
//!
//! Each volume is one chunked transfer. Volumes run on a bounded set of
//! concurrent workers, and every worker negotiates its **own** session with
//! the shared credentials — upload keys are single-use, so sharing one
//! session across in-flight requests would make the service reject all but
//! the first. A failed volume is recorded and never aborts its siblings.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::{info, warn};

use aceup_archive::ArchiveVolume;

use crate::client::Client;
use crate::error::ClientError;
use crate::types::UploadOutcome;

impl Client {
    /// Uploads each volume as an independent chunked transfer.
    ///
    /// Dispatches up to the client's worker limit concurrently and returns
    /// one outcome per volume, in volume order. Cancellation marks the
    /// volumes that have not finished as failed outcomes; volumes already
    /// past their final range keep their result.
    pub async fn upload_volumes(
        &self,
        volumes: &[ArchiveVolume],
        password: Option<&str>,
    ) -> Result<Vec<UploadOutcome>, ClientError> {
        if volumes.is_empty() {
            return Ok(Vec::new());
        }
        info!(
            volumes = volumes.len(),
            workers = self.workers,
            "uploading archive volumes"
        );

        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut handles = Vec::with_capacity(volumes.len());
        for volume in volumes {
            let semaphore = Arc::clone(&semaphore);
            let mut worker = self.worker_clone();
            let volume = volume.clone();
            let password = password.map(str::to_string);

            handles.push(tokio::spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return UploadOutcome::rejected(&volume_label(&volume), "worker pool closed".into());
                };
                upload_one_volume(&mut worker, &volume, password.as_deref()).await
            }));
        }

        let mut outcomes = Vec::with_capacity(handles.len());
        for handle in handles {
            outcomes.push(handle.await.map_err(|e| ClientError::Worker(e.to_string()))?);
        }

        let delivered = outcomes.iter().filter(|o| o.success).count();
        info!(delivered, total = outcomes.len(), "volume batch finished");
        Ok(outcomes)
    }
}

/// Negotiates a fresh session and uploads a single volume.
async fn upload_one_volume(
    worker: &mut Client,
    volume: &ArchiveVolume,
    password: Option<&str>,
) -> UploadOutcome {
    let label = volume_label(volume);

    if worker.cancel.is_cancelled() {
        return UploadOutcome::rejected(&label, "cancelled".to_string());
    }
    if let Err(e) = worker.negotiate().await {
        warn!(volume = %label, error = %e, "volume session negotiation failed");
        return UploadOutcome::rejected(&label, e.to_string());
    }

    match worker.upload_chunked(&volume.path, password).await {
        Ok(outcome) => {
            if outcome.success {
                info!(volume = %label, url = outcome.url.as_deref().unwrap_or(""), "volume delivered");
            } else {
                warn!(volume = %label, "volume rejected");
            }
            outcome
        }
        Err(e) => {
            warn!(volume = %label, error = %e, "volume transfer failed");
            UploadOutcome::rejected(&label, e.to_string())
        }
    }
}

fn volume_label(volume: &ArchiveVolume) -> String {
    volume
        .path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| volume.path.to_string_lossy().into_owned())
}
