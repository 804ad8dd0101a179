//! MirrorAce API client.
//!
//! Async HTTP client using `reqwest`. A client owns one negotiated
//! [`UploadSession`] at a time; the session's upload key is single-use, so
//! the client re-negotiates after every completed transfer unit. Concurrent
//! workers never share a session — see [`crate::batch`].

use std::path::PathBuf;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use aceup_protocol::constants::{FILE_INFO_PATH, FILE_UPLOAD_PATH, PASSWORD_FIELD};
use aceup_protocol::{ApiResponse, FileInfoMap, SessionGrant, UploadSession};

use crate::error::ClientError;
use crate::types::UploadOutcome;

/// Timeout for upload POSTs. Chunks can be large and the service slow to
/// acknowledge, so this is deliberately generous.
pub(crate) const UPLOAD_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Timeout for negotiation and info requests.
pub(crate) const API_TIMEOUT: Duration = Duration::from_secs(60);

/// Default number of concurrent volume workers.
pub const DEFAULT_WORKERS: usize = 4;

/// MirrorAce API client.
pub struct Client {
    pub(crate) http: reqwest::Client,
    pub(crate) api_key: String,
    pub(crate) api_token: String,
    pub(crate) base_url: String,
    pub(crate) work_dir: PathBuf,
    pub(crate) session: Option<UploadSession>,
    pub(crate) cancel: CancellationToken,
    pub(crate) workers: usize,
}

impl Client {
    /// Creates a client without negotiating a session yet.
    ///
    /// `work_dir` is where directory archives and split volumes are written.
    pub fn new(
        api_key: impl Into<String>,
        api_token: impl Into<String>,
        work_dir: impl Into<PathBuf>,
    ) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            api_key: api_key.into(),
            api_token: api_token.into(),
            base_url: aceup_protocol::constants::API_BASE_URL.to_string(),
            work_dir: work_dir.into(),
            session: None,
            cancel: CancellationToken::new(),
            workers: DEFAULT_WORKERS,
        })
    }

    /// Creates a client and negotiates its first session.
    pub async fn connect(
        api_key: impl Into<String>,
        api_token: impl Into<String>,
        work_dir: impl Into<PathBuf>,
    ) -> Result<Self, ClientError> {
        let mut client = Self::new(api_key, api_token, work_dir)?;
        client.negotiate().await?;
        Ok(client)
    }

    /// Sets the concurrent volume worker limit.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Points the client at a different API base URL (for testing).
    #[cfg(test)]
    pub(crate) fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self
    }

    /// Returns a cancellation token shared with all workers of this client.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Current negotiated session, if any.
    pub fn session(&self) -> Option<&UploadSession> {
        self.session.as_ref()
    }

    pub(crate) fn current_session(&self) -> Result<&UploadSession, ClientError> {
        self.session.as_ref().ok_or(ClientError::NoSession)
    }

    /// Clones the client configuration without the negotiated session.
    ///
    /// Workers start from this and negotiate their own session, so no
    /// upload key is ever shared between in-flight requests.
    pub(crate) fn worker_clone(&self) -> Self {
        Self {
            http: self.http.clone(),
            api_key: self.api_key.clone(),
            api_token: self.api_token.clone(),
            base_url: self.base_url.clone(),
            work_dir: self.work_dir.clone(),
            session: None,
            cancel: self.cancel.clone(),
            workers: self.workers,
        }
    }

    /// Negotiates a fresh session with the service.
    ///
    /// On success the previous session is replaced wholesale. On a rejected
    /// negotiation the previous session is left untouched and
    /// [`ClientError::Negotiation`] is returned.
    pub async fn negotiate(&mut self) -> Result<(), ClientError> {
        let url = format!("{}{}", self.base_url, FILE_UPLOAD_PATH);
        let response = self
            .http
            .post(&url)
            .form(&[("api_key", &self.api_key), ("api_token", &self.api_token)])
            .timeout(API_TIMEOUT)
            .send()
            .await?;
        let body = response.text().await?;

        match ApiResponse::<SessionGrant>::parse(&body) {
            ApiResponse::Success(grant) => {
                let session = UploadSession::from_grant(grant);
                debug!(
                    server_file = %session.server_file,
                    key_expiry = %session.upload_key_expiry,
                    "negotiated upload session"
                );
                self.session = Some(session);
                Ok(())
            }
            ApiResponse::Failure { raw } => Err(ClientError::Negotiation { raw }),
        }
    }

    /// Session form fields plus the optional download password.
    pub(crate) fn upload_fields(
        &self,
        password: Option<&str>,
    ) -> Result<Vec<(String, String)>, ClientError> {
        let session = self.current_session()?;
        let mut fields = session.form_fields(&self.api_key, &self.api_token);
        if let Some(password) = password {
            fields.push((PASSWORD_FIELD.to_string(), password.to_string()));
        }
        Ok(fields)
    }

    /// Queries the service for info on uploaded files by slug.
    ///
    /// Unknown or malformed slugs come back as records with absent fields;
    /// only a rejected envelope is an error.
    pub async fn file_info(&mut self, slugs: &[String]) -> Result<FileInfoMap, ClientError> {
        let mut fields = self.upload_fields(None)?;
        fields.push(("files".to_string(), slugs.join(",")));

        let url = format!("{}{}", self.base_url, FILE_INFO_PATH);
        let response = self
            .http
            .post(&url)
            .form(&fields)
            .timeout(API_TIMEOUT)
            .send()
            .await?;
        let body = response.text().await?;

        ApiResponse::<FileInfoMap>::parse(&body)
            .into_result()
            .map_err(|raw| ClientError::Rejected { raw })
    }

    /// Submits a remote URL for the service to fetch and mirror.
    ///
    /// Consumes the session's upload key; the session is re-negotiated after
    /// a successful submission.
    pub async fn upload_remote(
        &mut self,
        url: &str,
        password: Option<&str>,
    ) -> Result<UploadOutcome, ClientError> {
        let mut fields = self.upload_fields(password)?;
        fields.push(("url".to_string(), url.to_string()));
        let endpoint = self.current_session()?.server_remote.clone();

        let response = self
            .http
            .post(&endpoint)
            .form(&fields)
            .timeout(UPLOAD_TIMEOUT)
            .send()
            .await?;
        let body = response.text().await?;

        let outcome = UploadOutcome::from_body(url, 0, body);
        if outcome.success {
            info!(url, result = outcome.url.as_deref().unwrap_or(""), "remote submission accepted");
            self.negotiate().await?;
        }
        Ok(outcome)
    }
}
