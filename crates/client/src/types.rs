//! Task descriptors and transfer outcomes.

use std::path::PathBuf;

use aceup_protocol::{ApiResponse, UploadReceipt};

/// What a transfer task uploads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferSource {
    /// A local file or directory.
    Path(PathBuf),
    /// A remote URL the service fetches itself.
    RemoteUrl(String),
}

/// One requested upload, consumed once by [`crate::Client::run`].
#[derive(Debug, Clone)]
pub struct TransferTask {
    pub source: TransferSource,
    pub password: Option<String>,
}

impl TransferTask {
    /// Task for a local file or directory.
    pub fn path(path: impl Into<PathBuf>, password: Option<String>) -> Self {
        Self {
            source: TransferSource::Path(path.into()),
            password,
        }
    }

    /// Task for a remote URL.
    pub fn remote_url(url: impl Into<String>, password: Option<String>) -> Self {
        Self {
            source: TransferSource::RemoteUrl(url.into()),
            password,
        }
    }
}

/// Result of one completed transfer unit (a file, or one archive volume).
///
/// `raw` keeps the unmodified response body — or, for transfers that never
/// got a response, a short local description — so callers can inspect
/// failures.
#[derive(Debug, Clone)]
pub struct UploadOutcome {
    pub success: bool,
    pub name: Option<String>,
    pub slug: Option<String>,
    pub size: Option<String>,
    pub url: Option<String>,
    pub raw: String,
}

impl UploadOutcome {
    /// Builds an outcome from a response body.
    ///
    /// `local_name` and `local_size` fill in when the service omits them.
    pub fn from_body(local_name: &str, local_size: u64, body: String) -> Self {
        match ApiResponse::<UploadReceipt>::parse(&body) {
            ApiResponse::Success(receipt) => Self {
                success: true,
                name: receipt.name.or_else(|| Some(local_name.to_string())),
                slug: receipt.slug,
                size: receipt.size.or_else(|| Some(local_size.to_string())),
                url: receipt.url,
                raw: body,
            },
            ApiResponse::Failure { raw } => Self::rejected(local_name, raw),
        }
    }

    /// Outcome for a transfer the service rejected or that failed locally.
    pub fn rejected(local_name: &str, raw: String) -> Self {
        Self {
            success: false,
            name: Some(local_name.to_string()),
            slug: None,
            size: None,
            url: None,
            raw,
        }
    }
}
