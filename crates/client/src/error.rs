//! Upload engine error types.

/// Errors produced by the upload engine.
///
/// Negative API results on upload requests are **not** errors — they come
/// back as [`crate::UploadOutcome`] values with `success == false` so that
/// sibling transfers keep going. Errors are reserved for transport and
/// local-filesystem problems, rejected negotiations, and cancellation.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("negotiation rejected: {raw}")]
    Negotiation { raw: String },

    #[error("request rejected: {raw}")]
    Rejected { raw: String },

    #[error("source not found: {0}")]
    SourceNotFound(String),

    #[error("no negotiated session")]
    NoSession,

    #[error("negotiated session unusable: {0}")]
    UnusableSession(String),

    #[error("cancelled")]
    Cancelled,

    #[error("worker task failed: {0}")]
    Worker(String),

    #[error("archive error: {0}")]
    Archive(#[from] aceup_archive::ArchiveError),

    #[error("transfer error: {0}")]
    Transfer(#[from] aceup_transfer::TransferError),
}
