//! Directory archiving and multi-volume splitting.
//!
//! Payloads the service will not take in one transfer are prepared here:
//! directories become a single tar file, and files above the service's
//! absolute size threshold are cut into fixed-size volume files that upload
//! independently. Both operations work under a caller-supplied working
//! directory and are black boxes to the upload engine.

mod pack;
mod split;

pub use pack::archive_directory;
pub use split::{ArchiveVolume, list_volumes, split_file};

/// Errors produced by the archive crate.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("not a directory: {0}")]
    NotADirectory(String),

    #[error("source is empty: {0}")]
    EmptySource(String),

    #[error("volume size must be non-zero")]
    ZeroVolumeSize,

    #[error("unusable source name: {0}")]
    UnusableName(String),
}
