//! Payload classification and strategy selection.
//!
//! A payload path resolves to a file or a directory before any size check;
//! directories are archived into a single file and only then classified.
//! The size classification itself is a pure function of the negotiated
//! thresholds.

use std::path::{Path, PathBuf};

use crate::error::ClientError;

/// A payload path resolved against the filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    File(PathBuf),
    Directory(PathBuf),
}

impl Payload {
    /// Resolves `path`, failing with [`ClientError::SourceNotFound`] when it
    /// does not exist.
    pub fn resolve(path: &Path) -> Result<Self, ClientError> {
        if path.is_file() {
            Ok(Self::File(path.to_path_buf()))
        } else if path.is_dir() {
            Ok(Self::Directory(path.to_path_buf()))
        } else {
            Err(ClientError::SourceNotFound(
                path.to_string_lossy().into_owned(),
            ))
        }
    }
}

/// How a file of a given size is transferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// One POST with the whole file.
    Direct,
    /// Sequential `Content-Range` chunk POSTs.
    Chunked,
    /// Split into archive volumes, each uploaded as its own chunked transfer.
    Split,
}

/// Picks the strategy for a `size`-byte file.
///
/// The archive comparison is inclusive (`size >= file_threshold`) and the
/// chunk comparison exclusive (`size < chunk_threshold`), so every size maps
/// to exactly one strategy.
pub fn select(size: u64, chunk_threshold: u64, file_threshold: u64) -> Strategy {
    if size >= file_threshold {
        Strategy::Split
    } else if size >= chunk_threshold {
        Strategy::Chunked
    } else {
        Strategy::Direct
    }
}
