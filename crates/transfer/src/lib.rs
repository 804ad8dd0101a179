//! Byte-range planning and range-exact file reading for chunked uploads.
//!
//! A chunked upload sends one request per byte range, each declaring its
//! span with `Content-Range: bytes {start}-{end}/{total}`. [`RangePlan`]
//! computes the spans; [`RangeReader`] reads exactly one span at a time from
//! the payload file.

mod ranges;
mod reader;

pub use ranges::{ByteRange, RangePlan};
pub use reader::RangeReader;

/// Errors produced by the transfer crate.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("empty payload: {0}")]
    EmptyPayload(String),

    #[error("range {start}-{end} does not fit a {size}-byte payload")]
    RangeOutOfBounds { start: u64, end: u64, size: u64 },
}
