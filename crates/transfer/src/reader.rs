//! Range-exact file reading.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use crate::{ByteRange, TransferError};

/// Reads arbitrary byte ranges of one file.
///
/// Unlike a sequential chunk reader, every read seeks to the range start, so
/// an aborted transfer can be restarted from range zero without reopening
/// the file.
pub struct RangeReader {
    file: File,
    file_size: u64,
}

impl RangeReader {
    /// Opens `path` for range reads.
    ///
    /// Fails with [`TransferError::EmptyPayload`] for zero-length files;
    /// there is no range to plan over them.
    pub fn open(path: &Path) -> Result<Self, TransferError> {
        let file = File::open(path)?;
        let file_size = file.metadata()?.len();
        if file_size == 0 {
            return Err(TransferError::EmptyPayload(
                path.to_string_lossy().into_owned(),
            ));
        }
        Ok(Self { file, file_size })
    }

    /// Total file size in bytes.
    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// Reads exactly the bytes `range` covers.
    pub fn read_range(&mut self, range: &ByteRange) -> Result<Vec<u8>, TransferError> {
        if range.end >= self.file_size {
            return Err(TransferError::RangeOutOfBounds {
                start: range.start,
                end: range.end,
                size: self.file_size,
            });
        }
        self.file.seek(SeekFrom::Start(range.start))?;
        let mut buf = vec![0u8; range.len() as usize];
        self.file.read_exact(&mut buf)?;
        Ok(buf)
    }
}
