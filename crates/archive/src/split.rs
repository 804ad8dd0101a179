//! File → fixed-size volume files.

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::ArchiveError;

const COPY_BUF_SIZE: usize = 8 * 1024 * 1024;

/// One volume of a split file, tagged with its position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveVolume {
    /// 1-based position within the parent archive.
    pub ordinal: usize,
    /// Path of the volume file.
    pub path: PathBuf,
    /// Volume size in bytes.
    pub size: u64,
}

/// Splits `file` into volumes of at most `volume_size` bytes under
/// `out_dir/<file stem>/`, named `<stem>.001`, `<stem>.002`, …
///
/// Idempotent with respect to a populated target: when the per-file
/// subdirectory already exists and holds volumes, they are listed and
/// returned without re-splitting.
pub fn split_file(
    file: &Path,
    volume_size: u64,
    out_dir: &Path,
) -> Result<Vec<ArchiveVolume>, ArchiveError> {
    if volume_size == 0 {
        return Err(ArchiveError::ZeroVolumeSize);
    }
    let stem = file
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| ArchiveError::UnusableName(file.to_string_lossy().into_owned()))?;

    let target = out_dir.join(stem);
    if target.is_dir() {
        let existing = list_volumes(&target)?;
        if !existing.is_empty() {
            debug!(target = %target.display(), volumes = existing.len(), "volumes already present");
            return Ok(existing);
        }
    }
    std::fs::create_dir_all(&target)?;

    let mut source = File::open(file)?;
    let total = source.metadata()?.len();
    if total == 0 {
        return Err(ArchiveError::EmptySource(
            file.to_string_lossy().into_owned(),
        ));
    }

    let mut volumes = Vec::new();
    let mut buf = vec![0u8; COPY_BUF_SIZE.min(volume_size as usize)];
    let mut remaining_total = total;
    let mut ordinal = 0usize;

    while remaining_total > 0 {
        ordinal += 1;
        let path = target.join(format!("{stem}.{ordinal:03}"));
        let mut volume = File::create(&path)?;
        let mut written: u64 = 0;

        while written < volume_size && remaining_total > 0 {
            let want = buf
                .len()
                .min((volume_size - written) as usize)
                .min(remaining_total as usize);
            let n = source.read(&mut buf[..want])?;
            if n == 0 {
                break;
            }
            volume.write_all(&buf[..n])?;
            written += n as u64;
            remaining_total -= n as u64;
        }
        volume.sync_all()?;
        volumes.push(ArchiveVolume {
            ordinal,
            path,
            size: written,
        });
    }

    debug!(
        source = %file.display(),
        volumes = volumes.len(),
        volume_size,
        "split file into volumes"
    );
    Ok(volumes)
}

/// Lists volume files under a split target directory in ordinal order.
pub fn list_volumes(dir: &Path) -> Result<Vec<ArchiveVolume>, ArchiveError> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if entry.metadata()?.is_file() {
            paths.push((entry.path(), entry.metadata()?.len()));
        }
    }
    // Volume names differ only by their numeric extension. Sort by its
    // value, not lexicographically, so `.1000` lands after `.999`.
    paths.sort_by_key(|(path, _)| {
        let numeric = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(|e| e.parse::<u64>().ok());
        (numeric, path.clone())
    });

    Ok(paths
        .into_iter()
        .enumerate()
        .map(|(i, (path, size))| ArchiveVolume {
            ordinal: i + 1,
            path,
            size,
        })
        .collect())
}
