//! Directory → single tar file.

use std::fs::File;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::ArchiveError;

/// Archives a directory tree into `out_dir/<dir name>.tar`.
///
/// The archive holds the directory's contents at its root. An existing
/// archive of the same name is overwritten; the source is never modified.
pub fn archive_directory(dir: &Path, out_dir: &Path) -> Result<PathBuf, ArchiveError> {
    if !dir.is_dir() {
        return Err(ArchiveError::NotADirectory(
            dir.to_string_lossy().into_owned(),
        ));
    }
    let name = dir
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| ArchiveError::UnusableName(dir.to_string_lossy().into_owned()))?;

    std::fs::create_dir_all(out_dir)?;
    let archive_path = out_dir.join(format!("{name}.tar"));

    let file = File::create(&archive_path)?;
    let mut builder = tar::Builder::new(file);
    builder.append_dir_all("", dir)?;
    builder.into_inner()?.sync_all()?;

    debug!(source = %dir.display(), archive = %archive_path.display(), "archived directory");
    Ok(archive_path)
}
