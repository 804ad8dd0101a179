//! Records the service returns about uploaded files.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Per-slug record from the file-info endpoint.
///
/// Every field is optional: unknown or malformed slugs come back as an
/// object with the fields absent (or non-string), not as an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileInfo {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl FileInfo {
    /// Returns `true` when the service actually knows the slug.
    pub fn is_known(&self) -> bool {
        self.slug.is_some() && self.url.is_some()
    }
}

/// Info endpoint result: slug → record.
pub type FileInfoMap = HashMap<String, FileInfo>;

/// Result payload of a completed upload request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UploadReceipt {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}
