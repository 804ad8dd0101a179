//! Upload session parameters.
//!
//! A session is negotiated by POSTing the account credentials to the upload
//! endpoint. The service answers with per-session endpoints, size
//! thresholds, the mirror selection, and a **single-use** upload key: one
//! subsequent upload POST consumes it, after which the session must be
//! re-negotiated. Numeric thresholds travel as strings and are echoed back
//! verbatim in upload forms, so they are stored as received.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::constants::MIRRORS_FIELD;

/// Raw negotiation result as returned by the service.
///
/// Carries both the general `mirrors` catalogue and the `default_mirrors`
/// selection; [`UploadSession::from_grant`] collapses them into the single
/// outbound mirror list the upload endpoints expect.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionGrant {
    pub server: String,
    pub server_file: String,
    pub server_remote: String,
    #[serde(rename = "cTracker")]
    pub c_tracker: String,
    pub upload_key: String,
    #[serde(default)]
    pub upload_key_expiry: String,
    #[serde(default)]
    pub max_chunk_size: String,
    #[serde(default)]
    pub max_file_size: String,
    #[serde(default)]
    pub max_mirrors: String,
    #[serde(default)]
    pub mirrors: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub default_mirrors: Vec<String>,
}

/// Negotiated session state consumed by upload requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadSession {
    pub server: String,
    pub server_file: String,
    pub server_remote: String,
    pub c_tracker: String,
    pub upload_key: String,
    pub upload_key_expiry: String,
    pub max_chunk_size: String,
    pub max_file_size: String,
    pub max_mirrors: String,
    /// Mirror selection, sent as repeated `mirrors[]` form entries.
    pub mirrors: Vec<String>,
}

impl UploadSession {
    /// Collapses a raw grant into session state.
    ///
    /// The selection in `default_mirrors` becomes the outbound mirror list;
    /// the redundant `mirrors` catalogue is discarded.
    pub fn from_grant(grant: SessionGrant) -> Self {
        Self {
            server: grant.server,
            server_file: grant.server_file,
            server_remote: grant.server_remote,
            c_tracker: grant.c_tracker,
            upload_key: grant.upload_key,
            upload_key_expiry: grant.upload_key_expiry,
            max_chunk_size: grant.max_chunk_size,
            max_file_size: grant.max_file_size,
            max_mirrors: grant.max_mirrors,
            mirrors: grant.default_mirrors,
        }
    }

    /// Size at and above which a file must be uploaded in byte-range chunks.
    ///
    /// Returns 0 when the service sent nothing parseable; callers treat 0 as
    /// an unusable session.
    pub fn chunk_threshold(&self) -> u64 {
        self.max_chunk_size.parse().unwrap_or(0)
    }

    /// Size at and above which a file must be split into archive volumes.
    pub fn file_threshold(&self) -> u64 {
        self.max_file_size.parse().unwrap_or(0)
    }

    /// Form fields every upload/info request carries.
    pub fn form_fields(&self, api_key: &str, api_token: &str) -> Vec<(String, String)> {
        let mut fields = vec![
            ("api_key".to_string(), api_key.to_string()),
            ("api_token".to_string(), api_token.to_string()),
            ("cTracker".to_string(), self.c_tracker.clone()),
            ("upload_key".to_string(), self.upload_key.clone()),
            ("upload_key_expiry".to_string(), self.upload_key_expiry.clone()),
        ];
        for mirror in &self.mirrors {
            fields.push((MIRRORS_FIELD.to_string(), mirror.clone()));
        }
        fields
    }
}
