//! Response envelope decoding.
//!
//! Every MirrorAce response is `{"status": "...", "result": {...}}`. The
//! envelope is decoded into a tagged [`ApiResponse`] so callers match on
//! success/failure instead of poking at untyped JSON. Anything that is not a
//! well-formed success — wrong status, missing result, result that does not
//! fit the expected payload, or an unparseable body — is a failure carrying
//! the raw body for inspection.

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::constants::STATUS_SUCCESS;

#[derive(Debug, Deserialize)]
struct RawEnvelope {
    #[serde(default)]
    status: String,
    #[serde(default)]
    result: Option<serde_json::Value>,
}

/// Decoded response envelope for one endpoint's payload type.
#[derive(Debug, Clone)]
pub enum ApiResponse<T> {
    /// `status == "success"` and the result decoded as `T`.
    Success(T),
    /// Everything else; `raw` is the unmodified response body.
    Failure { raw: String },
}

impl<T: DeserializeOwned> ApiResponse<T> {
    /// Decodes a response body.
    pub fn parse(body: &str) -> Self {
        let envelope: RawEnvelope = match serde_json::from_str(body) {
            Ok(e) => e,
            Err(_) => return Self::failure(body),
        };
        if envelope.status != STATUS_SUCCESS {
            return Self::failure(body);
        }
        let Some(result) = envelope.result else {
            return Self::failure(body);
        };
        match serde_json::from_value(result) {
            Ok(payload) => Self::Success(payload),
            Err(_) => Self::failure(body),
        }
    }

    fn failure(body: &str) -> Self {
        Self::Failure {
            raw: body.to_string(),
        }
    }
}

impl<T> ApiResponse<T> {
    /// Returns `true` for [`ApiResponse::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Converts into `Result`, with the raw body as the error value.
    pub fn into_result(self) -> Result<T, String> {
        match self {
            Self::Success(payload) => Ok(payload),
            Self::Failure { raw } => Err(raw),
        }
    }
}
