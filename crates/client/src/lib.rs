//! MirrorAce upload engine.
//!
//! This crate implements the transfer-strategy logic for uploading files and
//! directories to MirrorAce. It is a library crate with no UI — the CLI app
//! layers argument parsing and output on top of [`Client`].
//!
//! # Pipeline
//!
//! 1. **Negotiate** — fetch session parameters (endpoints, thresholds,
//!    mirror selection, single-use upload key)
//! 2. **Classify** — directory → archive first; then pick a strategy from
//!    the file size against the negotiated thresholds
//! 3. **Transfer** — one direct POST, a sequence of `Content-Range` chunk
//!    POSTs, or an archive split uploaded volume-by-volume
//! 4. **Verify** — check each response envelope for the success marker
//! 5. **Refresh** — re-negotiate after every completed transfer unit, since
//!    each upload key is valid for one transfer only

pub mod batch;
pub mod client;
pub mod error;
pub mod strategy;
pub mod types;
pub mod upload;

#[cfg(test)]
mod testutil;

// Re-export primary types for convenience.
pub use client::Client;
pub use error::ClientError;
pub use strategy::{Payload, Strategy};
pub use types::{TransferSource, TransferTask, UploadOutcome};
