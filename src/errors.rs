//! Error Types
//!
//! This module defines the error type shared by the loader, the exporter and
//! the application controller.
//!
//! # Overview
//!
//! [`StudioError`] covers the failure modes that can reach the caller:
//! - Asset decoding errors (malformed or unrecognized input)
//! - Artifact encoding errors
//! - File I/O and settings errors
//!
//! Operations that act on a stale clip or an absent selection (renaming a
//! removed clip, blurring with nothing active, ...) are not errors. They are
//! no-ops reported through `bool` / `Option` return values.
//!
//! # Usage
//!
//! ```rust,ignore
//! use clip_studio::errors::{StudioError, Result};
//!
//! fn load() -> Result<()> {
//!     Err(StudioError::Decode("not a glTF file".into()))
//! }
//! ```

use thiserror::Error;

/// The main error type for Clip Studio.
#[derive(Error, Debug)]
pub enum StudioError {
    // ========================================================================
    // Boundary Codec Errors
    // ========================================================================
    /// The input bytes are not a valid, recognized model asset.
    #[error("Failed to decode asset: {0}")]
    Decode(String),

    /// The export encoder failed to produce an artifact.
    #[error("Failed to encode artifact: {0}")]
    Encode(String),

    // ========================================================================
    // Controller State Errors
    // ========================================================================
    /// The operation needs a loaded asset and none is live.
    #[error("No asset is currently loaded")]
    NoAssetLoaded,

    // ========================================================================
    // I/O & Configuration Errors
    // ========================================================================
    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid editor settings.
    #[error("Invalid settings: {0}")]
    Settings(String),
}

impl From<gltf::Error> for StudioError {
    fn from(err: gltf::Error) -> Self {
        StudioError::Decode(err.to_string())
    }
}

/// Alias for `Result<T, StudioError>`.
pub type Result<T> = std::result::Result<T, StudioError>;
