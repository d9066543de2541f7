//! Error types for loading plans, templates, and configuration.
//!
//! Interactive operations (gestures, manipulation, camera moves) never fail:
//! they clamp or no-op. Only decoding of externally supplied blobs can.

/// Errors surfaced by the floor canvas crate.
#[derive(Debug, thiserror::Error)]
pub enum CanvasError {
    #[error("failed to decode canvas data: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("duplicate element id: {0}")]
    DuplicateElementId(String),
    #[error("unknown template: {0}")]
    UnknownTemplate(String),
    #[error("invalid canvas config: {0}")]
    InvalidConfig(String),
}
