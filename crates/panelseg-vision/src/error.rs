//! Error types for panelseg-vision

use thiserror::Error;

/// Errors that can occur in the vision pipeline (border, edge, PPHT,
/// linker, regions).
#[derive(Debug, Error)]
pub enum VisionError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] panelseg_core::Error),
}

/// Result type for vision operations
pub type VisionResult<T> = Result<T, VisionError>;
