//! Error types for scene construction and rendering.
//!
//! Per-sample degeneracies (parallel rays, zero-area triangles, near-zero
//! pdfs) are never errors; they contribute zero radiance and are handled
//! inline. These types cover the fatal, per-render failures.

use thiserror::Error;

/// Scene construction failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SceneError {
    /// A primitive references a material slot past the end of the table.
    #[error("material index {index} out of range (table has {len} entries)")]
    MaterialOutOfRange { index: u32, len: usize },
}

/// Render invocation failures.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("image dimensions must be non-zero, got {width}x{height}")]
    InvalidResolution { width: u32, height: u32 },

    #[error("samples per pixel must be non-zero")]
    NoSamples,

    #[error("failed to build worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}
