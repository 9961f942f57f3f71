//! Error type for scene construction and rendering.

use thiserror::Error;

/// Errors that can occur while building acceleration structures or rendering.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("cannot build a BVH from an empty object list")]
    EmptyBvh,

    #[error("invalid render configuration: {0}")]
    InvalidConfig(String),

    #[error("pixel task at row {row}, column {col} failed: {message}")]
    TaskFailed { row: u32, col: u32, message: String },

    #[error("row {row} received {received} of {expected} pixel results")]
    MissingPixels {
        row: u32,
        expected: usize,
        received: usize,
    },

    #[error("failed to start worker pool: {0}")]
    ThreadPool(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type RenderResult<T> = Result<T, RenderError>;
