use thiserror::Error;

/// Errors surfaced by the editing core.
///
/// Locked or hidden layers, out-of-range history moves and malformed color
/// strings are deliberately absent: those degrade to no-ops or defaults.
#[derive(Debug, Error)]
pub enum EditorError {
    /// Flood fill seed lies outside the target buffer
    #[error("flood fill seed ({x}, {y}) is outside the buffer")]
    InvalidSeed { x: i64, y: i64 },

    #[error("no layer at index {0}")]
    LayerNotFound(usize),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error("invalid font data for family {family:?}")]
    InvalidFont { family: String },
}

/// Errors produced while encoding or restoring a layer snapshot
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to encode snapshot: {0}")]
    Encode(#[source] image::ImageError),

    #[error("failed to decode snapshot: {0}")]
    Decode(#[source] image::ImageError),

    #[error("snapshot is {actual:?} but the layer is {expected:?}")]
    SizeMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },
}

/// Errors produced while loading an [`EditorConfig`](crate::config::EditorConfig)
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Result type for editor operations
pub type EditorResult<T> = Result<T, EditorError>;
