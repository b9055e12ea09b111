/// Crate-level error type.
///
/// Geometry and relation deduction never fail; these variants cover the
/// configuration, scene management and serialization boundaries.
#[derive(thiserror::Error, Debug)]
pub enum SpatialError {
    #[error("Invalid adjustment: {0}")]
    InvalidAdjustment(String),

    #[error("Unknown adjust setting: {0}")]
    UnknownSetting(String),

    #[error("Invalid {setting} value: {value}")]
    InvalidNumber { setting: String, value: String },

    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    #[error("Index {index} out of range for {len} objects")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Invalid scene: {0}")]
    InvalidScene(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SpatialError>;
