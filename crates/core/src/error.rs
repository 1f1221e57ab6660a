/// Result alias that carries the custom [`ExerciseError`] type.
pub type Result<T> = std::result::Result<T, ExerciseError>;

/// Common error type for the core crate.
///
/// Every variant is produced while building a session or parsing its
/// configuration. The per-frame update path never fails.
#[derive(Debug, thiserror::Error)]
pub enum ExerciseError {
    /// The exercise configuration violates one of its constraints.
    #[error("invalid exercise configuration: {0}")]
    InvalidConfig(String),
    /// A landmark name that is not part of the pose or hand topology.
    #[error("unknown landmark `{0}`")]
    UnknownLandmark(String),
    /// Wrapper around JSON decoding errors for configuration documents.
    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

impl ExerciseError {
    pub(crate) fn config<T: Into<String>>(msg: T) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
