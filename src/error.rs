use thiserror::Error;

/// Result type for configuration, environment and network operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the crate
#[derive(Debug, Error)]
pub enum Error {
    /// A caller-side contract was broken (e.g. recording without a destination)
    #[error("precondition violated: {0}")]
    Precondition(String),

    /// The environment identifier is not registered
    #[error("unknown environment '{id}' (registered: {known})")]
    UnknownEnvironment { id: String, known: String },

    /// `set_game` has not been called yet, so observation/action sizes are unknown
    #[error("game is not set: call set_game before building games or networks")]
    GameNotSet,

    /// Invalid parameter value
    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    /// Invalid dimensions for operations
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: String, actual: String },

    /// Invalid action
    #[error("invalid action {action}: must be less than {max_actions}")]
    InvalidAction { action: usize, max_actions: usize },

    /// IO errors (file operations)
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<bincode::Error> for Error {
    fn from(err: bincode::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

// Helper functions for common error patterns
impl Error {
    pub fn dimension_mismatch<S: Into<String>>(expected: S, actual: S) -> Self {
        Error::DimensionMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn invalid_parameter<S: Into<String>>(name: S, reason: S) -> Self {
        Error::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn precondition<S: Into<String>>(reason: S) -> Self {
        Error::Precondition(reason.into())
    }
}
