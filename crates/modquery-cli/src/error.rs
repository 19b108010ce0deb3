//! Error types for modquery-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from modquery-core
    #[error(transparent)]
    Core(#[from] modquery_core::Error),

    /// Configuration file could not be parsed
    #[error("invalid configuration in {path}: {source}")]
    Config {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON output error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    /// Create a new user error with the given message
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }

    /// Process exit status for this error.
    pub fn exit_code(&self) -> i32 {
        use modquery_core::ErrorKind;

        match self {
            Self::Core(e) => match e.kind() {
                ErrorKind::GraphEvaluationFailed => 3,
                ErrorKind::Interrupted => 130,
                _ => 2,
            },
            Self::Config { .. } | Self::User { .. } => 2,
            Self::Io(_) | Self::Json(_) => 3,
        }
    }
}
