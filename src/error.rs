use std::fmt;

/// Result type for collusim operations
pub type Result<T> = std::result::Result<T, CollusimError>;

/// Main error type for the collusim library
#[derive(Debug, Clone)]
pub enum CollusimError {
    /// Invalid parameter value
    InvalidParameter {
        name: String,
        reason: String,
    },

    /// Feature that is deliberately unimplemented (e.g. Bertrand competition)
    NotImplemented {
        feature: String,
    },

    /// Statistics requested over too little data
    EmptyHistory(String),

    /// IO errors (file operations)
    IoError(String),

    /// Serialization/deserialization errors
    SerializationError(String),
}

impl fmt::Display for CollusimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollusimError::InvalidParameter { name, reason } => {
                write!(f, "Invalid parameter '{}': {}", name, reason)
            }
            CollusimError::NotImplemented { feature } => {
                write!(f, "Not implemented: {}", feature)
            }
            CollusimError::EmptyHistory(msg) => write!(f, "Empty history: {}", msg),
            CollusimError::IoError(msg) => write!(f, "IO error: {}", msg),
            CollusimError::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for CollusimError {}

// Conversion from std::io::Error
impl From<std::io::Error> for CollusimError {
    fn from(err: std::io::Error) -> Self {
        CollusimError::IoError(err.to_string())
    }
}

// Conversion from bincode::Error
impl From<bincode::Error> for CollusimError {
    fn from(err: bincode::Error) -> Self {
        CollusimError::SerializationError(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for CollusimError {
    fn from(err: serde_json::Error) -> Self {
        CollusimError::SerializationError(err.to_string())
    }
}

// Helper functions for common error patterns
impl CollusimError {
    pub fn invalid_parameter<S: Into<String>>(name: S, reason: S) -> Self {
        CollusimError::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn not_implemented<S: Into<String>>(feature: S) -> Self {
        CollusimError::NotImplemented {
            feature: feature.into(),
        }
    }
}
