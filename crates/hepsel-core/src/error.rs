//! Error types for hepsel

/// Result type alias using hepsel's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for hepsel operations
///
/// Per-event degradations (missing optional fields, no primary vertex,
/// column overflow) are not errors; they are encoded as defaults and logged.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Malformed event input
    #[error("input error: {0}")]
    Input(String),

    /// Detector geometry lookup errors
    #[error("geometry error: {0}")]
    Geometry(String),

    /// Output sink errors
    #[error("sink error: {0}")]
    Sink(String),

    /// Filesystem errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new input error
    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input(msg.into())
    }

    /// Create a new geometry error
    pub fn geometry(msg: impl Into<String>) -> Self {
        Self::Geometry(msg.into())
    }

    /// Create a new sink error
    pub fn sink(msg: impl Into<String>) -> Self {
        Self::Sink(msg.into())
    }
}
