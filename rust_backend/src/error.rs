//! Error types for analysis operations.
//!
//! Nothing in the analysis core is fatal: malformed records are dropped, degenerate fits
//! fall back to untrended output. The variants here cover the few places where a caller
//! supplies something that cannot be interpreted at all (an unknown knob value, an
//! unreadable configuration file).

/// Result type for analysis operations
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Error type for analysis operations
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Unknown metric: {0}")]
    UnknownMetric(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

impl From<String> for AnalysisError {
    fn from(s: String) -> Self {
        AnalysisError::InvalidParameter(s)
    }
}

impl From<&str> for AnalysisError {
    fn from(s: &str) -> Self {
        AnalysisError::InvalidParameter(s.to_string())
    }
}
