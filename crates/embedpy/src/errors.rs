use embedpy_config::ConfigError;
use std::io;
use thiserror::Error;

/// Errors that can occur while crossing the bridge
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Failed to initialize Python interpreter: {0}")]
    Initialization(String),

    #[error("Python interpreter has not been initialized")]
    NotInitialized,

    #[error("Failed to import module '{0}': {1}")]
    Import(String, String),

    #[error("Failed to resolve '{0}': {1}")]
    Resolution(String, String),

    #[error("Failed to decode text: {0}")]
    Decode(String),

    #[error("Call to '{0}' failed: {1}")]
    Invocation(String, String),

    #[error("Precondition violated: {0}")]
    Precondition(String),

    #[error("Python error: {0}")]
    Python(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Generic conversion from PyErr to BridgeError.
///
/// NOTE: the traceback is dropped here. Bridge operations record the full
/// report instead; fetch it with `LockToken::consume_last_error()`.
impl From<pyo3::PyErr> for BridgeError {
    fn from(err: pyo3::PyErr) -> Self {
        BridgeError::Python(format!("{}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BridgeError::Import("missing".to_string(), "No module named 'missing'".to_string());
        assert_eq!(
            err.to_string(),
            "Failed to import module 'missing': No module named 'missing'"
        );

        let err = BridgeError::Precondition("argument index 3 out of range".to_string());
        assert!(err.to_string().starts_with("Precondition violated"));
    }

    #[test]
    fn test_config_error_converts() {
        let err: BridgeError = ConfigError::UnknownKey("nope".to_string()).into();
        assert!(matches!(err, BridgeError::Config(_)));
    }
}
