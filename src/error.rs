use miette::Diagnostic;
use thiserror::Error;

/// Failures reported by a parameter store
#[derive(Debug, Error, Diagnostic)]
pub enum ParameterStoreError {
    #[error("Parameter not found: {0}")]
    #[diagnostic(code(calforward::parameter_store::not_found))]
    NotFound(String),

    #[error("Access denied to parameter: {0}")]
    #[diagnostic(code(calforward::parameter_store::access_denied))]
    AccessDenied(String),

    #[error("Invalid parameter request: {0}")]
    #[diagnostic(code(calforward::parameter_store::validation))]
    Validation(String),

    #[error("Parameter store service error: {0}")]
    #[diagnostic(code(calforward::parameter_store::service))]
    Service(String),
}

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Configuration error: {0}")]
    #[diagnostic(code(calforward::config))]
    Configuration(String),

    #[error("Authentication error: {0}")]
    #[diagnostic(code(calforward::authentication))]
    Authentication(String),

    #[error("Transport error: {0}")]
    #[diagnostic(code(calforward::transport))]
    Transport(String),

    #[error(transparent)]
    #[diagnostic(transparent)]
    ParameterStore(#[from] ParameterStoreError),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(calforward::serialization))]
    Serialization(String),

    #[error(transparent)]
    #[diagnostic(code(calforward::io))]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type ForwarderResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Configuration(format!("Missing environment variable: {}", var))
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Configuration(message.to_string())
}

/// Helper to create authentication errors
pub fn auth_error(message: &str) -> Error {
    Error::Authentication(message.to_string())
}

/// Helper to create transport errors
pub fn transport_error(message: &str) -> Error {
    Error::Transport(message.to_string())
}
