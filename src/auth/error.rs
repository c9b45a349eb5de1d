use thiserror::Error;

/// Errors raised while authenticating a submitter
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("No valid auth token provided")]
    MissingToken,

    #[error("Invalid authentication token: {0}")]
    InvalidToken(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}
