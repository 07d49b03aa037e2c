//! Error types for the auth module

use thiserror::Error;

/// Result type for auth operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Errors that can occur during authentication
#[derive(Debug, Error)]
pub enum AuthError {
    /// Token exchange rejected by the identity provider
    #[error("Token exchange failed: {0}")]
    TokenExchangeFailed(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
