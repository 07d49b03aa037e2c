//! Error types for the core module

use thiserror::Error;

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur while archiving a mailbox
#[derive(Debug, Error)]
pub enum CoreError {
    /// Invalid run configuration, raised before any network activity
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Graph request or response error
    #[error("Graph error: {0}")]
    GraphError(#[from] mailarchiv_graph::GraphError),

    /// Local disk write failure
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
