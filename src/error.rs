use std::time::Duration;

use thiserror::Error;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, TreeError>;

/// Errors surfaced by the tree model.
///
/// Collaborator failures are carried as opaque messages; the tree does not
/// interpret or retry them. Retry policy belongs to the caller.
#[derive(Debug, Error)]
pub enum TreeError {
    /// A storage collaborator call failed.
    #[error("storage error: {0}")]
    Storage(String),

    /// A registry collaborator call failed.
    #[error("registry error: {0}")]
    Registry(String),

    /// A content fetch exceeded its caller-supplied timeout.
    #[error("operation timed out after {0:?}")]
    Timeout(Duration),

    /// A rename or creation was given an unusable name.
    #[error("invalid name: {0}")]
    InvalidName(String),
}
