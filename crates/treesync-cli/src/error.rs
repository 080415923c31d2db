//! Error types for treesync-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from treesync-core
    #[error(transparent)]
    Core(#[from] treesync_core::Error),

    /// Error from treesync-fs
    #[error(transparent)]
    Fs(#[from] treesync_fs::Error),

    /// Error from treesync-git
    #[error(transparent)]
    Vcs(#[from] treesync_git::Error),

    /// Error from treesync-store
    #[error(transparent)]
    Store(#[from] treesync_store::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

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
}
