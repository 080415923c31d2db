//! Error types for treesync-git

use std::path::PathBuf;

use treesync_fs::ContentId;

/// Result type for treesync-git operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in treesync-git operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("Filesystem error: {0}")]
    Fs(#[from] treesync_fs::Error),

    #[error("Not a git working copy: {path}")]
    NotAWorkingCopy { path: PathBuf },

    #[error("Path '{path}' is not in the index")]
    NotInIndex { path: String },

    #[error("Content {id} is not in the local content store")]
    ContentMissing { id: ContentId },

    #[error("Content for {id} hashes to {actual}")]
    ContentMismatch { id: ContentId, actual: ContentId },

    #[error("Path '{path}' does not hold UTF-8 text")]
    NotUtf8 { path: String },
}
