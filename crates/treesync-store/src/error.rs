//! Error types for treesync-store

use std::path::PathBuf;

use treesync_fs::ContentId;

use crate::CommitId;

/// Result type for treesync-store operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in treesync-store operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Repository '{name}' not found")]
    NotFound { name: String },

    #[error("Repository '{name}' is unreachable: {message}")]
    Unreachable { name: String, message: String },

    #[error("Invalid repository name '{name}'")]
    InvalidName { name: String },

    #[error(
        "Head of '{name}' moved: expected {}, found {}",
        display_head(.expected),
        display_head(.actual)
    )]
    StaleHead {
        name: String,
        expected: Option<CommitId>,
        actual: Option<CommitId>,
    },

    #[error("Content {id} is not present in the store")]
    ContentMissing { id: ContentId },

    #[error("Content {id} failed verification: bytes hash to {actual}")]
    ContentMismatch { id: ContentId, actual: ContentId },

    #[error("Could not read content {id} for upload: {message}")]
    ContentSource { id: ContentId, message: String },

    #[error("Corrupt store data at {path}: {message}")]
    Corrupt { path: PathBuf, message: String },

    #[error("Filesystem error: {0}")]
    Fs(#[from] treesync_fs::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

fn display_head(head: &Option<CommitId>) -> String {
    match head {
        Some(id) => id.to_string(),
        None => "<none>".to_string(),
    }
}
