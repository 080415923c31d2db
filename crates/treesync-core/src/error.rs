//! Error types for treesync-core

use treesync_fs::{ContentId, NormalizedPath};

use crate::fetch::FetchMiss;

/// Result type for treesync-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in treesync-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A new object is needed but its bytes are not stored locally
    #[error("Content {content_id} for '{path}' is not available locally or in any remote")]
    ContentUnavailable {
        path: NormalizedPath,
        content_id: ContentId,
    },

    /// A plain file exceeds the inline text limit
    #[error("'{path}' is {size} bytes, over the inline text limit of {max} bytes")]
    TextTooLarge {
        path: NormalizedPath,
        size: u64,
        max: u64,
    },

    /// A plain file cannot be stored inline because it is not UTF-8
    #[error("'{path}' is not UTF-8 text; track it as content instead")]
    NotText { path: NormalizedPath },

    /// A path needs a directory where the tree already holds an object
    #[error("'{path}' conflicts with an existing object in the tree")]
    PathConflict { path: NormalizedPath },

    /// The remote records an origin commit this repository does not have
    #[error(
        "Remote '{remote}' was pushed from {origin_commit}, which is not in local history"
    )]
    HistoryUnknown {
        remote: String,
        origin_commit: String,
    },

    /// The remote's origin commit is not an ancestor of the local head
    #[error(
        "Remote '{remote}' was pushed from {origin_commit}, not an ancestor of {}; use --force",
        display_head(.head)
    )]
    Divergence {
        remote: String,
        origin_commit: String,
        head: Option<String>,
    },

    /// A non-empty remote snapshot has no origin commit to check against
    #[error("Remote '{remote}' has no recorded origin commit; use --force to replace it")]
    UnverifiableRemote { remote: String },

    #[error("No remotes configured; add one to .treesync/config.toml")]
    NoRemotesConfigured,

    /// The push target exists but could not be opened
    #[error("Push target '{remote}' is unavailable: {message}")]
    PushTargetUnavailable { remote: String, message: String },

    /// Aggregated per-path fetch failures
    #[error("Failed to fetch {} path(s): {}", .misses.len(), display_misses(.misses))]
    FetchMisses { misses: Vec<FetchMiss> },

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidConfig { key: String, message: String },

    // Transparent wrappers for underlying crate errors
    /// Filesystem error from treesync-fs
    #[error(transparent)]
    Fs(#[from] treesync_fs::Error),

    /// VCS error from treesync-git
    #[error(transparent)]
    Vcs(#[from] treesync_git::Error),

    /// Tree store error from treesync-store
    #[error(transparent)]
    Store(#[from] treesync_store::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// TOML deserialization error
    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),

    /// TOML serialization error
    #[error(transparent)]
    TomlSer(#[from] toml::ser::Error),
}

fn display_head(head: &Option<String>) -> String {
    match head {
        Some(head) => format!("local head {head}"),
        None => "an empty local history".to_string(),
    }
}

fn display_misses(misses: &[FetchMiss]) -> String {
    misses
        .iter()
        .map(|miss| miss.path.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
