//! Filesystem layer for treesync
//!
//! Provides normalized repository paths, content identifiers and safe I/O
//! shared by the VCS and tree-store collaborators.

pub mod checksum;
pub mod constants;
pub mod error;
pub mod io;
pub mod path;

pub use checksum::ContentId;
pub use constants::RepoPath;
pub use error::{Error, Result};
pub use path::NormalizedPath;
