//! Configuration resolution
//!
//! Configuration is loaded and merged from these sources (later sources
//! override earlier):
//!
//! 1. **Global defaults**: `<config_dir>/treesync/config.toml`
//! 2. **Repository config**: `.treesync/config.toml`
//! 3. **Local overrides**: `.treesync/config.local.toml` (git-ignored)
//! 4. **Environment**: `TREESYNC_STORE`, `TREESYNC_REMOTES`,
//!    `TREESYNC_UPLOAD_STRATEGY`, `TREESYNC_MAX_TEXT_SIZE`
//!
//! The result is an immutable [`SyncConfig`] handed to push and fetch.

mod manifest;
mod resolver;

pub use manifest::{Manifest, UploadSection};
pub use resolver::{ConfigResolver, DEFAULT_MAX_TEXT_SIZE, SyncConfig};
