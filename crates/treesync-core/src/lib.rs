//! Reconciliation engine for treesync
//!
//! This crate keeps a local working set and remote tree stores in step:
//!
//! - **Inventory**: what the working copy tracks and contains
//! - **Remote roots**: the latest snapshot of each configured remote, in precedence order
//! - **Object resolution**: finding remote objects that already hold a given content
//! - **Tree building**: a complete snapshot of the working set for a push
//! - **Sync guard**: refusing pushes that would discard remote history
//! - **Push / fetch**: the two operations the CLI exposes
//!
//! # Architecture
//!
//! ```text
//!                   treesync-cli
//!                        |
//!                  treesync-core
//!                        |
//!        +---------------+---------------+
//!        |               |               |
//!   treesync-fs    treesync-git    treesync-store
//! ```
//!
//! # Example
//!
//! ```ignore
//! use treesync_core::{ConfigResolver, PushEngine, PushOptions};
//!
//! let config = ConfigResolver::new(root.clone()).resolve()?;
//! let vcs = treesync_git::GitVcs::discover(&root)?;
//! let store = treesync_store::FsTreeStore::new(config.store_root()?.clone());
//! let report = PushEngine::new(&vcs, &store, &config).push(&PushOptions::default())?;
//! ```

pub mod builder;
pub mod config;
pub mod error;
pub mod fetch;
pub mod guard;
pub mod inventory;
pub mod push;
pub mod resolve;
pub mod roots;
pub mod strategy;

pub use builder::{BuildResult, BuildStats, TreeBuilder};
pub use config::{ConfigResolver, DEFAULT_MAX_TEXT_SIZE, Manifest, SyncConfig, UploadSection};
pub use error::{Error, Result};
pub use fetch::{FetchEngine, FetchMiss, FetchReport, MissReason};
pub use guard::{GuardOutcome, SyncGuard};
pub use inventory::Inventory;
pub use push::{PushEngine, PushOptions, PushOutcome, PushReport};
pub use resolve::{ObjectResolver, Resolved};
pub use roots::{OpenedRoots, RemoteRootResolver, SkipReason, SkippedRoot};
pub use strategy::StrategySetting;
