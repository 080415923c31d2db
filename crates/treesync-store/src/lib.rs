//! Remote tree store for treesync
//!
//! A tree store holds named repositories. Each repository is an append-only
//! chain of commits; each commit records one complete [`Tree`] snapshot plus
//! [`CommitMeta`]. Binary payloads live in a shared blob area keyed by
//! [`ContentId`](treesync_fs::ContentId), so any repository in the same store
//! can reference content uploaded by another.
//!
//! Two backends implement [`TreeStore`]:
//!
//! - [`FsTreeStore`]: a directory on a local or mounted filesystem
//! - [`MemoryTreeStore`]: in-process, used by tests

pub mod error;
pub mod fs_store;
pub mod memory;
pub mod node;
pub mod snapshot;
pub mod store;

pub use error::{Error, Result};
pub use fs_store::FsTreeStore;
pub use memory::MemoryTreeStore;
pub use node::{
    Node, Object, ObjectKind, ObjectMeta, Payload, Tree, TreeDigest, TreeMeta, UploadStrategy,
};
pub use snapshot::{CommitId, CommitMeta, CommitRecord, CommitRequest, Root, Snapshot};
pub use store::{ContentSource, TreeStore, validate_repository_name};
