//! Git working-copy collaborator for treesync
//!
//! Exposes the local repository through the [`Vcs`] trait: which paths carry
//! tracked content (and whether that content is materialized), the full
//! working path listing, commit ancestry, and a local content store that
//! newly fetched bytes are registered with.

pub mod content_store;
pub mod entry;
pub mod error;
pub mod pointer;
pub mod repository;
pub mod vcs;

pub use content_store::LocalContentStore;
pub use entry::{Entry, EntryStatus, PathKind, WorkingPath, matches_filters};
pub use error::{Error, Result};
pub use pointer::Pointer;
pub use repository::GitVcs;
pub use vcs::{Ancestry, Vcs};
