//! Shared test utilities for the treesync workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`git`]: git repository fixtures with pointer-tracked content
//! - [`vcs`]: [`MemoryVcs`](vcs::MemoryVcs), an in-memory working copy
//! - [`repo`]: [`TestRepo`](repo::TestRepo), a git working copy plus a store directory

pub mod git;
pub mod repo;
pub mod vcs;
