//! Materializing remote content locally
//!
//! Paths are processed one after another. A path that cannot be fetched is
//! recorded as a miss and the rest still run; misses are only reported once
//! every path has been attempted.

use std::fmt;

use treesync_fs::{ContentId, NormalizedPath};
use treesync_git::{Entry, Vcs};
use treesync_store::{Payload, Snapshot, TreeStore};

use crate::config::SyncConfig;
use crate::inventory::Inventory;
use crate::resolve::ObjectResolver;
use crate::roots::{RemoteRootResolver, SkippedRoot};
use crate::{Error, Result};

/// Why one path could not be fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MissReason {
    /// No opened root holds the content at this path
    NotFound,
    /// A requested path names no tracked content
    NotTracked,
    /// The content was located but could not be read or written
    Failed(String),
}

impl fmt::Display for MissReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not found in any remote"),
            Self::NotTracked => write!(f, "no tracked content at this path"),
            Self::Failed(message) => write!(f, "{message}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchMiss {
    pub path: NormalizedPath,
    pub reason: MissReason,
}

/// Outcome of a fetch.
#[derive(Debug, Clone, Default)]
pub struct FetchReport {
    /// Paths whose content was written, with the remote it came from
    pub fetched: Vec<(NormalizedPath, String)>,
    /// Paths that already held their content
    pub up_to_date: Vec<NormalizedPath>,
    pub misses: Vec<FetchMiss>,
    pub skipped_roots: Vec<SkippedRoot>,
}

impl FetchReport {
    pub fn is_complete(&self) -> bool {
        self.misses.is_empty()
    }

    /// `Ok(self)` when every path was fetched, else [`Error::FetchMisses`].
    pub fn into_result(self) -> Result<Self> {
        if self.is_complete() {
            Ok(self)
        } else {
            Err(Error::FetchMisses {
                misses: self.misses,
            })
        }
    }
}

/// Fetches tracked content from the configured remotes.
pub struct FetchEngine<'a> {
    vcs: &'a dyn Vcs,
    store: &'a dyn TreeStore,
    config: &'a SyncConfig,
}

impl<'a> FetchEngine<'a> {
    pub fn new(vcs: &'a dyn Vcs, store: &'a dyn TreeStore, config: &'a SyncConfig) -> Self {
        Self { vcs, store, config }
    }

    /// Fetch every tracked entry under `paths`, or all of them when empty.
    pub fn fetch(&self, paths: &[NormalizedPath]) -> Result<FetchReport> {
        let entries = Inventory::new(self.vcs).tracked_entries(paths)?;
        let opened = RemoteRootResolver::new(self.store).open_roots(&self.config.remotes);

        let mut report = FetchReport {
            skipped_roots: opened.skipped().to_vec(),
            ..FetchReport::default()
        };

        for requested in paths {
            if !entries.iter().any(|entry| entry.path.starts_with(requested)) {
                tracing::warn!(path = %requested, "No tracked content at requested path");
                report.misses.push(FetchMiss {
                    path: requested.clone(),
                    reason: MissReason::NotTracked,
                });
            }
        }

        for entry in &entries {
            if entry.is_up_to_date() {
                tracing::debug!(path = %entry.path, "Already up to date");
                report.up_to_date.push(entry.path.clone());
                continue;
            }
            match self.fetch_entry(entry, opened.roots()) {
                Ok(remote) => {
                    tracing::debug!(path = %entry.path, remote = %remote, "Fetched");
                    report.fetched.push((entry.path.clone(), remote));
                }
                Err(reason) => {
                    tracing::warn!(path = %entry.path, reason = %reason, "Fetch miss");
                    report.misses.push(FetchMiss {
                        path: entry.path.clone(),
                        reason,
                    });
                }
            }
        }

        tracing::info!(
            fetched = report.fetched.len(),
            up_to_date = report.up_to_date.len(),
            misses = report.misses.len(),
            "Fetch finished"
        );
        Ok(report)
    }

    fn fetch_entry(
        &self,
        entry: &Entry,
        roots: &[Snapshot],
    ) -> std::result::Result<String, MissReason> {
        let resolved = ObjectResolver::resolve(entry, roots).ok_or(MissReason::NotFound)?;
        let bytes = match resolved.object.payload() {
            Payload::Content(id) => self.read_blob(id)?,
            Payload::Text(text) => text.clone().into_bytes(),
        };
        self.vcs
            .register_content(&entry.path, &entry.content_id, &bytes)
            .map_err(|e| MissReason::Failed(e.to_string()))?;
        Ok(resolved.remote.to_string())
    }

    fn read_blob(&self, id: &ContentId) -> std::result::Result<Vec<u8>, MissReason> {
        self.store
            .read_content(id)
            .map_err(|e| MissReason::Failed(e.to_string()))
    }
}
