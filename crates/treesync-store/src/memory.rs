//! In-process tree store

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use treesync_fs::ContentId;

use crate::snapshot::{CommitId, CommitRecord, CommitRequest, Snapshot};
use crate::store::{ContentSource, TreeStore, fetch_verified, validate_repository_name};
use crate::{Error, Result};

#[derive(Debug, Default)]
struct State {
    /// Commit history per repository, oldest first
    repos: HashMap<String, Vec<CommitRecord>>,
    blobs: HashMap<ContentId, Vec<u8>>,
    unreachable: HashSet<String>,
}

/// A [`TreeStore`] held entirely in memory.
///
/// Names can be marked unreachable to exercise the paths that skip remote
/// roots which fail to open.
#[derive(Debug, Default)]
pub struct MemoryTreeStore {
    state: Mutex<State>,
}

impl MemoryTreeStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        // A poisoned lock only means another test thread panicked mid-update
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Create an empty repository with no commits.
    pub fn create_repository(&self, name: &str) -> Result<()> {
        validate_repository_name(name)?;
        self.state().repos.entry(name.to_string()).or_default();
        Ok(())
    }

    /// Make every subsequent `open` of `name` fail as unreachable.
    pub fn set_unreachable(&self, name: &str) {
        self.state().unreachable.insert(name.to_string());
    }

    /// Put bytes into the blob area directly, returning their id.
    pub fn put_content(&self, bytes: &[u8]) -> ContentId {
        let id = ContentId::for_bytes(bytes);
        self.state().blobs.insert(id.clone(), bytes.to_vec());
        id
    }

    /// Number of commits in `name`, zero if it does not exist.
    pub fn commit_count(&self, name: &str) -> usize {
        self.state().repos.get(name).map_or(0, Vec::len)
    }

    fn check_reachable(state: &State, name: &str) -> Result<()> {
        if state.unreachable.contains(name) {
            return Err(Error::Unreachable {
                name: name.to_string(),
                message: "marked unreachable".to_string(),
            });
        }
        Ok(())
    }
}

impl TreeStore for MemoryTreeStore {
    fn open(&self, name: &str) -> Result<Snapshot> {
        validate_repository_name(name)?;
        let state = self.state();
        Self::check_reachable(&state, name)?;

        let history = state.repos.get(name).ok_or_else(|| Error::NotFound {
            name: name.to_string(),
        })?;
        Ok(match history.last() {
            Some(record) => record.clone().into_snapshot(name),
            None => Snapshot::empty(name),
        })
    }

    fn has_content(&self, id: &ContentId) -> bool {
        self.state().blobs.contains_key(id)
    }

    fn read_content(&self, id: &ContentId) -> Result<Vec<u8>> {
        self.state()
            .blobs
            .get(id)
            .cloned()
            .ok_or_else(|| Error::ContentMissing { id: id.clone() })
    }

    fn commit(
        &self,
        name: &str,
        request: CommitRequest,
        source: &dyn ContentSource,
    ) -> Result<CommitId> {
        validate_repository_name(name)?;

        // Read uploads before taking the lock; the source may be slow
        let mut staged = Vec::new();
        for id in &request.uploads {
            if !self.has_content(id) {
                staged.push((id.clone(), fetch_verified(source, id)?));
            }
        }

        let mut state = self.state();
        Self::check_reachable(&state, name)?;

        let actual = state
            .repos
            .get(name)
            .and_then(|history| history.last())
            .map(|record| record.id.clone());
        if actual != request.parent {
            return Err(Error::StaleHead {
                name: name.to_string(),
                expected: request.parent,
                actual,
            });
        }

        state.blobs.extend(staged);
        let record = CommitRecord::from_request(request)?;
        let id = record.id.clone();
        state.repos.entry(name.to_string()).or_default().push(record);

        tracing::debug!(repository = %name, commit = %id, "Committed snapshot");
        Ok(id)
    }

    fn log(&self, name: &str, limit: usize) -> Result<Vec<CommitRecord>> {
        validate_repository_name(name)?;
        let state = self.state();
        Self::check_reachable(&state, name)?;
        let history = state.repos.get(name).ok_or_else(|| Error::NotFound {
            name: name.to_string(),
        })?;
        Ok(history.iter().rev().take(limit).cloned().collect())
    }
}
