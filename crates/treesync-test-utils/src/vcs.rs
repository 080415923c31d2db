//! [`MemoryVcs`]: a working copy held entirely in memory.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use treesync_fs::{ContentId, NormalizedPath};
use treesync_git::{
    Ancestry, Entry, EntryStatus, Error, PathKind, Result, Vcs, WorkingPath, matches_filters,
};

#[derive(Debug, Clone)]
enum Slot {
    Tracked {
        id: ContentId,
        size: u64,
        status: EntryStatus,
    },
    Text(Vec<u8>),
    Symlink(String),
    Submodule(String),
}

#[derive(Debug, Default)]
struct State {
    paths: BTreeMap<NormalizedPath, Slot>,
    /// Local content storage
    content: HashMap<ContentId, Vec<u8>>,
    /// Bytes written by `register_content`
    materialized: HashMap<NormalizedPath, Vec<u8>>,
    /// Commit id to parent ids
    commits: HashMap<String, Vec<String>>,
    head: Option<String>,
    /// Paths passed to `read_bytes`, in call order
    reads: Vec<NormalizedPath>,
}

/// An in-memory [`Vcs`] for exercising push and fetch without git.
///
/// # Example
///
/// ```rust
/// use treesync_test_utils::vcs::MemoryVcs;
///
/// let vcs = MemoryVcs::new();
/// vcs.add_content("data/x.bin", b"payload");
/// vcs.add_text("README.md", b"# hi");
/// vcs.commit("c1");
/// ```
#[derive(Debug, Default)]
pub struct MemoryVcs {
    state: Mutex<State>,
}

impl MemoryVcs {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Track `bytes` at `path`, not checked out, with a local copy stored.
    pub fn add_content(&self, path: &str, bytes: &[u8]) -> ContentId {
        let id = ContentId::for_bytes(bytes);
        let mut state = self.state();
        state.content.insert(id.clone(), bytes.to_vec());
        state.paths.insert(
            NormalizedPath::new(path),
            Slot::Tracked {
                id: id.clone(),
                size: bytes.len() as u64,
                status: EntryStatus::NotCheckedOut,
            },
        );
        id
    }

    /// Track `bytes` at `path` and mark the working file as up to date.
    pub fn add_checked_out_content(&self, path: &str, bytes: &[u8]) -> ContentId {
        let id = self.add_content(path, bytes);
        self.set_status(path, EntryStatus::UpToDate);
        id
    }

    /// Track content at `path` that is not stored locally.
    pub fn add_missing_content(&self, path: &str, bytes: &[u8]) -> ContentId {
        let id = ContentId::for_bytes(bytes);
        self.state().paths.insert(
            NormalizedPath::new(path),
            Slot::Tracked {
                id: id.clone(),
                size: bytes.len() as u64,
                status: EntryStatus::NotCheckedOut,
            },
        );
        id
    }

    pub fn add_text(&self, path: &str, bytes: &[u8]) {
        self.state()
            .paths
            .insert(NormalizedPath::new(path), Slot::Text(bytes.to_vec()));
    }

    pub fn add_symlink(&self, path: &str, target: &str) {
        self.state()
            .paths
            .insert(NormalizedPath::new(path), Slot::Symlink(target.to_string()));
    }

    pub fn add_submodule(&self, path: &str, revision: &str) {
        self.state()
            .paths
            .insert(NormalizedPath::new(path), Slot::Submodule(revision.to_string()));
    }

    pub fn remove(&self, path: &str) {
        self.state().paths.remove(&NormalizedPath::new(path));
    }

    pub fn set_status(&self, path: &str, status: EntryStatus) {
        if let Some(Slot::Tracked { status: current, .. }) =
            self.state().paths.get_mut(&NormalizedPath::new(path))
        {
            *current = status;
        }
    }

    /// Record a commit on top of the current head and move the head to it.
    pub fn commit(&self, id: &str) {
        let mut state = self.state();
        let parents = state.head.iter().cloned().collect();
        state.commits.insert(id.to_string(), parents);
        state.head = Some(id.to_string());
    }

    /// Record a commit with explicit parents without moving the head.
    pub fn add_commit(&self, id: &str, parents: &[&str]) {
        self.state().commits.insert(
            id.to_string(),
            parents.iter().map(|p| p.to_string()).collect(),
        );
    }

    /// Point the head at a known commit.
    pub fn set_head(&self, id: &str) {
        self.state().head = Some(id.to_string());
    }

    /// Bytes written to `path` by `register_content`, if any.
    pub fn working_file(&self, path: &str) -> Option<Vec<u8>> {
        self.state()
            .materialized
            .get(&NormalizedPath::new(path))
            .cloned()
    }

    /// Whether `read_bytes` was ever called for `path`.
    pub fn was_read(&self, path: &str) -> bool {
        self.state().reads.contains(&NormalizedPath::new(path))
    }

    /// Drop the local copy of `id`.
    pub fn forget_content(&self, id: &ContentId) {
        self.state().content.remove(id);
    }
}

fn not_found(path: &NormalizedPath) -> Error {
    Error::NotInIndex {
        path: path.to_string(),
    }
}

impl Vcs for MemoryVcs {
    fn list_tracked_entries(&self, filters: &[NormalizedPath]) -> Result<Vec<Entry>> {
        Ok(self
            .state()
            .paths
            .iter()
            .filter(|(path, _)| matches_filters(path, filters))
            .filter_map(|(path, slot)| match slot {
                Slot::Tracked { id, size, status } => Some(Entry {
                    path: path.clone(),
                    content_id: id.clone(),
                    size: *size,
                    status: *status,
                }),
                _ => None,
            })
            .collect())
    }

    fn list_all_paths(&self) -> Result<Vec<WorkingPath>> {
        Ok(self
            .state()
            .paths
            .iter()
            .map(|(path, slot)| WorkingPath {
                path: path.clone(),
                kind: match slot {
                    Slot::Symlink(_) => PathKind::Symlink,
                    Slot::Submodule(_) => PathKind::Submodule,
                    Slot::Tracked { .. } | Slot::Text(_) => PathKind::Regular,
                },
            })
            .collect())
    }

    fn head_commit(&self) -> Result<Option<String>> {
        Ok(self.state().head.clone())
    }

    fn ancestry(&self, commit: &str) -> Result<Ancestry> {
        let state = self.state();
        if !state.commits.contains_key(commit) {
            return Ok(Ancestry::Unknown);
        }
        let mut pending: Vec<&str> = state.head.as_deref().into_iter().collect();
        while let Some(current) = pending.pop() {
            if current == commit {
                return Ok(Ancestry::Ancestor);
            }
            if let Some(parents) = state.commits.get(current) {
                pending.extend(parents.iter().map(String::as_str));
            }
        }
        Ok(Ancestry::Diverged)
    }

    fn file_size(&self, path: &NormalizedPath) -> Result<u64> {
        let state = self.state();
        if let Some(bytes) = state.materialized.get(path) {
            return Ok(bytes.len() as u64);
        }
        match state.paths.get(path) {
            Some(Slot::Text(bytes)) => Ok(bytes.len() as u64),
            _ => Err(not_found(path)),
        }
    }

    fn read_bytes(&self, path: &NormalizedPath) -> Result<Vec<u8>> {
        let mut state = self.state();
        state.reads.push(path.clone());
        if let Some(bytes) = state.materialized.get(path) {
            return Ok(bytes.clone());
        }
        match state.paths.get(path) {
            Some(Slot::Text(bytes)) => Ok(bytes.clone()),
            _ => Err(not_found(path)),
        }
    }

    fn symlink_target(&self, path: &NormalizedPath) -> Result<String> {
        match self.state().paths.get(path) {
            Some(Slot::Symlink(target)) => Ok(target.clone()),
            _ => Err(not_found(path)),
        }
    }

    fn submodule_revision(&self, path: &NormalizedPath) -> Result<String> {
        match self.state().paths.get(path) {
            Some(Slot::Submodule(revision)) => Ok(revision.clone()),
            _ => Err(not_found(path)),
        }
    }

    fn has_content(&self, id: &ContentId) -> bool {
        self.state().content.contains_key(id)
    }

    fn read_content(&self, id: &ContentId) -> Result<Vec<u8>> {
        self.state()
            .content
            .get(id)
            .cloned()
            .ok_or_else(|| Error::ContentMissing { id: id.clone() })
    }

    fn register_content(
        &self,
        path: &NormalizedPath,
        id: &ContentId,
        bytes: &[u8],
    ) -> Result<()> {
        let actual = ContentId::for_bytes(bytes);
        if &actual != id {
            return Err(Error::ContentMismatch {
                id: id.clone(),
                actual,
            });
        }
        let mut state = self.state();
        state.content.insert(id.clone(), bytes.to_vec());
        state.materialized.insert(path.clone(), bytes.to_vec());
        if let Some(Slot::Tracked { status, .. }) = state.paths.get_mut(path) {
            *status = EntryStatus::UpToDate;
        }
        Ok(())
    }
}
