//! VCS collaborator trait

use treesync_fs::{ContentId, NormalizedPath};

use crate::Result;
use crate::entry::{Entry, WorkingPath};

/// How a commit relates to the local head.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ancestry {
    /// The commit is not in local history
    Unknown,
    /// The commit is the head or one of its ancestors
    Ancestor,
    /// The commit is known but not reachable from the head
    Diverged,
}

/// The local working copy as seen by push and fetch.
///
/// Every listing call re-queries the repository; nothing is cached between
/// calls.
pub trait Vcs {
    /// Tracked-content entries, restricted to `filters` when non-empty.
    fn list_tracked_entries(&self, filters: &[NormalizedPath]) -> Result<Vec<Entry>>;

    /// Every path the VCS tracks, with how it is stored.
    fn list_all_paths(&self) -> Result<Vec<WorkingPath>>;

    /// Head commit id, `None` before the first commit.
    fn head_commit(&self) -> Result<Option<String>>;

    /// Relation of `commit` to the head.
    fn ancestry(&self, commit: &str) -> Result<Ancestry>;

    /// Size of a plain file, without reading it.
    fn file_size(&self, path: &NormalizedPath) -> Result<u64>;

    /// Raw bytes of a plain file.
    fn read_bytes(&self, path: &NormalizedPath) -> Result<Vec<u8>>;

    /// Target of a symbolic link.
    fn symlink_target(&self, path: &NormalizedPath) -> Result<String>;

    /// Revision a subordinate repository is pinned to.
    fn submodule_revision(&self, path: &NormalizedPath) -> Result<String>;

    /// Whether local content storage holds `id`.
    fn has_content(&self, id: &ContentId) -> bool;

    /// Bytes for `id` from local content storage.
    fn read_content(&self, id: &ContentId) -> Result<Vec<u8>>;

    /// Record fetched bytes: store them and materialize them at `path`.
    fn register_content(&self, path: &NormalizedPath, id: &ContentId, bytes: &[u8])
    -> Result<()>;
}
