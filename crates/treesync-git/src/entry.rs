//! Working-copy listings

use treesync_fs::{ContentId, NormalizedPath};

/// Whether a tracked-content path holds its real bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    /// The working file already holds the content
    UpToDate,
    /// The working file is a pointer or stale
    NotCheckedOut,
}

/// A path whose bytes are managed by content tracking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Repository-relative path
    pub path: NormalizedPath,
    pub content_id: ContentId,
    pub size: u64,
    pub status: EntryStatus,
}

impl Entry {
    pub fn is_up_to_date(&self) -> bool {
        self.status == EntryStatus::UpToDate
    }
}

/// How a path in the full listing is stored by the VCS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    Regular,
    Symlink,
    /// A pinned subordinate repository
    Submodule,
}

/// One path of the full working listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingPath {
    pub path: NormalizedPath,
    pub kind: PathKind,
}

/// Whether `path` is selected by `filters`.
///
/// A filter selects the path it names and everything beneath it. No filters
/// select every path.
pub fn matches_filters(path: &NormalizedPath, filters: &[NormalizedPath]) -> bool {
    filters.is_empty() || filters.iter().any(|filter| path.starts_with(filter))
}
