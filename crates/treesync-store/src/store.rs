//! Tree store traits

use treesync_fs::ContentId;

use crate::snapshot::{CommitId, CommitRecord, CommitRequest, Snapshot};
use crate::{Error, Result};

/// Supplies bytes for content a commit needs to upload.
pub trait ContentSource {
    /// Read the bytes for `id`.
    fn read_content(&self, id: &ContentId) -> Result<Vec<u8>>;
}

/// A store of named, append-only tree repositories sharing one blob area.
pub trait TreeStore: Send + Sync {
    /// Open `name` and return its current snapshot.
    ///
    /// A repository that exists but has no commits yields a snapshot with
    /// `head == None`. Returns [`Error::NotFound`] if the repository does not
    /// exist and [`Error::Unreachable`] if it cannot be read.
    fn open(&self, name: &str) -> Result<Snapshot>;

    /// Whether the blob area holds `id`.
    fn has_content(&self, id: &ContentId) -> bool;

    /// Read a blob.
    fn read_content(&self, id: &ContentId) -> Result<Vec<u8>>;

    /// Append a commit to `name`, creating the repository if it has none.
    ///
    /// Every id in `request.uploads` missing from the blob area is read from
    /// `source`, verified and stored first. The new commit becomes the head
    /// only if the current head still equals `request.parent`; otherwise
    /// [`Error::StaleHead`] is returned and the head is left alone.
    fn commit(
        &self,
        name: &str,
        request: CommitRequest,
        source: &dyn ContentSource,
    ) -> Result<CommitId>;

    /// Up to `limit` most recent commits of `name`, newest first.
    fn log(&self, name: &str, limit: usize) -> Result<Vec<CommitRecord>>;
}

/// Reject names that could escape a store's namespace.
pub fn validate_repository_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
        && !name.chars().any(char::is_control);
    if valid {
        Ok(())
    } else {
        Err(Error::InvalidName {
            name: name.to_string(),
        })
    }
}

/// Read `id` from `source` and check the bytes really hash to it.
pub(crate) fn fetch_verified(source: &dyn ContentSource, id: &ContentId) -> Result<Vec<u8>> {
    let bytes = source.read_content(id)?;
    let actual = ContentId::for_bytes(&bytes);
    if &actual != id {
        return Err(Error::ContentMismatch {
            id: id.clone(),
            actual,
        });
    }
    Ok(bytes)
}
