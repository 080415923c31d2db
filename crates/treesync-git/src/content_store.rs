//! Local content store
//!
//! Materialized content lives under `<git-dir>/lfs/objects/<aa>/<bb>/<id>`,
//! the same fan-out the pointer tooling uses.

use treesync_fs::{ContentId, NormalizedPath, io};

use crate::{Error, Result};

#[derive(Debug, Clone)]
pub struct LocalContentStore {
    root: NormalizedPath,
}

impl LocalContentStore {
    pub fn new(root: NormalizedPath) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &NormalizedPath {
        &self.root
    }

    pub fn object_path(&self, id: &ContentId) -> NormalizedPath {
        let (aa, bb, full) = id.shard();
        self.root.join(aa).join(bb).join(full)
    }

    pub fn contains(&self, id: &ContentId) -> bool {
        self.object_path(id).is_file()
    }

    pub fn read(&self, id: &ContentId) -> Result<Vec<u8>> {
        match io::read_bytes(&self.object_path(id)) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.is_not_found() => Err(Error::ContentMissing { id: id.clone() }),
            Err(e) => Err(e.into()),
        }
    }

    /// Store `bytes` under `id` after checking they hash to it.
    pub fn write(&self, id: &ContentId, bytes: &[u8]) -> Result<()> {
        let actual = ContentId::for_bytes(bytes);
        if &actual != id {
            return Err(Error::ContentMismatch {
                id: id.clone(),
                actual,
            });
        }
        if !self.contains(id) {
            io::write_atomic(&self.object_path(id), bytes)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn write_then_read() {
        let temp = TempDir::new().unwrap();
        let store = LocalContentStore::new(NormalizedPath::new(temp.path()));
        let id = ContentId::for_bytes(b"abc");

        assert!(!store.contains(&id));
        store.write(&id, b"abc").unwrap();
        assert!(store.contains(&id));
        assert_eq!(store.read(&id).unwrap(), b"abc");

        let (aa, bb, full) = id.shard();
        assert!(temp.path().join(aa).join(bb).join(full).is_file());
    }

    #[test]
    fn mismatched_bytes_are_refused() {
        let temp = TempDir::new().unwrap();
        let store = LocalContentStore::new(NormalizedPath::new(temp.path()));
        let id = ContentId::for_bytes(b"abc");

        let err = store.write(&id, b"abd").unwrap_err();
        assert!(matches!(err, Error::ContentMismatch { .. }));
        assert!(!store.contains(&id));
    }

    #[test]
    fn missing_content_is_reported() {
        let temp = TempDir::new().unwrap();
        let store = LocalContentStore::new(NormalizedPath::new(temp.path()));
        let err = store.read(&ContentId::for_bytes(b"nope")).unwrap_err();
        assert!(matches!(err, Error::ContentMissing { .. }));
    }
}
