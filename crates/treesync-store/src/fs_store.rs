//! Directory-backed tree store
//!
//! Layout under the store root:
//!
//! ```text
//! blobs/<aa>/<bb>/<content-id>
//! repos/<name>/HEAD
//! repos/<name>/HEAD.lock
//! repos/<name>/commits/<commit-id>.json
//! ```

use treesync_fs::io::{self, ExclusiveLock};
use treesync_fs::{ContentId, NormalizedPath};

use crate::snapshot::{CommitId, CommitRecord, CommitRequest, Snapshot};
use crate::store::{ContentSource, TreeStore, fetch_verified, validate_repository_name};
use crate::{Error, Result};

const BLOBS_DIR: &str = "blobs";
const REPOS_DIR: &str = "repos";
const COMMITS_DIR: &str = "commits";
const HEAD_FILE: &str = "HEAD";
const HEAD_LOCK_FILE: &str = "HEAD.lock";

/// A [`TreeStore`] kept in a directory, usually on shared storage.
#[derive(Debug, Clone)]
pub struct FsTreeStore {
    root: NormalizedPath,
}

impl FsTreeStore {
    pub fn new(root: NormalizedPath) -> Self {
        Self { root }
    }

    /// Create the store directory skeleton if it does not exist yet.
    pub fn init(root: NormalizedPath) -> Result<Self> {
        for dir in [BLOBS_DIR, REPOS_DIR] {
            let native = root.join(dir).to_native();
            std::fs::create_dir_all(&native).map_err(|e| treesync_fs::Error::io(native, e))?;
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &NormalizedPath {
        &self.root
    }

    /// Create an empty repository with no commits.
    pub fn create_repository(&self, name: &str) -> Result<()> {
        validate_repository_name(name)?;
        let dir = self.repo_dir(name).join(COMMITS_DIR).to_native();
        std::fs::create_dir_all(&dir).map_err(|e| treesync_fs::Error::io(dir, e))?;
        Ok(())
    }

    fn blob_path(&self, id: &ContentId) -> NormalizedPath {
        let (aa, bb, full) = id.shard();
        self.root.join(BLOBS_DIR).join(aa).join(bb).join(full)
    }

    fn repo_dir(&self, name: &str) -> NormalizedPath {
        self.root.join(REPOS_DIR).join(name)
    }

    fn commit_path(&self, name: &str, id: &CommitId) -> NormalizedPath {
        self.repo_dir(name)
            .join(COMMITS_DIR)
            .join(&format!("{}.json", id.as_str()))
    }

    fn ensure_reachable(&self, name: &str) -> Result<()> {
        if self.root.is_dir() {
            Ok(())
        } else {
            Err(Error::Unreachable {
                name: name.to_string(),
                message: format!("store directory {} is not accessible", self.root),
            })
        }
    }

    /// Current head of `name`, `None` when the repository has no commits.
    fn read_head(&self, name: &str) -> Result<Option<CommitId>> {
        let path = self.repo_dir(name).join(HEAD_FILE);
        match io::read_text(&path) {
            Ok(text) => {
                let text = text.trim();
                Ok((!text.is_empty()).then(|| CommitId::new(text)))
            }
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn read_record(&self, name: &str, id: &CommitId) -> Result<CommitRecord> {
        let path = self.commit_path(name, id);
        let bytes = io::read_bytes(&path).map_err(|e| {
            if e.is_not_found() {
                Error::Corrupt {
                    path: path.to_native(),
                    message: format!("commit {id} is referenced but missing"),
                }
            } else {
                e.into()
            }
        })?;
        let record: CommitRecord = serde_json::from_slice(&bytes).map_err(|e| Error::Corrupt {
            path: path.to_native(),
            message: e.to_string(),
        })?;
        if &record.id != id {
            return Err(Error::Corrupt {
                path: path.to_native(),
                message: format!("record holds commit {} instead of {id}", record.id),
            });
        }
        Ok(record)
    }

    fn upload(&self, id: &ContentId, source: &dyn ContentSource) -> Result<()> {
        if self.has_content(id) {
            return Ok(());
        }
        let bytes = fetch_verified(source, id)?;
        io::write_atomic(&self.blob_path(id), &bytes)?;
        tracing::debug!(content = %id, size = bytes.len(), "Uploaded content");
        Ok(())
    }
}

impl TreeStore for FsTreeStore {
    fn open(&self, name: &str) -> Result<Snapshot> {
        validate_repository_name(name)?;
        self.ensure_reachable(name)?;
        if !self.repo_dir(name).is_dir() {
            return Err(Error::NotFound {
                name: name.to_string(),
            });
        }

        match self.read_head(name)? {
            Some(head) => Ok(self.read_record(name, &head)?.into_snapshot(name)),
            None => Ok(Snapshot::empty(name)),
        }
    }

    fn has_content(&self, id: &ContentId) -> bool {
        self.blob_path(id).is_file()
    }

    fn read_content(&self, id: &ContentId) -> Result<Vec<u8>> {
        match io::read_bytes(&self.blob_path(id)) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.is_not_found() => Err(Error::ContentMissing { id: id.clone() }),
            Err(e) => Err(e.into()),
        }
    }

    fn commit(
        &self,
        name: &str,
        request: CommitRequest,
        source: &dyn ContentSource,
    ) -> Result<CommitId> {
        validate_repository_name(name)?;
        self.ensure_reachable(name)?;

        // Blobs first: a commit must never reference content the store lacks
        for id in &request.uploads {
            self.upload(id, source)?;
        }

        let _lock = ExclusiveLock::acquire(&self.repo_dir(name).join(HEAD_LOCK_FILE))?;

        let actual = self.read_head(name)?;
        if actual != request.parent {
            return Err(Error::StaleHead {
                name: name.to_string(),
                expected: request.parent,
                actual,
            });
        }

        let record = CommitRecord::from_request(request)?;
        let encoded = serde_json::to_vec_pretty(&record)?;
        io::write_atomic(&self.commit_path(name, &record.id), &encoded)?;
        io::write_text(
            &self.repo_dir(name).join(HEAD_FILE),
            &format!("{}\n", record.id),
        )?;

        tracing::debug!(repository = %name, commit = %record.id, "Moved head");
        Ok(record.id)
    }

    fn log(&self, name: &str, limit: usize) -> Result<Vec<CommitRecord>> {
        validate_repository_name(name)?;
        self.ensure_reachable(name)?;
        if !self.repo_dir(name).is_dir() {
            return Err(Error::NotFound {
                name: name.to_string(),
            });
        }

        let mut out = Vec::new();
        let mut next = self.read_head(name)?;
        while let Some(id) = next {
            if out.len() >= limit {
                break;
            }
            let record = self.read_record(name, &id)?;
            next = record.parent.clone();
            out.push(record);
        }
        Ok(out)
    }
}
