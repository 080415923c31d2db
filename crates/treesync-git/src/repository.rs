//! [`Vcs`] over a git working copy

use std::path::Path;

use git2::{ErrorCode, IndexEntry, ObjectType, Oid, Repository};
use treesync_fs::{ContentId, NormalizedPath, RepoPath, io};

use crate::content_store::LocalContentStore;
use crate::entry::{Entry, EntryStatus, PathKind, WorkingPath, matches_filters};
use crate::pointer::{MAX_POINTER_SIZE, Pointer};
use crate::vcs::{Ancestry, Vcs};
use crate::{Error, Result};

const MODE_TYPE_MASK: u32 = 0o170000;
const MODE_SYMLINK: u32 = 0o120000;
const MODE_GITLINK: u32 = 0o160000;
const INDEX_STAGE_MASK: u16 = 0x3000;

/// A git working copy whose tracked content is stored as pointer files.
pub struct GitVcs {
    repo: Repository,
    workdir: NormalizedPath,
    content: LocalContentStore,
}

impl GitVcs {
    /// Open the working copy containing `path`.
    pub fn discover(path: &NormalizedPath) -> Result<Self> {
        let repo = Repository::discover(path.to_native()).map_err(|e| {
            if e.code() == ErrorCode::NotFound {
                Error::NotAWorkingCopy {
                    path: path.to_native(),
                }
            } else {
                e.into()
            }
        })?;
        Self::from_repository(repo)
    }

    pub fn from_repository(repo: Repository) -> Result<Self> {
        let workdir = repo
            .workdir()
            .map(NormalizedPath::new)
            .ok_or_else(|| Error::NotAWorkingCopy {
                path: repo.path().to_path_buf(),
            })?;
        let content = LocalContentStore::new(
            NormalizedPath::new(repo.path()).join(RepoPath::ContentStore.as_str()),
        );
        Ok(Self {
            repo,
            workdir,
            content,
        })
    }

    /// Root of the working tree.
    pub fn workdir(&self) -> &NormalizedPath {
        &self.workdir
    }

    /// The git directory (usually `<workdir>/.git`).
    pub fn git_dir(&self) -> NormalizedPath {
        NormalizedPath::new(self.repo.path())
    }

    pub fn content_store(&self) -> &LocalContentStore {
        &self.content
    }

    /// Stage-zero index entries, freshly read from disk.
    fn index_entries(&self) -> Result<Vec<IndexEntry>> {
        let mut index = self.repo.index()?;
        index.read(false)?;
        Ok(index
            .iter()
            .filter(|entry| entry.flags & INDEX_STAGE_MASK == 0)
            .collect())
    }

    fn index_entry(&self, path: &NormalizedPath) -> Result<IndexEntry> {
        let mut index = self.repo.index()?;
        index.read(false)?;
        index
            .get_path(Path::new(path.as_str()), 0)
            .ok_or_else(|| Error::NotInIndex {
                path: path.to_string(),
            })
    }

    /// Parse the blob behind a regular index entry as a pointer, if it is one.
    fn pointer_for(&self, entry: &IndexEntry) -> Result<Option<Pointer>> {
        if entry.mode & MODE_TYPE_MASK != 0o100000 {
            return Ok(None);
        }
        let (size, kind) = self.repo.odb()?.read_header(entry.id)?;
        if kind != ObjectType::Blob || size > MAX_POINTER_SIZE {
            return Ok(None);
        }
        let blob = self.repo.find_blob(entry.id)?;
        Ok(Pointer::parse(blob.content()))
    }

    fn working_status(&self, path: &NormalizedPath, pointer: &Pointer) -> EntryStatus {
        let native = self.workdir.join(path.as_str()).to_native();
        let size_matches = std::fs::symlink_metadata(&native)
            .is_ok_and(|meta| meta.is_file() && meta.len() == pointer.size);
        if size_matches && ContentId::for_file(&native).is_ok_and(|id| id == pointer.content_id) {
            EntryStatus::UpToDate
        } else {
            EntryStatus::NotCheckedOut
        }
    }
}

fn entry_path(entry: &IndexEntry) -> NormalizedPath {
    NormalizedPath::new(&*String::from_utf8_lossy(&entry.path))
}

impl Vcs for GitVcs {
    fn list_tracked_entries(&self, filters: &[NormalizedPath]) -> Result<Vec<Entry>> {
        let mut entries = Vec::new();
        for index_entry in self.index_entries()? {
            let path = entry_path(&index_entry);
            if !matches_filters(&path, filters) {
                continue;
            }
            let Some(pointer) = self.pointer_for(&index_entry)? else {
                continue;
            };
            let status = self.working_status(&path, &pointer);
            entries.push(Entry {
                path,
                content_id: pointer.content_id,
                size: pointer.size,
                status,
            });
        }
        tracing::debug!(count = entries.len(), "Listed tracked entries");
        Ok(entries)
    }

    fn list_all_paths(&self) -> Result<Vec<WorkingPath>> {
        Ok(self
            .index_entries()?
            .iter()
            .map(|entry| {
                let kind = match entry.mode & MODE_TYPE_MASK {
                    MODE_SYMLINK => PathKind::Symlink,
                    MODE_GITLINK => PathKind::Submodule,
                    _ => PathKind::Regular,
                };
                WorkingPath {
                    path: entry_path(entry),
                    kind,
                }
            })
            .collect())
    }

    fn head_commit(&self) -> Result<Option<String>> {
        match self.repo.head() {
            Ok(head) => Ok(Some(head.peel_to_commit()?.id().to_string())),
            Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => {
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn ancestry(&self, commit: &str) -> Result<Ancestry> {
        let Ok(oid) = Oid::from_str(commit) else {
            return Ok(Ancestry::Unknown);
        };
        if self.repo.find_commit(oid).is_err() {
            return Ok(Ancestry::Unknown);
        }
        let Some(head) = self.head_commit()? else {
            return Ok(Ancestry::Diverged);
        };
        let head = Oid::from_str(&head)?;
        if head == oid || self.repo.graph_descendant_of(head, oid)? {
            Ok(Ancestry::Ancestor)
        } else {
            Ok(Ancestry::Diverged)
        }
    }

    fn file_size(&self, path: &NormalizedPath) -> Result<u64> {
        Ok(io::file_size(&self.workdir.join(path.as_str()))?)
    }

    fn read_bytes(&self, path: &NormalizedPath) -> Result<Vec<u8>> {
        Ok(io::read_bytes(&self.workdir.join(path.as_str()))?)
    }

    fn symlink_target(&self, path: &NormalizedPath) -> Result<String> {
        let entry = self.index_entry(path)?;
        let blob = self.repo.find_blob(entry.id)?;
        String::from_utf8(blob.content().to_vec()).map_err(|_| Error::NotUtf8 {
            path: path.to_string(),
        })
    }

    fn submodule_revision(&self, path: &NormalizedPath) -> Result<String> {
        Ok(self.index_entry(path)?.id.to_string())
    }

    fn has_content(&self, id: &ContentId) -> bool {
        self.content.contains(id)
    }

    fn read_content(&self, id: &ContentId) -> Result<Vec<u8>> {
        self.content.read(id)
    }

    fn register_content(
        &self,
        path: &NormalizedPath,
        id: &ContentId,
        bytes: &[u8],
    ) -> Result<()> {
        self.content.write(id, bytes)?;
        io::write_atomic(&self.workdir.join(path.as_str()), bytes)?;
        tracing::debug!(path = %path, content = %id, "Materialized content");
        Ok(())
    }
}
