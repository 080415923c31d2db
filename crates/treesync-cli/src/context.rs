//! Repository context detection
//!
//! Commands work from any directory inside a working copy. The repository
//! root is the nearest ancestor holding `.treesync/config.toml`.

use std::path::{Component, Path, PathBuf};

use treesync_core::{ConfigResolver, SyncConfig};
use treesync_fs::{NormalizedPath, RepoPath};
use treesync_git::GitVcs;
use treesync_store::FsTreeStore;

use crate::error::{CliError, Result};

/// Find the repository root by walking up from `cwd`.
pub fn find_root(cwd: &Path) -> Option<PathBuf> {
    cwd.ancestors()
        .find(|dir| {
            dir.join(RepoPath::ConfigDir.as_str())
                .join(RepoPath::ConfigFile.as_str())
                .is_file()
        })
        .map(Path::to_path_buf)
}

/// Everything a push, fetch or status needs, loaded once per command.
pub struct SyncContext {
    pub root: PathBuf,
    pub config: SyncConfig,
    pub vcs: GitVcs,
    pub store: FsTreeStore,
}

impl SyncContext {
    pub fn load(cwd: &Path) -> Result<Self> {
        let root = find_root(cwd).ok_or_else(|| {
            CliError::user(
                "No .treesync/config.toml here or in any parent. Run `treesync init` first.",
            )
        })?;
        let normalized = NormalizedPath::new(&root);

        let config = ConfigResolver::new(normalized.clone()).resolve()?;
        let vcs = GitVcs::discover(&normalized)?;
        let store = FsTreeStore::new(config.store_root()?.clone());
        tracing::debug!(
            root = %normalized,
            store = %store.root(),
            remotes = ?config.remotes,
            "Loaded context"
        );

        Ok(Self {
            root,
            config,
            vcs,
            store,
        })
    }

    /// Turn a path given on the command line into a repository-relative one.
    pub fn repo_relative(&self, cwd: &Path, arg: &str) -> Result<NormalizedPath> {
        let joined = cwd.join(arg);
        let relative = joined.strip_prefix(&self.root).map_err(|_| {
            CliError::user(format!("'{arg}' is outside the repository"))
        })?;

        let mut parts: Vec<String> = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
                Component::ParentDir => {
                    if parts.pop().is_none() {
                        return Err(CliError::user(format!("'{arg}' is outside the repository")));
                    }
                }
                _ => {}
            }
        }
        Ok(NormalizedPath::new(parts.join("/")))
    }
}
