//! [`TestRepo`] builder for end-to-end treesync scenarios.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use treesync_fs::ContentId;

use crate::git;

/// A temporary directory holding a git working copy (`work/`) and a tree
/// store directory (`store/`).
///
/// # Example
///
/// ```rust,no_run
/// use treesync_test_utils::repo::TestRepo;
///
/// let repo = TestRepo::new();
/// repo.init_git();
/// repo.write_config(&["primary"]);
/// repo.track("data/x.bin", b"payload");
/// repo.commit("add data");
/// repo.assert_file_exists(".treesync/config.toml");
/// ```
pub struct TestRepo {
    temp_dir: TempDir,
}

impl Default for TestRepo {
    fn default() -> Self {
        Self::new()
    }
}

impl TestRepo {
    /// Create the directory skeleton. Neither git nor the store is set up.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("work")).unwrap();
        fs::create_dir_all(temp_dir.path().join("store")).unwrap();
        Self { temp_dir }
    }

    /// The temporary directory holding both `work/` and `store/`.
    pub fn base(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Absolute path of the working copy.
    pub fn work(&self) -> PathBuf {
        self.temp_dir.path().join("work")
    }

    /// Absolute path of the tree store directory.
    pub fn store(&self) -> PathBuf {
        self.temp_dir.path().join("store")
    }

    /// Initialise the working copy as a git repository with one commit.
    pub fn init_git(&self) -> String {
        git::real_git_repo_with_commit(&self.work())
    }

    /// Write `.treesync/config.toml` naming `remotes` and this store.
    pub fn write_config(&self, remotes: &[&str]) {
        self.write_config_with(remotes, "");
    }

    /// Like [`write_config`](Self::write_config) with extra TOML appended.
    pub fn write_config_with(&self, remotes: &[&str], extra: &str) {
        let dir = self.work().join(".treesync");
        fs::create_dir_all(&dir).unwrap();
        let remotes = remotes
            .iter()
            .map(|r| format!("\"{r}\""))
            .collect::<Vec<_>>()
            .join(", ");
        let store = self.store().display().to_string().replace('\\', "/");
        fs::write(
            dir.join("config.toml"),
            format!("remotes = [{remotes}]\nstore = \"{store}\"\n{extra}"),
        )
        .unwrap();
    }

    /// Track `bytes` at `rel` as pointer-managed content.
    pub fn track(&self, rel: &str, bytes: &[u8]) -> ContentId {
        git::track_content(&self.work(), rel, bytes)
    }

    /// Write a plain file into the working copy.
    pub fn write(&self, rel: &str, content: &str) {
        let path = self.work().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    /// Stage everything and commit, returning the head id.
    pub fn commit(&self, message: &str) -> String {
        git::commit_all(&self.work(), message)
    }

    /// Read a working-copy file.
    pub fn read(&self, rel: &str) -> Vec<u8> {
        fs::read(self.work().join(rel))
            .unwrap_or_else(|e| panic!("TestRepo::read: could not read {rel}: {e}"))
    }

    /// Assert that `path` (relative to the working copy) exists.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path does not exist.
    pub fn assert_file_exists(&self, path: &str) {
        let full_path = self.work().join(path);
        assert!(
            full_path.exists(),
            "Expected file to exist: {}",
            full_path.display()
        );
    }

    /// Assert that the file at `path` contains `content`.
    ///
    /// # Panics
    /// Panics if the file cannot be read or does not contain `content`.
    pub fn assert_file_contains(&self, path: &str, content: &str) {
        let full_path = self.work().join(path);
        let file_content = fs::read_to_string(&full_path)
            .unwrap_or_else(|_| panic!("Could not read file: {}", full_path.display()));
        assert!(
            file_content.contains(content),
            "File {} does not contain expected content.\nExpected: {}\nActual: {}",
            full_path.display(),
            content,
            file_content
        );
    }
}
