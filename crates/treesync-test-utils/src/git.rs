//! Git repository fixtures.
//!
//! All helpers panic on failure; they are meant for test setup only.

use std::fs;
use std::path::Path;
use std::process::Command;

use treesync_fs::{ContentId, NormalizedPath};
use treesync_git::{LocalContentStore, Pointer};

/// Run `git` in `path` and return its trimmed stdout.
///
/// # Panics
/// Panics if git cannot be spawned or exits unsuccessfully.
pub fn git(path: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(path)
        .output()
        .unwrap_or_else(|e| panic!("git: failed to run `git {args:?}`: {e}"));
    if !output.status.success() {
        panic!(
            "git: `git {args:?}` failed:\n{}",
            String::from_utf8_lossy(&output.stderr)
        );
    }
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Initialises a real git repository using `git2` (no commits, no config).
///
/// # Panics
/// Panics if `git2::Repository::init` fails.
pub fn real_git_repo(path: &Path) -> git2::Repository {
    git2::Repository::init(path).unwrap_or_else(|e| {
        panic!(
            "real_git_repo: failed to init repository at {}: {e}",
            path.display()
        )
    })
}

/// Initialises a git repository on branch `main` with one commit holding
/// `README.md`, using the `git` CLI.
///
/// Returns the commit id.
///
/// # Panics
/// Panics if any git operation fails.
pub fn real_git_repo_with_commit(path: &Path) -> String {
    git(path, &["init"]);
    git(path, &["config", "user.email", "test@test.com"]);
    git(path, &["config", "user.name", "Test User"]);
    git(path, &["config", "commit.gpgsign", "false"]);

    fs::write(path.join("README.md"), "# Test")
        .unwrap_or_else(|e| panic!("real_git_repo_with_commit: failed to write README.md: {e}"));

    let head = commit_all(path, "Initial commit");
    // Best-effort: older git versions may not support this flag
    let _ = Command::new("git")
        .args(["branch", "-m", "main"])
        .current_dir(path)
        .output();
    head
}

/// Stage everything and commit, returning the new head id.
pub fn commit_all(path: &Path, message: &str) -> String {
    git(path, &["add", "-A"]);
    git(path, &["commit", "-m", message]);
    git(path, &["rev-parse", "HEAD"])
}

/// Track `bytes` at `rel` as pointer-managed content.
///
/// The working file receives the pointer text and the bytes go into the
/// repository's local content store, which is the state right after a
/// clone that has not materialized content yet.
pub fn track_content(path: &Path, rel: &str, bytes: &[u8]) -> ContentId {
    let pointer = Pointer::for_bytes(bytes);
    let target = path.join(rel);
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).unwrap_or_else(|e| {
            panic!("track_content: failed to create {}: {e}", parent.display())
        });
    }
    fs::write(&target, pointer.format())
        .unwrap_or_else(|e| panic!("track_content: failed to write {}: {e}", target.display()));

    content_store(path)
        .write(&pointer.content_id, bytes)
        .unwrap_or_else(|e| panic!("track_content: failed to store content: {e}"));
    pointer.content_id
}

/// Track `bytes` at `rel` without keeping a local copy anywhere.
pub fn track_remote_only(path: &Path, rel: &str, bytes: &[u8]) -> ContentId {
    let id = track_content(path, rel, bytes);
    let object = content_store(path).object_path(&id).to_native();
    fs::remove_file(&object).unwrap_or_else(|e| {
        panic!("track_remote_only: failed to remove {}: {e}", object.display())
    });
    id
}

/// Replace the pointer at `rel` with the real bytes.
pub fn materialize(path: &Path, rel: &str, bytes: &[u8]) {
    fs::write(path.join(rel), bytes)
        .unwrap_or_else(|e| panic!("materialize: failed to write {rel}: {e}"));
}

/// The local content store of the repository at `path`.
pub fn content_store(path: &Path) -> LocalContentStore {
    LocalContentStore::new(NormalizedPath::new(path.join(".git/lfs/objects")))
}
