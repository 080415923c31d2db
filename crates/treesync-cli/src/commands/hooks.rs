//! Git hook installation
//!
//! Installs a `pre-push` hook so that every `git push` also pushes tracked
//! content. A hook written by someone else is left alone unless forced.

use std::path::Path;

use colored::Colorize;

use treesync_fs::{NormalizedPath, RepoPath, io};
use treesync_git::GitVcs;

use crate::error::{CliError, Result};

/// Line identifying hooks written by treesync.
const HOOK_MARKER: &str = "# installed by treesync";

const PRE_PUSH_HOOK: &str = "pre-push";

fn hook_script() -> String {
    format!("#!/bin/sh\n{HOOK_MARKER}\nexec treesync push\n")
}

/// Run the install-hooks command
pub fn run_install_hooks(path: &Path, force: bool) -> Result<()> {
    let hook = install_pre_push_hook(path, force)?;
    println!(
        "{} Installed {} hook at {}",
        "OK".green().bold(),
        PRE_PUSH_HOOK.cyan(),
        hook.as_str().dimmed()
    );
    Ok(())
}

/// Write the pre-push hook and return its path.
pub fn install_pre_push_hook(path: &Path, force: bool) -> Result<NormalizedPath> {
    let vcs = GitVcs::discover(&NormalizedPath::new(path))?;
    let hook = vcs
        .git_dir()
        .join(RepoPath::HooksDir.as_str())
        .join(PRE_PUSH_HOOK);

    if hook.is_file() {
        let existing = io::read_text(&hook).unwrap_or_default();
        if !existing.contains(HOOK_MARKER) && !force {
            return Err(CliError::user(format!(
                "{hook} exists and was not written by treesync. Use --force to replace it."
            )));
        }
    }

    io::write_text(&hook, &hook_script())?;
    make_executable(&hook)?;
    tracing::info!(hook = %hook, "Installed git hook");
    Ok(hook)
}

#[cfg(unix)]
fn make_executable(path: &NormalizedPath) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let native = path.to_native();
    let mut permissions = std::fs::metadata(&native)?.permissions();
    permissions.set_mode(0o755);
    std::fs::set_permissions(&native, permissions)?;
    Ok(())
}

#[cfg(not(unix))]
fn make_executable(_path: &NormalizedPath) -> Result<()> {
    Ok(())
}
