//! Init command implementation
//!
//! Writes `.treesync/config.toml` at the root of the current git working copy.

use std::path::Path;

use colored::Colorize;

use treesync_core::{ConfigResolver, Manifest};
use treesync_fs::{NormalizedPath, io};
use treesync_git::GitVcs;
use treesync_store::{FsTreeStore, validate_repository_name};

use crate::error::{CliError, Result};

/// Run the init command
pub fn run_init(path: &Path, remotes: &[String], store: Option<&str>, force: bool) -> Result<()> {
    println!("{} Initializing treesync...", "=>".blue().bold());

    let config_path = init_repository(path, remotes, store, force)?;

    if !remotes.is_empty() {
        println!("   Remotes: {}", remotes.join(", ").yellow());
    }
    if let Some(store) = store {
        println!("   Store: {}", store.yellow());
    }
    println!(
        "{} Wrote {}",
        "OK".green().bold(),
        config_path.as_str().cyan()
    );
    Ok(())
}

/// Create the configuration file and, when a store is given, its skeleton.
///
/// Returns the path of the written config file.
pub fn init_repository(
    path: &Path,
    remotes: &[String],
    store: Option<&str>,
    force: bool,
) -> Result<NormalizedPath> {
    for remote in remotes {
        validate_repository_name(remote)
            .map_err(|_| CliError::user(format!("'{remote}' is not a valid remote name")))?;
    }

    let vcs = GitVcs::discover(&NormalizedPath::new(path))?;
    let root = vcs.workdir();
    let resolver = ConfigResolver::new(root.clone());
    let config_path = resolver.config_path();

    if resolver.has_config() && !force {
        return Err(CliError::user(format!(
            "{config_path} already exists. Use --force to overwrite it."
        )));
    }

    let manifest = Manifest {
        remotes: remotes.to_vec(),
        store: store.map(str::to_string),
        ..Manifest::default()
    };
    io::write_text(&config_path, &manifest.to_toml()?)?;

    if let Some(store) = store {
        let store_root = if Path::new(store).is_absolute() {
            NormalizedPath::new(store)
        } else {
            root.join(store)
        };
        FsTreeStore::init(store_root)?;
    }

    tracing::info!(config = %config_path, "Initialized");
    Ok(config_path)
}
