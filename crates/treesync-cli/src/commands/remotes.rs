//! Remotes command implementation

use std::path::Path;

use colored::Colorize;

use treesync_core::ConfigResolver;
use treesync_fs::NormalizedPath;

use crate::context::find_root;
use crate::error::{CliError, Result};

/// List the resolved remotes in precedence order
pub fn run_remotes(path: &Path) -> Result<()> {
    let root = find_root(path).ok_or_else(|| {
        CliError::user("Not inside a treesync repository. Run `treesync init` first.")
    })?;
    let config = ConfigResolver::new(NormalizedPath::new(root)).resolve()?;

    if config.remotes.is_empty() {
        println!("{} No remotes configured.", "note:".yellow().bold());
        println!(
            "\n{} Add one with: {}",
            "hint:".cyan().bold(),
            "treesync init --force --remote <name> --store <dir>".cyan()
        );
        return Ok(());
    }

    for (index, remote) in config.remotes.iter().enumerate() {
        if index == 0 {
            println!("{}. {} {}", index + 1, remote.cyan(), "(push target)".dimmed());
        } else {
            println!("{}. {}", index + 1, remote.cyan());
        }
    }
    match &config.store {
        Some(store) => println!("\nStore: {}", store.as_str().yellow()),
        None => println!("\n{} No store configured.", "note:".yellow().bold()),
    }
    Ok(())
}
