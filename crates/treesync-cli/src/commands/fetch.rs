//! Fetch command implementation

use std::path::Path;

use colored::Colorize;

use treesync_core::FetchEngine;

use crate::context::SyncContext;
use crate::error::Result;

/// Run the fetch command
///
/// Every requested path is attempted. Misses are listed afterwards and turn
/// into a failing exit status.
pub fn run_fetch(path: &Path, paths: &[String]) -> Result<()> {
    let ctx = SyncContext::load(path)?;
    let filters = paths
        .iter()
        .map(|arg| ctx.repo_relative(path, arg))
        .collect::<Result<Vec<_>>>()?;

    println!(
        "{} Fetching from {}...",
        "=>".blue().bold(),
        ctx.config.remotes.join(", ").cyan()
    );

    let report = FetchEngine::new(&ctx.vcs, &ctx.store, &ctx.config).fetch(&filters)?;

    for skipped in &report.skipped_roots {
        println!(
            "   {} remote {} skipped: {}",
            "!".yellow(),
            skipped.name.cyan(),
            skipped.reason
        );
    }
    for (fetched, remote) in &report.fetched {
        println!("   {} {} ({})", "+".green(), fetched, remote.dimmed());
    }
    for miss in &report.misses {
        println!("   {} {}: {}", "-".red(), miss.path, miss.reason);
    }

    if report.is_complete() {
        println!(
            "{} {} fetched, {} already up to date.",
            "OK".green().bold(),
            report.fetched.len(),
            report.up_to_date.len()
        );
    }

    report.into_result()?;
    Ok(())
}
