//! Push command implementation

use std::path::Path;

use colored::Colorize;

use treesync_core::{PushEngine, PushOptions, PushOutcome, PushReport, StrategySetting};

use crate::context::SyncContext;
use crate::error::Result;

/// Run the push command
pub fn run_push(
    path: &Path,
    force: bool,
    strategy: Option<StrategySetting>,
    dry_run: bool,
    message: Option<String>,
) -> Result<()> {
    let ctx = SyncContext::load(path)?;
    let target = ctx.config.push_target()?;
    println!(
        "{} Pushing to {}{}...",
        "=>".blue().bold(),
        target.cyan(),
        if dry_run { " (dry run)" } else { "" }
    );

    let options = PushOptions {
        force,
        strategy,
        dry_run,
        message,
    };
    let report = PushEngine::new(&ctx.vcs, &ctx.store, &ctx.config).push(&options)?;
    print_report(&report);
    Ok(())
}

fn print_report(report: &PushReport) {
    for skipped in &report.skipped_roots {
        println!(
            "   {} remote {} skipped: {}",
            "!".yellow(),
            skipped.name.cyan(),
            skipped.reason
        );
    }

    let stats = &report.stats;
    println!("   Strategy: {}", report.strategy.to_string().yellow());
    println!("   Content: {} reused, {} new", stats.reused, stats.new);
    if stats.text + stats.symlink + stats.subordinate > 0 {
        println!(
            "   Inline: {} text, {} symlink, {} subrepository",
            stats.text, stats.symlink, stats.subordinate
        );
    }

    match &report.outcome {
        PushOutcome::UpToDate => {
            println!(
                "{} {} is already up to date. Nothing to push.",
                "OK".green().bold(),
                report.remote.cyan()
            );
        }
        PushOutcome::DryRun => {
            println!(
                "{} Would upload {} object(s) and commit to {}{}",
                "DRY RUN".yellow().bold(),
                report.uploads.len(),
                report.remote.cyan(),
                guard_suffix(report)
            );
        }
        PushOutcome::Committed(head) => {
            println!(
                "{} Committed {} to {}{}",
                "OK".green().bold(),
                head.short().yellow(),
                report.remote.cyan(),
                guard_suffix(report)
            );
        }
    }
}

fn guard_suffix(report: &PushReport) -> String {
    report
        .guard
        .map(|guard| format!(" ({guard})"))
        .unwrap_or_default()
}
