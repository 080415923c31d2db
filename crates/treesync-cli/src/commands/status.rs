//! Status command implementation
//!
//! Read-only: opens every configured remote, shows what it holds and asks
//! the sync guard whether a push to the target would be accepted.

use std::path::Path;

use colored::Colorize;

use treesync_core::{Inventory, RemoteRootResolver, SyncGuard};
use treesync_git::Vcs;
use treesync_store::{Snapshot, TreeStore};

use crate::context::SyncContext;
use crate::error::Result;

const HISTORY_LIMIT: usize = 3;

/// Run the status command
pub fn run_status(path: &Path) -> Result<()> {
    let ctx = SyncContext::load(path)?;
    let target = ctx.config.push_target()?;

    let entries = Inventory::new(&ctx.vcs).tracked_entries(&[])?;
    let checked_out = entries.iter().filter(|e| e.is_up_to_date()).count();
    let head = ctx.vcs.head_commit()?;
    println!("{}", "Working copy".bold());
    println!(
        "   Head:    {}",
        head.as_deref().unwrap_or("(no commits)").yellow()
    );
    println!(
        "   Content: {} tracked, {} checked out",
        entries.len(),
        checked_out
    );
    println!();

    println!("{} ({})", "Remotes".bold(), ctx.store.root().as_str().dimmed());
    let opened = RemoteRootResolver::new(&ctx.store).open_roots(&ctx.config.remotes);
    for name in &ctx.config.remotes {
        let marker = if name == target { "*" } else { " " };
        match opened.get(name) {
            Some(snapshot) => print_remote(marker, snapshot),
            None => {
                let reason = opened
                    .skip_reason(name)
                    .map(ToString::to_string)
                    .unwrap_or_default();
                println!("   {} {:<16} {}", marker, name.cyan(), reason.red());
            }
        }
    }
    println!();

    let verdict = opened
        .push_target(target)
        .and_then(|snapshot| SyncGuard::new(&ctx.vcs).check(&snapshot, false));
    match verdict {
        Ok(outcome) => println!(
            "{} Push to {} would proceed ({})",
            "OK".green().bold(),
            target.cyan(),
            outcome
        ),
        Err(e) => println!(
            "{} Push to {} would be rejected: {}",
            "REJECTED".red().bold(),
            target.cyan(),
            e
        ),
    }

    if opened.get(target).is_some() {
        let log = ctx.store.log(target, HISTORY_LIMIT)?;
        if !log.is_empty() {
            println!();
            println!("{} of {}", "Recent commits".bold(), target.cyan());
            for record in log {
                println!(
                    "   {} {} {}",
                    record.id.short().yellow(),
                    record.meta.timestamp.format("%Y-%m-%d %H:%M"),
                    record.meta.message.as_deref().unwrap_or("").dimmed()
                );
            }
        }
    }

    Ok(())
}

fn print_remote(marker: &str, snapshot: &Snapshot) {
    let Some(head) = &snapshot.head else {
        println!("   {} {:<16} {}", marker, snapshot.name.cyan(), "empty".dimmed());
        return;
    };
    let strategy = snapshot
        .root
        .tree
        .metadata()
        .upload_strategy
        .map(|s| s.to_string())
        .unwrap_or_else(|| "unrecorded".to_string());
    println!(
        "   {} {:<16} head {}  origin {}  {} object(s)  {}",
        marker,
        snapshot.name.cyan(),
        head.short().yellow(),
        snapshot.root.origin_commit().unwrap_or("unknown"),
        snapshot.root.tree.objects().len(),
        strategy.dimmed()
    );
}
