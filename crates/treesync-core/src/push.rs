//! Push orchestration
//!
//! Inventory, remote roots, tree build, guard, then a single commit to the
//! push target. Every failure before the commit leaves the remote as it was.

use treesync_fs::ContentId;
use treesync_git::Vcs;
use treesync_store::{CommitId, CommitMeta, CommitRequest, ContentSource, TreeStore, UploadStrategy};

use crate::builder::{BuildStats, TreeBuilder};
use crate::config::SyncConfig;
use crate::guard::{GuardOutcome, SyncGuard};
use crate::roots::{RemoteRootResolver, SkippedRoot};
use crate::strategy::StrategySetting;
use crate::{Error, Result};

/// Options for a single push.
#[derive(Debug, Clone, Default)]
pub struct PushOptions {
    /// Replace a diverged or unverifiable remote snapshot
    pub force: bool,
    /// Overrides the configured strategy setting
    pub strategy: Option<StrategySetting>,
    /// Build and check everything but do not commit
    pub dry_run: bool,
    pub message: Option<String>,
}

/// What happened to the push target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    /// The built tree is identical to the current remote tree
    UpToDate,
    /// A commit would have been made
    DryRun,
    Committed(CommitId),
}

#[derive(Debug, Clone)]
pub struct PushReport {
    /// Name of the push target
    pub remote: String,
    pub strategy: UploadStrategy,
    pub stats: BuildStats,
    /// `None` when no guard check was needed
    pub guard: Option<GuardOutcome>,
    pub outcome: PushOutcome,
    /// Content uploaded by the commit, or that would be
    pub uploads: Vec<ContentId>,
    pub skipped_roots: Vec<SkippedRoot>,
}

/// Reads upload bytes from the VCS's local content storage.
struct VcsContent<'a>(&'a dyn Vcs);

impl ContentSource for VcsContent<'_> {
    fn read_content(&self, id: &ContentId) -> treesync_store::Result<Vec<u8>> {
        self.0
            .read_content(id)
            .map_err(|e| treesync_store::Error::ContentSource {
                id: id.clone(),
                message: e.to_string(),
            })
    }
}

/// Pushes the working set to the first configured remote.
pub struct PushEngine<'a> {
    vcs: &'a dyn Vcs,
    store: &'a dyn TreeStore,
    config: &'a SyncConfig,
}

impl<'a> PushEngine<'a> {
    pub fn new(vcs: &'a dyn Vcs, store: &'a dyn TreeStore, config: &'a SyncConfig) -> Self {
        Self { vcs, store, config }
    }

    pub fn push(&self, options: &PushOptions) -> Result<PushReport> {
        let target_name = self.config.push_target()?;
        let opened = RemoteRootResolver::new(self.store).open_roots(&self.config.remotes);

        let target = opened.push_target(target_name)?;

        let setting = options.strategy.unwrap_or(self.config.strategy);
        let previous = target.root.tree.metadata();
        let strategy = setting.resolve(previous);
        tracing::debug!(%setting, %strategy, remote = %target_name, "Resolved upload strategy");

        let build = TreeBuilder::new(self.vcs, opened.roots(), self.config.max_text_size)
            .build(strategy, previous)?;

        let mut report = PushReport {
            remote: target_name.to_string(),
            strategy,
            stats: build.stats,
            guard: None,
            outcome: PushOutcome::UpToDate,
            uploads: build.uploads.clone(),
            skipped_roots: opened.skipped().to_vec(),
        };

        if target.head.is_some() && build.tree.digest()? == target.root.tree.digest()? {
            tracing::info!(remote = %target_name, "Remote already up to date");
            report.uploads.clear();
            return Ok(report);
        }

        report.guard = Some(SyncGuard::new(self.vcs).check(&target, options.force)?);

        if options.dry_run {
            report.outcome = PushOutcome::DryRun;
            return Ok(report);
        }

        let mut meta = CommitMeta::new(self.vcs.head_commit()?);
        if let Some(message) = &options.message {
            meta = meta.with_message(message.clone());
        }
        let request = CommitRequest {
            parent: target.head.clone(),
            tree: build.tree,
            meta,
            uploads: build.uploads,
        };
        let head = self
            .store
            .commit(target_name, request, &VcsContent(self.vcs))?;

        tracing::info!(remote = %target_name, commit = %head.short(), "Pushed");
        report.outcome = PushOutcome::Committed(head);
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use treesync_fs::NormalizedPath;
    use treesync_store::{MemoryTreeStore, Node, ObjectKind};
    use treesync_test_utils::vcs::MemoryVcs;

    fn config(remotes: &[&str]) -> SyncConfig {
        SyncConfig {
            remotes: remotes.iter().map(|r| r.to_string()).collect(),
            ..SyncConfig::default()
        }
    }

    fn committed(report: &PushReport) -> CommitId {
        match &report.outcome {
            PushOutcome::Committed(id) => id.clone(),
            other => panic!("expected a commit, got {other:?}"),
        }
    }

    #[test]
    fn first_push_creates_target_and_uploads() {
        let store = MemoryTreeStore::new();
        let vcs = MemoryVcs::new();
        let id = vcs.add_content("data/x.bin", b"payload");
        vcs.commit("c1");

        let config = config(&["primary"]);
        let report = PushEngine::new(&vcs, &store, &config)
            .push(&PushOptions::default())
            .unwrap();

        assert_eq!(report.guard, Some(GuardOutcome::ProceedEmpty));
        assert_eq!(report.stats.new, 1);
        committed(&report);
        assert!(store.has_content(&id));

        let snapshot = store.open("primary").unwrap();
        assert_eq!(snapshot.root.origin_commit(), Some("c1"));
        assert_eq!(
            snapshot.root.tree.metadata().upload_strategy,
            Some(UploadStrategy::ContentOnly)
        );
    }

    #[test]
    fn unchanged_push_is_idempotent() {
        let store = MemoryTreeStore::new();
        let vcs = MemoryVcs::new();
        vcs.add_content("data/x.bin", b"payload");
        vcs.commit("c1");
        let config = config(&["primary"]);
        let engine = PushEngine::new(&vcs, &store, &config);

        engine.push(&PushOptions::default()).unwrap();
        let before = store.open("primary").unwrap();
        vcs.commit("c2");
        let second = engine.push(&PushOptions::default()).unwrap();

        assert_eq!(second.outcome, PushOutcome::UpToDate);
        assert_eq!(second.stats.reused, 1);
        assert_eq!(store.commit_count("primary"), 1);
        let after = store.open("primary").unwrap();
        assert_eq!(
            after.root.tree.digest().unwrap(),
            before.root.tree.digest().unwrap()
        );
    }

    #[test]
    fn second_push_reuses_and_uploads_only_new() {
        let store = MemoryTreeStore::new();
        let vcs = MemoryVcs::new();
        vcs.add_content("data/x.bin", b"a1");
        vcs.commit("c1");
        let config = config(&["primary"]);
        let engine = PushEngine::new(&vcs, &store, &config);
        engine.push(&PushOptions::default()).unwrap();

        let b2 = vcs.add_content("data/y.bin", b"b2");
        vcs.commit("c2");
        let report = engine.push(&PushOptions::default()).unwrap();

        assert_eq!((report.stats.reused, report.stats.new), (1, 1));
        assert_eq!(report.uploads, vec![b2]);
        assert_eq!(report.guard, Some(GuardOutcome::ProceedFastForward));
        assert_eq!(store.commit_count("primary"), 2);
    }

    #[test]
    fn diverged_remote_requires_force() {
        let store = MemoryTreeStore::new();
        let vcs = MemoryVcs::new();
        vcs.add_content("data/x.bin", b"x");
        vcs.commit("c1");
        let config = config(&["primary"]);
        let engine = PushEngine::new(&vcs, &store, &config);
        engine.push(&PushOptions::default()).unwrap();

        // Local history is rewritten: c1 is known but no longer an ancestor
        vcs.add_commit("c1b", &[]);
        vcs.set_head("c1b");
        vcs.add_content("data/y.bin", b"y");

        let err = engine.push(&PushOptions::default()).unwrap_err();
        assert!(matches!(err, Error::Divergence { .. }));
        assert_eq!(store.commit_count("primary"), 1);

        let forced = engine
            .push(&PushOptions {
                force: true,
                ..PushOptions::default()
            })
            .unwrap();
        assert_eq!(forced.guard, Some(GuardOutcome::ProceedForced));
        assert_eq!(store.commit_count("primary"), 2);
    }

    #[test]
    fn unavailable_content_leaves_remote_untouched() {
        let store = MemoryTreeStore::new();
        let vcs = MemoryVcs::new();
        vcs.add_content("data/ok.bin", b"ok");
        vcs.add_missing_content("data/gone.bin", b"gone");
        vcs.commit("c1");

        let config = config(&["primary"]);
        let err = PushEngine::new(&vcs, &store, &config)
            .push(&PushOptions::default())
            .unwrap_err();

        assert!(matches!(err, Error::ContentUnavailable { .. }));
        assert!(matches!(
            store.open("primary"),
            Err(treesync_store::Error::NotFound { .. })
        ));
    }

    #[test]
    fn content_reused_from_secondary_root() {
        let store = MemoryTreeStore::new();
        let vcs = MemoryVcs::new();
        vcs.add_content("data/x.bin", b"x");
        vcs.commit("c1");
        let mirror_config = config(&["mirror"]);
        PushEngine::new(&vcs, &store, &mirror_config)
            .push(&PushOptions::default())
            .unwrap();

        let id = vcs.add_content("data/x.bin", b"x");
        vcs.forget_content(&id);
        let config = config(&["primary", "mirror"]);
        let report = PushEngine::new(&vcs, &store, &config)
            .push(&PushOptions::default())
            .unwrap();

        assert_eq!(report.stats.reused, 1);
        assert!(report.uploads.is_empty());
        committed(&report);
    }

    #[test]
    fn as_before_keeps_previous_strategy() {
        let store = MemoryTreeStore::new();
        let vcs = MemoryVcs::new();
        vcs.add_content("data/x.bin", b"x");
        vcs.add_text("README.md", b"# hi");
        vcs.commit("c1");
        let config = config(&["primary"]);
        let engine = PushEngine::new(&vcs, &store, &config);

        engine
            .push(&PushOptions {
                strategy: Some(StrategySetting::ContentAndText),
                ..PushOptions::default()
            })
            .unwrap();
        vcs.add_text("NOTES.md", b"more");
        vcs.commit("c2");
        let report = engine.push(&PushOptions::default()).unwrap();

        assert_eq!(report.strategy, UploadStrategy::ContentAndText);
        let tree = store.open("primary").unwrap().root.tree;
        let notes = tree
            .get(&NormalizedPath::new("NOTES.md"))
            .and_then(Node::as_object)
            .unwrap();
        assert_eq!(notes.metadata().kind, ObjectKind::Text);
    }

    #[test]
    fn dry_run_does_not_commit() {
        let store = MemoryTreeStore::new();
        let vcs = MemoryVcs::new();
        let id = vcs.add_content("data/x.bin", b"x");
        vcs.commit("c1");

        let config = config(&["primary"]);
        let report = PushEngine::new(&vcs, &store, &config)
            .push(&PushOptions {
                dry_run: true,
                ..PushOptions::default()
            })
            .unwrap();

        assert_eq!(report.outcome, PushOutcome::DryRun);
        assert_eq!(report.uploads, vec![id.clone()]);
        assert_eq!(store.commit_count("primary"), 0);
        assert!(!store.has_content(&id));
    }

    #[test]
    fn unreachable_target_is_an_error() {
        let store = MemoryTreeStore::new();
        store.create_repository("primary").unwrap();
        store.set_unreachable("primary");
        let vcs = MemoryVcs::new();
        vcs.commit("c1");

        let config = config(&["primary"]);
        let err = PushEngine::new(&vcs, &store, &config)
            .push(&PushOptions::default())
            .unwrap_err();
        assert!(matches!(err, Error::PushTargetUnavailable { .. }));
    }

    #[test]
    fn no_remotes_is_an_error() {
        let store = MemoryTreeStore::new();
        let vcs = MemoryVcs::new();
        let config = SyncConfig::default();
        let err = PushEngine::new(&vcs, &store, &config)
            .push(&PushOptions::default())
            .unwrap_err();
        assert!(matches!(err, Error::NoRemotesConfigured));
    }

    #[test]
    fn commit_message_is_recorded() {
        let store = MemoryTreeStore::new();
        let vcs = MemoryVcs::new();
        vcs.add_content("a.bin", b"a");
        vcs.commit("c1");

        let config = config(&["primary"]);
        PushEngine::new(&vcs, &store, &config)
            .push(&PushOptions {
                message: Some("release".into()),
                ..PushOptions::default()
            })
            .unwrap();

        let snapshot = store.open("primary").unwrap();
        assert_eq!(
            snapshot.root.commit.unwrap().message.as_deref(),
            Some("release")
        );
    }
}
