//! End-to-end integration tests
//!
//! These tests run the push and fetch flows over a real git working copy and
//! a directory-backed tree store: config loading -> inventory -> build ->
//! guard -> commit, and back again.

use std::collections::HashMap;
use std::fs;

use pretty_assertions::assert_eq;
use treesync_core::{
    ConfigResolver, Error, FetchEngine, PushEngine, PushOptions, PushOutcome, PushReport,
    StrategySetting, SyncConfig,
};
use treesync_fs::NormalizedPath;
use treesync_git::GitVcs;
use treesync_store::{FsTreeStore, Node, ObjectKind, Payload, TreeStore};
use treesync_test_utils::git::{git, track_content, track_remote_only};
use treesync_test_utils::repo::TestRepo;

/// Resolve config for `repo` without reading the user's global config or
/// the process environment.
fn resolve_config(repo: &TestRepo, env: &[(&str, &str)]) -> SyncConfig {
    ConfigResolver::new(NormalizedPath::new(repo.work()))
        .with_global_config_dir(repo.base().join("global"))
        .with_env(
            env.iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<HashMap<_, _>>(),
        )
        .resolve()
        .unwrap()
}

fn open(repo: &TestRepo) -> (GitVcs, FsTreeStore) {
    let vcs = GitVcs::discover(&NormalizedPath::new(repo.work())).unwrap();
    let store = FsTreeStore::new(NormalizedPath::new(repo.store()));
    (vcs, store)
}

fn push(repo: &TestRepo, options: &PushOptions) -> treesync_core::Result<PushReport> {
    let config = resolve_config(repo, &[]);
    let (vcs, store) = open(repo);
    PushEngine::new(&vcs, &store, &config).push(options)
}

fn setup(remotes: &[&str]) -> TestRepo {
    let repo = TestRepo::new();
    repo.init_git();
    repo.write_config(remotes);
    repo.commit("configure treesync");
    repo
}

#[test]
fn test_push_then_fetch_into_clone() {
    let repo = setup(&["primary"]);
    repo.track("data/x.bin", b"\x00\x01\x02binary");
    repo.track("models/deep/weights.bin", b"weights");
    repo.commit("add content");

    let report = push(&repo, &PushOptions::default()).unwrap();
    assert_eq!(report.stats.new, 2);

    git(repo.base(), &["clone", "-q", "work", "clone"]);
    let clone = repo.base().join("clone");
    let vcs = GitVcs::discover(&NormalizedPath::new(&clone)).unwrap();
    let config = ConfigResolver::new(NormalizedPath::new(&clone))
        .with_global_config_dir(repo.base().join("global"))
        .with_env(HashMap::new())
        .resolve()
        .unwrap();
    let store = FsTreeStore::new(config.store_root().unwrap().clone());

    let fetched = FetchEngine::new(&vcs, &store, &config)
        .fetch(&[])
        .unwrap()
        .into_result()
        .unwrap();

    assert_eq!(fetched.fetched.len(), 2);
    assert_eq!(fs::read(clone.join("data/x.bin")).unwrap(), b"\x00\x01\x02binary");
    assert_eq!(
        fs::read(clone.join("models/deep/weights.bin")).unwrap(),
        b"weights"
    );

    // A second fetch finds everything checked out
    let again = FetchEngine::new(&vcs, &store, &config).fetch(&[]).unwrap();
    assert!(again.fetched.is_empty());
    assert_eq!(again.up_to_date.len(), 2);
}

#[test]
fn test_unchanged_push_is_idempotent() {
    let repo = setup(&["primary"]);
    repo.track("data/x.bin", b"x");
    repo.commit("add content");

    let first = push(&repo, &PushOptions::default()).unwrap();
    let second = push(&repo, &PushOptions::default()).unwrap();

    assert!(matches!(first.outcome, PushOutcome::Committed(_)));
    assert_eq!(second.outcome, PushOutcome::UpToDate);
    let (_, store) = open(&repo);
    assert_eq!(store.log("primary", 10).unwrap().len(), 1);
}

#[test]
fn test_content_and_text_snapshot() {
    let repo = setup(&["primary"]);
    repo.track("data/x.bin", b"x");
    repo.write("docs/guide.md", "# Guide\n");
    let head = repo.commit("add docs");
    git(
        &repo.work(),
        &["update-index", "--add", "--cacheinfo", &format!("160000,{head},vendor/lib")],
    );
    #[cfg(unix)]
    {
        std::os::unix::fs::symlink("docs/guide.md", repo.work().join("guide-link")).unwrap();
        git(&repo.work(), &["add", "guide-link"]);
    }

    let report = push(
        &repo,
        &PushOptions {
            strategy: Some(StrategySetting::ContentAndText),
            ..PushOptions::default()
        },
    )
    .unwrap();

    assert_eq!(report.stats.new, 1);
    assert_eq!(report.stats.subordinate, 1);
    let (_, store) = open(&repo);
    let tree = store.open("primary").unwrap().root.tree;
    let object = |path: &str| {
        tree.get(&NormalizedPath::new(path))
            .and_then(Node::as_object)
            .cloned()
            .unwrap_or_else(|| panic!("{path} missing from snapshot"))
    };

    let guide = object("docs/guide.md");
    assert_eq!(guide.metadata().kind, ObjectKind::Text);
    assert_eq!(guide.payload(), &Payload::Text("# Guide\n".to_string()));
    let vendor = object("vendor/lib");
    assert_eq!(vendor.metadata().kind, ObjectKind::Subrepository);
    assert_eq!(vendor.payload(), &Payload::Text(head.clone()));
    #[cfg(unix)]
    {
        let link = object("guide-link");
        assert_eq!(link.metadata().kind, ObjectKind::Symlink);
        assert_eq!(link.payload(), &Payload::Text("docs/guide.md".to_string()));
    }
}

#[test]
fn test_text_limit_from_environment_aborts_push() {
    let repo = setup(&["primary"]);
    repo.write("small.txt", &"a".repeat(400));
    repo.write("big.txt", &"b".repeat(401));
    repo.commit("add text");

    let config = resolve_config(
        &repo,
        &[
            ("TREESYNC_MAX_TEXT_SIZE", "400"),
            ("TREESYNC_UPLOAD_STRATEGY", "content-and-text"),
        ],
    );
    let (vcs, store) = open(&repo);
    let err = PushEngine::new(&vcs, &store, &config)
        .push(&PushOptions::default())
        .unwrap_err();

    assert!(matches!(
        err,
        Error::TextTooLarge { ref path, size: 401, max: 400 } if path.as_str() == "big.txt"
    ));
    assert!(matches!(
        store.open("primary"),
        Err(treesync_store::Error::NotFound { .. })
    ));
}

#[test]
fn test_rewritten_history_needs_force() {
    let repo = setup(&["primary"]);
    repo.track("data/x.bin", b"x");
    repo.commit("add x");
    push(&repo, &PushOptions::default()).unwrap();

    git(&repo.work(), &["reset", "-q", "--hard", "HEAD~1"]);
    repo.track("data/y.bin", b"y");
    let rewritten = repo.commit("add y instead");

    let err = push(&repo, &PushOptions::default()).unwrap_err();
    assert!(matches!(err, Error::Divergence { .. }), "got {err}");

    let forced = push(
        &repo,
        &PushOptions {
            force: true,
            ..PushOptions::default()
        },
    )
    .unwrap();
    assert!(matches!(forced.outcome, PushOutcome::Committed(_)));
    let (_, store) = open(&repo);
    let snapshot = store.open("primary").unwrap();
    assert_eq!(snapshot.root.origin_commit(), Some(rewritten.as_str()));
    assert!(snapshot.root.tree.get(&NormalizedPath::new("data/x.bin")).is_none());
}

#[test]
fn test_remote_from_unrelated_history_is_history_unknown() {
    let first = setup(&["primary"]);
    first.track("data/x.bin", b"x");
    first.commit("add x");
    push(&first, &PushOptions::default()).unwrap();

    let second = TestRepo::new();
    second.init_git();
    track_content(&second.work(), "data/x.bin", b"other");
    second.commit("unrelated");
    let vcs = GitVcs::discover(&NormalizedPath::new(second.work())).unwrap();
    let store = FsTreeStore::new(NormalizedPath::new(first.store()));
    let config = SyncConfig {
        remotes: vec!["primary".to_string()],
        store: Some(store.root().clone()),
        ..SyncConfig::default()
    };

    for force in [false, true] {
        let err = PushEngine::new(&vcs, &store, &config)
            .push(&PushOptions {
                force,
                ..PushOptions::default()
            })
            .unwrap_err();
        assert!(matches!(err, Error::HistoryUnknown { .. }), "force={force}: {err}");
    }
}

#[test]
fn test_content_reused_from_mirror_without_local_copy() {
    let repo = setup(&["mirror"]);
    repo.track("data/x.bin", b"shared");
    repo.commit("add x");
    push(&repo, &PushOptions::default()).unwrap();

    repo.write_config(&["primary", "mirror"]);
    fs::remove_dir_all(repo.work().join(".git/lfs/objects")).unwrap();

    let report = push(&repo, &PushOptions::default()).unwrap();

    assert_eq!((report.stats.reused, report.stats.new), (1, 0));
    assert!(report.uploads.is_empty());
    assert!(matches!(report.outcome, PushOutcome::Committed(_)));
}

#[test]
fn test_missing_content_blocks_whole_push() {
    let repo = setup(&["primary"]);
    repo.track("data/ok.bin", b"ok");
    track_remote_only(&repo.work(), "data/lost.bin", b"lost");
    repo.commit("add both");

    let err = push(&repo, &PushOptions::default()).unwrap_err();

    assert!(matches!(err, Error::ContentUnavailable { .. }));
    assert!(!repo.store().join("repos/primary").exists());
    assert!(!repo.store().join("blobs").exists());
}

#[test]
fn test_corrupt_secondary_is_skipped() {
    let repo = setup(&["primary", "mirror"]);
    repo.track("data/x.bin", b"x");
    repo.commit("add x");
    let mirror = repo.store().join("repos/mirror");
    fs::create_dir_all(mirror.join("commits")).unwrap();
    fs::write(mirror.join("HEAD"), "deadbeef\n").unwrap();

    let report = push(&repo, &PushOptions::default()).unwrap();

    assert!(matches!(report.outcome, PushOutcome::Committed(_)));
    assert_eq!(report.skipped_roots.len(), 1);
    assert_eq!(report.skipped_roots[0].name, "mirror");
}

#[test]
fn test_fetch_reports_every_miss() {
    let repo = setup(&["primary"]);
    repo.track("a/x.bin", b"x");
    repo.commit("add x");
    push(&repo, &PushOptions::default()).unwrap();
    fs::remove_dir_all(repo.work().join(".git/lfs/objects")).unwrap();
    track_remote_only(&repo.work(), "b/lost1.bin", b"1");
    track_remote_only(&repo.work(), "c/lost2.bin", b"2");
    repo.commit("add unpushed");

    let config = resolve_config(&repo, &[]);
    let (vcs, store) = open(&repo);
    let report = FetchEngine::new(&vcs, &store, &config).fetch(&[]).unwrap();

    assert_eq!(report.fetched.len(), 1);
    assert_eq!(repo.read("a/x.bin"), b"x");
    let missed: Vec<_> = report.misses.iter().map(|m| m.path.as_str()).collect();
    assert_eq!(missed, vec!["b/lost1.bin", "c/lost2.bin"]);
}
