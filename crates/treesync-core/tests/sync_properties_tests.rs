//! End-to-end behavior of push and fetch over in-memory collaborators

use pretty_assertions::assert_eq;
use rstest::rstest;
use treesync_core::{
    BuildStats, Error, FetchEngine, PushEngine, PushOptions, PushOutcome, StrategySetting,
    SyncConfig, TreeBuilder,
};
use treesync_fs::NormalizedPath;
use treesync_store::{MemoryTreeStore, Node, TreeStore, UploadStrategy};
use treesync_test_utils::vcs::MemoryVcs;

fn config(remotes: &[&str]) -> SyncConfig {
    SyncConfig {
        remotes: remotes.iter().map(|r| r.to_string()).collect(),
        ..SyncConfig::default()
    }
}

fn push(vcs: &MemoryVcs, store: &MemoryTreeStore, remotes: &[&str]) -> treesync_core::PushReport {
    let config = config(remotes);
    PushEngine::new(vcs, store, &config)
        .push(&PushOptions::default())
        .unwrap()
}

#[test]
fn pushed_content_fetches_back_identical() {
    let store = MemoryTreeStore::new();
    let files: [(&str, &[u8]); 3] = [
        ("data/x.bin", b"\x00\x01binary"),
        ("data/nested/y.bin", b"second"),
        ("z.bin", b""),
    ];

    let origin = MemoryVcs::new();
    for (path, bytes) in files {
        origin.add_content(path, bytes);
    }
    origin.commit("c1");
    push(&origin, &store, &["primary"]);

    let clone = MemoryVcs::new();
    for (path, bytes) in files {
        clone.add_missing_content(path, bytes);
    }
    let config = config(&["primary"]);
    let report = FetchEngine::new(&clone, &store, &config)
        .fetch(&[])
        .unwrap()
        .into_result()
        .unwrap();

    assert_eq!(report.fetched.len(), files.len());
    for (path, bytes) in files {
        assert_eq!(clone.working_file(path).unwrap(), bytes, "{path}");
    }
}

#[test]
fn repeated_push_creates_no_commit() {
    let store = MemoryTreeStore::new();
    let vcs = MemoryVcs::new();
    vcs.add_content("data/x.bin", b"x");
    vcs.add_text("README.md", b"readme");
    vcs.commit("c1");
    let config = SyncConfig {
        strategy: StrategySetting::ContentAndText,
        ..config(&["primary"])
    };
    let engine = PushEngine::new(&vcs, &store, &config);

    let first = engine.push(&PushOptions::default()).unwrap();
    let second = engine.push(&PushOptions::default()).unwrap();

    assert!(matches!(first.outcome, PushOutcome::Committed(_)));
    assert_eq!(second.outcome, PushOutcome::UpToDate);
    assert_eq!(store.commit_count("primary"), 1);
}

#[test]
fn content_already_remote_is_reused() {
    let store = MemoryTreeStore::new();
    let vcs = MemoryVcs::new();
    vcs.add_content("data/x.bin", b"a1");
    vcs.commit("c1");
    push(&vcs, &store, &["mirror"]);

    let roots = vec![store.open("mirror").unwrap()];
    let build = TreeBuilder::new(&vcs, &roots, 1024)
        .build(UploadStrategy::ContentOnly, &Default::default())
        .unwrap();

    assert_eq!(build.stats.reused, 1);
    assert_eq!(build.stats.new, 0);
    assert!(build.uploads.is_empty());
}

#[test]
fn diverged_remote_fails_without_force_and_succeeds_with_it() {
    let store = MemoryTreeStore::new();
    let vcs = MemoryVcs::new();
    vcs.add_content("data/x.bin", b"x");
    vcs.commit("base");
    vcs.commit("theirs");
    push(&vcs, &store, &["primary"]);

    vcs.add_commit("ours", &["base"]);
    vcs.set_head("ours");
    vcs.add_content("data/y.bin", b"y");
    let config = config(&["primary"]);
    let engine = PushEngine::new(&vcs, &store, &config);

    let err = engine.push(&PushOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        Error::Divergence { ref origin_commit, .. } if origin_commit == "theirs"
    ));

    let report = engine
        .push(&PushOptions {
            force: true,
            ..PushOptions::default()
        })
        .unwrap();
    assert!(matches!(report.outcome, PushOutcome::Committed(_)));
    let root = store.open("primary").unwrap().root;
    assert_eq!(root.origin_commit(), Some("ours"));
}

#[test]
fn remote_history_missing_locally_is_not_divergence() {
    let store = MemoryTreeStore::new();
    let elsewhere = MemoryVcs::new();
    elsewhere.add_content("data/x.bin", b"x");
    elsewhere.commit("foreign");
    push(&elsewhere, &store, &["primary"]);

    let vcs = MemoryVcs::new();
    vcs.add_content("data/x.bin", b"x2");
    vcs.commit("local");
    let config = config(&["primary"]);
    let engine = PushEngine::new(&vcs, &store, &config);

    for force in [false, true] {
        let err = engine
            .push(&PushOptions {
                force,
                ..PushOptions::default()
            })
            .unwrap_err();
        assert!(matches!(err, Error::HistoryUnknown { .. }), "force={force}");
    }
    assert_eq!(store.commit_count("primary"), 1);
}

#[test]
fn one_unavailable_entry_blocks_the_whole_commit() {
    let store = MemoryTreeStore::new();
    let vcs = MemoryVcs::new();
    vcs.add_content("data/a.bin", b"a");
    vcs.commit("c1");
    push(&vcs, &store, &["primary"]);

    vcs.add_content("data/b.bin", b"b");
    vcs.add_missing_content("data/c.bin", b"nowhere");
    vcs.commit("c2");
    let config = config(&["primary"]);
    let err = PushEngine::new(&vcs, &store, &config)
        .push(&PushOptions::default())
        .unwrap_err();

    assert!(matches!(
        err,
        Error::ContentUnavailable { ref path, .. } if path.as_str() == "data/c.bin"
    ));
    assert_eq!(store.commit_count("primary"), 1);
    let tree = store.open("primary").unwrap().root.tree;
    assert!(tree.get(&NormalizedPath::new("data/b.bin")).is_none());
}

#[rstest]
#[case::at_limit(100, true)]
#[case::over_limit(101, false)]
fn text_size_limit(#[case] size: usize, #[case] accepted: bool) {
    let store = MemoryTreeStore::new();
    let vcs = MemoryVcs::new();
    vcs.add_content("data/x.bin", b"x");
    vcs.add_text("a.txt", b"small");
    vcs.add_text("docs/big.txt", &vec![b'a'; size]);
    vcs.commit("c1");
    let config = SyncConfig {
        strategy: StrategySetting::ContentAndText,
        max_text_size: 100,
        ..config(&["primary"])
    };

    let result = PushEngine::new(&vcs, &store, &config).push(&PushOptions::default());

    if accepted {
        assert_eq!(result.unwrap().stats.text, 2);
    } else {
        let err = result.unwrap_err();
        assert!(matches!(err, Error::TextTooLarge { size: 101, max: 100, .. }));
        assert_eq!(store.commit_count("primary"), 0);
    }
}

#[test]
fn first_root_wins_when_both_hold_the_content() {
    let store = MemoryTreeStore::new();
    let a = MemoryVcs::new();
    a.add_content("data/x.bin", b"a1");
    a.commit("ca");
    push(&a, &store, &["A"]);
    let b = MemoryVcs::new();
    b.add_content("data/x.bin", b"a1");
    b.commit("cb");
    push(&b, &store, &["B"]);

    let vcs = MemoryVcs::new();
    vcs.add_content("data/x.bin", b"a1");
    let roots = vec![store.open("A").unwrap(), store.open("B").unwrap()];
    let entries = treesync_core::Inventory::new(&vcs)
        .tracked_entries(&[])
        .unwrap();

    let resolved = treesync_core::ObjectResolver::resolve(&entries[0], &roots).unwrap();
    assert_eq!(resolved.remote, "A");
}

#[test]
fn reuses_existing_and_creates_missing() {
    let store = MemoryTreeStore::new();
    let seed = MemoryVcs::new();
    let a1 = seed.add_content("data/x.bin", b"a1");
    seed.commit("c0");
    push(&seed, &store, &["A"]);

    let vcs = MemoryVcs::new();
    vcs.add_content("data/x.bin", b"a1");
    let b2 = vcs.add_content("data/y.bin", b"b2");
    let roots = vec![store.open("A").unwrap()];
    let build = TreeBuilder::new(&vcs, &roots, 1024)
        .build(UploadStrategy::ContentOnly, &Default::default())
        .unwrap();

    assert_eq!(
        build.stats,
        BuildStats {
            reused: 1,
            new: 1,
            ..BuildStats::default()
        }
    );
    assert_eq!(build.uploads, vec![b2.clone()]);
    let object = |path: &str| {
        build
            .tree
            .get(&NormalizedPath::new(path))
            .and_then(Node::as_object)
            .and_then(|o| o.stored_content_id().cloned())
    };
    assert_eq!(object("data/x.bin"), Some(a1));
    assert_eq!(object("data/y.bin"), Some(b2));
}

#[test]
fn unreachable_secondary_does_not_block_push() {
    let store = MemoryTreeStore::new();
    store.create_repository("mirror").unwrap();
    store.set_unreachable("mirror");
    let vcs = MemoryVcs::new();
    vcs.add_content("data/x.bin", b"x");
    vcs.commit("c1");

    let report = push(&vcs, &store, &["primary", "mirror"]);

    assert!(matches!(report.outcome, PushOutcome::Committed(_)));
    assert_eq!(report.skipped_roots.len(), 1);
    assert_eq!(report.skipped_roots[0].name, "mirror");
}
