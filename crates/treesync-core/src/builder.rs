//! Building the tree for a push
//!
//! A build either completes with a full snapshot of the working set or
//! fails as a whole; nothing partial ever reaches a commit.

use std::collections::BTreeSet;

use treesync_fs::{ContentId, NormalizedPath};
use treesync_git::{Entry, PathKind, Vcs, WorkingPath};
use treesync_store::{Node, Object, ObjectKind, Snapshot, Tree, TreeMeta, UploadStrategy};

use crate::inventory::Inventory;
use crate::resolve::ObjectResolver;
use crate::{Error, Result};

/// Counts of what a build produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    /// Tracked content reused from a remote root
    pub reused: usize,
    /// Tracked content that must be uploaded
    pub new: usize,
    /// Plain files stored inline
    pub text: usize,
    pub symlink: usize,
    /// Subordinate repository placeholders
    pub subordinate: usize,
}

impl BuildStats {
    /// Tracked content entries handled.
    pub fn total(&self) -> usize {
        self.reused + self.new
    }
}

/// A finished build.
#[derive(Debug, Clone)]
pub struct BuildResult {
    pub tree: Tree,
    pub stats: BuildStats,
    /// Content the target store needs before the tree can be committed
    pub uploads: Vec<ContentId>,
}

/// Builds a snapshot tree from the working set, reusing remote objects.
pub struct TreeBuilder<'a> {
    vcs: &'a dyn Vcs,
    roots: &'a [Snapshot],
    max_text_size: u64,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(vcs: &'a dyn Vcs, roots: &'a [Snapshot], max_text_size: u64) -> Self {
        Self {
            vcs,
            roots,
            max_text_size,
        }
    }

    /// Build a tree with `strategy`, stamping it into the root metadata.
    ///
    /// Unknown metadata keys of `previous` are carried over to the new root.
    pub fn build(&self, strategy: UploadStrategy, previous: &TreeMeta) -> Result<BuildResult> {
        let mut state = BuildState::default();
        let inventory = Inventory::new(self.vcs);

        match strategy {
            UploadStrategy::ContentOnly => {
                for entry in inventory.tracked_entries(&[])? {
                    self.add_tracked(&mut state, &entry)?;
                }
            }
            UploadStrategy::ContentAndText => {
                let tracked = inventory.tracked_by_path()?;
                for working in inventory.all_paths()? {
                    match tracked.get(&working.path) {
                        Some(entry) => self.add_tracked(&mut state, entry)?,
                        None => self.add_untracked(&mut state, &working)?,
                    }
                }
            }
        }

        let metadata = state.tree.metadata_mut();
        metadata.extra = previous.extra.clone();
        metadata.upload_strategy = Some(strategy);

        tracing::info!(
            %strategy,
            reused = state.stats.reused,
            new = state.stats.new,
            text = state.stats.text,
            symlink = state.stats.symlink,
            subordinate = state.stats.subordinate,
            "Built tree"
        );

        Ok(BuildResult {
            tree: state.tree,
            stats: state.stats,
            uploads: state.uploads.into_iter().collect(),
        })
    }

    fn add_tracked(&self, state: &mut BuildState, entry: &Entry) -> Result<()> {
        let object = match ObjectResolver::resolve(entry, self.roots) {
            Some(resolved) => {
                tracing::debug!(
                    path = %entry.path,
                    remote = resolved.remote,
                    "Reusing remote object"
                );
                state.stats.reused += 1;
                resolved.object.clone()
            }
            None => {
                if !self.vcs.has_content(&entry.content_id) {
                    return Err(Error::ContentUnavailable {
                        path: entry.path.clone(),
                        content_id: entry.content_id.clone(),
                    });
                }
                tracing::debug!(path = %entry.path, content = %entry.content_id, "New object");
                state.stats.new += 1;
                state.uploads.insert(entry.content_id.clone());
                Object::content(leaf_name(&entry.path)?, entry.content_id.clone(), entry.size)
            }
        };
        insert_at(&mut state.tree, &entry.path, Node::Object(object))
    }

    fn add_untracked(&self, state: &mut BuildState, working: &WorkingPath) -> Result<()> {
        let path = &working.path;
        let name = leaf_name(path)?;
        let object = match working.kind {
            PathKind::Symlink => {
                state.stats.symlink += 1;
                Object::text(name, ObjectKind::Symlink, self.vcs.symlink_target(path)?)
            }
            PathKind::Submodule => {
                state.stats.subordinate += 1;
                Object::text(
                    name,
                    ObjectKind::Subrepository,
                    self.vcs.submodule_revision(path)?,
                )
            }
            PathKind::Regular => {
                let size = self.vcs.file_size(path)?;
                if size > self.max_text_size {
                    return Err(Error::TextTooLarge {
                        path: path.clone(),
                        size,
                        max: self.max_text_size,
                    });
                }
                let bytes = self.vcs.read_bytes(path)?;
                let text =
                    String::from_utf8(bytes).map_err(|_| Error::NotText { path: path.clone() })?;
                state.stats.text += 1;
                Object::text(name, ObjectKind::Text, text)
            }
        };
        insert_at(&mut state.tree, path, Node::Object(object))
    }
}

#[derive(Default)]
struct BuildState {
    tree: Tree,
    stats: BuildStats,
    uploads: BTreeSet<ContentId>,
}

fn leaf_name(path: &NormalizedPath) -> Result<String> {
    path.file_name()
        .map(str::to_string)
        .ok_or_else(|| Error::PathConflict { path: path.clone() })
}

/// Attach `node` at `path` below `root`, creating intermediate trees.
///
/// Existing subtrees along the way are reused. An object standing where a
/// directory is needed is a [`Error::PathConflict`].
pub fn insert_at(root: &mut Tree, path: &NormalizedPath, node: Node) -> Result<()> {
    let conflict = || Error::PathConflict { path: path.clone() };
    let (dirs, _) = path.split_leaf().ok_or_else(conflict)?;

    let mut tree = root;
    for dir in dirs {
        if tree.child(dir).is_none() {
            tree.insert(Node::Tree(Tree::new(dir)));
        }
        tree = match tree.child_mut(dir) {
            Some(Node::Tree(sub)) => sub,
            _ => return Err(conflict()),
        };
    }
    if matches!(tree.child(node.name()), Some(Node::Tree(_))) {
        return Err(conflict());
    }
    tree.insert(node);
    Ok(())
}
