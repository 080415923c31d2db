//! Locating existing remote objects
//!
//! An entry matches an object in a root when the object sits at the entry's
//! path and records the entry's content id. Roots are searched in order and
//! the first match wins.

use treesync_fs::{ContentId, NormalizedPath};
use treesync_git::Entry;
use treesync_store::{Node, Object, Snapshot};

/// An object found in a remote root.
#[derive(Debug, Clone, Copy)]
pub struct Resolved<'r> {
    /// Name of the root the object came from
    pub remote: &'r str,
    pub object: &'r Object,
}

pub struct ObjectResolver;

impl ObjectResolver {
    /// The first object across `roots` matching `entry`.
    pub fn resolve<'r>(entry: &Entry, roots: &'r [Snapshot]) -> Option<Resolved<'r>> {
        Self::resolve_path(&entry.path, &entry.content_id, roots)
    }

    /// The first object across `roots` at `path` recording `content_id`.
    pub fn resolve_path<'r>(
        path: &NormalizedPath,
        content_id: &ContentId,
        roots: &'r [Snapshot],
    ) -> Option<Resolved<'r>> {
        roots.iter().find_map(|root| {
            let object = match root.root.tree.get(path)? {
                Node::Object(object) => object,
                Node::Tree(_) => return None,
            };
            (object.stored_content_id() == Some(content_id)).then(|| Resolved {
                remote: root.name.as_str(),
                object,
            })
        })
    }
}
