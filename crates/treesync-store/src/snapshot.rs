//! Commits and snapshots

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use treesync_fs::ContentId;

use crate::node::{Tree, TreeDigest};
use crate::Result;

/// Identifier of a commit in a tree store repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommitId(String);

impl CommitId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Abbreviated form for display.
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(12)]
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Metadata recorded with a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitMeta {
    /// Local VCS commit the snapshot was built from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_commit: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    pub timestamp: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl CommitMeta {
    pub fn new(origin_commit: Option<String>) -> Self {
        Self {
            origin_commit,
            message: None,
            timestamp: Utc::now(),
            extra: BTreeMap::new(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// A committed tree together with its commit metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Root {
    pub tree: Tree,
    /// `None` for a repository with no commits yet
    pub commit: Option<CommitMeta>,
}

impl Root {
    /// The root of a repository with no commits.
    pub fn empty() -> Self {
        Self {
            tree: Tree::new(""),
            commit: None,
        }
    }

    /// Whether the snapshot holds no entries at all.
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    pub fn origin_commit(&self) -> Option<&str> {
        self.commit.as_ref()?.origin_commit.as_deref()
    }
}

/// The current state of one named repository.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub name: String,
    pub head: Option<CommitId>,
    pub root: Root,
}

impl Snapshot {
    /// A repository that has never been committed to.
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            head: None,
            root: Root::empty(),
        }
    }
}

/// A commit as persisted by a store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitRecord {
    pub id: CommitId,
    pub parent: Option<CommitId>,
    pub tree: Tree,
    pub meta: CommitMeta,
}

impl CommitRecord {
    /// Build the record for `request`, deriving its id from parent, tree
    /// identity and metadata.
    pub fn from_request(request: CommitRequest) -> Result<Self> {
        let digest = request.tree.digest()?;
        let id = commit_id(request.parent.as_ref(), &digest, &request.meta)?;
        Ok(Self {
            id,
            parent: request.parent,
            tree: request.tree,
            meta: request.meta,
        })
    }

    pub fn into_snapshot(self, name: impl Into<String>) -> Snapshot {
        Snapshot {
            name: name.into(),
            head: Some(self.id),
            root: Root {
                tree: self.tree,
                commit: Some(self.meta),
            },
        }
    }
}

fn commit_id(
    parent: Option<&CommitId>,
    digest: &TreeDigest,
    meta: &CommitMeta,
) -> Result<CommitId> {
    #[derive(Serialize)]
    struct Header<'a> {
        parent: Option<&'a CommitId>,
        tree: &'a TreeDigest,
        meta: &'a CommitMeta,
    }

    let encoded = serde_json::to_vec(&Header {
        parent,
        tree: digest,
        meta,
    })?;
    Ok(CommitId(ContentId::for_bytes(&encoded).to_string()))
}

/// Everything needed to append a commit.
#[derive(Debug, Clone)]
pub struct CommitRequest {
    /// Must equal the repository's current head
    pub parent: Option<CommitId>,
    pub tree: Tree,
    pub meta: CommitMeta,
    /// Content ids the store must hold before the commit becomes visible
    pub uploads: Vec<ContentId>,
}
