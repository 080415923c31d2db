//! Opening remote roots
//!
//! Each configured remote is opened once per operation. A remote that
//! cannot be opened is skipped with a warning; the remaining roots keep
//! their configured order, which is the resolution precedence.

use treesync_store::{Error as StoreError, Snapshot, TreeStore};

use crate::{Error, Result};

/// Why a remote was left out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The repository does not exist yet
    NotFound,
    /// The repository exists but could not be read
    Unreachable(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => write!(f, "does not exist yet"),
            Self::Unreachable(message) => write!(f, "unreachable: {message}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRoot {
    pub name: String,
    pub reason: SkipReason,
}

/// The remotes that opened, in precedence order, plus the ones that did not.
#[derive(Debug, Clone, Default)]
pub struct OpenedRoots {
    roots: Vec<Snapshot>,
    skipped: Vec<SkippedRoot>,
}

impl OpenedRoots {
    pub fn roots(&self) -> &[Snapshot] {
        &self.roots
    }

    pub fn skipped(&self) -> &[SkippedRoot] {
        &self.skipped
    }

    /// The opened snapshot named `name`.
    pub fn get(&self, name: &str) -> Option<&Snapshot> {
        self.roots.iter().find(|root| root.name == name)
    }

    /// Why `name` was skipped, if it was.
    pub fn skip_reason(&self, name: &str) -> Option<&SkipReason> {
        self.skipped
            .iter()
            .find(|skipped| skipped.name == name)
            .map(|skipped| &skipped.reason)
    }

    /// The snapshot a push to `name` builds on.
    ///
    /// A repository that does not exist yet is empty; the first commit
    /// creates it. An unreachable one cannot be pushed to.
    pub fn push_target(&self, name: &str) -> Result<Snapshot> {
        match (self.get(name), self.skip_reason(name)) {
            (Some(snapshot), _) => Ok(snapshot.clone()),
            (None, Some(SkipReason::Unreachable(message))) => Err(Error::PushTargetUnavailable {
                remote: name.to_string(),
                message: message.clone(),
            }),
            (None, _) => Ok(Snapshot::empty(name)),
        }
    }
}

pub struct RemoteRootResolver<'a> {
    store: &'a dyn TreeStore,
}

impl<'a> RemoteRootResolver<'a> {
    pub fn new(store: &'a dyn TreeStore) -> Self {
        Self { store }
    }

    /// Open every name in `names`, keeping the ones that succeed in order.
    pub fn open_roots(&self, names: &[String]) -> OpenedRoots {
        let mut opened = OpenedRoots::default();
        for name in names {
            match self.store.open(name) {
                Ok(snapshot) => {
                    tracing::debug!(remote = %name, head = ?snapshot.head, "Opened remote root");
                    opened.roots.push(snapshot);
                }
                Err(e) => {
                    tracing::warn!(remote = %name, error = %e, "Skipping remote root");
                    let reason = match e {
                        StoreError::NotFound { .. } => SkipReason::NotFound,
                        other => SkipReason::Unreachable(other.to_string()),
                    };
                    opened.skipped.push(SkippedRoot {
                        name: name.clone(),
                        reason,
                    });
                }
            }
        }
        opened
    }
}
