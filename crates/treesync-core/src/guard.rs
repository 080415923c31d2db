//! Fast-forward safety for pushes
//!
//! Replacing a remote snapshot is safe when the remote is empty or when the
//! local commit it was pushed from is part of local history. Anything else
//! is rejected unless forced, except a remote whose origin commit is not
//! known locally at all: that needs the missing history fetched first.

use treesync_git::{Ancestry, Vcs};
use treesync_store::Snapshot;

use crate::{Error, Result};

/// Why a push may go ahead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardOutcome {
    /// The remote snapshot holds nothing to protect
    ProceedEmpty,
    /// The remote's origin commit is the local head or one of its ancestors
    ProceedFastForward,
    /// The remote would have been rejected but force was given
    ProceedForced,
}

impl std::fmt::Display for GuardOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ProceedEmpty => write!(f, "empty remote"),
            Self::ProceedFastForward => write!(f, "fast-forward"),
            Self::ProceedForced => write!(f, "forced"),
        }
    }
}

pub struct SyncGuard<'a> {
    vcs: &'a dyn Vcs,
}

impl<'a> SyncGuard<'a> {
    pub fn new(vcs: &'a dyn Vcs) -> Self {
        Self { vcs }
    }

    /// Decide whether `target` may be replaced.
    ///
    /// Returns [`Error::HistoryUnknown`] when the origin commit is not in
    /// local history, whether forced or not. Returns [`Error::Divergence`] or
    /// [`Error::UnverifiableRemote`] when not forced.
    pub fn check(&self, target: &Snapshot, force: bool) -> Result<GuardOutcome> {
        if target.root.is_empty() {
            return Ok(GuardOutcome::ProceedEmpty);
        }

        let Some(origin) = target.root.origin_commit() else {
            if force {
                tracing::warn!(
                    remote = %target.name,
                    "Forcing push over remote without origin commit"
                );
                return Ok(GuardOutcome::ProceedForced);
            }
            return Err(Error::UnverifiableRemote {
                remote: target.name.clone(),
            });
        };

        match self.vcs.ancestry(origin)? {
            Ancestry::Ancestor => Ok(GuardOutcome::ProceedFastForward),
            Ancestry::Unknown => Err(Error::HistoryUnknown {
                remote: target.name.clone(),
                origin_commit: origin.to_string(),
            }),
            Ancestry::Diverged if force => {
                tracing::warn!(
                    remote = %target.name,
                    origin = %origin,
                    "Forcing push over diverged remote"
                );
                Ok(GuardOutcome::ProceedForced)
            }
            Ancestry::Diverged => Err(Error::Divergence {
                remote: target.name.clone(),
                origin_commit: origin.to_string(),
                head: self.vcs.head_commit()?,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use treesync_fs::{ContentId, NormalizedPath};
    use treesync_store::{CommitMeta, Node, Object, Root, Tree};
    use treesync_test_utils::vcs::MemoryVcs;

    use crate::builder::insert_at;

    fn remote(origin: Option<&str>, populated: bool) -> Snapshot {
        let mut tree = Tree::new("");
        if populated {
            insert_at(
                &mut tree,
                &NormalizedPath::new("data/x.bin"),
                Node::Object(Object::content("x.bin", ContentId::for_bytes(b"x"), 1)),
            )
            .unwrap();
        }
        Snapshot {
            name: "primary".to_string(),
            head: None,
            root: Root {
                tree,
                commit: Some(CommitMeta::new(origin.map(str::to_string))),
            },
        }
    }

    fn history() -> MemoryVcs {
        let vcs = MemoryVcs::new();
        vcs.commit("c1");
        vcs.commit("c2");
        vcs.add_commit("side", &["c1"]);
        vcs
    }

    #[test]
    fn empty_remote_proceeds() {
        let vcs = history();
        let guard = SyncGuard::new(&vcs);
        assert_eq!(
            guard.check(&remote(Some("side"), false), false).unwrap(),
            GuardOutcome::ProceedEmpty
        );
        assert_eq!(
            guard.check(&Snapshot::empty("primary"), false).unwrap(),
            GuardOutcome::ProceedEmpty
        );
    }

    #[test]
    fn ancestor_or_equal_origin_fast_forwards() {
        let vcs = history();
        let guard = SyncGuard::new(&vcs);
        for origin in ["c1", "c2"] {
            assert_eq!(
                guard.check(&remote(Some(origin), true), false).unwrap(),
                GuardOutcome::ProceedFastForward
            );
        }
    }

    #[test]
    fn diverged_origin_needs_force() {
        let vcs = history();
        let guard = SyncGuard::new(&vcs);

        let err = guard.check(&remote(Some("side"), true), false).unwrap_err();
        assert!(matches!(err, Error::Divergence { ref head, .. } if head.as_deref() == Some("c2")));

        assert_eq!(
            guard.check(&remote(Some("side"), true), true).unwrap(),
            GuardOutcome::ProceedForced
        );
    }

    #[test]
    fn unknown_origin_is_not_divergence() {
        let vcs = history();
        let guard = SyncGuard::new(&vcs);

        let err = guard.check(&remote(Some("elsewhere"), true), false).unwrap_err();
        assert!(matches!(err, Error::HistoryUnknown { .. }));
        let err = guard.check(&remote(Some("elsewhere"), true), true).unwrap_err();
        assert!(matches!(err, Error::HistoryUnknown { .. }));

        let divergence = Error::Divergence {
            remote: "primary".into(),
            origin_commit: "side".into(),
            head: Some("c2".into()),
        };
        let unknown = Error::HistoryUnknown {
            remote: "primary".into(),
            origin_commit: "elsewhere".into(),
        };
        assert!(divergence.to_string().contains("--force"));
        assert!(unknown.to_string().contains("fetch"));
    }

    #[test]
    fn missing_origin_is_unverifiable() {
        let vcs = history();
        let guard = SyncGuard::new(&vcs);

        let err = guard.check(&remote(None, true), false).unwrap_err();
        assert!(matches!(err, Error::UnverifiableRemote { .. }));
        assert_eq!(
            guard.check(&remote(None, true), true).unwrap(),
            GuardOutcome::ProceedForced
        );
    }
}
