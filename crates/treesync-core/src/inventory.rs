//! Inventory of the local working set
//!
//! Every call re-queries the VCS, so an inventory can be asked again after
//! the working copy changes.

use std::collections::HashMap;

use treesync_fs::NormalizedPath;
use treesync_git::{Entry, Vcs, WorkingPath};

use crate::Result;

pub struct Inventory<'a> {
    vcs: &'a dyn Vcs,
}

impl<'a> Inventory<'a> {
    pub fn new(vcs: &'a dyn Vcs) -> Self {
        Self { vcs }
    }

    /// Tracked-content entries, restricted to `filters` when non-empty.
    pub fn tracked_entries(&self, filters: &[NormalizedPath]) -> Result<Vec<Entry>> {
        let entries = self.vcs.list_tracked_entries(filters)?;
        tracing::debug!(
            entries = entries.len(),
            filters = filters.len(),
            "Listed tracked content"
        );
        Ok(entries)
    }

    /// The full working path listing.
    pub fn all_paths(&self) -> Result<Vec<WorkingPath>> {
        Ok(self.vcs.list_all_paths()?)
    }

    /// Tracked entries keyed by path.
    pub fn tracked_by_path(&self) -> Result<HashMap<NormalizedPath, Entry>> {
        Ok(self
            .tracked_entries(&[])?
            .into_iter()
            .map(|entry| (entry.path.clone(), entry))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use treesync_test_utils::vcs::MemoryVcs;

    #[test]
    fn inventory_reflects_later_changes() {
        let vcs = MemoryVcs::new();
        vcs.add_content("data/x.bin", b"x");
        let inventory = Inventory::new(&vcs);
        assert_eq!(inventory.tracked_entries(&[]).unwrap().len(), 1);

        vcs.add_content("data/y.bin", b"y");
        assert_eq!(inventory.tracked_entries(&[]).unwrap().len(), 2);
    }

    #[test]
    fn tracked_by_path_excludes_plain_files() {
        let vcs = MemoryVcs::new();
        vcs.add_content("data/x.bin", b"x");
        vcs.add_text("README.md", b"# hi");

        let inventory = Inventory::new(&vcs);
        let tracked = inventory.tracked_by_path().unwrap();
        assert_eq!(tracked.len(), 1);
        assert!(tracked.contains_key(&NormalizedPath::new("data/x.bin")));
        assert_eq!(inventory.all_paths().unwrap().len(), 2);
    }
}
