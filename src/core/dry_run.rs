/*!
 * Dry-run simulation mode
 *
 * Records the removals and links a session would perform without touching
 * the filesystem. Removal of a missing entry is still reported as a failure
 * so the preview matches what a real run would print.
 */

use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::resolve::fs::FileOps;

/// Dry-run operation tracker
#[derive(Debug, Clone, Default)]
pub struct DryRunSimulator {
    operations: Vec<DryRunOperation>,
    removed: HashSet<PathBuf>,
}

/// Types of operations that can be simulated
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DryRunOperation {
    RemoveFile { path: PathBuf },
    HardLink { original: PathBuf, link: PathBuf },
    Sync,
}

impl DryRunSimulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded operations
    pub fn operations(&self) -> &[DryRunOperation] {
        &self.operations
    }

    /// Get summary statistics
    pub fn summary(&self) -> DryRunSummary {
        let mut summary = DryRunSummary::default();
        for op in &self.operations {
            match op {
                DryRunOperation::RemoveFile { .. } => summary.remove_count += 1,
                DryRunOperation::HardLink { .. } => summary.link_count += 1,
                DryRunOperation::Sync => summary.sync_count += 1,
            }
        }
        summary
    }

    fn exists(&self, path: &Path) -> bool {
        !self.removed.contains(path) && std::fs::symlink_metadata(path).is_ok()
    }
}

impl FileOps for DryRunSimulator {
    fn remove(&mut self, path: &Path) -> io::Result<()> {
        if !self.exists(path) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                "No such file or directory",
            ));
        }

        info!(target: "dupsweep::dry_run", "[DRY-RUN] Would remove: {}", path.display());

        self.removed.insert(path.to_path_buf());
        self.operations.push(DryRunOperation::RemoveFile {
            path: path.to_path_buf(),
        });
        Ok(())
    }

    fn hard_link(&mut self, original: &Path, link: &Path) -> io::Result<()> {
        if !self.exists(original) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("preserved path {} is missing", original.display()),
            ));
        }
        if self.exists(link) {
            return Err(io::Error::new(io::ErrorKind::AlreadyExists, "File exists"));
        }

        info!(
            target: "dupsweep::dry_run",
            "[DRY-RUN] Would link: {} -> {}",
            link.display(),
            original.display()
        );

        self.removed.remove(link);
        self.operations.push(DryRunOperation::HardLink {
            original: original.to_path_buf(),
            link: link.to_path_buf(),
        });
        Ok(())
    }

    fn sync(&mut self) {
        debug!(target: "dupsweep::dry_run", "[DRY-RUN] Would sync filesystems");
        self.operations.push(DryRunOperation::Sync);
    }
}

/// Summary statistics for dry-run operations
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DryRunSummary {
    pub remove_count: usize,
    pub link_count: usize,
    pub sync_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_records_without_touching_disk() {
        let dir = tempdir().unwrap();
        let keep = dir.path().join("keep.txt");
        let drop = dir.path().join("drop.txt");
        std::fs::write(&keep, b"x").unwrap();
        std::fs::write(&drop, b"x").unwrap();

        let mut sim = DryRunSimulator::new();
        sim.remove(&drop).unwrap();
        sim.sync();
        sim.hard_link(&keep, &drop).unwrap();

        assert!(drop.exists());
        assert_eq!(
            sim.operations(),
            &[
                DryRunOperation::RemoveFile { path: drop.clone() },
                DryRunOperation::Sync,
                DryRunOperation::HardLink {
                    original: keep.clone(),
                    link: drop.clone()
                },
            ]
        );
        assert_eq!(
            sim.summary(),
            DryRunSummary {
                remove_count: 1,
                link_count: 1,
                sync_count: 1
            }
        );
    }

    #[test]
    fn test_missing_entries_fail_like_real_run() {
        let dir = tempdir().unwrap();
        let ghost = dir.path().join("ghost.txt");
        let present = dir.path().join("present.txt");
        std::fs::write(&present, b"x").unwrap();

        let mut sim = DryRunSimulator::new();
        assert_eq!(
            sim.remove(&ghost).unwrap_err().kind(),
            io::ErrorKind::NotFound
        );

        // Already removed within this simulation
        sim.remove(&present).unwrap();
        assert!(sim.remove(&present).is_err());

        // Link target must exist, link path must not
        assert!(sim.hard_link(&ghost, &present).is_err());
        assert_eq!(sim.summary().remove_count, 1);
    }

    #[test]
    fn test_link_over_existing_entry_fails() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        std::fs::write(&a, b"x").unwrap();
        std::fs::write(&b, b"x").unwrap();

        let mut sim = DryRunSimulator::new();
        assert_eq!(
            sim.hard_link(&a, &b).unwrap_err().kind(),
            io::ErrorKind::AlreadyExists
        );
    }
}
