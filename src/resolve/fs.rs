//! Filesystem side effects of a resolution, behind a trait so they can be
//! simulated (dry run) or observed (tests).

use std::io;
use std::path::Path;
use tracing::debug;

use crate::core::hardlink;

/// Side effects the resolution engine performs on group members
pub trait FileOps {
    /// Remove one member (the directory entry, never a symlink's target)
    fn remove(&mut self, path: &Path) -> io::Result<()>;

    /// Create `link` as a hard link to `original`
    fn hard_link(&mut self, original: &Path, link: &Path) -> io::Result<()>;

    /// Flush filesystem caches; advisory, never fails
    fn sync(&mut self);
}

impl<F: FileOps + ?Sized> FileOps for &mut F {
    fn remove(&mut self, path: &Path) -> io::Result<()> {
        (**self).remove(path)
    }

    fn hard_link(&mut self, original: &Path, link: &Path) -> io::Result<()> {
        (**self).hard_link(original, link)
    }

    fn sync(&mut self) {
        (**self).sync()
    }
}

/// Direct filesystem access
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFs;

impl FileOps for LocalFs {
    fn remove(&mut self, path: &Path) -> io::Result<()> {
        std::fs::remove_file(path)
    }

    fn hard_link(&mut self, original: &Path, link: &Path) -> io::Result<()> {
        hardlink::relink(original, link)
    }

    #[cfg(target_os = "linux")]
    fn sync(&mut self) {
        debug!("Syncing filesystems");
        rustix::fs::sync();
    }

    #[cfg(not(target_os = "linux"))]
    fn sync(&mut self) {
        debug!("Filesystem sync not available on this platform");
    }
}
