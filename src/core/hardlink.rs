/*!
 * Hardlink creation and identity checks for relink mode.
 *
 * In relink mode every removed duplicate is re-created as a hard link to the
 * preserved member, so the same content stays reachable under each original
 * path while occupying disk space once.
 */

use std::io;
use std::path::Path;

/// Platform-independent inode identity key.
/// On Unix: (dev, ino).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InodeKey {
    pub device: u64,
    pub inode: u64,
}

impl InodeKey {
    /// Identity of the entry at `path`, without following a final symlink
    #[cfg(unix)]
    pub fn of(path: &Path) -> io::Result<Self> {
        use std::os::unix::fs::MetadataExt;

        let metadata = std::fs::symlink_metadata(path)?;
        Ok(Self {
            device: metadata.dev(),
            inode: metadata.ino(),
        })
    }
}

/// Create `link_path` as a hard link to `original_path`.
///
/// The preserved member must exist. Unlike a copy-side hardlink, an entry
/// already sitting at `link_path` is not replaced: it means the earlier
/// removal failed and the operator has already been told.
pub fn relink(original_path: &Path, link_path: &Path) -> io::Result<()> {
    if std::fs::symlink_metadata(original_path).is_err() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("preserved path {} is missing", original_path.display()),
        ));
    }

    std::fs::hard_link(original_path, link_path)
}

/// Whether two paths name the same inode
#[cfg(unix)]
pub fn is_same_file(a: &Path, b: &Path) -> io::Result<bool> {
    Ok(InodeKey::of(a)? == InodeKey::of(b)?)
}
