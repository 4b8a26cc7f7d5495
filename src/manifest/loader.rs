/*!
 * Manifest loading
 *
 * The whole manifest is read into one immutable buffer at startup. Records and
 * groups are views into this buffer; nothing is copied out of it until the
 * unresolved tail is written back.
 */

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{DupError, Result};

/// Whether a missing manifest aborts the load or yields "no data"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Required,
    Optional,
}

/// Owned contents of a manifest file, read-only for the session
#[derive(Debug, Clone)]
pub struct ManifestBuffer {
    path: PathBuf,
    data: Vec<u8>,
}

impl ManifestBuffer {
    /// Wrap bytes that did not come from disk
    pub fn from_bytes(path: impl Into<PathBuf>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            data: data.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Read a manifest file into memory.
///
/// Returns `Ok(None)` only for an absent file with [`Presence::Optional`].
/// Anything other than a regular file, and a read that comes up short of the
/// size reported by the filesystem, is an error.
pub fn load_manifest(path: &Path, presence: Presence) -> Result<Option<ManifestBuffer>> {
    let metadata = match std::fs::metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return match presence {
                Presence::Optional => {
                    debug!("Optional manifest {} is absent", path.display());
                    Ok(None)
                }
                Presence::Required => Err(DupError::ManifestNotFound(path.to_path_buf())),
            };
        }
        Err(e) => return Err(DupError::io(path, e)),
    };

    if !metadata.is_file() {
        return Err(DupError::NotARegularFile(path.to_path_buf()));
    }

    let expected = metadata.len();
    let file = File::open(path).map_err(|e| DupError::io(path, e))?;
    let data = read_manifest(file, path, expected)?;

    debug!("Loaded manifest {} ({} bytes)", path.display(), expected);

    Ok(Some(ManifestBuffer {
        path: path.to_path_buf(),
        data,
    }))
}

/// Read exactly `expected` bytes; fewer is a [`DupError::ShortRead`]
fn read_manifest<R: Read>(mut reader: R, path: &Path, expected: u64) -> Result<Vec<u8>> {
    let mut data = Vec::with_capacity(expected as usize);
    reader
        .read_to_end(&mut data)
        .map_err(|e| DupError::io(path, e))?;

    let actual = data.len() as u64;
    if actual < expected {
        return Err(DupError::ShortRead {
            path: path.to_path_buf(),
            expected,
            actual,
        });
    }
    // The file grew after stat; keep only what was reported
    data.truncate(expected as usize);
    Ok(data)
}
