/*!
 * Manifest tail persistence
 *
 * After a session only the groups that were never resolved stay in the
 * manifest. The tail is written to a temporary file beside the manifest and
 * renamed over it, so an interrupted rewrite leaves the previous manifest in
 * place. A symlinked manifest is rewritten at its target. When no temporary
 * file can be created next to the target, the file is rewritten in place.
 */

use serde::Serialize;
use std::borrow::Cow;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::{DupError, Result};
use crate::manifest::loader::ManifestBuffer;

/// What happened to the manifest file at the end of a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PersistOutcome {
    /// No group was resolved; the file was not touched
    Untouched,

    /// Dry run; the file was not touched
    DryRun,

    /// The file now holds exactly the unresolved tail
    Rewritten { bytes: usize },

    /// The tail write came up short. A staged rewrite keeps the previous
    /// manifest; an in-place rewrite leaves the partial tail.
    Incomplete { expected: usize, actual: usize },
}

/// Rewrite the manifest so it holds the bytes from `write_from` to the end.
///
/// A `write_from` of zero means nothing was resolved and the file is left as
/// is. Every surviving line is kept verbatim and newline-terminated. The tail
/// is handed to a single `write` call; a short write is reported, not retried.
pub fn persist_tail(manifest: &ManifestBuffer, write_from: usize) -> Result<PersistOutcome> {
    persist_tail_with(manifest, write_from, |out, tail| out.write(tail))
}

/// [`persist_tail`] with the single tail write supplied by the caller
pub(crate) fn persist_tail_with<F>(
    manifest: &ManifestBuffer,
    write_from: usize,
    mut write_tail: F,
) -> Result<PersistOutcome>
where
    F: FnMut(&mut dyn Write, &[u8]) -> io::Result<usize>,
{
    if write_from == 0 {
        debug!("No group resolved, leaving {} untouched", manifest.path().display());
        return Ok(PersistOutcome::Untouched);
    }

    let tail = tail_bytes(manifest.as_bytes(), write_from);
    let target = resolve_target(manifest.path());
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut staged = match NamedTempFile::new_in(dir) {
        Ok(staged) => staged,
        Err(e) => {
            warn!(
                "Cannot stage a rewrite in {} ({}); rewriting {} in place",
                dir.display(),
                e,
                target.display()
            );
            return rewrite_in_place(&target, &*tail, write_tail);
        }
    };

    let written = write_tail(staged.as_file_mut(), &*tail)
        .map_err(|e| DupError::io(staged.path(), e))?;
    if written != tail.len() {
        // Dropping the staged file removes it; the manifest is untouched
        return Ok(short_write(&target, tail.len(), written));
    }

    staged
        .as_file()
        .sync_all()
        .map_err(|e| DupError::io(staged.path(), e))?;

    if let Ok(metadata) = std::fs::metadata(&target) {
        // Keep the manifest's mode rather than the temp file's 0600
        if let Err(e) = staged.as_file().set_permissions(metadata.permissions()) {
            warn!("Cannot copy permissions of {}: {}", target.display(), e);
        }
    }

    staged
        .persist(&target)
        .map_err(|e| DupError::io(&target, e.error))?;

    debug!(
        "Rewrote {} with {} unresolved bytes",
        target.display(),
        tail.len()
    );

    Ok(PersistOutcome::Rewritten { bytes: tail.len() })
}

/// Path the rewrite lands on: the symlink target when the manifest is a link
fn resolve_target(path: &Path) -> PathBuf {
    match std::fs::canonicalize(path) {
        Ok(target) => {
            if target != path {
                debug!("Manifest {} resolves to {}", path.display(), target.display());
            }
            target
        }
        Err(_) => path.to_path_buf(),
    }
}

/// Truncate `target` and write the tail into it directly
fn rewrite_in_place<F>(target: &Path, tail: &[u8], mut write_tail: F) -> Result<PersistOutcome>
where
    F: FnMut(&mut dyn Write, &[u8]) -> io::Result<usize>,
{
    let mut file = OpenOptions::new()
        .write(true)
        .truncate(true)
        .open(target)
        .map_err(|e| DupError::io(target, e))?;

    let written = write_tail(&mut file, tail).map_err(|e| DupError::io(target, e))?;
    if written != tail.len() {
        return Ok(short_write(target, tail.len(), written));
    }
    file.sync_all().map_err(|e| DupError::io(target, e))?;

    debug!(
        "Rewrote {} in place with {} unresolved bytes",
        target.display(),
        tail.len()
    );
    Ok(PersistOutcome::Rewritten { bytes: tail.len() })
}

fn short_write(target: &Path, expected: usize, actual: usize) -> PersistOutcome {
    let err = DupError::ShortWrite {
        path: target.to_path_buf(),
        expected,
        actual,
    };
    warn!(category = %err.category(), "{}", err);
    PersistOutcome::Incomplete { expected, actual }
}

/// Unresolved remainder of the buffer, newline-terminated
fn tail_bytes(buf: &[u8], write_from: usize) -> Cow<'_, [u8]> {
    let tail = &buf[write_from.min(buf.len())..];
    if tail.is_empty() || tail.ends_with(b"\n") {
        Cow::Borrowed(tail)
    } else {
        let mut owned = tail.to_vec();
        owned.push(b'\n');
        Cow::Owned(owned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::loader::{load_manifest, Presence};
    use tempfile::tempdir;

    fn write_manifest(dir: &Path, contents: &[u8]) -> ManifestBuffer {
        let path = dir.join("dups.txt");
        std::fs::write(&path, contents).unwrap();
        load_manifest(&path, Presence::Required).unwrap().unwrap()
    }

    #[test]
    fn test_nothing_resolved_leaves_file_alone() {
        let dir = tempdir().unwrap();
        let manifest = write_manifest(dir.path(), b"line one\nline two");

        let outcome = persist_tail(&manifest, 0).unwrap();
        assert_eq!(outcome, PersistOutcome::Untouched);
        assert_eq!(
            std::fs::read(manifest.path()).unwrap(),
            b"line one\nline two"
        );
    }

    #[test]
    fn test_tail_written_verbatim() {
        let dir = tempdir().unwrap();
        let manifest = write_manifest(dir.path(), b"first\nsecond  x\n\nthird\n");

        let outcome = persist_tail(&manifest, 6).unwrap();
        assert_eq!(outcome, PersistOutcome::Rewritten { bytes: 17 });
        assert_eq!(
            std::fs::read(manifest.path()).unwrap(),
            b"second  x\n\nthird\n"
        );
    }

    #[test]
    fn test_missing_final_newline_added() {
        let dir = tempdir().unwrap();
        let manifest = write_manifest(dir.path(), b"first\nsecond");

        persist_tail(&manifest, 6).unwrap();
        assert_eq!(std::fs::read(manifest.path()).unwrap(), b"second\n");
    }

    #[test]
    fn test_fully_resolved_manifest_is_emptied() {
        let dir = tempdir().unwrap();
        let manifest = write_manifest(dir.path(), b"only\n");

        let outcome = persist_tail(&manifest, manifest.len()).unwrap();
        assert_eq!(outcome, PersistOutcome::Rewritten { bytes: 0 });
        assert!(std::fs::read(manifest.path()).unwrap().is_empty());
    }

    #[test]
    fn test_no_temp_files_left_behind() {
        let dir = tempdir().unwrap();
        let manifest = write_manifest(dir.path(), b"a\nb\n");

        persist_tail(&manifest, 2).unwrap();
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    /// Accepts only the first half of what it is given
    fn half_write(out: &mut dyn Write, tail: &[u8]) -> io::Result<usize> {
        out.write(&tail[..tail.len() / 2])
    }

    #[test]
    fn test_short_write_keeps_previous_manifest() {
        let dir = tempdir().unwrap();
        let manifest = write_manifest(dir.path(), b"first\nsecond\nthird\n");

        let outcome = persist_tail_with(&manifest, 6, half_write).unwrap();
        assert_eq!(
            outcome,
            PersistOutcome::Incomplete {
                expected: 13,
                actual: 6
            }
        );
        assert_eq!(
            std::fs::read(manifest.path()).unwrap(),
            b"first\nsecond\nthird\n"
        );
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_rewrite_in_place() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dups.txt");
        std::fs::write(&path, b"first\nsecond\n").unwrap();

        let outcome = rewrite_in_place(&path, b"second\n", |out, tail| out.write(tail)).unwrap();
        assert_eq!(outcome, PersistOutcome::Rewritten { bytes: 7 });
        assert_eq!(std::fs::read(&path).unwrap(), b"second\n");
    }

    #[test]
    fn test_rewrite_in_place_short_write() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dups.txt");
        std::fs::write(&path, b"first\nsecond\n").unwrap();

        let outcome = rewrite_in_place(&path, b"second\n", half_write).unwrap();
        assert_eq!(
            outcome,
            PersistOutcome::Incomplete {
                expected: 7,
                actual: 3
            }
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_manifest_rewritten_at_target() {
        let dir = tempdir().unwrap();
        let real = dir.path().join("real.txt");
        let link = dir.path().join("dups.txt");
        std::fs::write(&real, b"first\nsecond\n").unwrap();
        std::os::unix::fs::symlink(&real, &link).unwrap();

        let manifest = load_manifest(&link, Presence::Required).unwrap().unwrap();
        persist_tail(&manifest, 6).unwrap();

        assert!(std::fs::symlink_metadata(&link)
            .unwrap()
            .file_type()
            .is_symlink());
        assert_eq!(std::fs::read(&real).unwrap(), b"second\n");
    }

    #[test]
    fn test_tail_bytes_clamps_cursor() {
        assert!(tail_bytes(b"abc\n", 99).is_empty());
        assert_eq!(&*tail_bytes(b"abc", 1), b"bc\n");
    }
}
