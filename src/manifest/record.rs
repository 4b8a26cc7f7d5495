/*!
 * Manifest record grammar
 *
 * One line per file:
 *
 * ```text
 * <path><TERMINATOR>[SP]<hash:32><SP><inode><SP><type>
 * ```
 *
 * The path may contain spaces, so it is delimited by a multi-byte terminator
 * rather than whitespace. Everything after the terminator is positional.
 */

use std::borrow::Cow;
use std::fmt;
use std::path::Path;

use crate::error::ParseError;

/// Width of the content fingerprint field
pub const HASH_LEN: usize = 32;

/// Longest path accepted in a record
pub const MAX_PATH_LEN: usize = 4096;

/// Kind of filesystem entry a record describes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    File,
    Symlink,
}

impl FileKind {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b'f' => Some(FileKind::File),
            b's' => Some(FileKind::Symlink),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            FileKind::File => 'f',
            FileKind::Symlink => 's',
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// A parsed manifest line, borrowing every field from the manifest buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Record<'a> {
    path: &'a [u8],
    hash: &'a [u8],
    inode: &'a [u8],
    kind: FileKind,
}

impl<'a> Record<'a> {
    pub fn path_bytes(&self) -> &'a [u8] {
        self.path
    }

    /// Filesystem path of the record
    pub fn path(&self) -> Cow<'a, Path> {
        bytes_to_path(self.path)
    }

    pub fn hash(&self) -> &'a [u8] {
        self.hash
    }

    /// Hash as text, for display and diagnostics
    pub fn hash_str(&self) -> Cow<'a, str> {
        String::from_utf8_lossy(self.hash)
    }

    /// Inode as written by the producer; display only
    pub fn inode(&self) -> Cow<'a, str> {
        String::from_utf8_lossy(self.inode)
    }

    pub fn kind(&self) -> FileKind {
        self.kind
    }
}

/// Parse one manifest line (without its trailing newline).
///
/// Fields are taken left to right: path up to `terminator`, an optional single
/// space or tab, exactly [`HASH_LEN`] hash bytes, one separator, the inode up
/// to the next space, and one type byte. A trailing `\r` is ignored and bytes
/// after the type are not inspected.
pub fn parse_line<'a>(line: &'a [u8], terminator: &[u8]) -> Result<Record<'a>, ParseError> {
    let line = line.strip_suffix(b"\r").unwrap_or(line);

    let end = find(line, terminator).ok_or(ParseError::MissingTerminator)?;
    let path = &line[..end];
    if path.is_empty() {
        return Err(ParseError::EmptyPath);
    }
    if path.len() > MAX_PATH_LEN {
        return Err(ParseError::PathTooLong(MAX_PATH_LEN));
    }

    let mut rest = &line[end + terminator.len()..];
    if let Some((&first, tail)) = rest.split_first() {
        if (first == b' ' || first == b'\t') && rest.len() > HASH_LEN {
            rest = tail;
        }
    }

    if rest.len() < HASH_LEN {
        return Err(ParseError::TruncatedHash);
    }
    let (hash, rest) = rest.split_at(HASH_LEN);

    // Separator between hash and inode
    let rest = rest.get(1..).ok_or(ParseError::MissingInode)?;
    let inode_end = rest
        .iter()
        .position(|&b| b == b' ')
        .ok_or(ParseError::MissingType)?;
    if inode_end == 0 {
        return Err(ParseError::MissingInode);
    }
    let inode = &rest[..inode_end];

    let type_byte = *rest.get(inode_end + 1).ok_or(ParseError::MissingType)?;
    let kind = FileKind::from_byte(type_byte).ok_or(ParseError::UnknownType(type_byte))?;

    Ok(Record {
        path,
        hash,
        inode,
        kind,
    })
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

#[cfg(unix)]
fn bytes_to_path(bytes: &[u8]) -> Cow<'_, Path> {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    Cow::Borrowed(Path::new(OsStr::from_bytes(bytes)))
}

#[cfg(not(unix))]
fn bytes_to_path(bytes: &[u8]) -> Cow<'_, Path> {
    match String::from_utf8_lossy(bytes) {
        Cow::Borrowed(s) => Cow::Borrowed(Path::new(s)),
        Cow::Owned(s) => Cow::Owned(s.into()),
    }
}
