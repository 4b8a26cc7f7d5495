/*!
 * Error types for dupsweep
 */

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DupError>;

/// Exit code constants for structured process exit
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_PARTIAL: i32 = 1;
pub const EXIT_FATAL: i32 = 2;

#[derive(Debug, Error)]
pub enum DupError {
    /// Manifest path does not exist
    #[error("Manifest not found: {}", .0.display())]
    ManifestNotFound(PathBuf),

    /// Manifest path exists but is not a regular file
    #[error("Not a file: {}", .0.display())]
    NotARegularFile(PathBuf),

    /// Fewer bytes were read than the file reported
    #[error("Short read on {}: expected {expected} bytes, read {actual}", .path.display())]
    ShortRead {
        path: PathBuf,
        expected: u64,
        actual: u64,
    },

    /// I/O error tied to a path
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A manifest line does not follow the record grammar
    #[error("Malformed record at line {line} (byte {offset}): {reason}")]
    MalformedRecord {
        line: usize,
        offset: usize,
        reason: ParseError,
    },

    /// A hash run is longer than the configured group bound
    #[error("Group {hash} at line {line} has {members} members, limit is {limit}")]
    GroupOverflow {
        hash: String,
        line: usize,
        members: usize,
        limit: usize,
    },

    /// Persisted tail was not completely written
    #[error("For file {}: expected to write {expected} bytes but only wrote {actual}", .path.display())]
    ShortWrite {
        path: PathBuf,
        expected: usize,
        actual: usize,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Operator prompt could not be rendered or read
    #[error("Prompt error: {0}")]
    Prompt(String),
}

/// Why a single manifest line failed to parse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("missing path terminator")]
    MissingTerminator,

    #[error("empty path")]
    EmptyPath,

    #[error("path longer than {0} bytes")]
    PathTooLong(usize),

    #[error("hash shorter than 32 characters")]
    TruncatedHash,

    #[error("missing inode field")]
    MissingInode,

    #[error("missing file type")]
    MissingType,

    #[error("unknown file type {:?}", type_char(.0))]
    UnknownType(u8),
}

fn type_char(byte: &u8) -> char {
    char::from(*byte)
}

impl DupError {
    /// Wrap an I/O error with the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        DupError::Io {
            path: path.into(),
            source,
        }
    }

    /// Get the process exit code for this error
    pub fn exit_code(&self) -> i32 {
        if self.is_fatal() {
            EXIT_FATAL
        } else {
            EXIT_PARTIAL
        }
    }

    /// Fatal errors end the process; everything else is reported and the session continues
    pub fn is_fatal(&self) -> bool {
        match self {
            DupError::ManifestNotFound(_)
            | DupError::NotARegularFile(_)
            | DupError::ShortRead { .. }
            | DupError::Config(_) => true,
            // Io reaches the caller from the config file, the manifest load
            // and the final rewrite; member failures are counted, not returned
            DupError::Io { .. } => true,

            DupError::MalformedRecord { .. }
            | DupError::GroupOverflow { .. }
            | DupError::ShortWrite { .. }
            | DupError::Prompt(_) => false,
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> ErrorCategory {
        match self {
            DupError::ManifestNotFound(_)
            | DupError::NotARegularFile(_)
            | DupError::ShortRead { .. }
            | DupError::Io { .. } => ErrorCategory::FatalIo,
            DupError::MalformedRecord { .. } => ErrorCategory::Malformed,
            DupError::GroupOverflow { .. } => ErrorCategory::Overflow,
            DupError::ShortWrite { .. } => ErrorCategory::Persistence,
            DupError::Config(_) => ErrorCategory::Configuration,
            DupError::Prompt(_) => ErrorCategory::Interaction,
        }
    }
}

/// Error category for classification and reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Manifest could not be loaded
    FatalIo,
    /// Manifest line violates the record grammar
    Malformed,
    /// Hash run exceeds the group bound
    Overflow,
    /// Tail rewrite problems
    Persistence,
    /// Invalid configuration or arguments
    Configuration,
    /// Operator I/O
    Interaction,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::FatalIo => write!(f, "fatal-io"),
            ErrorCategory::Malformed => write!(f, "malformed"),
            ErrorCategory::Overflow => write!(f, "overflow"),
            ErrorCategory::Persistence => write!(f, "persistence"),
            ErrorCategory::Configuration => write!(f, "configuration"),
            ErrorCategory::Interaction => write!(f, "interaction"),
        }
    }
}

impl From<toml::de::Error> for DupError {
    fn from(err: toml::de::Error) -> Self {
        DupError::Config(format!("TOML parse error: {}", err))
    }
}
