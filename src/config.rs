/*!
 * Configuration types for dupsweep
 */

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{DupError, Result};

/// Path terminator written by the companion manifest producer
pub const DEFAULT_PATH_TERMINATOR: &str = "!*END*!";

/// Historical bound on members per duplicate group
pub const DEFAULT_MAX_GROUP_SIZE: usize = 30;

/// Main configuration for a resolution session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveConfig {
    /// Delete losers only, or delete and re-create them as hard links
    #[serde(default)]
    pub mode: ResolveMode,

    /// Sentinel that ends the path field of every manifest line
    #[serde(default = "default_path_terminator")]
    pub path_terminator: String,

    /// Maximum number of members accepted in one group
    #[serde(default = "default_max_group_size")]
    pub max_group_size: usize,

    /// What to do with a hash run longer than `max_group_size`
    #[serde(default)]
    pub on_overflow: OverflowPolicy,

    /// What to do with a line that does not follow the record grammar
    #[serde(default)]
    pub on_malformed: MalformedPolicy,

    /// Flush filesystem caches after a group's removals, before any linking
    #[serde(default = "default_true")]
    pub sync_after_remove: bool,

    /// Report side effects without performing them
    #[serde(default)]
    pub dry_run: bool,

    /// Log level for diagnostic output
    #[serde(default)]
    pub log_level: LogLevel,

    /// Log file path (None = stderr)
    #[serde(default)]
    pub log_file: Option<PathBuf>,

    /// Enable verbose logging (shorthand for log_level = debug)
    #[serde(default)]
    pub verbose: bool,

    /// Print the session summary as a JSON line
    #[serde(default)]
    pub json_output: bool,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            mode: ResolveMode::Delete,
            path_terminator: default_path_terminator(),
            max_group_size: default_max_group_size(),
            on_overflow: OverflowPolicy::Truncate,
            on_malformed: MalformedPolicy::Stop,
            sync_after_remove: true,
            dry_run: false,
            log_level: LogLevel::Warn,
            log_file: None,
            verbose: false,
            json_output: false,
        }
    }
}

/// Resolution mode applied to every non-preserved member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ResolveMode {
    /// Remove the losers
    #[default]
    Delete,

    /// Remove the losers, then hard-link each one to the preserved member
    Link,
}

impl ResolveMode {
    pub fn links(&self) -> bool {
        matches!(self, ResolveMode::Link)
    }
}

/// Handling of a hash run longer than the group bound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OverflowPolicy {
    /// Keep the first `max_group_size` members; the rest are reported and left alone
    #[default]
    Truncate,

    /// Stop the session at the oversized group
    Reject,
}

/// Handling of manifest lines that fail to parse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MalformedPolicy {
    /// Report and stop scanning; the line stays in the persisted tail
    #[default]
    Stop,

    /// Report and step over the line
    Skip,

    /// Check every line up front and refuse the manifest on any failure
    Reject,
}

/// Log level for diagnostic output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Only errors
    Error,

    /// Warnings and errors
    #[default]
    Warn,

    /// Info, warnings, and errors
    Info,

    /// Debug and above
    Debug,

    /// All messages including traces
    Trace,
}

impl LogLevel {
    /// Convert to tracing::Level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

// Default value functions for serde
fn default_true() -> bool {
    true
}

fn default_path_terminator() -> String {
    DEFAULT_PATH_TERMINATOR.to_string()
}

fn default_max_group_size() -> usize {
    DEFAULT_MAX_GROUP_SIZE
}

impl ResolveConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| DupError::io(path, e))?;
        let config: ResolveConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn to_file(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| DupError::Config(format!("TOML serialize error: {}", e)))?;
        std::fs::write(path, contents).map_err(|e| DupError::io(path, e))
    }

    /// Reject values the parser and partitioner cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.path_terminator.is_empty() {
            return Err(DupError::Config("path terminator must not be empty".to_string()));
        }
        if self.path_terminator.contains('\n') {
            return Err(DupError::Config(
                "path terminator must not contain a newline".to_string(),
            ));
        }
        if self.max_group_size < 2 {
            return Err(DupError::Config(format!(
                "max group size must be at least 2, got {}",
                self.max_group_size
            )));
        }
        Ok(())
    }
}
