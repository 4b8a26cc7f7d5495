/*!
 * Dupsweep - interactive resolver for duplicate-file manifests
 *
 * Reads a manifest produced by a duplicate finder, where every line names a
 * file together with its content hash, and walks it group by group:
 * - Groups are contiguous runs of equal hashes, presented in manifest order
 * - The operator preserves one member, deletes all, skips, or quits
 * - Removed duplicates can be relinked to the preserved copy
 * - On exit the manifest keeps only the groups that were never resolved
 */

pub mod cli_style;
pub mod config;
pub mod core;
pub mod error;
pub mod logging;
pub mod manifest;
pub mod output;
pub mod resolve;
pub mod stats;

// Re-export commonly used types
pub use config::{MalformedPolicy, OverflowPolicy, ResolveConfig, ResolveMode};
pub use error::{DupError, Result};
pub use manifest::{Group, ManifestBuffer, Partitioner, PersistOutcome, Record};
pub use resolve::{resolve_manifest, Decision, Resolver, SessionReport, StopReason};
pub use stats::SessionStats;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
