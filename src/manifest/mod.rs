/*!
 * Duplicate manifest handling
 *
 * A manifest lists one file per line, grouped by content hash. This module
 * loads it, parses its records, splits it into duplicate groups and writes
 * the unresolved remainder back.
 */

pub mod loader;
pub mod partition;
pub mod persist;
pub mod record;

pub use loader::{load_manifest, ManifestBuffer, Presence};
pub use partition::{check_manifest, Group, Partitioner};
pub use persist::{persist_tail, PersistOutcome};
pub use record::{parse_line, FileKind, Record, HASH_LEN, MAX_PATH_LEN};
