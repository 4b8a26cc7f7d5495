/*!
 * Interactive resolution of duplicate groups
 */

pub mod decision;
pub mod engine;
pub mod fs;
pub mod operator;

pub use decision::{Decision, DELETE_ALL_CHOICE, SKIP_CHOICE};
pub use engine::{resolve_manifest, Resolver, Session, SessionReport, StopReason};
pub use fs::{FileOps, LocalFs};
pub use operator::{Operator, TerminalOperator};
