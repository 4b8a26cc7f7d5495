//! Operator decisions for a duplicate group.

use serde::Serialize;

/// Choice that leaves the group untouched
pub const SKIP_CHOICE: i64 = -1;

/// Choice that removes every member of the group
pub const DELETE_ALL_CHOICE: i64 = -5;

/// What to do with one duplicate group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", content = "index", rename_all = "snake_case")]
pub enum Decision {
    /// Leave every member on disk and move past the group
    Skip,

    /// Remove every member; nothing is preserved or linked
    DeleteAll,

    /// Keep the member at this index and remove the others
    Preserve(usize),

    /// Stop the session and persist the unresolved tail
    Abort,
}

impl Decision {
    /// Map a numeric operator choice onto a decision for a group of `group_len` members.
    ///
    /// Anything that is neither a sentinel nor a valid index aborts.
    pub fn from_choice(choice: i64, group_len: usize) -> Self {
        match choice {
            SKIP_CHOICE => Decision::Skip,
            DELETE_ALL_CHOICE => Decision::DeleteAll,
            n if n >= 0 && (n as u64) < group_len as u64 => Decision::Preserve(n as usize),
            _ => Decision::Abort,
        }
    }

    /// Parse one line of operator input.
    ///
    /// Returns `None` when the input is not an integer, so the caller can ask again.
    pub fn parse(input: &str, group_len: usize) -> Option<Self> {
        input
            .trim()
            .parse::<i64>()
            .ok()
            .map(|choice| Self::from_choice(choice, group_len))
    }

    /// Whether the decision consumes the group and advances the persistence cursor
    pub fn consumes_group(&self) -> bool {
        !matches!(self, Decision::Abort)
    }
}
