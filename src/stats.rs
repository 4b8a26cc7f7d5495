/*!
 * Session statistics
 */

use serde::Serialize;

/// Counters for one resolution session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    /// Groups presented to the operator
    pub groups_seen: u64,
    /// Groups left untouched on request
    pub groups_skipped: u64,
    /// Groups resolved by keeping one member
    pub groups_preserved: u64,
    /// Groups removed entirely
    pub groups_deleted: u64,
    /// Members removed from disk
    pub files_removed: u64,
    /// Members re-created as hard links
    pub links_created: u64,
    /// Per-member removal or link failures
    pub failures: u64,
    /// Manifest lines rejected by the parser
    pub malformed_lines: u64,
    /// Members dropped from oversized groups and left on disk
    pub truncated_members: u64,
}

impl SessionStats {
    /// Groups whose manifest lines were consumed
    pub fn groups_consumed(&self) -> u64 {
        self.groups_skipped + self.groups_preserved + self.groups_deleted
    }

    pub fn has_failures(&self) -> bool {
        self.failures > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_groups_consumed() {
        let stats = SessionStats {
            groups_seen: 4,
            groups_skipped: 1,
            groups_preserved: 2,
            groups_deleted: 1,
            ..Default::default()
        };
        assert_eq!(stats.groups_consumed(), 4);
        assert!(!stats.has_failures());
    }

    #[test]
    fn test_serializes_all_counters() {
        let json = serde_json::to_value(SessionStats::default()).unwrap();
        assert_eq!(json["files_removed"], 0);
        assert_eq!(json["malformed_lines"], 0);
        assert_eq!(json.as_object().unwrap().len(), 9);
    }
}
