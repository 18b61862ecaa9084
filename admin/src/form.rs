//! Pieces shared by every editing session.

use serde::{Deserialize, Serialize};
use shopfront_core::persistence::RecordId;

/// Outcome of the last successful save of a draft
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedRecord {
    /// Id the record was stored under
    pub record_id: RecordId,
    /// Draft revision that was saved
    pub revision: u64,
}

/// Returns true if a draft at `revision` has edits the last save did not include
#[must_use]
pub const fn has_unsaved_edits(revision: u64, saved: Option<&SavedRecord>) -> bool {
    match saved {
        Some(saved) => revision > saved.revision,
        None => revision > 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dirty_tracking() {
        assert!(!has_unsaved_edits(0, None));
        assert!(has_unsaved_edits(1, None));

        let saved = SavedRecord {
            record_id: RecordId::new(1),
            revision: 4,
        };
        assert!(!has_unsaved_edits(4, Some(&saved)));
        assert!(has_unsaved_edits(5, Some(&saved)));
    }
}
