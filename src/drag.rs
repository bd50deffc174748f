//! Drag-and-drop protocol.
//!
//! The transition rule is pure: a gesture either resolves to a single
//! bucket splice plus one status write, or it is ignored outright. Each
//! gesture is one independent optimistic transaction; rapid consecutive
//! drags are never batched.

use serde::{Deserialize, Serialize};

/// Result of one drag gesture as the view reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DragGesture {
    pub card_id: String,
    pub source_column_id: String,
    pub source_index: usize,
    /// `None` when the card was dropped outside any column.
    pub dest_column_id: Option<String>,
    pub dest_index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropDecision {
    /// No state change: dropped outside a column, or source and
    /// destination are identical (avoids a redundant write).
    Ignore,
    Move {
        dest_column_id: String,
        dest_index: usize,
    },
}

pub fn decide(gesture: &DragGesture) -> DropDecision {
    let Some(dest_column_id) = &gesture.dest_column_id else {
        return DropDecision::Ignore;
    };
    if *dest_column_id == gesture.source_column_id && gesture.dest_index == gesture.source_index {
        return DropDecision::Ignore;
    }
    DropDecision::Move {
        dest_column_id: dest_column_id.clone(),
        dest_index: gesture.dest_index,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gesture(dest: Option<&str>, source_index: usize, dest_index: usize) -> DragGesture {
        DragGesture {
            card_id: "c1".into(),
            source_column_id: "col-a".into(),
            source_index,
            dest_column_id: dest.map(|d| d.to_string()),
            dest_index,
        }
    }

    #[test]
    fn test_drop_outside_any_column_is_ignored() {
        assert_eq!(decide(&gesture(None, 0, 3)), DropDecision::Ignore);
    }

    #[test]
    fn test_identical_source_and_destination_is_ignored() {
        assert_eq!(decide(&gesture(Some("col-a"), 2, 2)), DropDecision::Ignore);
    }

    #[test]
    fn test_reorder_within_a_column_moves() {
        assert_eq!(
            decide(&gesture(Some("col-a"), 2, 0)),
            DropDecision::Move {
                dest_column_id: "col-a".into(),
                dest_index: 0
            }
        );
    }

    #[test]
    fn test_cross_column_moves() {
        assert_eq!(
            decide(&gesture(Some("col-b"), 0, 0)),
            DropDecision::Move {
                dest_column_id: "col-b".into(),
                dest_index: 0
            }
        );
    }
}
