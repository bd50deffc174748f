//! Customer pipeline stages.
//!
//! Customer rows carry a free-text `status` label ("Meeting Booked - Q3",
//! "called twice, no answer", ...). Column membership on the workflow
//! board is derived from it by classification into an explicit stage
//! enum. Substring matching is one concrete classifier implementation
//! behind the `StageClassifier` trait, so it can be swapped and tested
//! in isolation.

use serde::{Deserialize, Serialize};

use crate::types::{Board, BoardKind, Column};

/// Id of the implicit customer workflow board.
pub const CUSTOMER_BOARD_ID: &str = "customer-workflow";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CustomerStage {
    Leads,
    Called,
    MeetingBooked,
    MeetingAttended,
    Adopting,
    NotAdopting,
}

impl CustomerStage {
    /// All stages in pipeline order. This order defines the fixed column
    /// taxonomy of the customer board.
    pub const ALL: [CustomerStage; 6] = [
        CustomerStage::Leads,
        CustomerStage::Called,
        CustomerStage::MeetingBooked,
        CustomerStage::MeetingAttended,
        CustomerStage::Adopting,
        CustomerStage::NotAdopting,
    ];

    pub fn column_id(&self) -> &'static str {
        match self {
            CustomerStage::Leads => "column-1",
            CustomerStage::Called => "column-2",
            CustomerStage::MeetingBooked => "column-3",
            CustomerStage::MeetingAttended => "column-4",
            CustomerStage::Adopting => "column-5",
            CustomerStage::NotAdopting => "column-6",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            CustomerStage::Leads => "Leads",
            CustomerStage::Called => "Called",
            CustomerStage::MeetingBooked => "Meeting Booked",
            CustomerStage::MeetingAttended => "Meeting Attended",
            CustomerStage::Adopting => "Adopting",
            CustomerStage::NotAdopting => "Not Adopting",
        }
    }
}

/// Maps a free-text status label to a stage.
pub trait StageClassifier: Send + Sync {
    fn classify(&self, status: &str) -> CustomerStage;
}

/// Case-insensitive substring classifier.
///
/// "not adopting" is tested before "adopting" because the latter is a
/// substring of the former and would shadow it. Unmatched labels fall
/// back to `Leads`.
pub struct KeywordClassifier;

impl StageClassifier for KeywordClassifier {
    fn classify(&self, status: &str) -> CustomerStage {
        let lowered = status.to_lowercase();
        if lowered.contains("meeting booked") {
            CustomerStage::MeetingBooked
        } else if lowered.contains("meeting attended") {
            CustomerStage::MeetingAttended
        } else if lowered.contains("not adopting") {
            CustomerStage::NotAdopting
        } else if lowered.contains("adopting") {
            CustomerStage::Adopting
        } else if lowered.contains("call") {
            CustomerStage::Called
        } else {
            CustomerStage::Leads
        }
    }
}

/// The fixed fallback taxonomy used by the customer workflow view, which
/// has no board record in the store. "Adopting" is the success column.
pub fn customer_board() -> Board {
    let columns = CustomerStage::ALL
        .iter()
        .enumerate()
        .map(|(index, stage)| Column {
            id: stage.column_id().to_string(),
            board_id: CUSTOMER_BOARD_ID.to_string(),
            title: stage.title().to_string(),
            is_success: *stage == CustomerStage::Adopting,
            position: index as u32,
        })
        .collect();

    Board {
        id: CUSTOMER_BOARD_ID.to_string(),
        name: "Customers".to_string(),
        kind: BoardKind::Workflow,
        columns,
        default_column_id: Some(CustomerStage::Leads.column_id().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_keywords() {
        let classifier = KeywordClassifier;
        assert_eq!(classifier.classify("Meeting Booked - Q3"), CustomerStage::MeetingBooked);
        assert_eq!(classifier.classify("meeting attended 2026-08-12"), CustomerStage::MeetingAttended);
        assert_eq!(classifier.classify("Adopting (pilot)"), CustomerStage::Adopting);
        assert_eq!(classifier.classify("NOT ADOPTING - budget"), CustomerStage::NotAdopting);
        assert_eq!(classifier.classify("called, left voicemail"), CustomerStage::Called);
    }

    #[test]
    fn test_unmatched_status_falls_back_to_leads() {
        let classifier = KeywordClassifier;
        assert_eq!(classifier.classify(""), CustomerStage::Leads);
        assert_eq!(classifier.classify("fresh import"), CustomerStage::Leads);
    }

    #[test]
    fn test_meeting_booked_maps_to_column_3() {
        let classifier = KeywordClassifier;
        let stage = classifier.classify("Meeting Booked - Q3");
        assert_eq!(stage.column_id(), "column-3");
    }

    #[test]
    fn test_customer_board_taxonomy() {
        let board = customer_board();
        assert_eq!(board.columns.len(), 6);
        assert_eq!(board.first_column_id(), Some("column-1"));
        assert_eq!(board.success_column_id(), Some("column-5"));
        for (index, col) in board.columns.iter().enumerate() {
            assert_eq!(col.position, index as u32);
        }
    }
}
