//! Terminal-column detection and the completion celebration.
//!
//! A celebration is a one-shot visual mark set when a card lands in the
//! terminal column. Marks expire after a fixed short TTL so they never
//! persist across re-renders; expiry is checked at read time, with an
//! explicit cleanup for long-lived trackers.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::types::Board;

const CELEBRATION_TTL: Duration = Duration::from_secs(4);

/// The terminal ("success") column of a board, falling back to the last
/// column when none is flagged.
pub fn terminal_column_id(board: &Board) -> Option<&str> {
    board.success_column_id()
}

/// Is this column the board's terminal column?
pub fn is_terminal(board: &Board, column_id: &str) -> bool {
    terminal_column_id(board) == Some(column_id)
}

struct Mark {
    started_at: Instant,
}

/// Tracks active celebration marks per card id.
pub struct CelebrationTracker {
    marks: HashMap<String, Mark>,
    ttl: Duration,
}

impl CelebrationTracker {
    pub fn new() -> Self {
        Self::with_ttl(CELEBRATION_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            marks: HashMap::new(),
            ttl,
        }
    }

    /// Start (or restart) the celebration for a card.
    pub fn trigger(&mut self, card_id: &str) {
        self.marks.insert(
            card_id.to_string(),
            Mark {
                started_at: Instant::now(),
            },
        );
    }

    /// Whether the card's celebration is still showing. Expired marks
    /// read as inactive immediately; `cleanup_expired` reclaims them.
    pub fn is_active(&self, card_id: &str) -> bool {
        self.marks
            .get(card_id)
            .map(|mark| mark.started_at.elapsed() < self.ttl)
            .unwrap_or(false)
    }

    /// Drop expired marks.
    pub fn cleanup_expired(&mut self) {
        let ttl = self.ttl;
        self.marks.retain(|_, mark| mark.started_at.elapsed() < ttl);
    }
}

impl Default for CelebrationTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BoardKind, Column};

    fn board(success_index: Option<usize>) -> Board {
        let columns = (0..3)
            .map(|index| Column {
                id: format!("col-{index}"),
                board_id: "b1".into(),
                title: format!("Column {index}"),
                is_success: success_index == Some(index),
                position: index as u32,
            })
            .collect();
        Board {
            id: "b1".into(),
            name: "Sprint".into(),
            kind: BoardKind::Task,
            columns,
            default_column_id: None,
        }
    }

    #[test]
    fn test_terminal_is_the_flagged_column() {
        let board = board(Some(1));
        assert!(is_terminal(&board, "col-1"));
        assert!(!is_terminal(&board, "col-2"));
    }

    #[test]
    fn test_terminal_falls_back_to_last_column() {
        let board = board(None);
        assert!(is_terminal(&board, "col-2"));
        assert!(!is_terminal(&board, "col-0"));
    }

    #[test]
    fn test_celebration_is_one_shot_and_expires() {
        let mut tracker = CelebrationTracker::with_ttl(Duration::from_millis(0));
        assert!(!tracker.is_active("c1"));

        tracker.trigger("c1");
        // Zero TTL: expired as soon as it is read.
        assert!(!tracker.is_active("c1"));

        tracker.cleanup_expired();
        assert!(!tracker.is_active("c1"));
    }

    #[test]
    fn test_celebration_active_within_ttl() {
        let mut tracker = CelebrationTracker::with_ttl(Duration::from_secs(60));
        tracker.trigger("c1");
        assert!(tracker.is_active("c1"));
        assert!(!tracker.is_active("c2"));

        tracker.cleanup_expired();
        assert!(tracker.is_active("c1"));
    }
}
