use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::validate::{self, ValidationError};

/// Board flavor: customer workflow boards carry a fixed stage taxonomy,
/// task boards carry user-defined columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoardKind {
    Workflow,
    Task,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    High,
    Medium,
    Low,
}

/// One stage/bucket of a board. `position` is the sole ordering key and
/// must stay contiguous (0..n-1) after every structural change — the
/// editor re-sequences before persisting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    /// Empty for columns created locally and not yet persisted; the
    /// store assigns an id on insert.
    #[serde(default)]
    pub id: String,
    pub board_id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_success: bool,
    pub position: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: String,
    pub name: String,
    pub kind: BoardKind,
    /// Ordered by `position`.
    pub columns: Vec<Column>,
    /// Initial placement for cards created without a status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_column_id: Option<String>,
}

impl Board {
    pub fn column(&self, column_id: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == column_id)
    }

    pub fn first_column_id(&self) -> Option<&str> {
        self.columns.first().map(|c| c.id.as_str())
    }

    /// The terminal ("success") column. Exactly one column should carry
    /// the flag; if none does, the last column by position is the
    /// terminal one.
    pub fn success_column_id(&self) -> Option<&str> {
        self.columns
            .iter()
            .find(|c| c.is_success)
            .or_else(|| self.columns.last())
            .map(|c| c.id.as_str())
    }
}

/// A task card. `status` is a column id (foreign key by value into the
/// owning board's columns, resolved by lookup, never a live reference).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(default)]
    pub id: String,
    pub board_id: String,
    pub title: String,
    #[serde(default)]
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(
        default,
        alias = "assigned_to",
        alias = "assigned",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub assigned_to: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

/// A customer card. `status` is a free-text stage label; the stage
/// classifier derives column membership from it (see `stage`).
///
/// Legacy rows spell some fields differently (`assignedTo`/`assigned`,
/// `nextContactDate`); serde aliases normalize them to one canonical
/// name at the deserialization boundary so nothing downstream branches
/// on spelling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(
        default,
        alias = "assigned_to",
        alias = "assigned",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub assigned_to: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none", alias = "nextContactDate")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

/// Common surface the reconciler and filter predicate need from a card
/// row, independent of kind.
pub trait CardRecord: Clone + Send + Sync + 'static {
    fn id(&self) -> &str;
    fn set_id(&mut self, id: String);
    fn status(&self) -> &str;
    fn set_status(&mut self, status: String);
    /// Board partition key. `None` for kinds that live on one implicit
    /// board (customers).
    fn board_id(&self) -> Option<&str>;
    fn priority(&self) -> Option<Priority>;
    fn tags(&self) -> &[String];
    fn assignees(&self) -> &[String];
    fn due_date(&self) -> Option<NaiveDate>;
    fn notes_mut(&mut self) -> &mut Vec<String>;

    /// Pure pre-mutation validation; errors block the operation before
    /// any local or remote state changes.
    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

impl CardRecord for Task {
    fn id(&self) -> &str {
        &self.id
    }
    fn set_id(&mut self, id: String) {
        self.id = id;
    }
    fn status(&self) -> &str {
        &self.status
    }
    fn set_status(&mut self, status: String) {
        self.status = status;
    }
    fn board_id(&self) -> Option<&str> {
        Some(&self.board_id)
    }
    fn priority(&self) -> Option<Priority> {
        self.priority
    }
    fn tags(&self) -> &[String] {
        &self.tags
    }
    fn assignees(&self) -> &[String] {
        &self.assigned_to
    }
    fn due_date(&self) -> Option<NaiveDate> {
        self.due_date
    }
    fn notes_mut(&mut self) -> &mut Vec<String> {
        &mut self.notes
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::MissingField("title"));
        }
        Ok(())
    }
}

impl CardRecord for Customer {
    fn id(&self) -> &str {
        &self.id
    }
    fn set_id(&mut self, id: String) {
        self.id = id;
    }
    fn status(&self) -> &str {
        &self.status
    }
    fn set_status(&mut self, status: String) {
        self.status = status;
    }
    fn board_id(&self) -> Option<&str> {
        None
    }
    fn priority(&self) -> Option<Priority> {
        self.priority
    }
    fn tags(&self) -> &[String] {
        &self.tags
    }
    fn assignees(&self) -> &[String] {
        &self.assigned_to
    }
    fn due_date(&self) -> Option<NaiveDate> {
        self.due_date
    }
    fn notes_mut(&mut self) -> &mut Vec<String> {
        &mut self.notes
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField("name"));
        }
        if let Some(email) = &self.email {
            validate::check_email(email)?;
        }
        Ok(())
    }
}

/// Summary info for a board in list responses (board picker).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardSummary {
    pub id: String,
    pub name: String,
    pub kind: BoardKind,
    pub columns: Vec<ColumnSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSummary {
    pub id: String,
    pub title: String,
    pub card_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_with(columns: Vec<Column>) -> Board {
        Board {
            id: "b1".into(),
            name: "Sprint".into(),
            kind: BoardKind::Task,
            columns,
            default_column_id: None,
        }
    }

    fn column(id: &str, position: u32, is_success: bool) -> Column {
        Column {
            id: id.into(),
            board_id: "b1".into(),
            title: id.to_uppercase(),
            is_success,
            position,
        }
    }

    #[test]
    fn test_success_column_flagged() {
        let board = board_with(vec![
            column("a", 0, false),
            column("b", 1, true),
            column("c", 2, false),
        ]);
        assert_eq!(board.success_column_id(), Some("b"));
    }

    #[test]
    fn test_success_column_falls_back_to_last() {
        let board = board_with(vec![column("a", 0, false), column("b", 1, false)]);
        assert_eq!(board.success_column_id(), Some("b"));
    }

    #[test]
    fn test_legacy_field_spellings_normalized() {
        let customer: Customer = serde_json::from_str(
            r#"{"id":"5","name":"Acme","status":"Called","assignedTo":["u1"],"nextContactDate":"2026-09-01"}"#,
        )
        .unwrap();
        assert_eq!(customer.assigned_to, vec!["u1".to_string()]);
        assert_eq!(customer.due_date, NaiveDate::from_ymd_opt(2026, 9, 1));
    }

    #[test]
    fn test_task_validation_requires_title() {
        let task = Task {
            id: "t1".into(),
            board_id: "b1".into(),
            title: "  ".into(),
            status: String::new(),
            priority: None,
            tags: vec![],
            assigned_to: vec![],
            due_date: None,
            notes: vec![],
        };
        assert!(task.validate().is_err());
    }
}
