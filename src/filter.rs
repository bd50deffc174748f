//! Filter criteria → query constraint translation.
//!
//! `translate` is pure: it builds the constraint list incrementally and
//! never touches rows itself. Stores evaluate the constraints against
//! rows with `matches` at fetch time.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::{CardRecord, Priority};

/// Filter options as the UI hands them over. Absent or empty fields
/// impose no constraint; the default value is the identity filter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterCriteria {
    pub tags: Vec<String>,
    pub assigned_to: Vec<String>,
    pub priorities: Vec<Priority>,
    pub due_date_start: Option<NaiveDate>,
    pub due_date_end: Option<NaiveDate>,
}

impl FilterCriteria {
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
            && self.assigned_to.is_empty()
            && self.priorities.is_empty()
            && self.due_date_start.is_none()
            && self.due_date_end.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    /// Card tag set must contain every listed tag ("all of", not "any of").
    HasAllTags(Vec<String>),
    /// At least one of the card's assignees is in the listed set.
    AssignedToAnyOf(Vec<String>),
    /// Card priority is a member of the listed set.
    PriorityIn(Vec<Priority>),
    /// Inclusive lower bound on the due date.
    DueOnOrAfter(NaiveDate),
    /// Inclusive upper bound on the due date.
    DueOnOrBefore(NaiveDate),
}

/// Translate filter criteria into query constraints. Empty criteria
/// yield an empty list, which constrains nothing.
pub fn translate(criteria: &FilterCriteria) -> Vec<Constraint> {
    if criteria.is_empty() {
        return Vec::new();
    }
    let mut constraints = Vec::new();
    if !criteria.tags.is_empty() {
        constraints.push(Constraint::HasAllTags(criteria.tags.clone()));
    }
    if !criteria.assigned_to.is_empty() {
        constraints.push(Constraint::AssignedToAnyOf(criteria.assigned_to.clone()));
    }
    if !criteria.priorities.is_empty() {
        constraints.push(Constraint::PriorityIn(criteria.priorities.clone()));
    }
    if let Some(start) = criteria.due_date_start {
        constraints.push(Constraint::DueOnOrAfter(start));
    }
    if let Some(end) = criteria.due_date_end {
        constraints.push(Constraint::DueOnOrBefore(end));
    }
    constraints
}

/// Evaluate a constraint list against one card row. All constraints must
/// hold (AND semantics).
pub fn matches<C: CardRecord>(constraints: &[Constraint], card: &C) -> bool {
    constraints.iter().all(|constraint| match constraint {
        Constraint::HasAllTags(tags) => tags
            .iter()
            .all(|tag| card.tags().iter().any(|t| t == tag)),
        Constraint::AssignedToAnyOf(ids) => card
            .assignees()
            .iter()
            .any(|assignee| ids.iter().any(|id| id == assignee)),
        Constraint::PriorityIn(set) => card
            .priority()
            .map(|p| set.contains(&p))
            .unwrap_or(false),
        Constraint::DueOnOrAfter(start) => {
            card.due_date().map(|d| d >= *start).unwrap_or(false)
        }
        Constraint::DueOnOrBefore(end) => {
            card.due_date().map(|d| d <= *end).unwrap_or(false)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Task;

    fn task(tags: &[&str], priority: Option<Priority>, due: Option<(i32, u32, u32)>) -> Task {
        Task {
            id: "t1".into(),
            board_id: "b1".into(),
            title: "Task".into(),
            status: String::new(),
            priority,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            assigned_to: vec!["u1".into()],
            due_date: due.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
            notes: vec![],
        }
    }

    #[test]
    fn test_empty_criteria_is_identity() {
        assert!(FilterCriteria::default().is_empty());
        let constraints = translate(&FilterCriteria::default());
        assert!(constraints.is_empty());
        assert!(matches(&constraints, &task(&[], None, None)));

        let non_empty = FilterCriteria {
            priorities: vec![Priority::High],
            ..Default::default()
        };
        assert!(!non_empty.is_empty());
    }

    #[test]
    fn test_criteria_compose_with_and_semantics() {
        let criteria = FilterCriteria {
            tags: vec!["a".into()],
            priorities: vec![Priority::High],
            ..Default::default()
        };
        let constraints = translate(&criteria);
        assert_eq!(constraints.len(), 2);

        assert!(matches(&constraints, &task(&["a", "b"], Some(Priority::High), None)));
        assert!(!matches(&constraints, &task(&["a"], Some(Priority::Low), None)));
        assert!(!matches(&constraints, &task(&["b"], Some(Priority::High), None)));
    }

    #[test]
    fn test_tags_require_all_of() {
        let criteria = FilterCriteria {
            tags: vec!["a".into(), "b".into()],
            ..Default::default()
        };
        let constraints = translate(&criteria);
        assert!(matches(&constraints, &task(&["b", "c", "a"], None, None)));
        assert!(!matches(&constraints, &task(&["a"], None, None)));
    }

    #[test]
    fn test_assignee_membership() {
        let criteria = FilterCriteria {
            assigned_to: vec!["u2".into(), "u1".into()],
            ..Default::default()
        };
        let constraints = translate(&criteria);
        assert!(matches(&constraints, &task(&[], None, None)));

        let criteria = FilterCriteria {
            assigned_to: vec!["u9".into()],
            ..Default::default()
        };
        assert!(!matches(&translate(&criteria), &task(&[], None, None)));
    }

    #[test]
    fn test_due_date_bounds_are_inclusive_and_independent() {
        let start_only = translate(&FilterCriteria {
            due_date_start: NaiveDate::from_ymd_opt(2026, 9, 1),
            ..Default::default()
        });
        assert!(matches(&start_only, &task(&[], None, Some((2026, 9, 1)))));
        assert!(!matches(&start_only, &task(&[], None, Some((2026, 8, 31)))));
        assert!(!matches(&start_only, &task(&[], None, None)));

        let end_only = translate(&FilterCriteria {
            due_date_end: NaiveDate::from_ymd_opt(2026, 9, 30),
            ..Default::default()
        });
        assert!(matches(&end_only, &task(&[], None, Some((2026, 9, 30)))));
        assert!(!matches(&end_only, &task(&[], None, Some((2026, 10, 1)))));
    }
}
