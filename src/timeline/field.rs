use tracing::warn;

use super::state::{IssueState, UNASSIGNED};
use crate::types::{parse_id, ChangeItem};

/// Issue attributes reconstructed from the changelog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackedField {
    Priority,
    Assignee,
    IsAssigned,
    IssueType,
    Description,
    LinkCount,
    AffectCount,
    FixCount,
}

/// Direction of a change to a list-valued field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CountChange {
    Added,
    Removed,
}

impl TrackedField {
    /// Fields touched by a changelog item with the given Jira field name.
    pub fn for_changelog_field(field: &str) -> &'static [TrackedField] {
        match field {
            "priority" => &[TrackedField::Priority],
            "assignee" => &[TrackedField::Assignee, TrackedField::IsAssigned],
            "issuetype" => &[TrackedField::IssueType],
            "description" => &[TrackedField::Description],
            "Link" => &[TrackedField::LinkCount],
            "Version" => &[TrackedField::AffectCount],
            "Fix Version" => &[TrackedField::FixCount],
            _ => &[],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TrackedField::Priority => "priority",
            TrackedField::Assignee => "assignee",
            TrackedField::IsAssigned => "is_assigned",
            TrackedField::IssueType => "issuetype",
            TrackedField::Description => "description",
            TrackedField::LinkCount => "link_count",
            TrackedField::AffectCount => "affect_count",
            TrackedField::FixCount => "fix_count",
        }
    }

    /// Record on `state` the value this field held before `item` was applied.
    ///
    /// Plain fields overwrite the annotation, so when the changelog is
    /// replayed latest-first the earliest change of the day wins. Count
    /// fields only know the direction of the change and step the annotation
    /// by one relative to the nearest later known count.
    pub fn apply(self, state: &mut IssueState, item: &ChangeItem, issue: &str) {
        let previous = &mut state.previous;
        match self {
            TrackedField::Priority => {
                previous.priority = Some(parse_id(item.from_value()));
            }
            TrackedField::Assignee => {
                previous.assignee = Some(item.from_value().unwrap_or(UNASSIGNED).to_string());
            }
            TrackedField::IsAssigned => {
                previous.is_assigned = Some(item.from_value().is_some());
            }
            TrackedField::IssueType => {
                previous.issue_type = Some(parse_id(item.from_value()));
            }
            TrackedField::Description => {
                previous.description = Some(item.from_string.clone().unwrap_or_default());
            }
            TrackedField::LinkCount => {
                step_count(&mut previous.link_count, state.link_count, item, self, issue);
            }
            TrackedField::AffectCount => {
                step_count(&mut previous.affect_count, state.affect_count, item, self, issue);
            }
            TrackedField::FixCount => {
                step_count(&mut previous.fix_count, state.fix_count, item, self, issue);
            }
        }
    }
}

fn count_change(item: &ChangeItem) -> Option<CountChange> {
    match (item.from_value(), item.to_value()) {
        (Some(_), None) => Some(CountChange::Removed),
        (None, Some(_)) => Some(CountChange::Added),
        _ => None,
    }
}

fn step_count(
    previous: &mut Option<i64>,
    current: i64,
    item: &ChangeItem,
    field: TrackedField,
    issue: &str,
) {
    let Some(change) = count_change(item) else {
        warn!(
            issue,
            field = field.name(),
            from = ?item.from,
            to = ?item.to,
            "ambiguous count change, keeping value"
        );
        return;
    };
    let base = previous.unwrap_or(current);
    *previous = Some(match change {
        // Removed now, so there was one more before.
        CountChange::Removed => base + 1,
        CountChange::Added => base - 1,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(field: &str, from: Option<&str>, to: Option<&str>) -> ChangeItem {
        ChangeItem {
            field: field.to_string(),
            from: from.map(String::from),
            from_string: from.map(|s| format!("{s} text")),
            to: to.map(String::from),
        }
    }

    #[test]
    fn test_changelog_field_dispatch() {
        assert_eq!(
            TrackedField::for_changelog_field("assignee"),
            &[TrackedField::Assignee, TrackedField::IsAssigned]
        );
        assert_eq!(TrackedField::for_changelog_field("Fix Version"), &[TrackedField::FixCount]);
        assert!(TrackedField::for_changelog_field("status").is_empty());
    }

    #[test]
    fn test_priority_records_previous_value() {
        let mut state = IssueState { priority: 3, ..IssueState::default() };
        TrackedField::Priority.apply(&mut state, &item("priority", Some("2"), Some("3")), "X-1");
        assert_eq!(state.previous.priority, Some(2));
        assert_eq!(state.priority, 3);
    }

    #[test]
    fn test_unparseable_priority_is_sentinel() {
        let mut state = IssueState::default();
        TrackedField::Priority.apply(&mut state, &item("priority", None, Some("3")), "X-1");
        assert_eq!(state.previous.priority, Some(-1));
    }

    #[test]
    fn test_assignee_from_nobody() {
        let mut state = IssueState::default();
        let change = item("assignee", None, Some("stack"));
        TrackedField::Assignee.apply(&mut state, &change, "X-1");
        TrackedField::IsAssigned.apply(&mut state, &change, "X-1");
        assert_eq!(state.previous.assignee.as_deref(), Some(UNASSIGNED));
        assert_eq!(state.previous.is_assigned, Some(false));
    }

    #[test]
    fn test_description_previous_text() {
        let mut state = IssueState::default();
        TrackedField::Description.apply(&mut state, &item("description", Some("old"), Some("new")), "X-1");
        assert_eq!(state.previous.description.as_deref(), Some("old text"));
    }

    #[test]
    fn test_counts_step_from_current_then_from_annotation() {
        let mut state = IssueState { link_count: 2, ..IssueState::default() };
        // Link added on this day: one fewer before.
        TrackedField::LinkCount.apply(&mut state, &item("Link", None, Some("X-2")), "X-1");
        assert_eq!(state.previous.link_count, Some(1));
        // A second link added the same day steps from the annotation.
        TrackedField::LinkCount.apply(&mut state, &item("Link", None, Some("X-3")), "X-1");
        assert_eq!(state.previous.link_count, Some(0));
        // A removal goes the other way.
        TrackedField::LinkCount.apply(&mut state, &item("Link", Some("X-4"), None), "X-1");
        assert_eq!(state.previous.link_count, Some(1));
        assert_eq!(state.link_count, 2);
    }

    #[test]
    fn test_ambiguous_count_change_is_ignored() {
        let mut state = IssueState { fix_count: 1, ..IssueState::default() };
        TrackedField::FixCount.apply(&mut state, &item("Fix Version", Some("1"), Some("2")), "X-1");
        assert_eq!(state.previous.fix_count, None);
        TrackedField::FixCount.apply(&mut state, &item("Fix Version", None, None), "X-1");
        assert_eq!(state.previous.fix_count, None);
    }
}
