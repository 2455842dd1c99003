//! Per-issue state reconstruction.
//!
//! An [`IssueTimeline`] maps every date on which something about an issue
//! changed to a full [`IssueState`] snapshot. The builder walks the
//! changelog backwards from the issue's present state, so a state that has
//! to be created for a date with no direct observation is inferred from the
//! nearest later date: the value shown there *before* its change is the
//! value that held until then.

mod builder;
mod field;
mod state;

use std::collections::btree_map;
use std::collections::BTreeMap;

use chrono::NaiveDate;

pub use builder::{resolution_date, BuildOptions, ChangeFlagMode, ResolutionPolicy, TimelineBuilder};
pub use state::{IssueState, UNASSIGNED};

use field::TrackedField;

use crate::types::ChangeItem;

/// Ordered dated states of one issue.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IssueTimeline {
    key: String,
    states: BTreeMap<NaiveDate, IssueState>,
}

/// A stretch of an issue's life with a single assignee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssigneeSegment {
    pub assignee: String,
    pub assigned: NaiveDate,
    pub unassigned: NaiveDate,
}

impl IssueTimeline {
    pub fn empty(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            states: BTreeMap::new(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.states.keys().next().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.states.keys().next_back().copied()
    }

    #[cfg(test)]
    pub fn get(&self, date: NaiveDate) -> Option<&IssueState> {
        self.states.get(&date)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, NaiveDate, IssueState> {
        self.states.iter()
    }

    pub(crate) fn insert(&mut self, date: NaiveDate, state: IssueState) {
        self.states.insert(date, state);
    }

    pub(crate) fn states_mut(&mut self) -> btree_map::ValuesMut<'_, NaiveDate, IssueState> {
        self.states.values_mut()
    }

    /// Infer the state on `date` from the nearest later recorded date, or
    /// carry the last one forward when `date` lies past every record.
    fn infer(&self, date: NaiveDate) -> IssueState {
        if let Some((_, later)) = self.states.range(date..).next() {
            return later.carried_back();
        }
        self.states
            .values()
            .next_back()
            .map(IssueState::carried_forward)
            .unwrap_or_default()
    }

    /// The state on `date`, inferring and inserting one if none exists yet.
    pub(crate) fn state_at(&mut self, date: NaiveDate) -> &mut IssueState {
        let inferred = (!self.states.contains_key(&date)).then(|| self.infer(date));
        self.states
            .entry(date)
            .or_insert_with(|| inferred.unwrap_or_default())
    }

    /// Record the value `field` held before `item` happened on `date`.
    pub(crate) fn apply_transition(&mut self, date: NaiveDate, field: TrackedField, item: &ChangeItem) {
        let key = self.key.clone();
        field.apply(self.state_at(date), item, &key);
    }

    /// Split the issue's life into single-assignee stretches, up to and
    /// including the first dead date.
    pub fn assignee_segments(&self) -> Vec<AssigneeSegment> {
        let mut states = self.states.iter();
        let Some((&first, first_state)) = states.next() else {
            return Vec::new();
        };

        let mut segments = Vec::new();
        let mut assigned = first;
        let mut assignee = first_state.assignee.as_str();
        let mut last = first;

        if !first_state.is_dead {
            for (&date, state) in states {
                last = date;
                if state.assignee != assignee {
                    segments.push(AssigneeSegment {
                        assignee: assignee.to_string(),
                        assigned,
                        unassigned: date,
                    });
                    assigned = date;
                    assignee = state.assignee.as_str();
                }
                if state.is_dead {
                    break;
                }
            }
        }

        segments.push(AssigneeSegment {
            assignee: assignee.to_string(),
            assigned,
            unassigned: last,
        });
        segments
    }
}
