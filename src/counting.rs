//! Counting-process rows: one interval per pair of adjacent timeline dates.

use std::collections::btree_map;

use chrono::NaiveDate;
use serde::Serialize;

use crate::timeline::{IssueState, IssueTimeline};

/// Covariates of one issue over `[start, end)`, in days since creation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountingProcessRow {
    pub issue_key: String,
    pub start: i64,
    pub end: i64,
    /// Whether the issue died at `end`.
    pub is_dead: bool,
    pub priority: i32,
    pub issue_type: i32,
    pub assignee: String,
    pub is_assigned: bool,
    pub comment_count: u32,
    pub link_count: i64,
    pub affect_count: i64,
    pub fix_count: i64,
    pub has_priority_change: u32,
    pub has_desc_change: u32,
    pub has_fix_change: u32,
    pub reporter_rep: Option<f64>,
    pub assignee_workload: Option<i64>,
}

impl CountingProcessRow {
    fn new(issue_key: &str, start: i64, end: i64, is_dead: bool, state: &IssueState) -> Self {
        Self {
            issue_key: issue_key.to_string(),
            start,
            end,
            is_dead,
            priority: state.priority,
            issue_type: state.issue_type,
            assignee: state.assignee.clone(),
            is_assigned: state.is_assigned,
            comment_count: state.comment_count.unwrap_or_default(),
            link_count: state.link_count,
            affect_count: state.affect_count,
            fix_count: state.fix_count,
            has_priority_change: state.has_priority_change,
            has_desc_change: state.has_desc_change,
            has_fix_change: state.has_fix_change,
            reporter_rep: state.reporter_rep,
            assignee_workload: state.assignee_workload,
        }
    }
}

/// Rows of one timeline. Ends after the first row in which the issue dies.
#[derive(Clone)]
pub struct Rows<'a> {
    key: &'a str,
    creation: NaiveDate,
    current: Option<(&'a NaiveDate, &'a IssueState)>,
    rest: btree_map::Iter<'a, NaiveDate, IssueState>,
    finished: bool,
}

impl<'a> Iterator for Rows<'a> {
    type Item = CountingProcessRow;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let (curr_date, curr) = self.current?;
        let Some((next_date, next)) = self.rest.next() else {
            self.finished = true;
            return None;
        };
        self.current = Some((next_date, next));
        if next.is_dead {
            self.finished = true;
        }

        Some(CountingProcessRow::new(
            self.key,
            (*curr_date - self.creation).num_days(),
            (*next_date - self.creation).num_days(),
            next.is_dead,
            curr,
        ))
    }
}

impl IssueTimeline {
    /// Counting-process rows for this timeline; call again to restart.
    pub fn rows(&self) -> Rows<'_> {
        let mut rest = self.iter();
        let current = rest.next();
        Rows {
            key: self.key(),
            creation: current.map(|(date, _)| *date).unwrap_or_default(),
            current,
            rest,
            finished: false,
        }
    }
}
