use serde::Serialize;

use crate::types::Issue;

/// Assignee value used while nobody owns the issue.
pub const UNASSIGNED: &str = "unassigned";

/// Snapshot of an issue's tracked attributes on one calendar date.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct IssueState {
    pub is_dead: bool,
    pub priority: i32,
    pub issue_type: i32,
    pub assignee: String,
    pub is_assigned: bool,
    pub description: String,
    pub link_count: i64,
    pub affect_count: i64,
    pub fix_count: i64,
    /// Values held strictly before a change recorded on this date.
    pub previous: Previous,
    pub comment_count: Option<u32>,
    pub reporter_rep: Option<f64>,
    pub assignee_workload: Option<i64>,
    pub has_priority_change: u32,
    pub has_desc_change: u32,
    pub has_fix_change: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Previous {
    pub priority: Option<i32>,
    pub assignee: Option<String>,
    pub is_assigned: Option<bool>,
    pub issue_type: Option<i32>,
    pub description: Option<String>,
    pub link_count: Option<i64>,
    pub affect_count: Option<i64>,
    pub fix_count: Option<i64>,
}

impl IssueState {
    /// State built from the record's current fields.
    pub fn observed(issue: &Issue) -> Self {
        let assignee = issue.assignee();
        Self {
            priority: issue.priority(),
            issue_type: issue.issue_type(),
            assignee: assignee.unwrap_or(UNASSIGNED).to_string(),
            is_assigned: assignee.is_some(),
            description: issue.description().to_string(),
            link_count: issue.link_count(),
            affect_count: issue.affect_count(),
            fix_count: issue.fix_count(),
            ..Self::default()
        }
    }

    /// State that held on the days before this one: every annotated field
    /// takes its previous value, everything else carries over. Derived
    /// features are left empty for the leveling pass.
    pub fn carried_back(&self) -> Self {
        let p = &self.previous;
        Self {
            is_dead: false,
            priority: p.priority.unwrap_or(self.priority),
            issue_type: p.issue_type.unwrap_or(self.issue_type),
            assignee: p.assignee.clone().unwrap_or_else(|| self.assignee.clone()),
            is_assigned: p.is_assigned.unwrap_or(self.is_assigned),
            description: p
                .description
                .clone()
                .unwrap_or_else(|| self.description.clone()),
            link_count: p.link_count.unwrap_or(self.link_count),
            affect_count: p.affect_count.unwrap_or(self.affect_count),
            fix_count: p.fix_count.unwrap_or(self.fix_count),
            ..Self::default()
        }
    }

    /// State that holds on the days after this one when nothing changes:
    /// the current values carry over, annotations and derived features
    /// are left empty.
    pub fn carried_forward(&self) -> Self {
        Self {
            priority: self.priority,
            issue_type: self.issue_type,
            assignee: self.assignee.clone(),
            is_assigned: self.is_assigned,
            description: self.description.clone(),
            link_count: self.link_count,
            affect_count: self.affect_count,
            fix_count: self.fix_count,
            ..Self::default()
        }
    }
}
