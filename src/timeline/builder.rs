use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::field::TrackedField;
use super::state::{IssueState, UNASSIGNED};
use super::IssueTimeline;
use crate::actors::ActorTimelines;
use crate::error::Result;
use crate::types::{parse_date, Issue};

/// How the has-X-change features accumulate over an issue's life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChangeFlagMode {
    /// 0 until the first change, 1 afterwards
    Sticky,
    /// Number of dates with a change so far
    #[default]
    Count,
}

/// Where an issue's death date comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolutionPolicy {
    /// The record's `resolutiondate` field
    #[default]
    Field,
    /// The day after the first `resolution` change in the changelog
    FirstTransition,
}

impl ChangeFlagMode {
    fn bump(self, counter: &mut u32) {
        match self {
            ChangeFlagMode::Sticky => *counter = 1,
            ChangeFlagMode::Count => *counter += 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOptions {
    /// Evaluation date; open issues are censored here.
    pub now: NaiveDate,
    pub change_flags: ChangeFlagMode,
    pub resolution: ResolutionPolicy,
}

impl BuildOptions {
    pub fn new(now: NaiveDate) -> Self {
        Self {
            now,
            change_flags: ChangeFlagMode::default(),
            resolution: ResolutionPolicy::default(),
        }
    }
}

/// Builds [`IssueTimeline`]s, optionally enriched with cross-issue
/// reporter reputation and assignee workload.
#[derive(Debug, Clone, Copy)]
pub struct TimelineBuilder<'a> {
    options: BuildOptions,
    reputations: Option<&'a ActorTimelines<f64>>,
    workloads: Option<&'a ActorTimelines<i64>>,
}

/// Resolution date of `issue` under `policy`, `None` while it is open.
pub fn resolution_date(issue: &Issue, policy: ResolutionPolicy) -> Result<Option<NaiveDate>> {
    let Some(field) = issue.resolved()? else {
        return Ok(None);
    };

    match policy {
        ResolutionPolicy::Field => Ok(Some(field)),
        ResolutionPolicy::FirstTransition => {
            let mut first: Option<NaiveDate> = None;
            for history in &issue.changelog.histories {
                if history.items.iter().any(|item| item.field == "resolution") {
                    let date = parse_date(&issue.key, &history.created)?;
                    first = Some(first.map_or(date, |f| f.min(date)));
                }
            }
            match first {
                Some(date) => Ok(Some(date.succ_opt().unwrap_or(date))),
                None => {
                    debug!(issue = %issue.key, "no resolution change in changelog, using field");
                    Ok(Some(field))
                }
            }
        }
    }
}

impl<'a> TimelineBuilder<'a> {
    pub fn new(options: BuildOptions) -> Self {
        Self {
            options,
            reputations: None,
            workloads: None,
        }
    }

    pub fn with_reputations(mut self, reputations: &'a ActorTimelines<f64>) -> Self {
        self.reputations = Some(reputations);
        self
    }

    pub fn with_workloads(mut self, workloads: &'a ActorTimelines<i64>) -> Self {
        self.workloads = Some(workloads);
        self
    }

    pub fn has_reputations(&self) -> bool {
        self.reputations.is_some()
    }

    pub fn has_workloads(&self) -> bool {
        self.workloads.is_some()
    }

    /// Reconstruct the dated states of `issue`.
    ///
    /// Returns an empty timeline for issues resolved on the day they were
    /// created. Fails only on unparseable dates.
    pub fn build(&self, issue: &Issue) -> Result<IssueTimeline> {
        let key = issue.key.as_str();
        let created = issue.created()?;
        let resolved = resolution_date(issue, self.options.resolution)?;

        match resolved {
            Some(resolved) if resolved == created => {
                info!(issue = key, "creation date equals resolution date, skipping");
                return Ok(IssueTimeline::empty(key));
            }
            Some(resolved) if resolved < created => {
                warn!(issue = key, %created, %resolved, "resolved before created, skipping");
                return Ok(IssueTimeline::empty(key));
            }
            _ => {}
        }

        // Nothing may precede creation.
        let clamp = |date: NaiveDate| date.max(created);

        let mut changes = issue
            .changelog
            .histories
            .iter()
            .map(|history| Ok((clamp(parse_date(key, &history.created)?), history)))
            .collect::<Result<Vec<_>>>()?;
        changes.sort_by_key(|(date, _)| *date);

        let mut comment_dates = issue
            .comments
            .iter()
            .map(|comment| parse_date(key, &comment.created).map(clamp))
            .collect::<Result<Vec<_>>>()?;
        comment_dates.sort_unstable();

        // The observed fields hold on the latest date anything is known about.
        let seed = changes
            .iter()
            .map(|(date, _)| *date)
            .chain(comment_dates.iter().copied())
            .chain(resolved)
            .fold(self.options.now.max(created), NaiveDate::max);

        let mut timeline = IssueTimeline::empty(key);
        timeline.insert(seed, IssueState::observed(issue));

        for (date, history) in changes.iter().rev() {
            for item in &history.items {
                for &field in TrackedField::for_changelog_field(&item.field) {
                    timeline.apply_transition(*date, field, item);
                }
            }
        }

        timeline.state_at(created);
        if let Some(resolved) = resolved {
            timeline.state_at(resolved).is_dead = true;
        }

        for (idx, date) in comment_dates.iter().enumerate() {
            timeline.state_at(*date).comment_count = Some(idx as u32 + 1);
        }

        if let Some(reputations) = self.reputations {
            attach_reputation(issue, &mut timeline, reputations, created);
        }
        if let Some(workloads) = self.workloads {
            attach_workload(&mut timeline, workloads);
        }

        self.level(&mut timeline);
        self.flag_changes(&mut timeline);

        debug!(issue = key, states = timeline.len(), "built timeline");
        Ok(timeline)
    }

    /// Forward-fill comment count, reputation and workload so every state
    /// carries a value. Workload never carries across an assignee change
    /// and is empty while unassigned.
    fn level(&self, timeline: &mut IssueTimeline) {
        let with_reputation = self.reputations.is_some();
        let with_workload = self.workloads.is_some();

        let mut comments = 0;
        let mut reputation = None;
        let mut workload: Option<(String, i64)> = None;

        for state in timeline.states_mut() {
            match state.comment_count {
                Some(count) => comments = count,
                None => state.comment_count = Some(comments),
            }

            if with_reputation {
                match state.reporter_rep {
                    Some(rep) => reputation = Some(rep),
                    None => state.reporter_rep = reputation,
                }
            }

            if with_workload {
                if state.assignee == UNASSIGNED {
                    state.assignee_workload = None;
                    workload = None;
                    continue;
                }
                match state.assignee_workload {
                    Some(value) => workload = Some((state.assignee.clone(), value)),
                    None => {
                        state.assignee_workload = workload
                            .as_ref()
                            .filter(|(assignee, _)| *assignee == state.assignee)
                            .map(|(_, value)| *value);
                    }
                }
            }
        }
    }

    fn flag_changes(&self, timeline: &mut IssueTimeline) {
        let mode = self.options.change_flags;
        let (mut priority, mut desc, mut fix) = (0, 0, 0);

        for state in timeline.states_mut() {
            if state.previous.priority.is_some() {
                mode.bump(&mut priority);
            }
            if state.previous.description.is_some() {
                mode.bump(&mut desc);
            }
            if state.previous.fix_count.is_some() {
                mode.bump(&mut fix);
            }
            state.has_priority_change = priority;
            state.has_desc_change = desc;
            state.has_fix_change = fix;
        }
    }
}

fn attach_reputation(
    issue: &Issue,
    timeline: &mut IssueTimeline,
    reputations: &ActorTimelines<f64>,
    created: NaiveDate,
) {
    let Some(reporter) = issue.reporter() else {
        debug!(issue = %issue.key, "no reporter on record");
        return;
    };
    let Some(actor) = reputations.get(reporter) else {
        debug!(issue = %issue.key, reporter, "no reputation timeline");
        return;
    };
    let Some(last) = timeline.last_date() else {
        return;
    };

    for (date, rep) in actor.steps(created, last.succ_opt().unwrap_or(last)) {
        timeline.state_at(date).reporter_rep = Some(rep);
    }
}

fn attach_workload(timeline: &mut IssueTimeline, workloads: &ActorTimelines<i64>) {
    for segment in timeline.assignee_segments() {
        if segment.assignee == UNASSIGNED {
            continue;
        }
        let Some(actor) = workloads.get(&segment.assignee) else {
            debug!(issue = timeline.key(), assignee = %segment.assignee, "no workload timeline");
            continue;
        };
        for (date, workload) in actor.steps(segment.assigned, segment.unassigned) {
            timeline.state_at(date).assignee_workload = Some(workload);
        }
    }
}
