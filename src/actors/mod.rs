//! Cross-issue covariates: per-actor cumulative timelines from which
//! reporter reputation and assignee workload are read as step functions.

mod aggregate;

use std::collections::BTreeMap;
use std::ops::Bound;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub use aggregate::aggregate;

/// Cumulative counts of one actor as of a date, and the value derived
/// from them. `started` counts issues opened (reporters) or assigned
/// (assignees); `finished` counts issues closed or unassigned.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct ActorStep<T> {
    pub value: T,
    pub started: u32,
    pub finished: u32,
}

/// Dates on which an actor's cumulative counts change.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(transparent)]
pub struct ActorTimeline<T> {
    steps: BTreeMap<NaiveDate, ActorStep<T>>,
}

/// Timelines for every actor of one kind, keyed by identity.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(transparent)]
pub struct ActorTimelines<T> {
    actors: BTreeMap<String, ActorTimeline<T>>,
}

/// The artifact written by `jsurv actors` and read by the dataset build.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct CrossIssueData {
    pub reputations: ActorTimelines<f64>,
    pub workloads: ActorTimelines<i64>,
}

/// Laplace-smoothed share of an actor's issues that got closed.
pub fn reputation(opened: u32, closed: u32) -> f64 {
    f64::from(closed) / (f64::from(opened) + 1.0)
}

/// Issues currently on an assignee's plate. Not clamped: inconsistent
/// data can drive it negative.
pub fn workload(assigned: u32, unassigned: u32) -> i64 {
    i64::from(assigned) - i64::from(unassigned)
}

impl<T: Copy> ActorTimeline<T> {
    /// Accumulate started/finished events. Events on the same date land in
    /// a single step.
    pub fn from_events(
        started: &[NaiveDate],
        finished: &[NaiveDate],
        value: impl Fn(u32, u32) -> T,
    ) -> Self {
        let mut per_day: BTreeMap<NaiveDate, (u32, u32)> = BTreeMap::new();
        for date in started {
            per_day.entry(*date).or_default().0 += 1;
        }
        for date in finished {
            per_day.entry(*date).or_default().1 += 1;
        }

        let (mut total_started, mut total_finished) = (0, 0);
        let steps = per_day
            .into_iter()
            .map(|(date, (s, f))| {
                total_started += s;
                total_finished += f;
                let step = ActorStep {
                    value: value(total_started, total_finished),
                    started: total_started,
                    finished: total_finished,
                };
                (date, step)
            })
            .collect();

        Self { steps }
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, &ActorStep<T>)> {
        self.steps.iter().map(|(date, step)| (*date, step))
    }

    /// Value recorded on the nearest date at or before `date`.
    pub fn value_at(&self, date: NaiveDate) -> Option<T> {
        self.steps
            .range(..=date)
            .next_back()
            .map(|(_, step)| step.value)
    }

    /// Values in effect over `[start, end)`: the one holding on `start`
    /// (reported at `start`), then every later change before `end`.
    pub fn steps(&self, start: NaiveDate, end: NaiveDate) -> Vec<(NaiveDate, T)> {
        if end <= start {
            return Vec::new();
        }
        let first = self.value_at(start).map(|value| (start, value));
        let later = self
            .steps
            .range((Bound::Excluded(start), Bound::Excluded(end)))
            .map(|(date, step)| (*date, step.value));
        first.into_iter().chain(later).collect()
    }
}

impl ActorTimeline<f64> {
    pub fn reputation(opened: &[NaiveDate], closed: &[NaiveDate]) -> Self {
        Self::from_events(opened, closed, reputation)
    }
}

impl ActorTimeline<i64> {
    pub fn workload(assigned: &[NaiveDate], unassigned: &[NaiveDate]) -> Self {
        Self::from_events(assigned, unassigned, workload)
    }
}

impl<T> Default for ActorTimelines<T> {
    fn default() -> Self {
        Self {
            actors: BTreeMap::new(),
        }
    }
}

impl<T> ActorTimelines<T> {
    #[cfg(test)]
    pub fn insert(&mut self, actor: impl Into<String>, timeline: ActorTimeline<T>) {
        self.actors.insert(actor.into(), timeline);
    }

    pub fn get(&self, actor: &str) -> Option<&ActorTimeline<T>> {
        self.actors.get(actor)
    }

    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }
}

impl<T> FromIterator<(String, ActorTimeline<T>)> for ActorTimelines<T> {
    fn from_iter<I: IntoIterator<Item = (String, ActorTimeline<T>)>>(iter: I) -> Self {
        Self {
            actors: iter.into_iter().collect(),
        }
    }
}
