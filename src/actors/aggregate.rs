use std::collections::BTreeMap;

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use super::{ActorTimeline, ActorTimelines, CrossIssueData};
use crate::error::Result;
use crate::timeline::{resolution_date, BuildOptions, ResolutionPolicy, TimelineBuilder, UNASSIGNED};
use crate::types::Issue;

/// Per-actor list of the issues they touched.
pub type Worklogs<E> = BTreeMap<String, Vec<E>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReporterWorklogEntry {
    pub issue_key: String,
    pub created: NaiveDate,
    pub resolved: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssigneeWorklogEntry {
    pub issue_key: String,
    pub assigned: NaiveDate,
    pub unassigned: NaiveDate,
}

/// Group issues by the person who opened them.
pub fn reporter_worklogs(
    issues: &[Issue],
    policy: ResolutionPolicy,
) -> Result<Worklogs<ReporterWorklogEntry>> {
    let mut worklogs: Worklogs<ReporterWorklogEntry> = BTreeMap::new();

    for issue in issues {
        let Some(reporter) = issue.reporter() else {
            warn!(issue = %issue.key, "no reporter, left out of reputations");
            continue;
        };
        let entry = ReporterWorklogEntry {
            issue_key: issue.key.clone(),
            created: issue.created()?,
            resolved: resolution_date(issue, policy)?,
        };
        worklogs.entry(reporter.to_string()).or_default().push(entry);
    }

    Ok(worklogs)
}

/// Walk every issue's own timeline and record who held it when.
pub fn assignee_worklogs(
    issues: &[Issue],
    options: BuildOptions,
) -> Result<Worklogs<AssigneeWorklogEntry>> {
    let builder = TimelineBuilder::new(options);

    let segments = issues
        .par_iter()
        .map(|issue| {
            builder
                .build(issue)
                .map(|timeline| (issue.key.clone(), timeline.assignee_segments()))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut worklogs: Worklogs<AssigneeWorklogEntry> = BTreeMap::new();
    for (issue_key, segments) in segments {
        for segment in segments {
            if segment.assignee == UNASSIGNED {
                continue;
            }
            worklogs
                .entry(segment.assignee)
                .or_default()
                .push(AssigneeWorklogEntry {
                    issue_key: issue_key.clone(),
                    assigned: segment.assigned,
                    unassigned: segment.unassigned,
                });
        }
    }

    Ok(worklogs)
}

pub fn reputation_timelines(worklogs: &Worklogs<ReporterWorklogEntry>) -> ActorTimelines<f64> {
    worklogs
        .par_iter()
        .map(|(reporter, entries)| {
            let opened: Vec<_> = entries.iter().map(|e| e.created).collect();
            let closed: Vec<_> = entries.iter().filter_map(|e| e.resolved).collect();
            (reporter.clone(), ActorTimeline::reputation(&opened, &closed))
        })
        .collect::<Vec<_>>()
        .into_iter()
        .collect()
}

pub fn workload_timelines(worklogs: &Worklogs<AssigneeWorklogEntry>) -> ActorTimelines<i64> {
    worklogs
        .par_iter()
        .map(|(assignee, entries)| {
            let assigned: Vec<_> = entries.iter().map(|e| e.assigned).collect();
            let unassigned: Vec<_> = entries.iter().map(|e| e.unassigned).collect();
            (assignee.clone(), ActorTimeline::workload(&assigned, &unassigned))
        })
        .collect::<Vec<_>>()
        .into_iter()
        .collect()
}

/// Build reporter reputation and assignee workload timelines for a corpus.
pub fn aggregate(issues: &[Issue], options: BuildOptions) -> Result<CrossIssueData> {
    let reporters = reporter_worklogs(issues, options.resolution)?;
    let assignees = assignee_worklogs(issues, options)?;

    let data = CrossIssueData {
        reputations: reputation_timelines(&reporters),
        workloads: workload_timelines(&assignees),
    };

    info!(
        issues = issues.len(),
        reporters = data.reputations.len(),
        assignees = data.workloads.len(),
        "built cross-issue timelines"
    );
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2018, m, day).unwrap()
    }

    fn corpus() -> Vec<Issue> {
        let issues = json!([
            {
                "key": "HBASE-1",
                "fields": {
                    "created": "2018-01-01", "resolutiondate": "2018-01-05",
                    "priority": { "id": "3" }, "issuetype": { "id": "1" },
                    "creator": { "key": "apurtell" }, "assignee": { "key": "stack" }
                },
                "changelog": { "histories": [{
                    "created": "2018-01-02",
                    "items": [{ "field": "assignee", "from": null, "fromString": null, "to": "stack", "toString": "Stack" }]
                }] }
            },
            {
                "key": "HBASE-2",
                "fields": {
                    "created": "2018-01-03",
                    "priority": { "id": "3" }, "issuetype": { "id": "1" },
                    "creator": { "key": "apurtell" }, "assignee": { "key": "stack" }
                }
            },
            {
                "key": "HBASE-3",
                "fields": {
                    "created": "2018-01-03", "resolutiondate": "2018-01-04",
                    "priority": { "id": "3" }, "issuetype": { "id": "1" },
                    "creator": { "key": "larsh" }
                }
            },
            {
                "key": "HBASE-4",
                "fields": { "created": "2018-01-03", "priority": { "id": "3" }, "issuetype": { "id": "1" } }
            }
        ]);
        serde_json::from_value(issues).unwrap()
    }

    fn options() -> BuildOptions {
        BuildOptions::new(d(2, 1))
    }

    #[test]
    fn test_reporter_worklogs_group_by_creator() {
        let worklogs = reporter_worklogs(&corpus(), ResolutionPolicy::Field).unwrap();
        assert_eq!(worklogs.len(), 2);
        assert_eq!(
            worklogs["apurtell"],
            vec![
                ReporterWorklogEntry { issue_key: "HBASE-1".into(), created: d(1, 1), resolved: Some(d(1, 5)) },
                ReporterWorklogEntry { issue_key: "HBASE-2".into(), created: d(1, 3), resolved: None },
            ]
        );
    }

    #[test]
    fn test_assignee_worklogs_follow_issue_timelines() {
        let worklogs = assignee_worklogs(&corpus(), options()).unwrap();
        assert!(!worklogs.contains_key(UNASSIGNED));
        assert_eq!(
            worklogs["stack"],
            vec![
                AssigneeWorklogEntry { issue_key: "HBASE-1".into(), assigned: d(1, 2), unassigned: d(1, 5) },
                AssigneeWorklogEntry { issue_key: "HBASE-2".into(), assigned: d(1, 3), unassigned: d(2, 1) },
            ]
        );
    }

    #[test]
    fn test_aggregate_builds_both_kinds() {
        let data = aggregate(&corpus(), options()).unwrap();

        let apurtell = data.reputations.get("apurtell").unwrap();
        assert_eq!(apurtell.value_at(d(1, 1)), Some(0.0));
        assert_eq!(apurtell.value_at(d(1, 5)), Some(1.0 / 3.0));

        let larsh = data.reputations.get("larsh").unwrap();
        assert_eq!(larsh.value_at(d(1, 4)), Some(0.5));

        let stack = data.workloads.get("stack").unwrap();
        assert_eq!(stack.value_at(d(1, 2)), Some(1));
        assert_eq!(stack.value_at(d(1, 3)), Some(2));
        assert_eq!(stack.value_at(d(1, 5)), Some(1));
        assert_eq!(stack.value_at(d(2, 1)), Some(0));
    }
}
