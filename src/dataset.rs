//! Tab-separated counting-process dataset.

use std::io::Write;

use rayon::prelude::*;
use serde::Serialize;
use tracing::info;

use crate::counting::CountingProcessRow;
use crate::error::Result;
use crate::timeline::TimelineBuilder;
use crate::types::Issue;

pub const BASE_COLUMNS: [&str; 15] = [
    "issuekey",
    "start",
    "end",
    "is_dead",
    "priority",
    "issuetype",
    "assignee",
    "is_assigned",
    "comment_count",
    "link_count",
    "affect_count",
    "fix_count",
    "has_priority_change",
    "has_desc_change",
    "has_fix_change",
];

#[derive(Debug, Clone, Copy, Default)]
pub struct DatasetOptions {
    /// Leave out issues with a malformed priority or issue type.
    pub drop_malformed: bool,
    /// Written in place of a missing assignee workload.
    pub impute_workload: Option<i64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DatasetSummary {
    pub issues: usize,
    pub rows: usize,
    /// Issues that produced no rows.
    pub skipped: usize,
    /// Issues left out because of malformed fields.
    pub dropped: usize,
    /// Issues still open at the end of their last row.
    pub censored: usize,
}

pub struct DatasetWriter<W: Write> {
    out: W,
    reporter_rep: bool,
    assignee_workload: bool,
    impute_workload: Option<i64>,
}

impl<W: Write> DatasetWriter<W> {
    pub fn new(out: W, reporter_rep: bool, assignee_workload: bool) -> Self {
        Self {
            out,
            reporter_rep,
            assignee_workload,
            impute_workload: None,
        }
    }

    pub fn with_imputed_workload(mut self, value: Option<i64>) -> Self {
        self.impute_workload = value;
        self
    }

    pub fn columns(&self) -> Vec<&'static str> {
        let mut columns = BASE_COLUMNS.to_vec();
        if self.reporter_rep {
            columns.push("reporter_rep");
        }
        if self.assignee_workload {
            columns.push("assignee_workload");
        }
        columns
    }

    pub fn write_header(&mut self) -> Result<()> {
        writeln!(self.out, "{}", self.columns().join("\t"))?;
        Ok(())
    }

    pub fn write_row(&mut self, row: &CountingProcessRow) -> Result<()> {
        let mut fields = vec![
            clean(&row.issue_key),
            row.start.to_string(),
            row.end.to_string(),
            flag(row.is_dead),
            row.priority.to_string(),
            row.issue_type.to_string(),
            clean(&row.assignee),
            flag(row.is_assigned),
            row.comment_count.to_string(),
            row.link_count.to_string(),
            row.affect_count.to_string(),
            row.fix_count.to_string(),
            row.has_priority_change.to_string(),
            row.has_desc_change.to_string(),
            row.has_fix_change.to_string(),
        ];
        if self.reporter_rep {
            fields.push(optional(row.reporter_rep));
        }
        if self.assignee_workload {
            fields.push(optional(row.assignee_workload.or(self.impute_workload)));
        }
        writeln!(self.out, "{}", fields.join("\t"))?;
        Ok(())
    }

    pub fn into_inner(mut self) -> Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}

fn flag(value: bool) -> String {
    u8::from(value).to_string()
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn clean(value: &str) -> String {
    value.replace(['\t', '\n', '\r'], " ")
}

/// Build every issue's timeline and write its rows, in corpus order.
pub fn generate<W: Write>(
    issues: &[Issue],
    builder: &TimelineBuilder<'_>,
    options: DatasetOptions,
    out: W,
) -> Result<(W, DatasetSummary)> {
    let per_issue = issues
        .par_iter()
        .map(|issue| {
            builder
                .build(issue)
                .map(|timeline| timeline.rows().collect::<Vec<_>>())
        })
        .collect::<Result<Vec<_>>>()?;

    let mut writer = DatasetWriter::new(out, builder.has_reputations(), builder.has_workloads())
        .with_imputed_workload(options.impute_workload);
    writer.write_header()?;

    let mut summary = DatasetSummary {
        issues: issues.len(),
        ..DatasetSummary::default()
    };

    for rows in per_issue {
        let Some(last) = rows.last() else {
            summary.skipped += 1;
            continue;
        };
        if options.drop_malformed && rows.iter().any(|r| r.priority == -1 || r.issue_type == -1) {
            info!(issue = %last.issue_key, "dropping issue with malformed fields");
            summary.dropped += 1;
            continue;
        }
        if !last.is_dead {
            summary.censored += 1;
        }
        for row in &rows {
            writer.write_row(row)?;
        }
        summary.rows += rows.len();
    }

    let out = writer.into_inner()?;
    info!(
        issues = summary.issues,
        rows = summary.rows,
        skipped = summary.skipped,
        dropped = summary.dropped,
        censored = summary.censored,
        "wrote dataset"
    );
    Ok((out, summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actors::{ActorTimeline, ActorTimelines};
    use crate::timeline::BuildOptions;
    use chrono::NaiveDate;
    use serde_json::json;

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2018, m, day).unwrap()
    }

    fn corpus() -> Vec<Issue> {
        serde_json::from_value(json!([
            {
                "key": "HBASE-1",
                "fields": {
                    "created": "2018-01-01", "resolutiondate": "2018-01-05",
                    "priority": { "id": "3" }, "issuetype": { "id": "1" },
                    "assignee": { "key": "stack" }, "creator": { "key": "apurtell" }
                }
            },
            {
                "key": "HBASE-2",
                "fields": {
                    "created": "2018-01-02", "resolutiondate": "2018-01-02",
                    "priority": { "id": "3" }, "issuetype": { "id": "1" }
                }
            },
            {
                "key": "HBASE-3",
                "fields": { "created": "2018-01-20", "priority": {}, "issuetype": { "id": "1" } }
            }
        ]))
        .unwrap()
    }

    fn render(builder: &TimelineBuilder<'_>, options: DatasetOptions) -> (String, DatasetSummary) {
        let (out, summary) = generate(&corpus(), builder, options, Vec::new()).unwrap();
        (String::from_utf8(out).unwrap(), summary)
    }

    #[test]
    fn test_within_issue_dataset() {
        let builder = TimelineBuilder::new(BuildOptions::new(d(2, 1)));
        let (text, summary) = render(&builder, DatasetOptions::default());

        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], BASE_COLUMNS.join("\t"));
        assert_eq!(lines[1], "HBASE-1\t0\t4\t1\t3\t1\tstack\t1\t0\t0\t0\t0\t0\t0\t0");
        assert_eq!(lines[2], "HBASE-3\t0\t12\t0\t-1\t1\tunassigned\t0\t0\t0\t0\t0\t0\t0\t0");
        assert_eq!(lines.len(), 3);
        assert_eq!(
            summary,
            DatasetSummary { issues: 3, rows: 2, skipped: 1, dropped: 0, censored: 1 }
        );
    }

    #[test]
    fn test_drop_malformed() {
        let builder = TimelineBuilder::new(BuildOptions::new(d(2, 1)));
        let (text, summary) = render(
            &builder,
            DatasetOptions { drop_malformed: true, impute_workload: None },
        );
        assert_eq!(text.lines().count(), 2);
        assert_eq!(summary.dropped, 1);
    }

    #[test]
    fn test_cross_issue_columns_and_imputation() {
        let mut reputations = ActorTimelines::default();
        reputations.insert("apurtell", ActorTimeline::reputation(&[d(1, 1)], &[d(1, 5)]));
        let mut workloads = ActorTimelines::default();
        workloads.insert("stack", ActorTimeline::workload(&[d(1, 1)], &[d(1, 5)]));

        let builder = TimelineBuilder::new(BuildOptions::new(d(2, 1)))
            .with_reputations(&reputations)
            .with_workloads(&workloads);
        let (text, _) = render(
            &builder,
            DatasetOptions { drop_malformed: false, impute_workload: Some(8) },
        );

        let lines: Vec<_> = text.lines().collect();
        assert!(lines[0].ends_with("has_fix_change\treporter_rep\tassignee_workload"));
        assert!(lines[1].ends_with("\t0\t1"), "{}", lines[1]);
        // No reporter on HBASE-3: empty reputation, imputed workload.
        assert!(lines[2].ends_with("\t\t8"), "{}", lines[2]);
    }
}
