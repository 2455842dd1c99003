use chrono::NaiveDate;
use serde::Serialize;
use tabled::Tabled;

use crate::cli::TimelineArgs;
use crate::commands::{build_options, load_cross_issue};
use crate::config::Config;
use crate::counting::CountingProcessRow;
use crate::error::Result;
use crate::output::{
    event_colored, format_offset, format_optional, format_reputation, print_message, print_table,
    truncate,
};
use crate::store;
use crate::timeline::{IssueState, TimelineBuilder};
use crate::types::priority_colored;

#[derive(Tabled)]
struct IntervalRow {
    #[tabled(rename = "From")]
    from: String,
    #[tabled(rename = "To")]
    to: String,
    #[tabled(rename = "Days")]
    days: String,
    #[tabled(rename = "Priority")]
    priority: String,
    #[tabled(rename = "Type")]
    issue_type: i32,
    #[tabled(rename = "Assignee")]
    assignee: String,
    #[tabled(rename = "Comments")]
    comments: u32,
    #[tabled(rename = "Links")]
    links: i64,
    #[tabled(rename = "Affects")]
    affects: i64,
    #[tabled(rename = "Fixes")]
    fixes: i64,
    #[tabled(rename = "Changes P/D/F")]
    changes: String,
    #[tabled(rename = "Rep")]
    reputation: String,
    #[tabled(rename = "Load")]
    workload: String,
    #[tabled(rename = "End")]
    event: String,
}

#[derive(Serialize)]
struct DatedState<'a> {
    date: NaiveDate,
    #[serde(flatten)]
    state: &'a IssueState,
}

#[derive(Tabled)]
struct StateRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Priority")]
    priority: String,
    #[tabled(rename = "Type")]
    issue_type: i32,
    #[tabled(rename = "Assignee")]
    assignee: String,
    #[tabled(rename = "Comments")]
    comments: String,
    #[tabled(rename = "Links")]
    links: i64,
    #[tabled(rename = "Affects")]
    affects: i64,
    #[tabled(rename = "Fixes")]
    fixes: i64,
    #[tabled(rename = "Dead")]
    dead: String,
}

pub fn run(config: &Config, args: TimelineArgs) -> Result<()> {
    let options = build_options(config, &args.build);
    let cross_issue = load_cross_issue(config, args.cross_issue)?;
    let issue = store::load_issue(&args.file)?;

    let mut builder = TimelineBuilder::new(options);
    if let Some(data) = &cross_issue {
        builder = builder
            .with_reputations(&data.reputations)
            .with_workloads(&data.workloads);
    }
    let timeline = builder.build(&issue)?;

    let Some(created) = timeline.first_date() else {
        print_message(&format!(
            "{} has no intervals: resolved on or before its creation day",
            issue.key
        ));
        return Ok(());
    };

    if args.states {
        let states: Vec<DatedState> = timeline
            .iter()
            .map(|(date, state)| DatedState { date: *date, state })
            .collect();
        print_table(&states, |s| StateRow {
            date: s.date.to_string(),
            priority: priority_colored(s.state.priority),
            issue_type: s.state.issue_type,
            assignee: truncate(&s.state.assignee, 20),
            comments: format_optional(s.state.comment_count),
            links: s.state.link_count,
            affects: s.state.affect_count,
            fixes: s.state.fix_count,
            dead: if s.state.is_dead { "yes".to_string() } else { String::new() },
        });
        return Ok(());
    }

    let rows: Vec<CountingProcessRow> = timeline.rows().collect();
    print_table(&rows, |row| IntervalRow {
        from: format_offset(created, row.start),
        to: format_offset(created, row.end),
        days: format!("{}-{}", row.start, row.end),
        priority: priority_colored(row.priority),
        issue_type: row.issue_type,
        assignee: truncate(&row.assignee, 20),
        comments: row.comment_count,
        links: row.link_count,
        affects: row.affect_count,
        fixes: row.fix_count,
        changes: format!(
            "{}/{}/{}",
            row.has_priority_change, row.has_desc_change, row.has_fix_change
        ),
        reputation: format_reputation(row.reporter_rep),
        workload: format_optional(row.assignee_workload),
        event: event_colored(row.is_dead),
    });

    Ok(())
}
