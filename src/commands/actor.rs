use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use crate::actors::ActorTimeline;
use crate::cli::ActorArgs;
use crate::config::Config;
use crate::error::{Result, SurvivalError};
use crate::output::print_item;
use crate::store;

#[derive(Serialize)]
struct ActorView<'a> {
    name: &'a str,
    reputation: Option<&'a ActorTimeline<f64>>,
    workload: Option<&'a ActorTimeline<i64>>,
}

#[derive(Tabled)]
struct ReputationRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Reputation")]
    value: String,
    #[tabled(rename = "Opened")]
    opened: u32,
    #[tabled(rename = "Closed")]
    closed: u32,
}

#[derive(Tabled)]
struct WorkloadRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Workload")]
    value: i64,
    #[tabled(rename = "Assigned")]
    assigned: u32,
    #[tabled(rename = "Unassigned")]
    unassigned: u32,
}

pub fn run(config: &Config, args: ActorArgs) -> Result<()> {
    let path = config.resolve_cross_issue_path(args.cross_issue);
    let data = store::load_cross_issue(&path)?;

    let view = ActorView {
        name: &args.name,
        reputation: data.reputations.get(&args.name),
        workload: data.workloads.get(&args.name),
    };
    if view.reputation.is_none() && view.workload.is_none() {
        return Err(SurvivalError::ActorNotFound(args.name));
    }

    print_item(&view, |v| {
        if let Some(timeline) = v.reputation {
            let rows: Vec<ReputationRow> = timeline
                .iter()
                .map(|(date, step)| ReputationRow {
                    date: date.to_string(),
                    value: format!("{:.3}", step.value),
                    opened: step.started,
                    closed: step.finished,
                })
                .collect();
            println!("Reputation of {} as reporter:", v.name);
            println!("{}", Table::new(rows).with(Style::rounded()));
        }
        if let Some(timeline) = v.workload {
            let rows: Vec<WorkloadRow> = timeline
                .iter()
                .map(|(date, step)| WorkloadRow {
                    date: date.to_string(),
                    value: step.value,
                    assigned: step.started,
                    unassigned: step.finished,
                })
                .collect();
            println!("Workload of {} as assignee:", v.name);
            println!("{}", Table::new(rows).with(Style::rounded()));
        }
    });

    Ok(())
}
