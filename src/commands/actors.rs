use std::path::PathBuf;

use serde::Serialize;

use crate::actors::aggregate;
use crate::cli::ActorsArgs;
use crate::commands::build_options;
use crate::config::Config;
use crate::error::Result;
use crate::output::print_item;
use crate::store;

#[derive(Serialize)]
struct ActorsSummary {
    issues: usize,
    reporters: usize,
    assignees: usize,
    path: PathBuf,
}

pub fn run(config: &Config, args: ActorsArgs) -> Result<()> {
    let issues_dir = config.resolve_issues_dir(args.issues);
    let out = config.resolve_cross_issue_path(args.out);
    let options = build_options(config, &args.build);

    let issues = store::load_issues(&issues_dir)?;
    let data = aggregate(&issues, options)?;
    store::save_cross_issue(&out, &data)?;

    let summary = ActorsSummary {
        issues: issues.len(),
        reporters: data.reputations.len(),
        assignees: data.workloads.len(),
        path: out,
    };
    print_item(&summary, |s| {
        println!(
            "Built timelines for {} reporters and {} assignees from {} issues",
            s.reporters, s.assignees, s.issues
        );
        println!("Saved to {}", s.path.display());
    });

    Ok(())
}
