use std::fs::{self, File};
use std::io::{self, BufWriter};

use crate::cli::DatasetArgs;
use crate::commands::{build_options, load_cross_issue};
use crate::config::Config;
use crate::dataset::{generate, DatasetOptions};
use crate::error::Result;
use crate::output::print_item;
use crate::store;
use crate::timeline::TimelineBuilder;

pub fn run(config: &Config, args: DatasetArgs) -> Result<()> {
    let issues_dir = config.resolve_issues_dir(args.issues);
    let options = build_options(config, &args.build);
    let cross_issue = load_cross_issue(config, args.cross_issue)?;

    let issues = store::load_issues(&issues_dir)?;

    let mut builder = TimelineBuilder::new(options);
    if let Some(data) = &cross_issue {
        builder = builder
            .with_reputations(&data.reputations)
            .with_workloads(&data.workloads);
    }

    let dataset_options = DatasetOptions {
        drop_malformed: args.drop_malformed,
        impute_workload: args.impute_workload,
    };

    match args.out {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            let file = BufWriter::new(File::create(&path)?);
            let (_, summary) = generate(&issues, &builder, dataset_options, file)?;
            print_item(&summary, |s| {
                println!(
                    "Wrote {} rows for {} issues to {}",
                    s.rows,
                    s.issues - s.skipped - s.dropped,
                    path.display()
                );
                println!(
                    "{} censored, {} without intervals, {} dropped as malformed",
                    s.censored, s.skipped, s.dropped
                );
            });
        }
        // The dataset itself goes to stdout; the summary is only logged.
        None => {
            let stdout = BufWriter::new(io::stdout().lock());
            generate(&issues, &builder, dataset_options, stdout)?;
        }
    }

    Ok(())
}
