use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use crate::timeline::{ChangeFlagMode, ResolutionPolicy};

#[derive(Parser)]
#[command(name = "jsurv")]
#[command(about = "Survival-analysis datasets from Jira issue histories", version)]
#[command(after_help = "EXAMPLES:
    jsurv fetch --project HBASE --from-year 2015     Download issues and comments
    jsurv actors                                     Build reputation/workload timelines
    jsurv dataset --cross-issue --out hbase.tsv      Write the counting-process dataset
    jsurv timeline issues/HBASE-1234.json            Show one issue's intervals")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Show error causes
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download a project's issues with their changelogs and comments
    #[command(after_help = "EXAMPLES:
    jsurv fetch --project HBASE
    jsurv fetch --project HBASE --from-year 2012 --to-year 2018 --out data/hbase")]
    Fetch(FetchArgs),
    /// Build per-actor reputation and workload timelines
    #[command(after_help = "EXAMPLES:
    jsurv actors
    jsurv actors --issues data/hbase --out data/hbase-actors.json")]
    Actors(ActorsArgs),
    /// Write the counting-process dataset as TSV
    #[command(after_help = "EXAMPLES:
    jsurv dataset --out hbase.tsv
    jsurv dataset --cross-issue --impute-workload 0 --out hbase.tsv
    jsurv dataset --change-flags sticky --resolution first-transition")]
    Dataset(DatasetArgs),
    /// Show the reconstructed intervals of one issue
    #[command(after_help = "EXAMPLES:
    jsurv timeline issues/HBASE-1234.json
    jsurv timeline issues/HBASE-1234.json --cross-issue --json")]
    Timeline(TimelineArgs),
    /// Show one actor's reputation and workload timelines
    #[command(after_help = "EXAMPLES:
    jsurv actor stack
    jsurv actor apurtell --cross-issue data/hbase-actors.json")]
    Actor(ActorArgs),
    /// Generate shell completions
    #[command(after_help = "EXAMPLES:
    jsurv completions bash > ~/.bash_completion.d/jsurv
    jsurv completions zsh > ~/.zfunc/_jsurv
    jsurv completions fish > ~/.config/fish/completions/jsurv.fish")]
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
    /// Initialize configuration file interactively
    #[command(after_help = "EXAMPLES:
    jsurv init")]
    Init,
}

/// Switches shared by every command that builds timelines.
#[derive(Args, Clone, Debug, Default)]
pub struct BuildArgs {
    /// How has-change features accumulate (default: count)
    #[arg(long, value_enum)]
    pub change_flags: Option<ChangeFlagMode>,

    /// Where an issue's resolution date comes from (default: field)
    #[arg(long, value_enum)]
    pub resolution: Option<ResolutionPolicy>,

    /// Evaluation date for open issues, YYYY-MM-DD (default: today, UTC)
    #[arg(long)]
    pub as_of: Option<NaiveDate>,
}

#[derive(Args)]
pub struct FetchArgs {
    /// Jira project key (e.g., HBASE)
    #[arg(long, short)]
    pub project: String,

    /// First creation year to fetch
    #[arg(long, default_value = "2010")]
    pub from_year: i32,

    /// Last creation year to fetch (default: current year)
    #[arg(long)]
    pub to_year: Option<i32>,

    /// Directory to store issue files in (default: config or issues/)
    #[arg(long, short)]
    pub out: Option<PathBuf>,

    /// Skip the per-issue comment pass
    #[arg(long)]
    pub no_comments: bool,
}

#[derive(Args)]
pub struct ActorsArgs {
    /// Directory of issue files (default: config or issues/)
    #[arg(long, short)]
    pub issues: Option<PathBuf>,

    /// Where to write the timelines (default: config or cross_issue_data/timelines.json)
    #[arg(long, short)]
    pub out: Option<PathBuf>,

    #[command(flatten)]
    pub build: BuildArgs,
}

#[derive(Args)]
pub struct DatasetArgs {
    /// Directory of issue files (default: config or issues/)
    #[arg(long, short)]
    pub issues: Option<PathBuf>,

    /// TSV file to write (default: stdout)
    #[arg(long, short)]
    pub out: Option<PathBuf>,

    /// Add reporter_rep and assignee_workload from cross-issue timelines,
    /// optionally at a non-default path
    #[arg(long, num_args = 0..=1, require_equals = true)]
    pub cross_issue: Option<Option<PathBuf>>,

    /// Write this value where an assignee workload is missing
    #[arg(long, allow_negative_numbers = true)]
    pub impute_workload: Option<i64>,

    /// Leave out issues with a malformed priority or issue type
    #[arg(long)]
    pub drop_malformed: bool,

    #[command(flatten)]
    pub build: BuildArgs,
}

#[derive(Args)]
pub struct TimelineArgs {
    /// Issue file to reconstruct
    pub file: PathBuf,

    /// Attach cross-issue covariates, optionally from a non-default path
    #[arg(long, num_args = 0..=1, require_equals = true)]
    pub cross_issue: Option<Option<PathBuf>>,

    /// Print every dated state instead of intervals
    #[arg(long)]
    pub states: bool,

    #[command(flatten)]
    pub build: BuildArgs,
}

#[derive(Args)]
pub struct ActorArgs {
    /// Actor identity (Jira user key or name)
    pub name: String,

    /// Cross-issue timelines file (default: config or cross_issue_data/timelines.json)
    #[arg(long)]
    pub cross_issue: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_dataset_cross_issue_flag_forms() {
        let parse = |args: &[&str]| match Cli::try_parse_from(args).unwrap().command {
            Commands::Dataset(args) => args,
            _ => panic!("expected dataset"),
        };

        assert_eq!(parse(&["jsurv", "dataset"]).cross_issue, None);
        assert_eq!(parse(&["jsurv", "dataset", "--cross-issue"]).cross_issue, Some(None));
        assert_eq!(
            parse(&["jsurv", "dataset", "--cross-issue=a.json"]).cross_issue,
            Some(Some(PathBuf::from("a.json")))
        );

        let args = parse(&[
            "jsurv",
            "dataset",
            "--change-flags",
            "sticky",
            "--resolution",
            "first-transition",
            "--as-of",
            "2018-02-01",
            "--impute-workload",
            "-1",
        ]);
        assert_eq!(args.build.change_flags, Some(ChangeFlagMode::Sticky));
        assert_eq!(args.build.resolution, Some(ResolutionPolicy::FirstTransition));
        assert_eq!(args.build.as_of, NaiveDate::from_ymd_opt(2018, 2, 1));
        assert_eq!(args.impute_workload, Some(-1));
    }

    #[test]
    fn test_bare_cross_issue_keeps_positional_file() {
        let args = match Cli::try_parse_from(["jsurv", "timeline", "--cross-issue", "issues/X.json"])
            .unwrap()
            .command
        {
            Commands::Timeline(args) => args,
            _ => panic!("expected timeline"),
        };

        assert_eq!(args.file, PathBuf::from("issues/X.json"));
        assert_eq!(args.cross_issue, Some(None));
    }
}
