pub mod actor;
pub mod actors;
pub mod dataset;
pub mod fetch;
pub mod init;
pub mod timeline;

use std::path::PathBuf;

use chrono::Utc;
use tracing::warn;

use crate::actors::CrossIssueData;
use crate::cli::BuildArgs;
use crate::config::Config;
use crate::error::Result;
use crate::store;
use crate::timeline::BuildOptions;

/// Merge command-line switches over config defaults.
pub fn build_options(config: &Config, args: &BuildArgs) -> BuildOptions {
    let now = args.as_of.unwrap_or_else(|| Utc::now().date_naive());
    BuildOptions {
        change_flags: config.resolve_change_flags(args.change_flags),
        resolution: config.resolve_resolution(args.resolution),
        ..BuildOptions::new(now)
    }
}

/// Load cross-issue timelines when `--cross-issue` was given, with or
/// without an explicit path.
pub fn load_cross_issue(
    config: &Config,
    flag: Option<Option<PathBuf>>,
) -> Result<Option<CrossIssueData>> {
    match flag {
        None => Ok(None),
        Some(explicit) => {
            let path = config.resolve_cross_issue_path(explicit);
            let data = store::load_cross_issue(&path)?;
            if data.reputations.is_empty() && data.workloads.is_empty() {
                warn!(path = %path.display(), "cross-issue data holds no actors");
            }
            Ok(Some(data))
        }
    }
}
