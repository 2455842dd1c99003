use std::fs;
use std::path::Path;

use chrono::{Datelike, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::cli::FetchArgs;
use crate::client::{year_jql, JiraClient};
use crate::config::Config;
use crate::error::Result;
use crate::output::print_item;
use crate::store::{self, BROKEN_COMMENTS_FILE};

#[derive(Serialize, Default, Debug, PartialEq)]
pub struct FetchSummary {
    pub fetched: usize,
    pub existing: usize,
    pub comment_logs: usize,
    pub broken_comments: Vec<String>,
}

pub async fn run(client: &JiraClient, config: &Config, args: FetchArgs) -> Result<()> {
    let out = config.resolve_issues_dir(args.out);
    fs::create_dir_all(&out)?;

    let to_year = args.to_year.unwrap_or_else(|| Utc::now().year());
    let mut summary = FetchSummary::default();

    for year in args.from_year..=to_year {
        info!(project = %args.project, year, "fetching issues");
        fetch_year(client, &out, &args.project, year, &mut summary).await?;
    }

    if !args.no_comments {
        fetch_comments(client, &out, &mut summary).await?;
    }

    print_item(&summary, |s| {
        println!("Fetched {} issues into {}", s.fetched, out.display());
        if s.existing > 0 {
            println!("Skipped {} already present", s.existing);
        }
        if !args.no_comments {
            println!("Added {} comment logs", s.comment_logs);
        }
        if !s.broken_comments.is_empty() {
            println!(
                "Could not fetch comments for {} issues (listed in {})",
                s.broken_comments.len(),
                BROKEN_COMMENTS_FILE
            );
        }
    });

    Ok(())
}

async fn fetch_year(
    client: &JiraClient,
    out: &Path,
    project: &str,
    year: i32,
    summary: &mut FetchSummary,
) -> Result<()> {
    let jql = year_jql(project, year);
    let mut start_at = 0;

    loop {
        let page = client.search(&jql, start_at).await?;
        if page.issues.is_empty() {
            break;
        }
        debug!(year, start_at, count = page.issues.len(), total = page.total, "search page");

        for issue in &page.issues {
            let Some(key) = issue.get("key").and_then(Value::as_str) else {
                warn!(year, "search result without a key, skipping");
                continue;
            };
            let path = store::issue_path(out, key);
            if path.exists() {
                debug!(issue = key, "already stored");
                summary.existing += 1;
                continue;
            }
            store::write_json(&path, issue)?;
            summary.fetched += 1;
        }

        start_at += page.issues.len() as u32;
        if page.total > 0 && start_at >= page.total {
            break;
        }
    }

    Ok(())
}

/// Append each stored issue's comment log. Issues that already have a
/// `comments` key, even an empty one, are left alone, so an interrupted run
/// can be resumed.
async fn fetch_comments(client: &JiraClient, out: &Path, summary: &mut FetchSummary) -> Result<()> {
    for path in store::issue_paths(out)? {
        let mut issue: Value = serde_json::from_str(&fs::read_to_string(&path)?)?;
        if !needs_comments(&issue) {
            continue;
        }
        let Some(key) = path.file_stem().and_then(|s| s.to_str()).map(String::from) else {
            continue;
        };

        match client.comments(&key).await {
            Ok(comments) => {
                if let Value::Object(fields) = &mut issue {
                    fields.insert("comments".to_string(), Value::Array(comments));
                }
                store::write_json(&path, &issue)?;
                summary.comment_logs += 1;
            }
            Err(e) => {
                warn!(issue = %key, error = %e, "could not fetch comments");
                summary.broken_comments.push(key);
            }
        }
    }

    store::write_json(&out.join(BROKEN_COMMENTS_FILE), &summary.broken_comments)?;
    Ok(())
}

fn needs_comments(issue: &Value) -> bool {
    issue.get("comments").is_none()
}
