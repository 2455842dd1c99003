use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::actors::CrossIssueData;
use crate::error::{Result, SurvivalError};
use crate::types::Issue;

/// Name of the list of issues whose comment log could not be fetched.
pub const BROKEN_COMMENTS_FILE: &str = "_broken_comments.json";

/// File an issue is stored under inside an issues directory.
pub fn issue_path(dir: &Path, key: &str) -> PathBuf {
    dir.join(format!("{key}.json"))
}

/// Issue files in `dir`, sorted by name. Files starting with `_` hold
/// bookkeeping, not issues.
pub fn issue_paths(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_issue = path.extension().is_some_and(|ext| ext == "json")
            && path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| !name.starts_with('_'));
        if is_issue && path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

pub fn load_issue(path: &Path) -> Result<Issue> {
    let contents = fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|e| SurvivalError::IssueParse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Every issue in `dir`, in file-name order.
pub fn load_issues(dir: &Path) -> Result<Vec<Issue>> {
    let issues = issue_paths(dir)?
        .iter()
        .map(|path| load_issue(path))
        .collect::<Result<Vec<_>>>()?;
    info!(dir = %dir.display(), count = issues.len(), "loaded issues");
    Ok(issues)
}

/// Write `value` as pretty JSON, creating parent directories.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let contents = serde_json::to_string_pretty(value)?;
    fs::write(path, contents)?;
    debug!(path = %path.display(), "wrote json");
    Ok(())
}

pub fn save_cross_issue(path: &Path, data: &CrossIssueData) -> Result<()> {
    write_json(path, data)
}

pub fn load_cross_issue(path: &Path) -> Result<CrossIssueData> {
    if !path.exists() {
        return Err(SurvivalError::MissingCrossIssueData(path.to_path_buf()));
    }
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}
