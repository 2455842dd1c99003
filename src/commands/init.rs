use std::io::{self, Write};
use std::path::Path;

use crate::config::{Config, DEFAULT_CROSS_ISSUE_PATH, DEFAULT_ISSUES_DIR, DEFAULT_JIRA_URL};
use crate::error::{Result, SurvivalError};

fn prompt(question: &str) -> Result<String> {
    print!("{question}");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

fn quoted(value: &str) -> String {
    toml::Value::String(value.to_string()).to_string()
}

/// Config file contents for the given answers; empty answers keep the default.
fn render(jira_url: &str, issues_dir: &str, cross_issue_path: &str) -> String {
    let mut content = String::new();
    for (key, value) in [
        ("jira_url", jira_url),
        ("issues_dir", issues_dir),
        ("cross_issue_path", cross_issue_path),
    ] {
        if !value.is_empty() {
            content.push_str(&format!("{key} = {}\n", quoted(value)));
        }
    }
    content
}

fn write_config(config_path: &Path, content: &str) -> Result<()> {
    let write_error = |e| SurvivalError::ConfigWrite {
        path: config_path.to_path_buf(),
        source: e,
    };

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent).map_err(write_error)?;
    }
    std::fs::write(config_path, content).map_err(write_error)
}

pub fn run() -> Result<()> {
    let config_path = Config::config_path()?;

    if config_path.exists() {
        let answer = prompt(&format!(
            "Config file already exists at {}. Overwrite? [y/N] ",
            config_path.display()
        ))?;
        if !answer.eq_ignore_ascii_case("y") {
            println!("Aborted.");
            return Ok(());
        }
    }

    println!("Jira Survival Configuration");
    println!("===========================\n");

    let jira_url = prompt(&format!("Jira base URL [{DEFAULT_JIRA_URL}]: "))?;
    let issues_dir = prompt(&format!("Issues directory [{DEFAULT_ISSUES_DIR}]: "))?;
    let cross_issue_path = prompt(&format!(
        "Cross-issue timelines file [{DEFAULT_CROSS_ISSUE_PATH}]: "
    ))?;

    write_config(
        &config_path,
        &render(&jira_url, &issues_dir, &cross_issue_path),
    )?;

    println!("\nConfig saved to {}", config_path.display());
    println!("You can now use 'jsurv' commands!");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_write_config_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jira-survival").join("config.toml");

        write_config(&path, "jira_url = \"https://jira.example.org\"\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.jira_url.as_deref(), Some("https://jira.example.org"));
    }

    #[test]
    fn test_write_failure_is_reported_as_write() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "").unwrap();

        let err = write_config(&blocker.join("config.toml"), "").unwrap_err();
        assert!(matches!(err, SurvivalError::ConfigWrite { .. }));
        assert!(err.to_string().starts_with("Failed to write config file"));
    }

    #[test]
    fn test_rendered_config_parses_back() {
        let content = render("https://jira.example.org", "", "C:\\data\\timelines.json");
        assert!(!content.contains("issues_dir"));

        let config: Config = toml::from_str(&content).unwrap();
        assert_eq!(config.jira_url.as_deref(), Some("https://jira.example.org"));
        assert_eq!(
            config.cross_issue_path,
            Some(PathBuf::from("C:\\data\\timelines.json"))
        );
    }
}
