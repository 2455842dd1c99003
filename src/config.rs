use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::Deserialize;

use crate::error::{Result, SurvivalError};
use crate::timeline::{ChangeFlagMode, ResolutionPolicy};

pub const DEFAULT_JIRA_URL: &str = "https://issues.apache.org/jira";
pub const DEFAULT_ISSUES_DIR: &str = "issues";
pub const DEFAULT_CROSS_ISSUE_PATH: &str = "cross_issue_data/timelines.json";

#[derive(Deserialize, Default, Debug, PartialEq)]
pub struct Config {
    pub jira_url: Option<String>,
    pub issues_dir: Option<PathBuf>,
    pub cross_issue_path: Option<PathBuf>,
    pub change_flags: Option<ChangeFlagMode>,
    pub resolution: Option<ResolutionPolicy>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        let contents =
            std::fs::read_to_string(config_path).map_err(|e| SurvivalError::ConfigRead {
                path: config_path.to_path_buf(),
                source: e,
            })?;

        toml::from_str(&contents).map_err(|e| SurvivalError::ConfigParse {
            path: config_path.to_path_buf(),
            source: e,
        })
    }

    pub fn config_path() -> Result<PathBuf> {
        ProjectDirs::from("", "", "jira-survival")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .ok_or(SurvivalError::NoConfigDir)
    }

    /// Get the Jira base URL with env var taking precedence over config file
    pub fn jira_url(&self) -> String {
        if let Ok(url) = std::env::var("JIRA_URL") {
            if !url.trim().is_empty() {
                return url;
            }
        }

        self.jira_url
            .clone()
            .unwrap_or_else(|| DEFAULT_JIRA_URL.to_string())
    }

    /// Get issues directory, preferring explicit argument over config
    pub fn resolve_issues_dir(&self, explicit: Option<PathBuf>) -> PathBuf {
        explicit
            .or_else(|| self.issues_dir.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ISSUES_DIR))
    }

    pub fn resolve_cross_issue_path(&self, explicit: Option<PathBuf>) -> PathBuf {
        explicit
            .or_else(|| self.cross_issue_path.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CROSS_ISSUE_PATH))
    }

    pub fn resolve_change_flags(&self, explicit: Option<ChangeFlagMode>) -> ChangeFlagMode {
        explicit.or(self.change_flags).unwrap_or_default()
    }

    pub fn resolve_resolution(&self, explicit: Option<ResolutionPolicy>) -> ResolutionPolicy {
        explicit.or(self.resolution).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "jira_url = \"https://jira.example.org\"\nissues_dir = \"data/hbase\"\nchange_flags = \"sticky\"\nresolution = \"first-transition\"\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.jira_url.as_deref(), Some("https://jira.example.org"));
        assert_eq!(config.resolve_issues_dir(None), PathBuf::from("data/hbase"));
        assert_eq!(config.resolve_change_flags(None), ChangeFlagMode::Sticky);
        assert_eq!(config.resolve_resolution(None), ResolutionPolicy::FirstTransition);
    }

    #[test]
    fn test_defaults_and_explicit_overrides() {
        let config = Config::default();
        assert_eq!(config.resolve_issues_dir(None), PathBuf::from(DEFAULT_ISSUES_DIR));
        assert_eq!(
            config.resolve_cross_issue_path(None),
            PathBuf::from(DEFAULT_CROSS_ISSUE_PATH)
        );
        assert_eq!(config.resolve_change_flags(None), ChangeFlagMode::Count);
        assert_eq!(config.resolve_resolution(None), ResolutionPolicy::Field);

        let config = Config {
            issues_dir: Some(PathBuf::from("from-config")),
            ..Config::default()
        };
        assert_eq!(
            config.resolve_issues_dir(Some(PathBuf::from("from-flag"))),
            PathBuf::from("from-flag")
        );
    }

    #[test]
    fn test_parse_error_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "change_flags = \"sometimes\"\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, SurvivalError::ConfigParse { .. }));
        assert!(err.to_string().contains("config.toml"));
    }
}
