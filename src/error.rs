use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SurvivalError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Failed to read config file at {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to write config file at {path}: {source}")]
    ConfigWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Unparseable date '{value}' in issue {issue}")]
    InvalidDate { issue: String, value: String },

    #[error("Failed to parse issue record {path}: {source}")]
    IssueParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Cross-issue data not found at {0} (run `jsurv actors` first)")]
    MissingCrossIssueData(PathBuf),

    #[error("Actor not found: {0}")]
    ActorNotFound(String),
}

pub type Result<T> = std::result::Result<T, SurvivalError>;
