use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::{Result, SurvivalError};

/// Issues requested per search page.
pub const PAGE_SIZE: u32 = 1000;

/// Read-only client for the Jira REST v2 API.
pub struct JiraClient {
    http: Client,
    base: Url,
}

/// One page of `/search` results. Issues are kept as raw JSON so they are
/// stored exactly as served.
#[derive(Deserialize, Debug)]
pub struct SearchPage {
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub issues: Vec<Value>,
}

#[derive(Deserialize)]
struct CommentPage {
    comments: Vec<Value>,
}

/// JQL selecting the issues of `project` created during `year`.
pub fn year_jql(project: &str, year: i32) -> String {
    format!(
        "project = \"{project}\" AND created >= \"{year}/01/01\" AND created <= \"{year}/12/31\" ORDER BY key ASC"
    )
}

impl JiraClient {
    pub fn new(base_url: &str) -> Result<Self> {
        // Url::join drops the last path segment unless it ends in a slash.
        let normalized = format!("{}/", base_url.trim_end_matches('/'));
        let base =
            Url::parse(&normalized).map_err(|_| SurvivalError::InvalidUrl(base_url.to_string()))?;

        Ok(Self {
            http: Client::new(),
            base,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base
            .join(path)
            .map_err(|_| SurvivalError::InvalidUrl(format!("{}{path}", self.base)))
    }

    pub fn search_url(&self, jql: &str, start_at: u32) -> Result<Url> {
        let mut url = self.endpoint("rest/api/2/search")?;
        url.query_pairs_mut()
            .append_pair("jql", jql)
            .append_pair("startAt", &start_at.to_string())
            .append_pair("maxResults", &PAGE_SIZE.to_string())
            .append_pair("expand", "changelog");
        Ok(url)
    }

    pub fn comments_url(&self, key: &str) -> Result<Url> {
        self.endpoint(&format!("rest/api/2/issue/{key}/comment"))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        debug!(%url, "GET");
        let response = self
            .http
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SurvivalError::ApiError {
                status: response.status().as_u16(),
                message: response
                    .text()
                    .await
                    .unwrap_or_else(|_| "<failed to read response body>".to_string()),
            });
        }

        Ok(response.json().await?)
    }

    pub async fn search(&self, jql: &str, start_at: u32) -> Result<SearchPage> {
        self.get_json(self.search_url(jql, start_at)?).await
    }

    /// The full comment log of one issue.
    pub async fn comments(&self, key: &str) -> Result<Vec<Value>> {
        let page: CommentPage = self.get_json(self.comments_url(key)?).await?;
        Ok(page.comments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_url_keeps_base_path() {
        let client = JiraClient::new("https://issues.apache.org/jira").unwrap();
        let url = client.search_url(&year_jql("HBASE", 2018), 2000).unwrap();

        assert_eq!(url.path(), "/jira/rest/api/2/search");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                (
                    "jql".to_string(),
                    "project = \"HBASE\" AND created >= \"2018/01/01\" AND created <= \"2018/12/31\" ORDER BY key ASC".to_string()
                ),
                ("startAt".to_string(), "2000".to_string()),
                ("maxResults".to_string(), "1000".to_string()),
                ("expand".to_string(), "changelog".to_string()),
            ]
        );
    }

    #[test]
    fn test_comments_url() {
        let client = JiraClient::new("https://jira.example.org/").unwrap();
        assert_eq!(
            client.comments_url("HBASE-42").unwrap().as_str(),
            "https://jira.example.org/rest/api/2/issue/HBASE-42/comment"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            JiraClient::new("not a url"),
            Err(SurvivalError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_search_page_tolerates_missing_fields() {
        let page: SearchPage = serde_json::from_str(r#"{ "issues": [{ "key": "HBASE-1" }] }"#).unwrap();
        assert_eq!(page.total, 0);
        assert_eq!(page.issues.len(), 1);
    }
}
