use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;

use super::{parse_date, User};
use crate::error::Result;

/// A single Jira issue as saved by `jsurv fetch`.
#[derive(Deserialize, Debug, Clone)]
pub struct Issue {
    pub key: String,
    pub fields: IssueFields,
    #[serde(default)]
    pub changelog: Changelog,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct IssueFields {
    pub created: String,
    #[serde(rename = "resolutiondate", default)]
    pub resolution_date: Option<String>,
    #[serde(default)]
    pub priority: Option<IdRef>,
    #[serde(rename = "issuetype", default)]
    pub issue_type: Option<IdRef>,
    #[serde(default)]
    pub assignee: Option<User>,
    #[serde(default)]
    pub creator: Option<User>,
    #[serde(default)]
    pub reporter: Option<User>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "issuelinks", default)]
    pub issue_links: Option<Vec<Value>>,
    #[serde(default)]
    pub versions: Option<Vec<Value>>,
    #[serde(rename = "fixVersions", default)]
    pub fix_versions: Option<Vec<Value>>,
}

/// Reference to a Jira entity that is identified by a numeric string id.
#[derive(Deserialize, Debug, Clone)]
pub struct IdRef {
    pub id: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct Changelog {
    #[serde(default)]
    pub histories: Vec<History>,
}

/// One changelog entry: every item in it happened at `created`.
#[derive(Deserialize, Debug, Clone)]
pub struct History {
    pub created: String,
    #[serde(default)]
    pub items: Vec<ChangeItem>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ChangeItem {
    pub field: String,
    pub from: Option<String>,
    #[serde(rename = "fromString")]
    pub from_string: Option<String>,
    pub to: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Comment {
    pub created: String,
}

impl Issue {
    pub fn created(&self) -> Result<NaiveDate> {
        parse_date(&self.key, &self.fields.created)
    }

    pub fn resolved(&self) -> Result<Option<NaiveDate>> {
        self.fields
            .resolution_date
            .as_deref()
            .map(|value| parse_date(&self.key, value))
            .transpose()
    }

    /// Identity of the person who opened the issue.
    pub fn reporter(&self) -> Option<&str> {
        self.fields
            .creator
            .as_ref()
            .and_then(User::identity)
            .or_else(|| self.fields.reporter.as_ref().and_then(User::identity))
    }

    pub fn assignee(&self) -> Option<&str> {
        self.fields.assignee.as_ref().and_then(User::identity)
    }

    /// Priority id, or -1 when the record has no usable id.
    pub fn priority(&self) -> i32 {
        sentinel_id(self.fields.priority.as_ref())
    }

    /// Issue type id, or -1 when the record has no usable id.
    pub fn issue_type(&self) -> i32 {
        sentinel_id(self.fields.issue_type.as_ref())
    }

    pub fn description(&self) -> &str {
        self.fields.description.as_deref().unwrap_or_default()
    }

    pub fn link_count(&self) -> i64 {
        list_len(&self.fields.issue_links)
    }

    pub fn affect_count(&self) -> i64 {
        list_len(&self.fields.versions)
    }

    pub fn fix_count(&self) -> i64 {
        list_len(&self.fields.fix_versions)
    }
}

impl ChangeItem {
    /// `from`, treating empty strings like a missing value.
    pub fn from_value(&self) -> Option<&str> {
        self.from.as_deref().filter(|s| !s.is_empty())
    }

    pub fn to_value(&self) -> Option<&str> {
        self.to.as_deref().filter(|s| !s.is_empty())
    }
}

/// Parse a Jira numeric id, falling back to -1.
pub fn parse_id(value: Option<&str>) -> i32 {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(-1)
}

fn sentinel_id(id: Option<&IdRef>) -> i32 {
    parse_id(id.and_then(|r| r.id.as_deref()))
}

fn list_len(list: &Option<Vec<Value>>) -> i64 {
    list.as_ref().map_or(0, |items| items.len() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn issue(fields: Value) -> Issue {
        serde_json::from_value(json!({ "key": "HBASE-1", "fields": fields })).unwrap()
    }

    #[test]
    fn test_minimal_record_deserializes() {
        let issue = issue(json!({ "created": "2018-01-01T10:00:00.000+0000" }));
        assert_eq!(issue.created().unwrap(), NaiveDate::from_ymd_opt(2018, 1, 1).unwrap());
        assert_eq!(issue.resolved().unwrap(), None);
        assert!(issue.changelog.histories.is_empty());
        assert!(issue.comments.is_empty());
        assert_eq!(issue.link_count(), 0);
    }

    #[test]
    fn test_malformed_ids_become_sentinels() {
        let issue = issue(json!({
            "created": "2018-01-01",
            "priority": { "name": "Major" },
            "issuetype": null
        }));
        assert_eq!(issue.priority(), -1);
        assert_eq!(issue.issue_type(), -1);
    }

    #[test]
    fn test_observed_fields() {
        let issue = issue(json!({
            "created": "2018-01-01",
            "priority": { "id": "3" },
            "issuetype": { "id": "1" },
            "assignee": { "key": "stack" },
            "creator": { "key": "apurtell" },
            "description": "It breaks",
            "issuelinks": [{}, {}],
            "versions": [{}],
            "fixVersions": []
        }));
        assert_eq!(issue.priority(), 3);
        assert_eq!(issue.issue_type(), 1);
        assert_eq!(issue.assignee(), Some("stack"));
        assert_eq!(issue.reporter(), Some("apurtell"));
        assert_eq!(issue.description(), "It breaks");
        assert_eq!(issue.link_count(), 2);
        assert_eq!(issue.affect_count(), 1);
        assert_eq!(issue.fix_count(), 0);
    }

    #[test]
    fn test_reporter_falls_back_to_reporter_field() {
        let issue = issue(json!({
            "created": "2018-01-01",
            "reporter": { "name": "larsh" }
        }));
        assert_eq!(issue.reporter(), Some("larsh"));
    }

    #[test]
    fn test_change_item_empty_values() {
        let item: ChangeItem = serde_json::from_value(json!({
            "field": "Link",
            "from": "",
            "fromString": null,
            "to": "HBASE-2",
            "toString": "relates to HBASE-2"
        }))
        .unwrap();
        assert_eq!(item.from_value(), None);
        assert_eq!(item.to_value(), Some("HBASE-2"));
    }
}
