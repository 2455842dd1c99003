mod issue;
mod priority;
mod user;

use chrono::{DateTime, NaiveDate};

use crate::error::{Result, SurvivalError};

pub use issue::{parse_id, ChangeItem, Issue};
pub use priority::priority_colored;
pub use user::User;

/// Parse a Jira timestamp into the calendar date it falls on in its own
/// offset. Accepts `2018-01-01T10:00:00.000+0000`, RFC 3339 and bare dates.
pub fn parse_date(issue: &str, value: &str) -> Result<NaiveDate> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Ok(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.date_naive());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| SurvivalError::InvalidDate {
        issue: issue.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_jira_timestamp() {
        let date = parse_date("X-1", "2018-03-04T23:59:59.000+0000").unwrap();
        assert_eq!(date, ymd(2018, 3, 4));
    }

    #[test]
    fn test_parse_keeps_own_offset() {
        // 01:00 at -0800 is still the 4th locally, even though it is the 5th in UTC.
        let date = parse_date("X-1", "2018-03-04T01:00:00.000-0800").unwrap();
        assert_eq!(date, ymd(2018, 3, 4));
    }

    #[test]
    fn test_parse_rfc3339_and_bare_date() {
        assert_eq!(parse_date("X-1", "2018-03-04T10:00:00Z").unwrap(), ymd(2018, 3, 4));
        assert_eq!(parse_date("X-1", "2018-03-04").unwrap(), ymd(2018, 3, 4));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let err = parse_date("X-1", "yesterday").unwrap_err();
        assert!(matches!(err, SurvivalError::InvalidDate { .. }));
        assert!(err.to_string().contains("X-1"));
    }
}
