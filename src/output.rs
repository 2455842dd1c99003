use std::sync::atomic::{AtomicBool, Ordering};

use chrono::NaiveDate;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

/// Global output format setting
static OUTPUT_JSON: AtomicBool = AtomicBool::new(false);

pub fn set_json_output(json: bool) {
    OUTPUT_JSON.store(json, Ordering::Relaxed);
}

pub fn is_json_output() -> bool {
    OUTPUT_JSON.load(Ordering::Relaxed)
}

/// Print a table or JSON depending on output mode
pub fn print_table<T, R, F>(items: &[T], to_row: F)
where
    T: Serialize,
    R: Tabled,
    F: Fn(&T) -> R,
{
    if is_json_output() {
        println!("{}", serde_json::to_string_pretty(items).unwrap_or_default());
    } else {
        let rows: Vec<R> = items.iter().map(to_row).collect();
        let table = Table::new(rows).with(Style::rounded()).to_string();
        println!("{table}");
    }
}

/// Print a single item or JSON depending on output mode
pub fn print_item<T: Serialize + ?Sized>(item: &T, display: impl FnOnce(&T)) {
    if is_json_output() {
        println!("{}", serde_json::to_string_pretty(item).unwrap_or_default());
    } else {
        display(item);
    }
}

/// Print a message (skipped in JSON mode, or prints simple object)
pub fn print_message(message: &str) {
    if is_json_output() {
        println!("{}", serde_json::json!({ "message": message }));
    } else {
        println!("{message}");
    }
}

/// Dead/censored marker for the last interval of an issue.
pub fn event_colored(is_dead: bool) -> String {
    if is_dead {
        "resolved".red().bold().to_string()
    } else {
        "-".bright_black().to_string()
    }
}

pub fn format_optional<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

pub fn format_reputation(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.3}")).unwrap_or_else(|| "-".to_string())
}

/// Day `offset` days after `origin`, for showing row bounds as dates.
pub fn format_offset(origin: NaiveDate, offset: i64) -> String {
    origin
        .checked_add_signed(chrono::Duration::days(offset))
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| offset.to_string())
}

/// Truncate a string with ellipsis
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("apurtell", 20), "apurtell");
        assert_eq!(truncate("a-very-long-assignee-name", 10), "a-very-...");
        assert_eq!(truncate("ééééé", 4), "é...");
    }

    #[test]
    fn test_format_offset() {
        let origin = NaiveDate::from_ymd_opt(2018, 1, 30).unwrap();
        assert_eq!(format_offset(origin, 3), "2018-02-02");
    }

    #[test]
    fn test_format_optionals() {
        assert_eq!(format_optional::<i64>(None), "-");
        assert_eq!(format_optional(Some(4)), "4");
        assert_eq!(format_reputation(Some(1.0 / 3.0)), "0.333");
    }
}
