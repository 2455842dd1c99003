use colored::Colorize;

/// Label for a Jira priority id (1 = Blocker .. 5 = Trivial).
pub fn priority_label(priority: i32) -> String {
    match priority {
        1 => "Blocker".to_string(),
        2 => "Critical".to_string(),
        3 => "Major".to_string(),
        4 => "Minor".to_string(),
        5 => "Trivial".to_string(),
        -1 => "Malformed".to_string(),
        _ => format!("P{priority}"),
    }
}

/// Get the colored label for terminal output.
pub fn priority_colored(priority: i32) -> String {
    let label = priority_label(priority);
    match priority {
        1 => label.red().bold().to_string(),
        2 => label.yellow().bold().to_string(),
        3 => label.blue().to_string(),
        4 | 5 => label.bright_black().to_string(),
        -1 => label.magenta().to_string(),
        _ => label,
    }
}
