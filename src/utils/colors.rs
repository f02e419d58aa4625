/// ANSI color helper utilities for terminal output.
pub const RESET: &str = "\x1b[0m";

pub const GREY: &str = "\x1b[90m";

pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";

pub const YELLOW: &str = "\x1b[33m";
pub const CYAN: &str = "\x1b[36m";
pub const MAGENTA: &str = "\x1b[35m";

/// Completion rate color:
/// \>= 75 → green
/// \>= 40 → yellow
/// otherwise → red
pub fn color_for_rate(rate: u32) -> &'static str {
    if rate >= 75 {
        GREEN
    } else if rate >= 40 {
        YELLOW
    } else {
        RED
    }
}

/// Any overdue task is worth a red number; zero is greyed out.
pub fn color_for_overdue(count: usize) -> &'static str {
    if count > 0 { RED } else { GREY }
}

/// Grey for zero counts, plain otherwise.
pub fn colorize_count(count: usize) -> String {
    if count == 0 {
        format!("{GREY}{count}{RESET}")
    } else {
        count.to_string()
    }
}

pub fn color_for_status(status: Option<crate::models::task_status::TaskStatus>) -> &'static str {
    use crate::models::task_status::TaskStatus;
    match status {
        Some(TaskStatus::Done) => GREEN,
        Some(TaskStatus::InProgress) => CYAN,
        Some(TaskStatus::Review) => MAGENTA,
        Some(TaskStatus::Todo) => YELLOW,
        Some(TaskStatus::Backlog) | None => GREY,
    }
}
