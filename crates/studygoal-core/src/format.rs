//! Display helpers shared by every front end.

/// Format seconds as `"01h 02m 03s"`, or `"02m 03s"` under an hour.
pub fn format_duration(secs: u64) -> String {
    let h = secs / 3600;
    let m = (secs % 3600) / 60;
    let s = secs % 60;
    if h > 0 {
        format!("{h:02}h {m:02}m {s:02}s")
    } else {
        format!("{m:02}m {s:02}s")
    }
}

/// One-line nudge comparing focused time against the goal.
pub fn goal_message(focused_secs: u64, goal_secs: u64) -> String {
    let remaining = goal_secs.saturating_sub(focused_secs);
    if remaining == 0 {
        "Goal reached".to_string()
    } else {
        format!("Remaining focus time: {}", format_duration(remaining))
    }
}
