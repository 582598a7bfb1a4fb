use std::fmt::Write;

use chrono::Local;
use lumberjack::models::JobState;
use lumberjack::snapshot::{JobSnapshot, SnapshotDiff};

use super::styling::{bright_green, bright_red, bright_yellow, cyan, dim, styled_result};

pub fn render_snapshot_summary(push_id: u64, snapshot: &JobSnapshot) -> String {
    let unscheduled = snapshot.count_in_state(JobState::Unscheduled);
    let unscheduled = if unscheduled > 0 {
        format!("{} unscheduled, ", dim(unscheduled))
    } else {
        String::new()
    };

    format!(
        "{} push {}: {} jobs, {}{} pending, {} running, {} completed, {} failed",
        dim(Local::now().format("%H:%M:%S")),
        cyan(push_id),
        snapshot.len(),
        unscheduled,
        bright_yellow(snapshot.count_in_state(JobState::Pending)),
        bright_yellow(snapshot.count_in_state(JobState::Running)),
        bright_green(snapshot.count_in_state(JobState::Completed)),
        bright_red(snapshot.count_failed()),
    )
}

pub fn render_diff(diff: &SnapshotDiff) -> String {
    let mut output = String::new();

    for job in &diff.added {
        let _ = writeln!(
            output,
            "  {} {} {} [{}] {}",
            bright_green("+"),
            dim(job.id),
            job.name,
            job.platform,
            job.state
        );
    }

    for change in &diff.changed {
        let (before, after) = (&change.before, &change.after);
        let transition = if before.state == after.state {
            format!("{} -> {}", styled_result(&before.result), styled_result(&after.result))
        } else if after.state == JobState::Completed {
            format!("{} -> {}", before.state, styled_result(&after.result))
        } else {
            format!("{} -> {}", before.state, after.state)
        };
        let _ = writeln!(
            output,
            "  {} {} {} [{}] {}",
            bright_yellow("~"),
            dim(after.id),
            after.name,
            after.platform,
            transition
        );
    }

    output
}
