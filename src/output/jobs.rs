use std::fmt::Write;

use comfy_table::{Cell, Color};
use lumberjack::log_search::LogMatch;
use lumberjack::models::{Job, JobLogUrl, JobState, SimilarJob};

use super::format::{format_duration, format_moment, truncate};
use super::styling::{bright, bright_yellow, cyan, dim, styled_result};
use super::tables::{create_table, id_cell, number_cell, result_cell};

const TASKCLUSTER_TASK_URL: &str = "https://firefox-ci-tc.services.mozilla.com/tasks";
const MAX_JOB_NAME_LEN: usize = 50;

fn duration_text(job: &Job) -> String {
    if job.state != JobState::Completed {
        return String::new();
    }
    job.duration_seconds().map(format_duration).unwrap_or_default()
}

pub fn render_jobs(project: &str, jobs: &[Job]) -> String {
    let mut output = String::new();

    if jobs.is_empty() {
        let _ = writeln!(output, "No jobs found for {}", cyan(project));
        return output;
    }

    let mut table = create_table(&[
        "ID", "Symbol", "Name", "Platform", "State", "Result", "Duration",
    ]);
    for job in jobs {
        table.add_row(vec![
            id_cell(job.id),
            Cell::new(job.symbol()).fg(Color::Cyan),
            Cell::new(truncate(&job.job_type_name, MAX_JOB_NAME_LEN)),
            Cell::new(format!("{} {}", job.platform, job.platform_option).trim()),
            Cell::new(job.state),
            result_cell(&job.result),
            number_cell(duration_text(job)),
        ]);
    }

    let _ = writeln!(
        output,
        "{} {} ({})",
        bright_yellow("Jobs for"),
        cyan(project),
        jobs.len()
    );
    let _ = write!(output, "{table}");
    output
}

pub fn render_job_detail(job: &Job, log_urls: Option<&[JobLogUrl]>) -> String {
    let mut output = String::new();
    let field = |output: &mut String, label: &str, value: &dyn std::fmt::Display| {
        let _ = writeln!(output, "  {} {value}", cyan(format!("{label}:")));
    };

    let _ = writeln!(output, "\n{}: {}\n", bright("Job Details"), job.job_guid);
    field(&mut output, "ID", &job.id);
    field(&mut output, "Type", &job.job_type_name);
    field(&mut output, "Symbol", &job.symbol());
    field(&mut output, "Platform", &job.platform);
    field(&mut output, "State", &job.state);
    field(&mut output, "Result", &styled_result(&job.result));
    field(&mut output, "Tier", &job.tier);
    field(&mut output, "Push ID", &job.push_id);
    field(&mut output, "Submitted", &format_moment(job.submitted_at()));
    field(&mut output, "Started", &format_moment(job.started_at()));
    field(&mut output, "Ended", &format_moment(job.ended_at()));

    let duration = duration_text(job);
    if !duration.is_empty() {
        field(&mut output, "Duration", &duration);
    }

    if let Some(task_id) = &job.task_id {
        field(&mut output, "Task ID", task_id);
        field(&mut output, "Task URL", &format!("{TASKCLUSTER_TASK_URL}/{task_id}"));
    }

    if let Some(logs) = log_urls {
        if logs.is_empty() {
            let _ = writeln!(output, "\n{}", dim("No logs available"));
        } else {
            let _ = writeln!(output, "\n{}", bright("Log URLs:"));
            for log in logs {
                let _ = writeln!(output, "  - {}: {}", log.name, log.url);
            }
        }
    }

    output
}

pub fn render_similar_jobs(job_id: u64, jobs: &[SimilarJob]) -> String {
    let mut output = String::new();

    if jobs.is_empty() {
        let _ = writeln!(output, "No similar jobs found for {job_id}");
        return output;
    }

    let mut table = create_table(&["ID", "Push ID", "Platform", "State", "Result", "Duration"]);
    for job in jobs {
        table.add_row(vec![
            id_cell(job.id),
            Cell::new(job.push_id),
            Cell::new(&job.build_platform),
            Cell::new(job.state.map(|s| s.to_string()).unwrap_or_default()),
            result_cell(&job.result),
            number_cell(job.duration_seconds().map(format_duration).unwrap_or_default()),
        ]);
    }

    let failures = jobs.iter().filter(|j| j.result.is_failure()).count();
    let _ = writeln!(
        output,
        "{} {} ({} of {} failed)",
        bright_yellow("Similar jobs for"),
        cyan(job_id),
        failures,
        jobs.len()
    );
    let _ = write!(output, "{table}");
    output
}

pub fn render_log_matches(log: &JobLogUrl, matches: &[LogMatch]) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "{} {}", bright("Searching"), dim(&log.url));
    if matches.is_empty() {
        let _ = writeln!(output, "No matching lines");
        return output;
    }

    for (i, m) in matches.iter().enumerate() {
        if i > 0 && (!m.before.is_empty() || !m.after.is_empty()) {
            let _ = writeln!(output, "{}", dim("--"));
        }
        let first = m.line_number - m.before.len();
        for (offset, line) in m.before.iter().enumerate() {
            let _ = writeln!(output, "{}  {}", dim(format!("{:>7}", first + offset)), dim(line));
        }
        let _ = writeln!(
            output,
            "{}  {}",
            bright_yellow(format!("{:>7}", m.line_number)),
            m.line
        );
        for (offset, line) in m.after.iter().enumerate() {
            let _ = writeln!(
                output,
                "{}  {}",
                dim(format!("{:>7}", m.line_number + 1 + offset)),
                dim(line)
            );
        }
    }

    let _ = writeln!(output, "\n{} matching lines", matches.len());
    output
}
