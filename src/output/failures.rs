use std::fmt::Write;

use comfy_table::{Cell, Color};
use lumberjack::models::{BugSuggestion, FailureByBug, FailureClassification, TextLogError};

use super::format::truncate;
use super::styling::{bright, bright_yellow, cyan, dim};
use super::tables::{create_table, id_cell, number_cell};

const MAX_LINE_LEN: usize = 100;

pub fn render_failures(bug_id: u64, failures: &[FailureByBug]) -> String {
    let mut output = String::new();

    if failures.is_empty() {
        let _ = writeln!(output, "No failures found for bug {}", cyan(bug_id));
        return output;
    }

    let mut table = create_table(&[
        "Job ID", "Pushed", "Tree", "Platform", "Build", "Suite", "Revision",
    ]);
    for failure in failures {
        table.add_row(vec![
            id_cell(failure.job_id),
            Cell::new(&failure.push_time),
            Cell::new(&failure.tree).fg(Color::Cyan),
            Cell::new(&failure.platform),
            Cell::new(&failure.build_type),
            Cell::new(&failure.test_suite),
            Cell::new(failure.revision.get(..12).unwrap_or(&failure.revision)),
        ]);
    }

    let _ = writeln!(
        output,
        "{} {} ({})",
        bright_yellow("Failures for bug"),
        cyan(bug_id),
        failures.len()
    );
    let _ = write!(output, "{table}");
    output
}

pub fn render_errors(
    job_id: u64,
    errors: &[TextLogError],
    suggestions: Option<&[BugSuggestion]>,
) -> String {
    let mut output = String::new();

    if errors.is_empty() {
        let _ = writeln!(output, "No errors found for job {}", cyan(job_id));
    } else {
        let mut table = create_table(&["Line", "Error"]);
        for error in errors {
            table.add_row(vec![
                number_cell(error.line_number),
                Cell::new(truncate(&error.line, MAX_LINE_LEN)),
            ]);
        }
        let _ = writeln!(
            output,
            "{} {} ({})",
            bright_yellow("Errors for job"),
            cyan(job_id),
            errors.len()
        );
        let _ = writeln!(output, "{table}");
    }

    let Some(suggestions) = suggestions else {
        return output;
    };

    let _ = writeln!(output, "\n{}", bright("Bug suggestions"));
    if suggestions.is_empty() {
        let _ = writeln!(output, "  {}", dim("none"));
        return output;
    }

    for suggestion in suggestions {
        let _ = writeln!(output, "  {}", truncate(&suggestion.search, MAX_LINE_LEN));
        if suggestion.failure_new_in_rev {
            let _ = writeln!(output, "    {}", bright_yellow("new failure in this revision"));
        }
        let mut any = false;
        for bug in suggestion.all_bugs() {
            any = true;
            let status = if bug.resolution.is_empty() {
                bug.status.clone()
            } else {
                format!("{} {}", bug.status, bug.resolution)
            };
            let _ = writeln!(
                output,
                "    {} {} {}",
                cyan(format!("Bug {}", bug.id)),
                dim(format!("[{}]", status.trim())),
                bug.summary
            );
        }
        if !any {
            let _ = writeln!(output, "    {}", dim("no matching bugs"));
        }
    }

    output
}

pub fn render_classifications(classifications: &[FailureClassification]) -> String {
    let mut table = create_table(&["ID", "Name"]);
    for classification in classifications {
        table.add_row(vec![
            id_cell(classification.id),
            Cell::new(&classification.name).fg(Color::Cyan),
        ]);
    }
    format!("Failure Classifications\n{table}")
}
