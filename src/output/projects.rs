use std::fmt::Write;

use comfy_table::{Cell, Color};
use lumberjack::models::{Push, Repository};

use super::format::{format_moment, truncate};
use super::styling::{bright_yellow, cyan};
use super::tables::{create_table, id_cell, number_cell};

pub fn render_repositories(repositories: &[Repository]) -> String {
    let mut sorted: Vec<&Repository> = repositories.iter().collect();
    sorted.sort_by(|a, b| a.name.cmp(&b.name));

    let mut table = create_table(&["Name", "Type", "Group", "Try?", "Perf Alerts?"]);
    for repo in sorted {
        table.add_row(vec![
            Cell::new(&repo.name).fg(Color::Cyan),
            Cell::new(repo.dvcs_type),
            Cell::new(&repo.repository_group.name),
            Cell::new(if repo.is_try_repo { "Yes" } else { "" }),
            Cell::new(if repo.performance_alerts_enabled { "Yes" } else { "" }),
        ]);
    }

    format!("Repositories ({})\n{table}", repositories.len())
}

pub fn render_pushes(project: &str, pushes: &[Push]) -> String {
    let mut output = String::new();

    if pushes.is_empty() {
        let _ = writeln!(output, "No pushes found for {}", cyan(project));
        return output;
    }

    let mut table = create_table(&["ID", "Revision", "Author", "Time", "Commits", "Summary"]);
    for push in pushes {
        let summary = push
            .revisions
            .first()
            .and_then(|rev| rev.comments.lines().next())
            .map(|line| truncate(line, 60))
            .unwrap_or_default();

        table.add_row(vec![
            id_cell(push.id),
            Cell::new(push.short_revision()).fg(Color::Cyan),
            Cell::new(&push.author),
            Cell::new(format_moment(push.pushed_at())),
            number_cell(push.revision_count),
            Cell::new(summary),
        ]);
    }

    let _ = writeln!(output, "{} {}", bright_yellow("Pushes for"), cyan(project));
    let _ = write!(output, "{table}");
    output
}
