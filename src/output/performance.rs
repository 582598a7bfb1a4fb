use comfy_table::{Cell, Color};
use lumberjack::models::{PerformanceAlertSummary, PerformanceFramework};

use super::tables::{count_cell, create_table, id_cell};

pub fn render_alert_summaries(summaries: &[PerformanceAlertSummary]) -> String {
    if summaries.is_empty() {
        return "No performance alert summaries found".to_string();
    }

    let mut table = create_table(&[
        "ID",
        "Repository",
        "Revision",
        "Created",
        "Regressions",
        "Improvements",
        "Bug",
    ]);
    for summary in summaries {
        table.add_row(vec![
            id_cell(summary.id),
            Cell::new(&summary.repository).fg(Color::Cyan),
            Cell::new(summary.display_revision().unwrap_or("-")),
            Cell::new(summary.created.format("%Y-%m-%d %H:%M")),
            count_cell(summary.regression_count(), Color::Red),
            count_cell(summary.improvement_count(), Color::Green),
            Cell::new(summary.bug_number.map(|b| b.to_string()).unwrap_or_default()),
        ]);
    }

    format!("Performance Alert Summaries\n{table}")
}

pub fn render_frameworks(frameworks: &[PerformanceFramework]) -> String {
    let mut table = create_table(&["ID", "Name"]);
    for framework in frameworks {
        table.add_row(vec![
            id_cell(framework.id),
            Cell::new(&framework.name).fg(Color::Cyan),
        ]);
    }
    format!("Performance Frameworks\n{table}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_alert_summaries() {
        let summaries: Vec<PerformanceAlertSummary> = serde_json::from_value(json!([{
            "id": 40000,
            "repository": "autoland",
            "framework": 13,
            "created": "2024-01-15T10:23:45.123456",
            "alerts": [{"id": 1, "is_regression": true}, {"id": 2, "is_regression": false}]
        }]))
        .unwrap();

        let rendered = render_alert_summaries(&summaries);
        assert!(rendered.contains("40000"));
        assert!(rendered.contains("2024-01-15 10:23"));
        assert!(rendered.contains(" - "));
    }

    #[test]
    fn test_render_empty_alert_summaries() {
        assert_eq!(
            render_alert_summaries(&[]),
            "No performance alert summaries found"
        );
    }
}
