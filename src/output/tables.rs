use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, Color as TableColor, ContentArrangement, Table};

use lumberjack::models::JobResult;

/// Table and cell creation helpers
pub fn create_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            headers
                .iter()
                .map(|label| Cell::new(*label).fg(TableColor::Cyan))
                .collect::<Vec<_>>(),
        );
    table
}

pub fn result_cell(result: &JobResult) -> Cell {
    let cell = Cell::new(result);
    match result {
        JobResult::Success => cell.fg(TableColor::Green),
        JobResult::Retry => cell.fg(TableColor::Yellow),
        r if r.is_failure() => cell.fg(TableColor::Red),
        _ => cell,
    }
}

pub fn id_cell(id: impl std::fmt::Display) -> Cell {
    Cell::new(id).fg(TableColor::DarkGrey)
}

pub fn number_cell(value: impl std::fmt::Display) -> Cell {
    Cell::new(value).set_alignment(CellAlignment::Right)
}

pub fn count_cell(count: usize, color: TableColor) -> Cell {
    let cell = number_cell(count);
    if count > 0 {
        cell.fg(color)
    } else {
        cell
    }
}
