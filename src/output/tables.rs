use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color as TableColor, ContentArrangement, Table};

use runvis::graph::{StepRunStatus, StepStatus};
use runvis::tekton::RunStatus;

/// Table and cell creation helpers
pub fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn color_coded_status_cell(status: RunStatus) -> Cell {
    let cell = Cell::new(status.label());
    match status {
        RunStatus::Succeeded => cell.fg(TableColor::Green),
        RunStatus::Failed | RunStatus::FailedToStart | RunStatus::TestFailed => {
            cell.fg(TableColor::Red)
        }
        RunStatus::TestWarning | RunStatus::Cancelled | RunStatus::Cancelling => {
            cell.fg(TableColor::Yellow)
        }
        RunStatus::Running | RunStatus::InProgress => cell.fg(TableColor::Cyan),
        _ => cell.fg(TableColor::DarkGrey),
    }
}

/// Renders step progress as `done/total`, colored by the worst step outcome.
pub fn steps_progress_cell(steps: &[StepStatus]) -> Cell {
    if steps.is_empty() {
        return Cell::new("-").fg(TableColor::DarkGrey);
    }

    let done = steps
        .iter()
        .filter(|s| s.status == StepRunStatus::Succeeded)
        .count();
    let text = format!("{done}/{}", steps.len());

    let failed = steps
        .iter()
        .any(|s| matches!(s.status, StepRunStatus::Failed | StepRunStatus::TestFailed));
    if failed {
        Cell::new(text).fg(TableColor::Red)
    } else if done == steps.len() {
        Cell::new(text).fg(TableColor::Green)
    } else {
        Cell::new(text).fg(TableColor::Yellow)
    }
}

pub fn badge_cell(count: u32) -> Cell {
    if count == 0 {
        Cell::new("-").fg(TableColor::DarkGrey)
    } else {
        Cell::new(count).fg(TableColor::Yellow)
    }
}
