use console::style;

use runvis::tekton::RunStatus;

/// Styling helpers for terminal output
pub fn bright_yellow(text: impl std::fmt::Display) -> console::StyledObject<String> {
    style(text.to_string()).bright().yellow()
}

pub fn bright_green(text: impl std::fmt::Display) -> console::StyledObject<String> {
    style(text.to_string()).bright().green()
}

pub fn bright_red(text: impl std::fmt::Display) -> console::StyledObject<String> {
    style(text.to_string()).bright().red()
}

pub fn cyan(text: impl std::fmt::Display) -> console::StyledObject<String> {
    style(text.to_string()).cyan()
}

pub fn dim(text: impl std::fmt::Display) -> console::StyledObject<String> {
    style(text.to_string()).dim()
}

pub fn bright(text: impl std::fmt::Display) -> console::StyledObject<String> {
    style(text.to_string()).bright()
}

pub fn magenta_bold(text: impl std::fmt::Display) -> console::StyledObject<String> {
    style(text.to_string()).magenta().bold()
}

pub fn status_styled(status: RunStatus) -> console::StyledObject<String> {
    match status {
        RunStatus::Succeeded => bright_green(status),
        RunStatus::Failed | RunStatus::FailedToStart | RunStatus::TestFailed => bright_red(status),
        RunStatus::TestWarning | RunStatus::Cancelled | RunStatus::Cancelling => {
            bright_yellow(status)
        }
        RunStatus::Running | RunStatus::InProgress => cyan(status),
        _ => dim(status),
    }
}
