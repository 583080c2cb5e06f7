// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::grid::ToolbarAction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    Grid,
    RowEdit,
    ConfirmSave,
    Details,
    Help,
}

impl AppMode {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Grid => "GRID",
            Self::RowEdit => "EDIT",
            Self::ConfirmSave => "CONFIRM",
            Self::Details => "DETAILS",
            Self::Help => "HELP",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub mode: AppMode,
    pub selected_row: Option<usize>,
    pub status_line: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            mode: AppMode::Grid,
            selected_row: None,
            status_line: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    Select(Option<usize>),
    RowsChanged(usize),
    StartRowEdit,
    FinishRowEdit,
    CancelRowEdit,
    AskSave,
    ConfirmSave,
    CancelSave,
    OpenDetails,
    CloseDetails,
    ToggleHelp,
    SetStatus(String),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    ModeChanged(AppMode),
    SelectionChanged(Option<usize>),
    SaveConfirmed,
    ActionRejected(ToolbarAction),
    StatusUpdated(String),
    StatusCleared,
}

impl AppState {
    pub fn has_selection(&self) -> bool {
        self.selected_row.is_some()
    }

    pub fn action_enabled(&self, action: ToolbarAction) -> bool {
        action.enabled(self.has_selection())
    }

    pub fn dispatch(&mut self, command: AppCommand) -> Vec<AppEvent> {
        match command {
            AppCommand::Select(row) => {
                if self.selected_row == row {
                    return Vec::new();
                }
                self.selected_row = row;
                vec![AppEvent::SelectionChanged(row)]
            }
            AppCommand::RowsChanged(len) => {
                let fitted = match self.selected_row {
                    _ if len == 0 => None,
                    Some(row) => Some(row.min(len - 1)),
                    None => None,
                };
                if fitted == self.selected_row {
                    return Vec::new();
                }
                self.selected_row = fitted;
                vec![AppEvent::SelectionChanged(fitted)]
            }
            AppCommand::StartRowEdit => {
                if !self.has_selection() {
                    return vec![self.set_status("select a car to edit")];
                }
                self.set_mode(AppMode::RowEdit)
            }
            AppCommand::FinishRowEdit | AppCommand::CancelRowEdit => {
                if self.mode != AppMode::RowEdit {
                    return Vec::new();
                }
                self.set_mode(AppMode::Grid)
            }
            AppCommand::AskSave => self.set_mode(AppMode::ConfirmSave),
            AppCommand::ConfirmSave => {
                if self.mode != AppMode::ConfirmSave {
                    return Vec::new();
                }
                let mut events = self.set_mode(AppMode::Grid);
                events.push(AppEvent::SaveConfirmed);
                events
            }
            AppCommand::CancelSave => {
                if self.mode != AppMode::ConfirmSave {
                    return Vec::new();
                }
                self.set_mode(AppMode::Grid)
            }
            AppCommand::OpenDetails => {
                if !self.action_enabled(ToolbarAction::Details) {
                    return vec![
                        AppEvent::ActionRejected(ToolbarAction::Details),
                        self.set_status("details needs a selected car"),
                    ];
                }
                self.set_mode(AppMode::Details)
            }
            AppCommand::CloseDetails => {
                if self.mode != AppMode::Details {
                    return Vec::new();
                }
                self.set_mode(AppMode::Grid)
            }
            AppCommand::ToggleHelp => {
                let next = if self.mode == AppMode::Help {
                    AppMode::Grid
                } else {
                    AppMode::Help
                };
                self.set_mode(next)
            }
            AppCommand::SetStatus(message) => vec![self.set_status(&message)],
            AppCommand::ClearStatus => {
                self.status_line = None;
                vec![AppEvent::StatusCleared]
            }
        }
    }

    fn set_mode(&mut self, mode: AppMode) -> Vec<AppEvent> {
        self.mode = mode;
        vec![AppEvent::ModeChanged(mode)]
    }

    fn set_status(&mut self, message: &str) -> AppEvent {
        self.status_line = Some(message.to_owned());
        AppEvent::StatusUpdated(message.to_owned())
    }
}
