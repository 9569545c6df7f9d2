//! Enumerations for TUI state management.

/// Which screen the terminal user interface is showing.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AppState {
    TaskList,
    AddTask,
    EditTask,
    Help,
    Confirm,
}

/// An action waiting for a y/n answer.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PendingAction {
    Delete(u64),
}
