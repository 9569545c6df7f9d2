//! Enumerations shared by the CLI and the terminal UI.

use clap::ValueEnum;

use crate::task::Task;

/// Which tasks a view shows, by completion status.
#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
pub enum Filter {
    #[default]
    All,
    Pending,
    Completed,
}

impl Filter {
    /// Filters in the order the filter bar shows them.
    pub const ALL_FILTERS: [Filter; 3] = [Filter::All, Filter::Pending, Filter::Completed];

    /// Whether `task` belongs in a view using this filter.
    pub fn matches(self, task: &Task) -> bool {
        match self {
            Filter::All => true,
            Filter::Pending => !task.completed,
            Filter::Completed => task.completed,
        }
    }

    /// The filter after this one, wrapping around.
    pub fn next(self) -> Filter {
        match self {
            Filter::All => Filter::Pending,
            Filter::Pending => Filter::Completed,
            Filter::Completed => Filter::All,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Filter::All => "All",
            Filter::Pending => "Pending",
            Filter::Completed => "Completed",
        }
    }
}
