//! Derived views over a task collection.
//!
//! A view is a filtered, deadline-ordered projection recomputed on every
//! render. It borrows from the collection and never changes its order.

use std::cmp::Ordering;

use chrono::NaiveDate;

use crate::fields::Filter;
use crate::task::Task;

/// Display ordering: dated tasks first, earliest deadline first.
///
/// Two undated tasks compare equal so a stable sort keeps insertion order.
pub fn deadline_order(a: &Task, b: &Task) -> Ordering {
    match (a.deadline, b.deadline) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Tasks matching `filter`, in display order.
pub fn visible_tasks(tasks: &[Task], filter: Filter) -> Vec<&Task> {
    let mut visible: Vec<&Task> = tasks.iter().filter(|t| filter.matches(t)).collect();
    // `sort_by` is stable.
    visible.sort_by(|a, b| deadline_order(a, b));
    visible
}

/// A pending task whose deadline has already passed.
pub fn is_overdue(task: &Task, today: NaiveDate) -> bool {
    !task.completed && task.deadline.is_some_and(|d| d < today)
}

/// Per-filter task counts for the filter bar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterCounts {
    pub all: usize,
    pub pending: usize,
    pub completed: usize,
}

impl FilterCounts {
    pub fn of(tasks: &[Task]) -> Self {
        let completed = tasks.iter().filter(|t| t.completed).count();
        FilterCounts {
            all: tasks.len(),
            pending: tasks.len() - completed,
            completed,
        }
    }

    pub fn get(&self, filter: Filter) -> usize {
        match filter {
            Filter::All => self.all,
            Filter::Pending => self.pending,
            Filter::Completed => self.completed,
        }
    }
}
