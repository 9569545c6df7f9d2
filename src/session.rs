//! The state container the shells drive.
//!
//! A `Session` owns the current collection and filter selection for one run
//! of the CLI or the terminal UI. Every mutation goes through the pure
//! functions in [`crate::ops`], replaces the held collection, and is then
//! flushed through the repository. Saves are awaited before the mutation
//! returns, so they complete in the order the mutations happened.

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::error::StorageResult;
use crate::fields::Filter;
use crate::ops;
use crate::repository::TaskRepository;
use crate::task::{IdAllocator, Task};
use crate::view::{visible_tasks, FilterCounts};

/// What a mutation did to the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A task was created with this id.
    Added(u64),
    Changed,
    /// Unknown id or blank text; nothing was touched.
    Unchanged,
}

pub struct Session {
    repository: TaskRepository,
    tasks: Vec<Task>,
    filter: Filter,
    ids: IdAllocator,
    dirty: bool,
    load_warning: Option<String>,
}

impl Session {
    /// Open a session, loading the stored collection.
    ///
    /// An unreachable store does not fail the session: it starts empty and
    /// the reason is kept in [`Session::load_warning`].
    pub async fn open(repository: TaskRepository) -> Self {
        let (tasks, load_warning) = match repository.load().await {
            Ok(tasks) => (tasks, None),
            Err(e) => {
                warn!(error = %e, "could not load tasks, starting with an empty list");
                (Vec::new(), Some(e.to_string()))
            }
        };
        info!(count = tasks.len(), "session opened");
        Session {
            ids: IdAllocator::seeded_from(&tasks),
            repository,
            tasks,
            filter: Filter::default(),
            dirty: false,
            load_warning,
        }
    }

    /// Tasks in storage order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: u64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    pub fn set_filter(&mut self, filter: Filter) {
        self.filter = filter;
    }

    /// The current view: filtered and ordered by deadline.
    pub fn visible(&self) -> Vec<&Task> {
        visible_tasks(&self.tasks, self.filter)
    }

    pub fn counts(&self) -> FilterCounts {
        FilterCounts::of(&self.tasks)
    }

    /// Why the stored collection could not be loaded, if it could not.
    pub fn load_warning(&self) -> Option<&str> {
        self.load_warning.as_deref()
    }

    /// True while the last save failed and memory is ahead of storage.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Create a task. Blank text creates nothing.
    pub async fn add(&mut self, text: &str, deadline: Option<NaiveDate>) -> StorageResult<Outcome> {
        let Some(task) = Task::new(self.ids.next_id(), text, deadline) else {
            return Ok(Outcome::Unchanged);
        };
        let id = task.id;
        let next = ops::add_task(&self.tasks, task);
        self.commit(next).await?;
        Ok(Outcome::Added(id))
    }

    pub async fn toggle(&mut self, id: u64) -> StorageResult<Outcome> {
        let next = ops::toggle_task(&self.tasks, id);
        self.commit(next).await
    }

    pub async fn edit(&mut self, id: u64, new_text: &str) -> StorageResult<Outcome> {
        let next = ops::edit_task(&self.tasks, id, new_text);
        self.commit(next).await
    }

    pub async fn delete(&mut self, id: u64) -> StorageResult<Outcome> {
        let next = ops::delete_task(&self.tasks, id);
        self.commit(next).await
    }

    pub async fn update(&mut self, updated: Task) -> StorageResult<Outcome> {
        let next = ops::update_task(&self.tasks, &updated);
        self.commit(next).await
    }

    /// Replace the held collection and flush it.
    ///
    /// On `Err` the in-memory collection already holds `next`; the session
    /// stays usable and retries the write on the next mutation.
    async fn commit(&mut self, next: Vec<Task>) -> StorageResult<Outcome> {
        let outcome = if next == self.tasks {
            Outcome::Unchanged
        } else {
            Outcome::Changed
        };
        if let Some(max) = next.iter().map(|t| t.id).max() {
            self.ids.observe(max);
        }
        self.tasks = next;

        if outcome == Outcome::Unchanged && !self.dirty {
            return Ok(outcome);
        }
        match self.repository.save(&self.tasks).await {
            Ok(()) => {
                self.dirty = false;
                Ok(outcome)
            }
            Err(e) => {
                warn!(error = %e, "could not save tasks, changes are kept in memory only");
                self.dirty = true;
                Err(e)
            }
        }
    }
}
