//! Whole-collection persistence for tasks.
//!
//! The collection is stored as one JSON array under a single fixed key. Every
//! save overwrites the previous value; there is no delta log and no schema
//! version.

use tracing::{debug, warn};

use crate::error::StorageResult;
use crate::storage::BlobStore;
use crate::task::{normalise_text, Task};

/// Key the task collection lives under.
pub const STORAGE_KEY: &str = "TODOS";

/// Loads and saves the task collection through a [`BlobStore`].
pub struct TaskRepository {
    store: Box<dyn BlobStore>,
    key: String,
}

impl TaskRepository {
    pub fn new(store: impl BlobStore + 'static) -> Self {
        TaskRepository {
            store: Box::new(store),
            key: STORAGE_KEY.to_string(),
        }
    }

    /// Load the persisted collection.
    ///
    /// Nothing stored yet gives an empty collection, as does a blob that is
    /// not a valid task array. Only an unreachable store is an error.
    pub async fn load(&self) -> StorageResult<Vec<Task>> {
        let Some(raw) = self.store.get(&self.key).await? else {
            debug!(key = %self.key, "no stored tasks, starting empty");
            return Ok(Vec::new());
        };

        let tasks: Vec<Task> = match serde_json::from_str(&raw) {
            Ok(tasks) => tasks,
            Err(e) => {
                warn!(key = %self.key, error = %e, "stored tasks are malformed, starting empty");
                return Ok(Vec::new());
            }
        };

        let before = tasks.len();
        let tasks: Vec<Task> = tasks
            .into_iter()
            .filter_map(|t| Some(Task { text: normalise_text(&t.text)?, ..t }))
            .collect();
        if tasks.len() != before {
            warn!(dropped = before - tasks.len(), "skipped stored tasks with blank text");
        }

        debug!(key = %self.key, count = tasks.len(), "loaded tasks");
        Ok(tasks)
    }

    /// Serialise the whole collection and write it as one unit.
    pub async fn save(&self, tasks: &[Task]) -> StorageResult<()> {
        let data = serde_json::to_string_pretty(tasks)?;
        self.store.put(&self.key, &data).await?;
        debug!(key = %self.key, count = tasks.len(), "saved tasks");
        Ok(())
    }
}
