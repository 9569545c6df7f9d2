//! Task data structure and id allocation.
//!
//! This module defines the `Task` record that the whole application revolves
//! around, the text normalisation every mutation goes through, and the
//! `IdAllocator` used by the shells to hand out creation-time identities.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::dates::deserialize_deadline;

/// A single to-do item.
///
/// `text` is never blank for a task that made it into a collection, and
/// `deadline` is a plain calendar date: `None` means "no deadline".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_deadline"
    )]
    pub deadline: Option<NaiveDate>,
}

impl Task {
    /// Create a pending task, or `None` when `text` is blank after trimming.
    pub fn new(id: u64, text: &str, deadline: Option<NaiveDate>) -> Option<Self> {
        let text = normalise_text(text)?;
        Some(Task {
            id,
            text,
            completed: false,
            deadline,
        })
    }
}

/// Trim task text, returning `None` for empty or whitespace-only input.
pub fn normalise_text(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Hands out task ids that are unique for the lifetime of a session.
///
/// Ids stay timestamp-shaped (milliseconds since the Unix epoch) but never go
/// backwards: each id is at least one greater than the last one issued or
/// seen in the loaded collection, so rapid successive creation cannot collide
/// and a deleted id is never handed out again.
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    last: u64,
}

impl IdAllocator {
    /// Seed the allocator with the highest id already present.
    pub fn seeded_from(tasks: &[Task]) -> Self {
        IdAllocator {
            last: tasks.iter().map(|t| t.id).max().unwrap_or(0),
        }
    }

    /// Allocate the next id using the current wall clock.
    pub fn next_id(&mut self) -> u64 {
        let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0);
        self.next_id_at(now)
    }

    /// Allocate the next id for a given clock reading in milliseconds.
    pub fn next_id_at(&mut self, now_millis: u64) -> u64 {
        let id = now_millis.max(self.last.saturating_add(1));
        self.last = id;
        id
    }

    /// Make sure ids handed out later stay above `id`.
    pub fn observe(&mut self, id: u64) {
        self.last = self.last.max(id);
    }
}
