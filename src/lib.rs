//! # todo - Personal Task List
//!
//! A small task list for one person: short text tasks with an optional
//! deadline, a completed flag, and a choice of views. Usable from the command
//! line or from an interactive terminal user interface (TUI).
//!
//! ## Key Features
//!
//! - **Pure Core**: Every change (add, toggle, edit, delete, update) is a pure
//!   function from one collection to the next, see [`ops`].
//! - **Deadline Ordering**: Views list dated tasks first, earliest deadline
//!   first, keeping insertion order among undated tasks, see [`view`].
//! - **Filters**: All, Pending, Completed.
//! - **Local File Storage**: The whole list lives in one JSON file and is
//!   rewritten after every change.
//!
//! ## Quick Start
//!
//! ```bash
//! # Add a task with a deadline
//! todo add Renew passport --deadline "next friday"
//!
//! # List pending tasks
//! todo list --filter pending
//!
//! # Mark it done, by ID or by text
//! todo toggle "renew passport"
//!
//! # Or do everything interactively
//! todo ui
//! ```
//!
//! Data is stored in `~/.todo/TODOS.json` unless `--data-dir` says otherwise.

pub mod cli;
pub mod cmd;
pub mod dates;
pub mod error;
pub mod fields;
pub mod logging;
pub mod ops;
pub mod repository;
pub mod session;
pub mod storage;
pub mod task;
pub mod view;
pub mod tui {
    pub mod app;
    pub mod colors;
    pub mod enums;
    pub mod input;
    pub mod run;
    pub mod task_form;
    pub mod utils;
}
