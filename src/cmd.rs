//! Command implementations for the CLI interface.
//!
//! Each subcommand loads nothing itself: it runs against an open
//! [`Session`], which has already read the store and flushes it after every
//! change.

use std::io;

use anyhow::{anyhow, bail, Context, Result};
use chrono::{Local, NaiveDate};
use clap::{CommandFactory, Subcommand};
use clap_complete::{generate, Shell};

use crate::cli::Cli;
use crate::dates::{format_deadline_relative, parse_deadline_input};
use crate::fields::Filter;
use crate::session::{Outcome, Session};
use crate::task::Task;
use crate::tui::run::run_tui;
use crate::view::is_overdue;

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the interactive UI interface.
    Ui,

    /// Add a new task.
    Add {
        /// Task text. Multiple words are joined with spaces.
        #[arg(required = true)]
        text: Vec<String>,
        /// Deadline: YYYY-MM-DD, "today", "tomorrow", "fri", "next mon", "in Nd", "eom".
        #[arg(long)]
        deadline: Option<String>,
    },

    /// List tasks, earliest deadline first.
    List {
        /// Which tasks to show.
        #[arg(long, value_enum, default_value_t = Filter::All)]
        filter: Filter,
        /// Limit number of rows printed.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Flip a task between pending and completed.
    Toggle {
        /// Task ID or text
        id: String,
    },

    /// Replace the text of a task.
    Edit {
        /// Task ID or text
        id: String,
        /// New text.
        #[arg(required = true)]
        text: Vec<String>,
    },

    /// Update several fields of a task at once.
    Update {
        /// Task ID or text
        id: String,
        #[arg(long)]
        text: Option<String>,
        #[arg(long, conflicts_with = "clear_deadline")]
        deadline: Option<String>,
        /// Remove the deadline.
        #[arg(long)]
        clear_deadline: bool,
        /// Set completion explicitly: true | false.
        #[arg(long)]
        completed: Option<bool>,
    },

    /// Delete a task by ID or text.
    Delete {
        /// Task ID or text
        id: String,
    },

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl Commands {
    /// Whether the command writes to the task store.
    pub fn mutates(&self) -> bool {
        matches!(
            self,
            Commands::Add { .. }
                | Commands::Toggle { .. }
                | Commands::Edit { .. }
                | Commands::Update { .. }
                | Commands::Delete { .. }
        )
    }
}

/// Run a parsed command against an open session.
pub async fn run_command(session: &mut Session, command: Commands) -> Result<()> {
    if command.mutates() {
        if let Some(warning) = session.load_warning() {
            bail!("refusing to modify tasks that could not be loaded: {warning}");
        }
    }

    match command {
        Commands::Ui => cmd_ui(session).await,
        Commands::Add { text, deadline } => cmd_add(session, text, deadline).await,
        Commands::List { filter, limit } => {
            cmd_list(session, filter, limit);
            Ok(())
        }
        Commands::Toggle { id } => cmd_toggle(session, &id).await,
        Commands::Edit { id, text } => cmd_edit(session, &id, text).await,
        Commands::Update { id, text, deadline, clear_deadline, completed } => {
            cmd_update(session, &id, text, deadline, clear_deadline, completed).await
        }
        Commands::Delete { id } => cmd_delete(session, &id).await,
        Commands::Completions { shell } => {
            cmd_completions(shell);
            Ok(())
        }
    }
}

/// Launch the terminal user interface.
pub async fn cmd_ui(session: &mut Session) -> Result<()> {
    run_tui(session).await.context("UI error")
}

/// Add a new task.
pub async fn cmd_add(session: &mut Session, text: Vec<String>, deadline: Option<String>) -> Result<()> {
    let deadline = parse_deadline_arg(deadline.as_deref())?;
    match session.add(&text.join(" "), deadline).await.context("could not save tasks")? {
        Outcome::Added(id) => {
            println!("Added task {id}");
            Ok(())
        }
        _ => bail!("Task text cannot be empty"),
    }
}

/// List tasks matching `filter` in display order.
pub fn cmd_list(session: &Session, filter: Filter, limit: Option<usize>) {
    let mut visible = crate::view::visible_tasks(session.tasks(), filter);
    if let Some(n) = limit {
        visible.truncate(n);
    }
    let today = Local::now().date_naive();
    print!("{}", render_table(&visible, today));
    println!("{} of {} tasks ({})", visible.len(), session.tasks().len(), filter.label());
}

/// Flip completion on a task.
pub async fn cmd_toggle(session: &mut Session, identifier: &str) -> Result<()> {
    let id = resolve_task_identifier(identifier, session.tasks()).map_err(|e| anyhow!(e))?;
    session.toggle(id).await.context("could not save tasks")?;
    let state = match session.get(id) {
        Some(task) if task.completed => "done",
        _ => "pending",
    };
    println!("Task {id} is now {state}");
    Ok(())
}

/// Replace a task's text.
pub async fn cmd_edit(session: &mut Session, identifier: &str, text: Vec<String>) -> Result<()> {
    let id = resolve_task_identifier(identifier, session.tasks()).map_err(|e| anyhow!(e))?;
    let text = text.join(" ");
    if text.trim().is_empty() {
        bail!("Task text cannot be empty");
    }
    match session.edit(id, &text).await.context("could not save tasks")? {
        Outcome::Unchanged => println!("Task {id} already reads that way"),
        _ => println!("Updated task {id}"),
    }
    Ok(())
}

/// Update text, deadline and completion of a task in one write.
pub async fn cmd_update(
    session: &mut Session,
    identifier: &str,
    text: Option<String>,
    deadline: Option<String>,
    clear_deadline: bool,
    completed: Option<bool>,
) -> Result<()> {
    let id = resolve_task_identifier(identifier, session.tasks()).map_err(|e| anyhow!(e))?;
    let Some(current) = session.get(id).cloned() else {
        bail!("Task {id} not found");
    };

    if text.as_deref().is_some_and(|t| t.trim().is_empty()) {
        bail!("Task text cannot be empty");
    }
    let deadline = if clear_deadline {
        None
    } else {
        parse_deadline_arg(deadline.as_deref())?.or(current.deadline)
    };

    let updated = Task {
        id,
        text: text.unwrap_or(current.text),
        completed: completed.unwrap_or(current.completed),
        deadline,
    };

    match session.update(updated).await.context("could not save tasks")? {
        Outcome::Unchanged => println!("Nothing to update for task {id}"),
        _ => println!("Updated task {id}"),
    }
    Ok(())
}

/// Delete a task.
pub async fn cmd_delete(session: &mut Session, identifier: &str) -> Result<()> {
    let id = resolve_task_identifier(identifier, session.tasks()).map_err(|e| anyhow!(e))?;
    session.delete(id).await.context("could not save tasks")?;
    println!("Deleted task {id}");
    Ok(())
}

/// Print a completion script for `shell` to stdout.
pub fn cmd_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "todo", &mut io::stdout());
}

fn parse_deadline_arg(input: Option<&str>) -> Result<Option<NaiveDate>> {
    match input {
        None => Ok(None),
        Some(s) => parse_deadline_input(s).map(Some).ok_or_else(|| {
            anyhow!("Could not understand deadline '{s}'. Try YYYY-MM-DD, today, tomorrow, fri or in 3d")
        }),
    }
}

/// Resolve a task identifier (either ID or exact text, ignoring case) to a task ID.
/// An ID wins over a task whose text happens to be the same number.
/// Returns an error if the text has multiple matches and suggests using the ID instead.
pub fn resolve_task_identifier(identifier: &str, tasks: &[Task]) -> Result<u64, String> {
    let numeric = identifier.trim().parse::<u64>().ok();
    if let Some(id) = numeric {
        if tasks.iter().any(|t| t.id == id) {
            return Ok(id);
        }
    }

    let wanted = identifier.trim().to_lowercase();
    let matches: Vec<&Task> = tasks
        .iter()
        .filter(|t| t.text.to_lowercase() == wanted)
        .collect();

    match matches.as_slice() {
        [] => Err(match numeric {
            Some(id) => format!("Task with ID {id} not found"),
            None => format!("No task found with text '{identifier}'"),
        }),
        [task] => Ok(task.id),
        _ => {
            let mut error_msg = format!("Multiple tasks found with text '{identifier}':\n");
            for task in matches {
                error_msg.push_str(&format!("  ID {}: {}\n", task.id, task.text));
            }
            error_msg.push_str("Please use the specific ID instead.");
            Err(error_msg)
        }
    }
}

/// Render tasks as a plain-text table. Overdue deadlines are flagged with `!`.
pub fn render_table(tasks: &[&Task], today: NaiveDate) -> String {
    let mut out = format!("{:<15} {:<4} {:<12} {}\n", "ID", "Done", "Deadline", "Task");
    for t in tasks {
        let mut deadline = format_deadline_relative(t.deadline, today);
        if is_overdue(t, today) {
            deadline.push_str(" !");
        }
        out.push_str(&format!(
            "{:<15} {:<4} {:<12} {}\n",
            t.id,
            if t.completed { "[x]" } else { "[ ]" },
            deadline,
            truncate(&t.text, 60)
        ));
    }
    out
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{TaskRepository, STORAGE_KEY};
    use crate::storage::MemoryBlobStore;
    use rstest::rstest;

    fn task(id: u64, text: &str, completed: bool, deadline: Option<NaiveDate>) -> Task {
        Task { id, text: text.into(), completed, deadline }
    }

    async fn session() -> Session {
        Session::open(TaskRepository::new(MemoryBlobStore::new())).await
    }

    fn words(s: &str) -> Vec<String> {
        s.split(' ').map(String::from).collect()
    }

    #[rstest]
    #[case("2", Ok(2))]
    #[case("walk DOG", Ok(2))]
    #[case("9", Err("Task with ID 9 not found"))]
    #[case("nope", Err("No task found with text 'nope'"))]
    #[case("42", Ok(3))]
    #[case("1", Ok(1))]
    fn test_resolve_task_identifier(#[case] input: &str, #[case] expected: Result<u64, &str>) {
        let tasks = vec![
            task(1, "Buy milk", false, None),
            task(2, "Walk dog", false, None),
            task(3, "42", false, None),
            task(4, "1", false, None),
        ];
        assert_eq!(resolve_task_identifier(input, &tasks), expected.map_err(String::from));
    }

    #[test]
    fn test_resolve_ambiguous_text_asks_for_id() {
        let tasks = vec![task(1, "Call", false, None), task(2, "call", false, None)];
        let err = resolve_task_identifier("call", &tasks).unwrap_err();
        assert!(err.contains("ID 1: Call"));
        assert!(err.contains("ID 2: call"));
    }

    #[test]
    fn test_render_table_flags_overdue() {
        let today = NaiveDate::from_ymd_opt(2025, 1, 8).unwrap();
        let late = task(1, "Pay rent", false, NaiveDate::from_ymd_opt(2025, 1, 6));
        let done = task(2, "Walk dog", true, NaiveDate::from_ymd_opt(2025, 1, 6));
        let table = render_table(&[&late, &done], today);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].contains("2d late !"));
        assert!(lines[1].contains("[ ]"));
        assert!(!lines[2].contains('!'));
        assert!(lines[2].contains("[x]"));
    }

    #[rstest]
    #[case("short", 10, "short")]
    #[case("exactly10!", 10, "exactly10!")]
    #[case("much longer text", 6, "much …")]
    fn test_truncate(#[case] input: &str, #[case] width: usize, #[case] expected: &str) {
        assert_eq!(truncate(input, width), expected);
    }

    #[tokio::test]
    async fn test_add_toggle_update_delete_flow() {
        let mut s = session().await;
        run_command(&mut s, Commands::Add { text: words("Buy milk"), deadline: Some("2025-01-10".into()) })
            .await
            .unwrap();
        let id = s.tasks()[0].id;
        assert_eq!(s.tasks()[0].text, "Buy milk");

        run_command(&mut s, Commands::Toggle { id: "buy milk".into() }).await.unwrap();
        assert!(s.get(id).unwrap().completed);

        run_command(
            &mut s,
            Commands::Update {
                id: id.to_string(),
                text: Some("Buy oat milk".into()),
                deadline: None,
                clear_deadline: true,
                completed: Some(false),
            },
        )
        .await
        .unwrap();
        assert_eq!(s.get(id), Some(&task(id, "Buy oat milk", false, None)));

        run_command(&mut s, Commands::Delete { id: id.to_string() }).await.unwrap();
        assert!(s.tasks().is_empty());
    }

    #[tokio::test]
    async fn test_update_keeps_unmentioned_fields() {
        let mut s = session().await;
        let due = NaiveDate::from_ymd_opt(2025, 3, 1);
        s.add("Renew passport", due).await.unwrap();
        let id = s.tasks()[0].id;

        run_command(
            &mut s,
            Commands::Update { id: id.to_string(), text: None, deadline: None, clear_deadline: false, completed: Some(true) },
        )
        .await
        .unwrap();
        assert_eq!(s.get(id), Some(&task(id, "Renew passport", true, due)));
    }

    #[tokio::test]
    async fn test_blank_text_is_reported() {
        let mut s = session().await;
        assert!(run_command(&mut s, Commands::Add { text: words(" "), deadline: None }).await.is_err());
        s.add("Keep me", None).await.unwrap();
        let id = s.tasks()[0].id.to_string();
        assert!(run_command(&mut s, Commands::Edit { id, text: words(" ") }).await.is_err());
        assert_eq!(s.tasks()[0].text, "Keep me");
    }

    #[tokio::test]
    async fn test_bad_deadline_is_reported() {
        let mut s = session().await;
        let err = run_command(&mut s, Commands::Add { text: words("x"), deadline: Some("someday".into()) })
            .await
            .unwrap_err();
        assert!(err.to_string().contains("someday"));
        assert!(s.tasks().is_empty());
    }

    #[tokio::test]
    async fn test_mutations_refused_after_failed_load() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "x").unwrap();
        let repo = TaskRepository::new(crate::storage::FileBlobStore::new(&blocker));
        let mut s = Session::open(repo).await;

        assert!(run_command(&mut s, Commands::Add { text: words("x"), deadline: None }).await.is_err());
        run_command(&mut s, Commands::List { filter: Filter::All, limit: None }).await.unwrap();
    }

    #[tokio::test]
    async fn test_list_reads_existing_store() {
        let raw = r#"[{"id": 1, "text": "Stored", "completed": false}]"#;
        let mut s = Session::open(TaskRepository::new(MemoryBlobStore::with_entry(STORAGE_KEY, raw))).await;
        assert_eq!(s.tasks().len(), 1);
        run_command(&mut s, Commands::List { filter: Filter::Pending, limit: Some(1) }).await.unwrap();
    }
}
