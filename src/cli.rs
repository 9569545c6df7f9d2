use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// Personal task list with deadlines.
/// Tasks are stored in `TODOS.json` under `~/.todo` or the directory passed via --data-dir.
#[derive(Parser)]
#[command(name = "todo", version, about = "Personal task list CLI")]
pub struct Cli {
    /// Directory holding the task store.
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Log debug output (overridden by RUST_LOG).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// The data directory, defaulting to `$HOME/.todo`.
    pub fn resolve_data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".todo")
        })
    }
}
