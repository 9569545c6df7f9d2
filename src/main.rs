use anyhow::Context;
use clap::Parser;

use tasklist::cli::Cli;
use tasklist::cmd::{cmd_completions, run_command, Commands};
use tasklist::logging::init_logging;
use tasklist::repository::TaskRepository;
use tasklist::session::Session;
use tasklist::storage::FileBlobStore;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let data_dir = cli.resolve_data_dir();

    // The UI owns the terminal, so its logs go to a file.
    let log_file = matches!(cli.command, Commands::Ui).then(|| data_dir.join("todo.log"));
    init_logging(cli.verbose, log_file.as_deref()).context("failed to set up logging")?;

    if let Commands::Completions { shell } = cli.command {
        cmd_completions(shell);
        return Ok(());
    }

    let store = FileBlobStore::new(&data_dir);
    tracing::debug!(path = %store.dir().display(), "using task store");
    let mut session = Session::open(TaskRepository::new(store)).await;
    if let Some(warning) = session.load_warning() {
        eprintln!("Warning: could not load tasks: {warning}");
    }

    run_command(&mut session, cli.command).await
}
