//! todo-sync CLI
//!
//! Command-line interface for a personal task list kept on a remote
//! task service.

use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use todo_core::Config;

mod app;
mod commands;
mod output;
mod prompt;

use app::App;
use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "todo")]
#[command(about = "todo-sync - Personal task list backed by a remote task service")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Use this config file instead of the default
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account
    Register {
        username: String,
        email: String,
        /// Password (prompted if omitted)
        #[arg(long)]
        password: Option<String>,
    },
    /// Log in and remember the session
    Login {
        username: String,
        /// Password (prompted if omitted)
        #[arg(long)]
        password: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// List tasks
    #[command(alias = "ls")]
    List {
        /// Only show open tasks
        #[arg(long)]
        open: bool,
    },
    /// Show a single task
    Show {
        /// Task ID
        id: i64,
    },
    /// Create a task
    #[command(alias = "create")]
    Add {
        /// Task title
        title: String,
        /// Task description
        #[arg(short, long)]
        description: Option<String>,
        /// Create the task already completed
        #[arg(long)]
        done: bool,
    },
    /// Change a task's title or description
    Edit {
        /// Task ID
        id: i64,
        #[arg(short = 'T', long)]
        title: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Toggle a task between open and completed
    #[command(alias = "toggle")]
    Done {
        /// Task ID
        id: i64,
    },
    /// Delete a task
    #[command(alias = "rm")]
    Delete {
        /// Task ID
        id: i64,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
    /// Show status (server, session, task counts)
    Status,
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (api_url, data_dir, log_file)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));
    let config_path = cli.config.as_ref();

    // Commands that don't talk to the server
    if let Commands::Config { command } = &cli.command {
        return match command.clone() {
            Some(ConfigCommands::Show) | None => commands::config::show(config_path, &output),
            Some(ConfigCommands::Set { key, value }) => {
                commands::config::set(key, value, config_path, &output)
            }
        };
    }

    let config = Config::load_with_cli_override(config_path)?;
    init_logging(&config);

    let mut app = App::open(config)?;

    // Register/login start from scratch; everything else picks up the stored session
    if !matches!(cli.command, Commands::Register { .. } | Commands::Login { .. }) {
        app.restore().await;
    }

    let result = run(cli.command, &mut app, &output).await;
    if let Err(ref e) = result {
        if let Some(hint) = app::recovery_hint(e) {
            eprintln!("Hint: {}", hint);
        }
    }
    result
}

async fn run(command: Commands, app: &mut App, output: &Output) -> Result<()> {
    match command {
        Commands::Register {
            username,
            email,
            password,
        } => commands::auth::register(app, username, email, password, output).await,
        Commands::Login { username, password } => {
            commands::auth::login(app, username, password, output).await
        }
        Commands::Logout => commands::auth::logout(app, output),
        Commands::Whoami => commands::auth::whoami(app, output),
        Commands::List { open } => commands::task::list(app, open, output).await,
        Commands::Show { id } => commands::task::show(app, id, output).await,
        Commands::Add {
            title,
            description,
            done,
        } => commands::task::add(app, title, description, done, output).await,
        Commands::Edit {
            id,
            title,
            description,
        } => commands::task::edit(app, id, title, description, output).await,
        Commands::Done { id } => commands::task::toggle(app, id, output).await,
        Commands::Delete { id, yes } => commands::task::delete(app, id, yes, output).await,
        Commands::Status => commands::status::show(app, output).await,
        Commands::Config { .. } => unreachable!(), // Handled above
    }
}

/// Initialize logging
///
/// Only initializes if TODO_LOG is set (e.g. `TODO_LOG=debug`).
/// Logs to config.log_file when set, otherwise stderr.
fn init_logging(config: &Config) {
    let Ok(log_level) = std::env::var("TODO_LOG") else {
        return;
    };

    let env_filter = EnvFilter::new(format!("todo_core={},todo_cli={}", log_level, log_level));

    match config.log_file {
        Some(ref log_path) => {
            let log_file = match File::create(log_path) {
                Ok(f) => f,
                Err(e) => {
                    eprintln!("Warning: Could not create log file {:?}: {}", log_path, e);
                    return;
                }
            };

            // Ignore error if already initialized
            let _ = tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(log_file))
                .try_init();

            info!("Logging initialized to {:?}", log_path);
        }
        None => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .try_init();
        }
    }
}
