//! CLI command definitions and execution
//!
//! Every storage command runs inside one session: configuration is loaded,
//! credentials are resolved, the client logs in, the command runs and the
//! session is logged out again whatever the outcome.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use sc_core::{Config, ConfigManager, Credentials};
use sc_swift::SwiftClient;

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

mod about;
mod completions;
mod get;
mod list;
mod put;
mod remove;

/// swift - OpenStack Swift CLI Client
///
/// Retrieve, store, list, remove and describe objects in an OpenStack Swift
/// object store. Credentials come from the usual OS_* environment variables
/// or from the configuration file.
#[derive(Parser, Debug)]
#[command(name = "swift")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file [default: $HOME/.swift.yaml]
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output format: human-readable or JSON
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true, default_value = "false")]
    pub no_color: bool,

    /// Disable progress bar
    #[arg(long, global = true, default_value = "false")]
    pub no_progress: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, default_value = "false")]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long, global = true, default_value = "false")]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Retrieve an object into a file or standard output
    #[command(visible_aliases = ["retrieve", "download"])]
    Get(get::GetArgs),

    /// Store a file or standard input as an object
    #[command(visible_aliases = ["store", "upload"])]
    Put(put::PutArgs),

    /// List the objects in a bucket, optionally filtered by a regular expression
    #[command(visible_aliases = ["ls", "search", "find", "l", "s", "f"])]
    List(list::ListArgs),

    /// Remove an object
    #[command(visible_aliases = ["drop", "delete", "rem", "del", "rm"])]
    Remove(remove::RemoveArgs),

    /// Show object metadata
    #[command(visible_aliases = ["info"])]
    About(about::AboutArgs),

    /// Generate shell completion scripts
    Completions(completions::CompletionsArgs),
}

/// A command that runs against an authenticated session
#[derive(Debug)]
enum StorageCommand {
    Get(get::GetArgs),
    Put(put::PutArgs),
    List(list::ListArgs),
    Remove(remove::RemoveArgs),
    About(about::AboutArgs),
}

impl Commands {
    /// Split the session-bound commands from those that run locally
    fn into_storage(self) -> Result<StorageCommand, completions::CompletionsArgs> {
        match self {
            Commands::Get(args) => Ok(StorageCommand::Get(args)),
            Commands::Put(args) => Ok(StorageCommand::Put(args)),
            Commands::List(args) => Ok(StorageCommand::List(args)),
            Commands::Remove(args) => Ok(StorageCommand::Remove(args)),
            Commands::About(args) => Ok(StorageCommand::About(args)),
            Commands::Completions(args) => Err(args),
        }
    }
}

/// Execute the CLI command and return an exit code
pub async fn execute(cli: Cli) -> ExitCode {
    let output_config = OutputConfig {
        json: cli.json,
        no_color: cli.no_color,
        no_progress: cli.no_progress,
        quiet: cli.quiet,
    };

    match cli.command.into_storage() {
        Ok(command) => run_in_session(command, cli.config.as_deref(), output_config).await,
        Err(args) => completions::execute(args),
    }
}

async fn run_in_session(
    command: StorageCommand,
    config_path: Option<&Path>,
    output_config: OutputConfig,
) -> ExitCode {
    let formatter = Formatter::new(output_config.clone());

    let (mut client, config) = match login(config_path).await {
        Ok(session) => session,
        Err(e) => {
            formatter.error(&e.to_string());
            return ExitCode::from(&e);
        }
    };

    let code = match command {
        StorageCommand::Get(args) => get::execute(args, &client, &output_config).await,
        StorageCommand::Put(args) => put::execute(args, &client, &output_config).await,
        StorageCommand::List(args) => {
            list::execute(args, &client, config.page_size, &output_config).await
        }
        StorageCommand::Remove(args) => remove::execute(args, &client, &output_config).await,
        StorageCommand::About(args) => about::execute(args, &client, &output_config).await,
    };

    client.logout();
    code
}

/// Load configuration, resolve credentials and open a session
async fn login(config_path: Option<&Path>) -> sc_core::Result<(SwiftClient, Config)> {
    let manager = ConfigManager::resolve(config_path)?;
    let config = manager.load()?;
    tracing::debug!(path = %manager.config_path().display(), "configuration loaded");

    let credentials = Credentials::from_env(&config)?;
    let client = SwiftClient::login(&credentials, &config.timeout_config()).await?;
    Ok((client, config))
}
