//! CLI command definitions and execution
//!
//! This module contains all CLI commands and their implementations.
//! Each invocation runs exactly one command.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use cmdata_core::{open_store, ConfigManager, DataManager};

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

mod add;
mod completions;
mod del;
mod get;
mod ls;

/// cmdata - multi-service data access
///
/// Tracks files stored on local folders and cloud object stores through a
/// small metadata index.
#[derive(Parser, Debug)]
#[command(name = "cmdata")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Location of the configuration file
    #[arg(long, global = true, env = "CMDATA_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format: human-readable or JSON
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true, default_value = "false")]
    pub no_color: bool,

    /// Disable progress spinner
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
    /// Upload a file to a service and track it
    Add(add::AddArgs),

    /// Download a tracked file
    Get(get::GetArgs),

    /// Remove a tracked file from its service and the index
    Del(del::DelArgs),

    /// List tracked files
    #[command(visible_alias = "dir")]
    Ls(ls::LsArgs),

    /// Generate shell completion scripts
    Completions(completions::CompletionsArgs),
}

/// Execute the CLI command and return an exit code
pub async fn execute(cli: Cli) -> ExitCode {
    let output_config = OutputConfig {
        json: cli.json,
        no_color: cli.no_color,
        no_progress: cli.no_progress,
        quiet: cli.quiet,
    };
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Add(args) => add::execute(args, config_path, output_config).await,
        Commands::Get(args) => get::execute(args, config_path, output_config).await,
        Commands::Del(args) => del::execute(args, config_path, output_config).await,
        Commands::Ls(args) => ls::execute(args, config_path, output_config).await,
        Commands::Completions(args) => completions::execute(args),
    }
}

/// Load configuration and wire up the registry and metadata store
///
/// Reports the failure through `formatter` and returns the exit code to use.
async fn open_manager(
    config_path: Option<&Path>,
    formatter: &Formatter,
) -> Result<DataManager, ExitCode> {
    let config_manager = match config_path {
        Some(path) => ConfigManager::with_path(path.to_path_buf()),
        None => ConfigManager::new()
            .map_err(|e| fail(formatter, "Failed to locate configuration", &e))?,
    };

    let config = config_manager
        .load()
        .map_err(|e| fail(formatter, "Failed to load configuration", &e))?;

    let registry = cmdata_backends::build_registry(&config)
        .await
        .map_err(|e| fail(formatter, "Failed to configure services", &e))?;
    tracing::debug!(?registry, "services configured");

    let store =
        open_store(&config).map_err(|e| fail(formatter, "Failed to open metadata store", &e))?;

    Ok(DataManager::new(registry, store))
}

fn fail(formatter: &Formatter, context: &str, err: &cmdata_core::Error) -> ExitCode {
    formatter.error(&format!("{context}: {err}"));
    ExitCode::from(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_dir_is_alias_for_ls() {
        let cli = Cli::try_parse_from(["cmdata", "dir"]).unwrap();
        assert!(matches!(cli.command, Commands::Ls(_)));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["cmdata", "ls", "--json", "--config", "/tmp/c.toml"]).unwrap();
        assert!(cli.json);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.toml")));
    }

    #[test]
    fn test_unknown_command_rejected() {
        assert!(Cli::try_parse_from(["cmdata", "sync"]).is_err());
    }
}
