//! get command - Download a tracked file
//!
//! The service is taken from the file's metadata record.

use std::path::{Path, PathBuf};

use clap::Args;
use serde::Serialize;

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, ProgressBar};

const NOT_FOUND_MESSAGE: &str = "Requested file not found. Use `ls` to see a list of file names.";

/// Download a tracked file
#[derive(Args, Debug)]
pub struct GetArgs {
    /// Name of the tracked file
    pub file: String,

    /// Folder to download into (default: current directory)
    pub dest_folder: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct GetOutput {
    status: &'static str,
    name: String,
    service: String,
    destination: String,
}

/// Execute the get command
pub async fn execute(
    args: GetArgs,
    config_path: Option<&Path>,
    output_config: OutputConfig,
) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let manager = match super::open_manager(config_path, &formatter).await {
        Ok(m) => m,
        Err(code) => return code,
    };

    let spinner = ProgressBar::spinner(formatter.config(), &format!("Downloading {}", args.file));
    let result = manager.get(&args.file, args.dest_folder.as_deref()).await;
    spinner.finish_and_clear();

    match result {
        Ok(tracked) => {
            let dest = args
                .dest_folder
                .as_deref()
                .unwrap_or_else(|| Path::new(cmdata_core::manager::DEFAULT_DEST_FOLDER))
                .join(&tracked.name);
            if formatter.is_json() {
                formatter.json(&GetOutput {
                    status: "success",
                    name: tracked.name,
                    service: tracked.service,
                    destination: dest.display().to_string(),
                });
            } else {
                formatter.success(&format!(
                    "Downloaded {} from {} to {}",
                    tracked.name,
                    tracked.service,
                    dest.display()
                ));
            }
            ExitCode::Success
        }
        Err(e @ cmdata_core::Error::NotFound(_)) => {
            tracing::debug!(error = %e, "get failed");
            formatter.error(NOT_FOUND_MESSAGE);
            ExitCode::NotFound
        }
        Err(e) => {
            formatter.error(&format!("Failed to get {}: {e}", args.file));
            ExitCode::from(&e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{Cli, Commands};
    use clap::Parser;

    #[test]
    fn test_get_default_destination() {
        let cli = Cli::try_parse_from(["cmdata", "get", "notes.txt"]).unwrap();
        match cli.command {
            Commands::Get(args) => {
                assert_eq!(args.file, "notes.txt");
                assert!(args.dest_folder.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_get_with_destination() {
        let cli = Cli::try_parse_from(["cmdata", "get", "notes.txt", "/tmp/out"]).unwrap();
        match cli.command {
            Commands::Get(args) => assert_eq!(args.dest_folder, Some(PathBuf::from("/tmp/out"))),
            other => panic!("unexpected command {other:?}"),
        }
    }
}
