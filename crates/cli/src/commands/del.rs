//! del command - Remove a tracked file
//!
//! Removes the stored object first and the index entry second.

use std::path::Path;

use clap::Args;
use serde::Serialize;

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, ProgressBar};

/// Remove a tracked file
#[derive(Args, Debug)]
pub struct DelArgs {
    /// Name of the tracked file
    pub file: String,
}

#[derive(Debug, Serialize)]
struct DelOutput {
    status: &'static str,
    name: String,
    service: String,
}

/// Execute the del command
pub async fn execute(
    args: DelArgs,
    config_path: Option<&Path>,
    output_config: OutputConfig,
) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let manager = match super::open_manager(config_path, &formatter).await {
        Ok(m) => m,
        Err(code) => return code,
    };

    let spinner = ProgressBar::spinner(formatter.config(), &format!("Removing {}", args.file));
    let result = manager.delete(&args.file).await;
    spinner.finish_and_clear();

    match result {
        Ok(removed) => {
            if formatter.is_json() {
                formatter.json(&DelOutput {
                    status: "success",
                    name: removed.name,
                    service: removed.service,
                });
            } else {
                formatter.success(&format!("Removed {} from {}", removed.name, removed.service));
            }
            ExitCode::Success
        }
        Err(e) => {
            formatter.error(&format!("Failed to delete {}: {e}", args.file));
            ExitCode::from(&e)
        }
    }
}
