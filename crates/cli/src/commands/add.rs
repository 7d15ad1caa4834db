//! add command - Upload a file and track it
//!
//! `add FILE` uses the default service, `add SERVICE FILE` a named one.

use std::path::{Path, PathBuf};

use clap::Args;
use serde::Serialize;

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, ProgressBar};

/// Upload a file and track it
#[derive(Args, Debug)]
pub struct AddArgs {
    /// [SERVICE] FILE: optional service name followed by the local file
    #[arg(required = true, num_args = 1..=2, value_names = ["SERVICE", "FILE"])]
    pub operands: Vec<String>,

    /// Refuse to replace a file that is already tracked under the same name
    #[arg(long)]
    pub no_clobber: bool,
}

impl AddArgs {
    /// Split the operands into (service, file)
    fn service_and_file(&self) -> (Option<&str>, PathBuf) {
        match self.operands.as_slice() {
            [service, file] => (Some(service.as_str()), PathBuf::from(file)),
            [file] => (None, PathBuf::from(file)),
            // clap enforces one or two operands
            _ => (None, PathBuf::new()),
        }
    }
}

#[derive(Debug, Serialize)]
struct AddOutput {
    status: &'static str,
    name: String,
    service: String,
    size: u64,
    size_human: String,
    url: String,
}

/// Execute the add command
pub async fn execute(
    args: AddArgs,
    config_path: Option<&Path>,
    output_config: OutputConfig,
) -> ExitCode {
    let formatter = Formatter::new(output_config);
    let (service, file) = args.service_and_file();

    let manager = match super::open_manager(config_path, &formatter).await {
        Ok(m) => m,
        Err(code) => return code,
    };

    let spinner = ProgressBar::spinner(
        formatter.config(),
        &format!("Uploading {}", file.display()),
    );
    let result = manager.add(service, &file, !args.no_clobber).await;
    spinner.finish_and_clear();

    match result {
        Ok(tracked) => {
            if formatter.is_json() {
                formatter.json(&AddOutput {
                    status: "success",
                    size_human: tracked.size_human(),
                    name: tracked.name,
                    service: tracked.service,
                    size: tracked.size,
                    url: tracked.url,
                });
            } else {
                formatter.success(&format!(
                    "Added {} to {} ({})",
                    tracked.name,
                    tracked.service,
                    tracked.size_human()
                ));
            }
            ExitCode::Success
        }
        Err(e) => {
            formatter.error(&format!("Failed to add {}: {e}", file.display()));
            ExitCode::from(&e)
        }
    }
}
