//! ls command - List tracked files
//!
//! Prints a fixed-width table with a header row, or the records as JSON.

use std::path::Path;

use clap::Args;
use cmdata_core::TrackedFile;
use serde::Serialize;

use crate::exit_code::ExitCode;
use crate::output::{render_table, Formatter, OutputConfig};

/// List tracked files
#[derive(Args, Debug)]
pub struct LsArgs {
    /// Summarize output (show totals only)
    #[arg(long)]
    pub summarize: bool,
}

/// Output structure for ls command (JSON format)
#[derive(Debug, Serialize)]
struct LsOutput {
    items: Vec<LsItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<Summary>,
}

#[derive(Debug, Serialize)]
struct LsItem {
    name: String,
    service: String,
    size: u64,
    size_human: String,
    url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    added_at: Option<String>,
}

impl From<TrackedFile> for LsItem {
    fn from(f: TrackedFile) -> Self {
        Self {
            size_human: f.size_human(),
            added_at: f.added_at.map(|t| t.to_string()),
            name: f.name,
            service: f.service,
            size: f.size,
            url: f.url,
        }
    }
}

#[derive(Debug, Serialize)]
struct Summary {
    total_files: usize,
    total_size: u64,
    total_size_human: String,
}

fn summarize(files: &[TrackedFile]) -> Summary {
    let total_size: u64 = files.iter().map(|f| f.size).sum();
    Summary {
        total_files: files.len(),
        total_size,
        total_size_human: humansize::format_size(total_size, humansize::BINARY),
    }
}

/// Execute the ls command
pub async fn execute(
    args: LsArgs,
    config_path: Option<&Path>,
    output_config: OutputConfig,
) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let manager = match super::open_manager(config_path, &formatter).await {
        Ok(m) => m,
        Err(code) => return code,
    };

    let files = match manager.list() {
        Ok(files) => files,
        Err(e) => {
            formatter.error(&format!("Failed to list tracked files: {e}"));
            return ExitCode::from(&e);
        }
    };

    let summary = summarize(&files);

    if formatter.is_json() {
        formatter.json(&LsOutput {
            items: files.into_iter().map(LsItem::from).collect(),
            summary: args.summarize.then_some(summary),
        });
    } else if args.summarize {
        formatter.println(&format!(
            "Total: {} files, {}",
            summary.total_files, summary.total_size_human
        ));
    } else {
        formatter.println(&render_table(&files));
    }

    ExitCode::Success
}
