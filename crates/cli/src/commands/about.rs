//! about command - Show object metadata
//!
//! Displays the system and user metadata of an object without downloading
//! its body.

use std::collections::BTreeMap;

use clap::Args;
use clap::builder::NonEmptyStringValueParser;
use sc_core::{ObjectStore, metadata};
use serde::Serialize;

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Show object metadata
#[derive(Args, Debug)]
pub struct AboutArgs {
    /// Bucket holding the object
    #[arg(value_parser = NonEmptyStringValueParser::new())]
    pub bucket: String,

    /// Name of the object
    #[arg(value_parser = NonEmptyStringValueParser::new())]
    pub object: String,

    /// Render the metadata as a table
    #[arg(long)]
    pub table: bool,
}

#[derive(Debug, Serialize)]
struct AboutOutput {
    bucket: String,
    object: String,
    metadata: BTreeMap<String, String>,
}

/// Execute the about command
pub async fn execute<S>(args: AboutArgs, store: &S, output_config: &OutputConfig) -> ExitCode
where
    S: ObjectStore + ?Sized,
{
    let formatter = Formatter::new(output_config.clone());

    let info = match metadata::about(store, &args.bucket, &args.object).await {
        Ok(info) => info,
        Err(e) => {
            formatter.error(&e.to_string());
            return ExitCode::from(&e);
        }
    };
    let sorted: BTreeMap<String, String> = info.into_iter().collect();

    if formatter.is_json() {
        formatter.json(&AboutOutput {
            bucket: args.bucket,
            object: args.object,
            metadata: sorted,
        });
    } else if args.table {
        let rows: Vec<(String, String)> = sorted.into_iter().collect();
        formatter.table(["Key", "Value"], &rows);
    } else {
        for line in render_lines(&sorted) {
            formatter.println(&line);
        }
    }
    ExitCode::Success
}

/// `"key": "value"` lines in key order
fn render_lines(metadata: &BTreeMap<String, String>) -> Vec<String> {
    metadata
        .iter()
        .map(|(key, value)| format!("{key:?}: {value:?}"))
        .collect()
}
