//! get command - Retrieve an object
//!
//! Streams an object into a local file, or to standard output when no file
//! name is given.

use clap::Args;
use clap::builder::NonEmptyStringValueParser;
use sc_core::{ByteSink, ObjectStore, transfer};
use serde::Serialize;

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, ProgressBar};

/// Retrieve an object
#[derive(Args, Debug)]
pub struct GetArgs {
    /// Bucket holding the object
    #[arg(value_parser = NonEmptyStringValueParser::new())]
    pub bucket: String,

    /// Name of the object
    #[arg(value_parser = NonEmptyStringValueParser::new())]
    pub object: String,

    /// File to write; standard output when omitted
    pub filename: Option<String>,
}

#[derive(Debug, Serialize)]
struct GetOutput {
    status: &'static str,
    bucket: String,
    object: String,
    target: String,
    size_bytes: u64,
    size_human: String,
}

/// Execute the get command
pub async fn execute<S>(args: GetArgs, store: &S, output_config: &OutputConfig) -> ExitCode
where
    S: ObjectStore + ?Sized,
{
    let formatter = Formatter::new(output_config.clone());
    let sink = ByteSink::from_arg(args.filename.as_deref());

    // Object data owns standard output; keep it free of decorations.
    let progress = if sink.is_stdout() {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(output_config, None, &args.object)
    };
    let callback = progress.callback();

    let result = transfer::download(
        store,
        &args.bucket,
        &args.object,
        &sink,
        callback.as_ref(),
    )
    .await;
    progress.finish_and_clear();

    match result {
        Ok(size) => {
            if sink.is_stdout() {
                return ExitCode::Success;
            }
            let size_human = humansize::format_size(size, humansize::BINARY);
            if formatter.is_json() {
                formatter.json(&GetOutput {
                    status: "success",
                    bucket: args.bucket,
                    object: args.object,
                    target: sink.to_string(),
                    size_bytes: size,
                    size_human,
                });
            } else {
                formatter.success(&format!(
                    "Retrieved {}/{} into {sink} ({size_human})",
                    args.bucket, args.object
                ));
            }
            ExitCode::Success
        }
        Err(e) => {
            formatter.error(&e.to_string());
            ExitCode::from(&e)
        }
    }
}
