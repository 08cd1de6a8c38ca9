//! put command - Store an object
//!
//! Uploads a local file, or standard input when no file name is given, as
//! an `application/octet-stream` object.

use clap::Args;
use clap::builder::NonEmptyStringValueParser;
use sc_core::{ByteSource, ObjectStore, transfer};
use serde::Serialize;

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, ProgressBar};

/// Store an object
#[derive(Args, Debug)]
pub struct PutArgs {
    /// Destination bucket
    #[arg(value_parser = NonEmptyStringValueParser::new())]
    pub bucket: String,

    /// Name of the object to create or replace
    #[arg(value_parser = NonEmptyStringValueParser::new())]
    pub object: String,

    /// File to upload; standard input when omitted
    pub filename: Option<String>,
}

#[derive(Debug, Serialize)]
struct PutOutput {
    status: &'static str,
    source: String,
    bucket: String,
    object: String,
    size_bytes: u64,
    size_human: String,
}

/// Execute the put command
pub async fn execute<S>(args: PutArgs, store: &S, output_config: &OutputConfig) -> ExitCode
where
    S: ObjectStore + ?Sized,
{
    let formatter = Formatter::new(output_config.clone());
    let source = ByteSource::from_arg(args.filename.as_deref());

    let reader = match source.open().await {
        Ok(r) => r,
        Err(e) => {
            formatter.error(&e.to_string());
            return ExitCode::from(&e);
        }
    };

    let total = match &source {
        ByteSource::File(path) => tokio::fs::metadata(path).await.ok().map(|m| m.len()),
        ByteSource::Stdin => None,
    };
    let progress = ProgressBar::new(output_config, total, &args.object);
    let callback = progress.callback();

    let result = transfer::put(
        store,
        &args.bucket,
        &args.object,
        reader,
        callback.as_ref(),
    )
    .await;
    progress.finish_and_clear();

    match result {
        Ok(size) => {
            let size_human = humansize::format_size(size, humansize::BINARY);
            if formatter.is_json() {
                formatter.json(&PutOutput {
                    status: "success",
                    source: source.to_string(),
                    bucket: args.bucket,
                    object: args.object,
                    size_bytes: size,
                    size_human,
                });
            } else {
                formatter.success(&format!(
                    "Stored {source} as {}/{} ({size_human})",
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
