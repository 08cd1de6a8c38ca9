//! remove command - Remove an object

use clap::Args;
use clap::builder::NonEmptyStringValueParser;
use sc_core::{ObjectStore, transfer};
use serde::Serialize;

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Remove an object
#[derive(Args, Debug)]
pub struct RemoveArgs {
    /// Bucket holding the object
    #[arg(value_parser = NonEmptyStringValueParser::new())]
    pub bucket: String,

    /// Name of the object to remove
    #[arg(value_parser = NonEmptyStringValueParser::new())]
    pub object: String,
}

#[derive(Debug, Serialize)]
struct RemoveOutput {
    status: &'static str,
    bucket: String,
    object: String,
}

/// Execute the remove command
pub async fn execute<S>(args: RemoveArgs, store: &S, output_config: &OutputConfig) -> ExitCode
where
    S: ObjectStore + ?Sized,
{
    let formatter = Formatter::new(output_config.clone());

    match transfer::delete(store, &args.bucket, &args.object).await {
        Ok(()) => {
            if formatter.is_json() {
                formatter.json(&RemoveOutput {
                    status: "success",
                    bucket: args.bucket,
                    object: args.object,
                });
            } else {
                formatter.success(&format!("Removed {}/{}", args.bucket, args.object));
            }
            ExitCode::Success
        }
        Err(e) => {
            formatter.error(&e.to_string());
            ExitCode::from(&e)
        }
    }
}
