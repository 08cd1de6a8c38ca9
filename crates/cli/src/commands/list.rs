//! list command - List objects in a bucket
//!
//! Prints every object name in the bucket in byte order, narrowed to the
//! names matching an optional regular expression.

use clap::Args;
use clap::builder::NonEmptyStringValueParser;
use sc_core::{ObjectStore, listing};
use serde::Serialize;

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// List objects in a bucket
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Bucket to list
    #[arg(value_parser = NonEmptyStringValueParser::new())]
    pub bucket: String,

    /// Regular expression matched anywhere in the object name
    pub filter: Option<String>,

    /// Names requested per page [default: service limit]
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    pub page_size: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ListOutput {
    bucket: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<String>,
    objects: Vec<String>,
    total: usize,
}

/// Execute the list command
///
/// `configured_page_size` applies when `--page-size` is not given.
pub async fn execute<S>(
    args: ListArgs,
    store: &S,
    configured_page_size: Option<u32>,
    output_config: &OutputConfig,
) -> ExitCode
where
    S: ObjectStore + ?Sized,
{
    let formatter = Formatter::new(output_config.clone());
    let page_size = args.page_size.or(configured_page_size);

    let names = match listing::list(store, &args.bucket, args.filter.as_deref(), page_size).await
    {
        Ok(names) => names,
        Err(e) => {
            formatter.error(&e.to_string());
            return ExitCode::from(&e);
        }
    };

    if formatter.is_json() {
        formatter.json(&ListOutput {
            bucket: args.bucket,
            filter: args.filter.filter(|f| !f.is_empty()),
            total: names.len(),
            objects: names,
        });
    } else {
        for name in &names {
            formatter.println(name);
        }
    }
    ExitCode::Success
}
