//! Listing and filter engine
//!
//! Collects every page of object names in a bucket, sorts them by raw byte
//! value and optionally keeps only the names matching a regular expression.

use regex::Regex;

use crate::error::{Error, Result};
use crate::traits::{ListOptions, ObjectStore};

/// Compile a filter pattern; an absent or empty pattern means "match all"
///
/// Patterns are unanchored and case-sensitive.
pub fn compile_filter(pattern: Option<&str>) -> Result<Option<Regex>> {
    match pattern {
        Some(p) if !p.is_empty() => Ok(Some(Regex::new(p)?)),
        _ => Ok(None),
    }
}

/// List the names in `bucket`, sorted, narrowed by `pattern` if given
///
/// The pattern is validated before any request is made. `page_size` bounds
/// the number of names asked for per request.
pub async fn list<S>(
    store: &S,
    bucket: &str,
    pattern: Option<&str>,
    page_size: Option<u32>,
) -> Result<Vec<String>>
where
    S: ObjectStore + ?Sized,
{
    let filter = compile_filter(pattern)?;

    let mut names = fetch_all(store, bucket, page_size).await?;
    names.sort_unstable();

    if let Some(re) = &filter {
        tracing::debug!(pattern = re.as_str(), "filtering names");
        names.retain(|name| re.is_match(name));
    }

    tracing::debug!(bucket, count = names.len(), "retrieved list of objects in bucket");
    Ok(names)
}

/// Request pages until the service returns an empty one
async fn fetch_all<S>(store: &S, bucket: &str, page_size: Option<u32>) -> Result<Vec<String>>
where
    S: ObjectStore + ?Sized,
{
    let mut names = Vec::new();
    let mut marker: Option<String> = None;
    let mut pages = 0usize;

    loop {
        let options = ListOptions {
            marker: marker.clone(),
            limit: page_size,
        };
        let page = store.list_page(bucket, options).await?;
        pages += 1;

        let Some(last) = page.last().cloned() else {
            break;
        };
        if marker.as_deref() == Some(last.as_str()) {
            return Err(Error::List(format!(
                "listing of {bucket} did not advance past marker {last:?}"
            )));
        }

        tracing::trace!(bucket, page = pages, names = page.len(), "received listing page");
        names.extend(page);
        marker = Some(last);
    }

    tracing::debug!(bucket, pages, "listing complete");
    Ok(names)
}
