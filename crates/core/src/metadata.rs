//! Object metadata retrieval

use std::collections::HashMap;

use crate::error::Result;
use crate::traits::ObjectStore;

/// Per-response transport headers; everything else describes the object
pub const TRANSPORT_HEADERS: &[&str] = &[
    "date",
    "x-trans-id",
    "x-openstack-request-id",
    "accept-ranges",
    "connection",
    "keep-alive",
    "transfer-encoding",
];

/// Retrieve the metadata of a single object without transferring its body
///
/// Keys are lower-case header names. The map has no meaningful order.
pub async fn about<S>(store: &S, bucket: &str, object: &str) -> Result<HashMap<String, String>>
where
    S: ObjectStore + ?Sized,
{
    tracing::debug!(bucket, object, "getting info about object");
    let headers = store.head_object(bucket, object).await?;
    Ok(select_metadata(headers))
}

/// Keep every header attached to the object, dropping transport noise
pub fn select_metadata(headers: HashMap<String, String>) -> HashMap<String, String> {
    headers
        .into_iter()
        .map(|(k, v)| (k.to_ascii_lowercase(), v))
        .filter(|(k, _)| !TRANSPORT_HEADERS.contains(&k.as_str()))
        .collect()
}
