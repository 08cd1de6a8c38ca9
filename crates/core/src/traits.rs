//! ObjectStore trait definition
//!
//! This trait defines the round trips the engines need from a Swift-compatible
//! storage service. It allows the transfer, listing and metadata logic to be
//! decoupled from the HTTP adapter and tested without a server.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::error::Result;

/// Readable byte stream: a remote object body or an upload source
pub type ObjectReader = Box<dyn AsyncRead + Send + Unpin>;

/// Writable byte stream: a download sink
pub type ObjectWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Options for a single listing page request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// Return only names after this one
    pub marker: Option<String>,

    /// Maximum number of names to return
    pub limit: Option<u32>,
}

/// Trait for Swift-compatible storage operations
///
/// Implemented by the HTTP adapter and mocked for testing. Every method is a
/// single request against an authenticated endpoint.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch one page of object names in a bucket
    ///
    /// An empty page means there are no names after the marker.
    async fn list_page(&self, bucket: &str, options: ListOptions) -> Result<Vec<String>>;

    /// Open a streaming download of an object body
    async fn open_object(&self, bucket: &str, object: &str) -> Result<ObjectReader>;

    /// Upload an object body from a stream
    async fn put_object(
        &self,
        bucket: &str,
        object: &str,
        body: ObjectReader,
        content_type: &str,
    ) -> Result<()>;

    /// Remove an object
    async fn delete_object(&self, bucket: &str, object: &str) -> Result<()>;

    /// Fetch object headers without the body, keyed by lower-case header name
    async fn head_object(&self, bucket: &str, object: &str) -> Result<HashMap<String, String>>;
}
