//! Swift v1 client implementation
//!
//! Wraps reqwest and implements the ObjectStore trait from sc-core. Every
//! request carries the session token in `X-Auth-Token`.

use std::collections::HashMap;
use std::io;
use std::time::Duration;

use async_trait::async_trait;
use futures::TryStreamExt;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use tokio_util::io::{ReaderStream, StreamReader};

use sc_core::transfer::COPY_BUFFER_SIZE;
use sc_core::{
    Credentials, Error, ListOptions, ObjectReader, ObjectStore, Result, Session, TimeoutConfig,
};

use crate::identity;

/// Header carrying the bearer token on storage requests
const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";

const USER_AGENT: &str = concat!("swift-cli/", env!("CARGO_PKG_VERSION"));

/// Swift client bound to an authenticated session
pub struct SwiftClient {
    http: reqwest::Client,
    session: Session,
}

impl SwiftClient {
    /// Authenticate with the identity service and bind the resulting session
    pub async fn login(credentials: &Credentials, timeouts: &TimeoutConfig) -> Result<Self> {
        let http = http_client(timeouts)?;
        let session = identity::login(&http, credentials).await?;
        Ok(Self { http, session })
    }

    /// Bind an existing session to an HTTP client
    pub fn new(http: reqwest::Client, session: Session) -> Self {
        Self { http, session }
    }

    /// The session used to authorize requests
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Invalidate the session; later requests fail without reaching the network
    pub fn logout(&mut self) {
        self.session.logout();
    }

    fn request(&self, method: Method, bucket: &str, object: Option<&str>) -> Result<RequestBuilder> {
        let token = self.session.require_active()?;
        let url = self.session.object_url(bucket, object)?;
        tracing::trace!(%method, %url, "storage request");
        Ok(self
            .http
            .request(method, url)
            .header(AUTH_TOKEN_HEADER, token))
    }
}

/// Build the HTTP client used for identity and storage requests
pub fn http_client(timeouts: &TimeoutConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(Duration::from_millis(timeouts.connect_ms))
        .read_timeout(Duration::from_millis(timeouts.read_ms))
        .build()
        .map_err(|e| Error::Network(format!("Unable to create HTTP client: {e}")))
}

async fn send(builder: RequestBuilder) -> Result<Response> {
    builder
        .send()
        .await
        .map_err(|e| Error::Network(format!("Unable to reach storage service: {e}")))
}

fn rejected(status: StatusCode) -> Error {
    Error::Auth(format!("Storage service rejected the token ({status})"))
}

/// One entry of a JSON container listing
#[derive(Debug, Deserialize)]
struct ListEntry {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    subdir: Option<String>,
}

#[async_trait]
impl ObjectStore for SwiftClient {
    async fn list_page(&self, bucket: &str, options: ListOptions) -> Result<Vec<String>> {
        let mut query: Vec<(&str, String)> = vec![("format", "json".to_string())];
        if let Some(marker) = &options.marker {
            query.push(("marker", marker.clone()));
        }
        if let Some(limit) = options.limit {
            query.push(("limit", limit.to_string()));
        }

        let response = send(self.request(Method::GET, bucket, None)?.query(&query)).await?;
        match response.status() {
            StatusCode::NO_CONTENT => Ok(Vec::new()),
            s if s.is_success() => {
                let entries: Vec<ListEntry> = response
                    .json()
                    .await
                    .map_err(|e| Error::List(format!("Unable to parse listing of {bucket}: {e}")))?;
                Ok(entries
                    .into_iter()
                    .filter_map(|e| e.name.or(e.subdir))
                    .collect())
            }
            StatusCode::UNAUTHORIZED => Err(rejected(StatusCode::UNAUTHORIZED)),
            StatusCode::NOT_FOUND => Err(Error::List(format!("Bucket not found: {bucket}"))),
            s => Err(Error::List(format!(
                "Unable to list objects in {bucket}: {s}"
            ))),
        }
    }

    async fn open_object(&self, bucket: &str, object: &str) -> Result<ObjectReader> {
        let response = send(self.request(Method::GET, bucket, Some(object))?).await?;
        match response.status() {
            s if s.is_success() => {
                let stream = response.bytes_stream().map_err(io::Error::other);
                Ok(Box::new(StreamReader::new(Box::pin(stream))))
            }
            StatusCode::UNAUTHORIZED => Err(rejected(StatusCode::UNAUTHORIZED)),
            StatusCode::NOT_FOUND => Err(Error::ObjectNotFound(format!("{bucket}/{object}"))),
            s => Err(Error::Network(format!(
                "Unable to retrieve {bucket}/{object}: {s}"
            ))),
        }
    }

    async fn put_object(
        &self,
        bucket: &str,
        object: &str,
        body: ObjectReader,
        content_type: &str,
    ) -> Result<()> {
        let stream = ReaderStream::with_capacity(body, COPY_BUFFER_SIZE);
        let builder = self
            .request(Method::PUT, bucket, Some(object))?
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(reqwest::Body::wrap_stream(stream));

        let response = send(builder).await?;
        match response.status() {
            s if s.is_success() => {
                if let Some(etag) = response.headers().get(reqwest::header::ETAG) {
                    tracing::debug!(bucket, object, etag = ?etag, "object stored");
                }
                Ok(())
            }
            StatusCode::UNAUTHORIZED => Err(rejected(StatusCode::UNAUTHORIZED)),
            s => Err(Error::StorageWrite(format!(
                "Unable to upload {bucket}/{object}: {s}"
            ))),
        }
    }

    async fn delete_object(&self, bucket: &str, object: &str) -> Result<()> {
        let response = send(self.request(Method::DELETE, bucket, Some(object))?).await?;
        match response.status() {
            s if s.is_success() => Ok(()),
            StatusCode::UNAUTHORIZED => Err(rejected(StatusCode::UNAUTHORIZED)),
            StatusCode::NOT_FOUND => Err(Error::ObjectNotFound(format!("{bucket}/{object}"))),
            s => Err(Error::StorageWrite(format!(
                "Unable to remove {bucket}/{object}: {s}"
            ))),
        }
    }

    async fn head_object(&self, bucket: &str, object: &str) -> Result<HashMap<String, String>> {
        let response = send(self.request(Method::HEAD, bucket, Some(object))?).await?;
        match response.status() {
            s if s.is_success() => Ok(response
                .headers()
                .iter()
                .map(|(name, value)| {
                    let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
                    (name.as_str().to_string(), value)
                })
                .collect()),
            StatusCode::UNAUTHORIZED => Err(rejected(StatusCode::UNAUTHORIZED)),
            StatusCode::NOT_FOUND => Err(Error::ObjectNotFound(format!("{bucket}/{object}"))),
            s => Err(Error::Network(format!(
                "Unable to retrieve metadata of {bucket}/{object}: {s}"
            ))),
        }
    }
}
