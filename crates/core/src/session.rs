//! Authenticated session
//!
//! A `Session` is the in-memory result of a successful login: the bearer
//! token plus the object-store endpoint it is valid for. It is owned by the
//! caller and invalidated by [`Session::logout`].

use std::fmt;

use jiff::Timestamp;
use url::Url;

use crate::error::{Error, Result};

/// Authenticated handle used to authorize storage requests
pub struct Session {
    token: Option<String>,
    endpoint: Url,
    region: Option<String>,
    expires_at: Option<Timestamp>,
}

impl Session {
    /// Create a new active session
    pub fn new(
        token: impl Into<String>,
        endpoint: Url,
        region: Option<String>,
        expires_at: Option<Timestamp>,
    ) -> Self {
        Self {
            token: Some(token.into()),
            endpoint,
            region,
            expires_at,
        }
    }

    /// Object-store endpoint URL
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Region the endpoint was resolved for, if one was requested
    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    /// Token expiry reported by the identity service
    pub fn expires_at(&self) -> Option<Timestamp> {
        self.expires_at
    }

    /// Whether logout has not been called yet
    pub fn is_active(&self) -> bool {
        self.token.is_some()
    }

    /// Whether the token expiry lies in the past
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|t| t <= Timestamp::now())
    }

    /// Return the token if the session can still be used
    ///
    /// Fails before any request is issued when the session was logged out
    /// or the token has expired.
    pub fn require_active(&self) -> Result<&str> {
        let token = self
            .token
            .as_deref()
            .ok_or_else(|| Error::Auth("session has been logged out".into()))?;
        if self.is_expired() {
            return Err(Error::Auth("session token has expired".into()));
        }
        Ok(token)
    }

    /// Invalidate the session. Calling it again is a no-op.
    pub fn logout(&mut self) {
        if self.token.take().is_some() {
            tracing::info!(endpoint = %self.endpoint, "logged out of storage service");
        }
    }

    /// Build `{endpoint}/{bucket}` or `{endpoint}/{bucket}/{object}`
    ///
    /// Names are percent-encoded as single path segments, so an object name
    /// containing `/` stays one segment.
    pub fn object_url(&self, bucket: &str, object: Option<&str>) -> Result<Url> {
        let mut url = self.endpoint.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                Error::Config(format!("endpoint cannot be a base URL: {}", self.endpoint))
            })?;
            segments.pop_if_empty().push(bucket);
            if let Some(object) = object {
                segments.push(object);
            }
        }
        Ok(url)
    }
}

/// Shorten a token for log output
pub fn redact(token: &str) -> String {
    let prefix: String = token.chars().take(4).collect();
    format!("{prefix}…")
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &self.token.as_deref().map(redact))
            .field("endpoint", &self.endpoint.as_str())
            .field("region", &self.region)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
