//! Error types for sc-core
//!
//! Provides a unified error type that can be converted to appropriate exit codes.

use thiserror::Error;

/// Result type alias for sc-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for sc-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file or credential input error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Credentials rejected, no token issued, or the session is no longer usable
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// The service catalog has no usable object-store endpoint
    #[error("Endpoint not found: {0}")]
    EndpointNotFound(String),

    /// The remote object does not exist
    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    /// The storage service rejected a write or delete
    #[error("Storage write rejected: {0}")]
    StorageWrite(String),

    /// Invalid listing filter expression
    #[error("Invalid filter pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// Listing failed or the bucket does not exist
    #[error("Listing failed: {0}")]
    List(String),

    /// IO error on a local file or standard stream
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// URL parsing error
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Transport failure or unexpected service response
    #[error("Network error: {0}")]
    Network(String),
}

impl Error {
    /// Get the appropriate exit code for this error
    pub const fn exit_code(&self) -> i32 {
        match self {
            Error::Config(_) | Error::Pattern(_) => 2, // UsageError
            Error::Yaml(_) | Error::InvalidUrl(_) => 2, // UsageError
            Error::Network(_) => 3,                     // NetworkError
            Error::Auth(_) => 4,                        // AuthError
            Error::ObjectNotFound(_) | Error::EndpointNotFound(_) => 5, // NotFound
            _ => 1,                                     // GeneralError
        }
    }

    /// Whether this error means the remote object is missing
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Error::ObjectNotFound(_))
    }
}
