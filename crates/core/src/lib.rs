//! sc-core: Core library for the swift object storage client
//!
//! This crate provides the core functionality for the swift CLI, including:
//! - Configuration file loading and credential resolution
//! - The authenticated `Session` value
//! - ObjectStore trait for Swift operations
//! - Transfer, listing and metadata engines built on that trait
//!
//! This crate is designed to be independent of any HTTP client,
//! allowing the engines to be tested without a storage service.

pub mod config;
pub mod credentials;
pub mod error;
pub mod listing;
pub mod metadata;
pub mod session;
pub mod stream;
pub mod traits;
pub mod transfer;

#[cfg(test)]
mod memory;

pub use config::{Config, ConfigManager, TimeoutConfig};
pub use credentials::{AuthMethod, Credentials, DomainRef, Interface, Scope, UserRef};
pub use error::{Error, Result};
pub use session::Session;
pub use stream::{ByteSink, ByteSource};
pub use traits::{ListOptions, ObjectReader, ObjectStore, ObjectWriter};
pub use transfer::ProgressCallback;
