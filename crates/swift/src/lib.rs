//! sc-swift: OpenStack adapter for the swift CLI
//!
//! This crate provides the Keystone login and the implementation of the
//! ObjectStore trait over the Swift v1 REST API. It is the only crate that
//! talks HTTP.

pub mod catalog;
pub mod client;
pub mod identity;

pub use client::SwiftClient;
