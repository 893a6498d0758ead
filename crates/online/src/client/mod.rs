//! Transport implementations for executing management operations.
//!
//! This module provides the [`Client`] trait and its implementations:
//! [`http::HttpClient`] for a running server and [`mock::MockClient`], an
//! in-memory server used by tests and dry runs.

pub mod http;
pub mod mock;

pub use http::HttpClient;
pub use mock::MockClient;

use crate::error::Result;
use crate::operation::{ModelNodeResult, Operation};

/// Executes single management requests.
///
/// A failed outcome is a successful call that returns a failed
/// [`ModelNodeResult`]; `Err` is reserved for transport problems.
pub trait Client: Send + Sync {
    /// Execute one request.
    fn execute(&self, operation: &Operation) -> Result<ModelNodeResult>;

    /// Human-readable target description for logs and messages.
    fn describe(&self) -> String;
}
