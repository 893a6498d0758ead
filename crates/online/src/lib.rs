//! # online
//!
//! Executes management operations against a running server.
//!
//! - [`Client`]: transport seam; [`HttpClient`] talks JSON to the HTTP
//!   management endpoint, [`MockClient`] emulates a server in memory
//! - [`Operations`]: single resource actions (`exists`, `add`, `remove`, ...)
//! - [`Batch`]: ordered steps submitted as one all-or-nothing composite
//! - [`Administration`]: reload handling
//!
//! ## Example
//!
//! ```
//! use model::{Address, ManagementVersion, Values};
//! use online::{Batch, MockClient, Operations};
//!
//! let client = MockClient::standalone(ManagementVersion::VERSION_2_1_0);
//! let ops = Operations::new(&client);
//!
//! let address = Address::subsystem("datasources").and("jdbc-driver", "h2");
//! let mut batch = Batch::new();
//! batch.add(address.clone(), Values::empty().and("driver-name", "h2"));
//! ops.batch(&batch).unwrap();
//!
//! assert!(ops.exists(&address).unwrap());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod admin;
pub mod batch;
pub mod client;
pub mod error;
pub mod operation;
pub mod operations;

pub use admin::{Administration, read_version};
pub use batch::{Batch, Step};
pub use client::{Client, HttpClient, MockClient};
pub use error::{Error, ErrorCategory, Result};
pub use operation::{ModelNodeResult, Operation};
pub use operations::Operations;
