//! # model
//!
//! Primitives of the server management model shared by the online and
//! offline backends.
//!
//! - [`Address`]: hierarchical resource path, e.g. `/subsystem=datasources/data-source=DS1`
//! - [`Values`]: ordered attribute payload with strict omission semantics
//! - [`ManagementVersion`]: comparable management model version used to
//!   pick between alternate payloads
//!
//! ## Example
//!
//! ```
//! use model::{Address, ManagementVersion, Values};
//!
//! let address = Address::subsystem("datasources").and("data-source", "DS1");
//! assert_eq!(address.to_string(), "/subsystem=datasources/data-source=DS1");
//!
//! let values = Values::empty()
//!     .and("jndi-name", "java:/DS1")
//!     .and_optional("jta", Some(false))
//!     .and_optional("min-pool-size", None::<i64>);
//! assert!(values.contains("jta"));
//! assert!(!values.contains("min-pool-size"));
//!
//! assert!(ManagementVersion::new(1, 6, 0).less_than(ManagementVersion::VERSION_2_0_0));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod address;
pub mod error;
pub mod values;
pub mod version;

pub use address::Address;
pub use error::{Error, Result};
pub use values::{ModelValue, Scalar, Values};
pub use version::ManagementVersion;
