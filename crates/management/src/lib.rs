//! # management
//!
//! Configuration commands that apply identically to a running server or to
//! a configuration file on disk.
//!
//! A [`Command`] is validated once when built, then rendered either to an
//! atomic [`Batch`](online::Batch) for a live server or to a
//! [`Transform`](offline::Transform) for a file. Both paths agree on
//! existence checks, omission rules and failure messages.
//!
//! ## Example
//!
//! ```
//! use management::{AddJdbcDriver, Command, JdbcDriverConfig, OnlineContext};
//! use model::ManagementVersion;
//! use online::MockClient;
//!
//! let client = MockClient::standalone(ManagementVersion::VERSION_2_1_0);
//! let ctx = OnlineContext::connect(&client).unwrap();
//!
//! let command = AddJdbcDriver::new(JdbcDriverConfig {
//!     name: "h2".into(),
//!     module: "com.h2database.h2".into(),
//!     ..JdbcDriverConfig::default()
//! })
//! .unwrap();
//!
//! command.apply_online(&ctx).unwrap();
//! assert!(command.apply_online(&ctx).is_err());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod command;
pub mod context;
pub mod datasource;
pub mod driver;
pub mod error;
pub mod security_realm;
pub mod vendor;

pub use command::{ApplyState, Command, apply};
pub use context::{OfflineContext, OnlineContext, Target};
pub use datasource::{AddDataSource, DataSourceConfig, RemoveDataSource};
pub use driver::{AddJdbcDriver, JdbcDriverConfig, RemoveJdbcDriver};
pub use error::{Error, ErrorCategory, Result};
pub use security_realm::{
    AddLocalAuthentication, AddPropertiesAuthentication, AddPropertiesAuthorization,
    AddSecurityRealm, LocalAuthenticationConfig, PropertiesConfig, RemoveSecurityRealm,
};
pub use vendor::{DatabaseVendor, vendor_defaults};
