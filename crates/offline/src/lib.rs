//! # offline
//!
//! Edits server configuration files while the server is stopped.
//!
//! - [`Document`]: parsed XML with a small mutable element tree
//! - [`Subtree`]: find-or-create locators for configuration sections
//! - [`Script`] / [`Transform`]: a named mutation bound to its subtrees and
//!   parameters
//! - [`ConfigFile`]: load, apply, and write back atomically
//!
//! ## Example
//!
//! ```
//! use offline::{Document, Element, Result, Scope, Script, Subtree, Transform};
//!
//! fn add_extension(scope: &mut Scope<'_>) -> Result<()> {
//!     let module = scope.required_string_param("module")?;
//!     let extensions = scope.subtree("extensions")?;
//!     extensions.push(Element::new("extension").with_attribute("module", module));
//!     Ok(())
//! }
//!
//! let mut document = Document::parse(r#"<server xmlns="urn:jboss:domain:4.0"/>"#).unwrap();
//! let transform = Transform::of(Script::new("add-extension", add_extension))
//!     .subtree("extensions", Subtree::extensions())
//!     .parameter("module", "org.jboss.as.connector")
//!     .build();
//!
//! document.apply(&transform).unwrap();
//! assert!(document.to_xml_string().unwrap().contains("org.jboss.as.connector"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod document;
pub mod error;
pub mod subtree;
pub mod transform;
pub mod xml;

pub use document::ConfigFile;
pub use error::{Error, Result};
pub use subtree::Subtree;
pub use transform::{Params, Scope, Script, ScriptBody, Transform, TransformBuilder};
pub use xml::{Document, Element, Node};
