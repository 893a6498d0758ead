//! Locations of configuration sections.
//!
//! A [`Subtree`] names a section of a standalone server configuration.
//! Resolving it against a document returns the section element, creating
//! it (and any missing parent) in schema order when absent. This mirrors a
//! live server, where the containers always exist.

use crate::error::{Error, Result};
use crate::xml::Element;
use std::fmt;

/// Root namespace prefix of subsystem sections.
const SUBSYSTEM_NAMESPACE_PREFIX: &str = "urn:jboss:domain:";

/// Server children that follow `<extensions>`.
const AFTER_EXTENSIONS: &[&str] = &[
    "system-properties",
    "vault",
    "management",
    "profile",
    "interfaces",
    "socket-binding-group",
    "deployments",
];
/// Server children that follow `<management>`.
const AFTER_MANAGEMENT: &[&str] = &["profile", "interfaces", "socket-binding-group", "deployments"];
/// Server children that follow `<profile>`.
const AFTER_PROFILE: &[&str] = &["interfaces", "socket-binding-group", "deployments"];

/// Locator of a configuration section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subtree {
    /// The document element itself.
    Root,
    /// `<profile>`.
    Profile,
    /// `<management>`.
    Management,
    /// `<extensions>`.
    Extensions,
    /// `<profile><subsystem xmlns="urn:jboss:domain:NAME:*">`.
    Subsystem(String),
}

impl Subtree {
    /// The document element.
    #[must_use]
    pub fn root() -> Self {
        Self::Root
    }

    /// The `<profile>` section.
    #[must_use]
    pub fn profile() -> Self {
        Self::Profile
    }

    /// The `<management>` section.
    #[must_use]
    pub fn management() -> Self {
        Self::Management
    }

    /// The `<extensions>` section.
    #[must_use]
    pub fn extensions() -> Self {
        Self::Extensions
    }

    /// A subsystem section, e.g. `datasources`.
    pub fn subsystem(name: impl Into<String>) -> Self {
        Self::Subsystem(name.into())
    }

    /// Find or create the section under the document element.
    pub fn resolve<'a>(&self, root: &'a mut Element) -> Result<&'a mut Element> {
        log::trace!("resolving subtree {self}");
        match self {
            Self::Root => Ok(root),
            Self::Profile => root.child_or_insert("profile", AFTER_PROFILE),
            Self::Management => root.child_or_insert("management", AFTER_MANAGEMENT),
            Self::Extensions => root.child_or_insert("extensions", AFTER_EXTENSIONS),
            Self::Subsystem(name) => {
                let profile = root.child_or_insert("profile", AFTER_PROFILE)?;
                let prefix = format!("{SUBSYSTEM_NAMESPACE_PREFIX}{name}:");
                let matches = |element: &Element| {
                    element.name == "subsystem"
                        && element
                            .attribute("xmlns")
                            .is_some_and(|namespace| namespace.starts_with(&prefix))
                };

                if profile.find_child(matches).is_none() {
                    log::debug!("creating subsystem {name}");
                    profile.push(
                        Element::new("subsystem").with_attribute("xmlns", format!("{prefix}1.0")),
                    );
                }
                profile
                    .find_child_mut(matches)
                    .ok_or_else(|| Error::Structure(format!("subsystem {name} missing after insert")))
            }
        }
    }
}

impl fmt::Display for Subtree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Root => write!(f, "root"),
            Self::Profile => write!(f, "profile"),
            Self::Management => write!(f, "management"),
            Self::Extensions => write!(f, "extensions"),
            Self::Subsystem(name) => write!(f, "subsystem:{name}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::Document;

    fn server() -> Element {
        Document::parse(
            r#"<server xmlns="urn:jboss:domain:1.7">
                <extensions><extension module="org.jboss.as.connector"/></extensions>
                <profile>
                    <subsystem xmlns="urn:jboss:domain:datasources:1.2"><datasources/></subsystem>
                </profile>
                <interfaces/>
            </server>"#,
        )
        .unwrap()
        .root
    }

    #[test]
    fn test_resolves_existing_subsystem() {
        let mut root = server();
        let subsystem = Subtree::subsystem("datasources").resolve(&mut root).unwrap();
        assert_eq!(
            subsystem.attribute("xmlns"),
            Some("urn:jboss:domain:datasources:1.2")
        );
        assert!(subsystem.child("datasources").is_some());
    }

    #[test]
    fn test_subsystem_prefix_is_exact() {
        let mut root = server();
        let created = Subtree::subsystem("data").resolve(&mut root).unwrap();
        assert_eq!(created.attribute("xmlns"), Some("urn:jboss:domain:data:1.0"));
        assert_eq!(
            root.child("profile").unwrap().children_named("subsystem").count(),
            2
        );
    }

    #[test]
    fn test_creates_management_in_schema_order() {
        let mut root = server();
        Subtree::management().resolve(&mut root).unwrap();

        let names: Vec<&str> = root.elements().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["extensions", "management", "profile", "interfaces"]);
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let mut root = Element::new("server");
        Subtree::subsystem("datasources").resolve(&mut root).unwrap();
        let once = root.clone();
        Subtree::subsystem("datasources").resolve(&mut root).unwrap();
        assert_eq!(root, once);
    }

    #[test]
    fn test_root() {
        let mut root = server();
        assert_eq!(Subtree::root().resolve(&mut root).unwrap().name, "server");
    }
}
