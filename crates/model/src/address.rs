//! Hierarchical resource addresses.
//!
//! An address is an ordered list of `(type, name)` pairs. It is immutable:
//! [`Address::and`] returns a new address and leaves the receiver untouched.
//! Two addresses are equal when their segments are equal element-wise, which
//! makes them usable as map keys for existence and idempotency checks.

use crate::error::{Error, Result};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// One `type=name` step of an address.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Segment {
    /// Resource type, e.g. `subsystem` or `data-source`.
    pub kind: String,
    /// Resource name within its type, e.g. `datasources` or `DS1`.
    pub name: String,
}

/// Immutable path to a resource in the management tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address {
    segments: Vec<Segment>,
}

impl Address {
    /// The root of the management tree.
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// A single-segment address.
    pub fn of(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self::root().and(kind, name)
    }

    /// `/subsystem=<name>`
    pub fn subsystem(name: impl Into<String>) -> Self {
        Self::of("subsystem", name)
    }

    /// `/core-service=<name>`
    pub fn core_service(name: impl Into<String>) -> Self {
        Self::of("core-service", name)
    }

    /// `/extension=<name>`
    pub fn extension(name: impl Into<String>) -> Self {
        Self::of("extension", name)
    }

    /// Append a segment, returning a new address.
    pub fn and(&self, kind: impl Into<String>, name: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(Segment {
            kind: kind.into(),
            name: name.into(),
        });
        Self { segments }
    }

    /// Whether this is the root address.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// The segments, outermost first.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// The last segment, `None` for the root.
    pub fn last(&self) -> Option<&Segment> {
        self.segments.last()
    }

    /// The address one level up, `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// Whether `self` is `other` or lies below it.
    pub fn starts_with(&self, other: &Address) -> bool {
        self.segments.starts_with(&other.segments)
    }

    /// Wire form: `[{"subsystem": "datasources"}, {"data-source": "DS1"}]`.
    pub fn to_model(&self) -> Value {
        Value::Array(
            self.segments
                .iter()
                .map(|segment| {
                    let mut pair = Map::new();
                    pair.insert(segment.kind.clone(), Value::String(segment.name.clone()));
                    Value::Object(pair)
                })
                .collect(),
        )
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return write!(f, "/");
        }
        for segment in &self.segments {
            write!(f, "/{}={}", segment.kind, segment.name)?;
        }
        Ok(())
    }
}

impl FromStr for Address {
    type Err = Error;

    /// Parse CLI syntax, e.g. `/subsystem=datasources/data-source=DS1`.
    fn from_str(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() || trimmed == "/" {
            return Ok(Self::root());
        }
        let Some(body) = trimmed.strip_prefix('/') else {
            return Err(Error::address(input, "must start with '/'"));
        };

        let mut address = Self::root();
        for part in body.split('/') {
            let (kind, name) = part
                .split_once('=')
                .ok_or_else(|| Error::address(input, format!("segment '{part}' has no '='")))?;
            if kind.is_empty() || name.is_empty() {
                return Err(Error::address(
                    input,
                    format!("segment '{part}' has an empty type or name"),
                ));
            }
            address = address.and(kind, name);
        }
        Ok(address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_structural_equality() {
        let a = Address::subsystem("datasources").and("data-source", "DS1");
        let b = Address::subsystem("datasources").and("data-source", "DS1");
        assert_eq!(a, b);

        let c = Address::subsystem("datasources").and("data-source", "DS2");
        assert_ne!(a, c);
    }

    #[test]
    fn test_and_does_not_mutate_receiver() {
        let base = Address::subsystem("datasources");
        let child = base.and("data-source", "DS1");
        assert_eq!(base.segments().len(), 1);
        assert_eq!(child.segments().len(), 2);
    }

    #[test]
    fn test_usable_as_map_key() {
        let mut seen = HashMap::new();
        seen.insert(Address::subsystem("datasources").and("jdbc-driver", "h2"), 1);
        assert_eq!(
            seen.get(&Address::subsystem("datasources").and("jdbc-driver", "h2")),
            Some(&1)
        );
    }

    #[test]
    fn test_parent_and_last() {
        let address = Address::core_service("management").and("security-realm", "R");
        assert_eq!(address.parent(), Some(Address::core_service("management")));
        assert_eq!(address.last().map(|s| s.name.as_str()), Some("R"));
        assert_eq!(Address::root().parent(), None);
        assert!(Address::root().last().is_none());
    }

    #[test]
    fn test_display() {
        assert_eq!(Address::root().to_string(), "/");
        assert_eq!(
            Address::subsystem("datasources")
                .and("data-source", "DS1")
                .to_string(),
            "/subsystem=datasources/data-source=DS1"
        );
    }

    #[test]
    fn test_parse() {
        let parsed: Address = "/subsystem=datasources/data-source=DS1".parse().unwrap();
        assert_eq!(
            parsed,
            Address::subsystem("datasources").and("data-source", "DS1")
        );
        assert_eq!("/".parse::<Address>().unwrap(), Address::root());
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!("subsystem=datasources".parse::<Address>().is_err());
        assert!("/subsystem".parse::<Address>().is_err());
        assert!("/subsystem=".parse::<Address>().is_err());
        assert!("/=x".parse::<Address>().is_err());
    }

    #[test]
    fn test_to_model() {
        let model = Address::subsystem("datasources")
            .and("data-source", "DS1")
            .to_model();
        assert_eq!(
            model,
            serde_json::json!([{"subsystem": "datasources"}, {"data-source": "DS1"}])
        );
    }

    #[test]
    fn test_starts_with() {
        let parent = Address::subsystem("datasources");
        let child = parent.and("data-source", "DS1");
        assert!(child.starts_with(&parent));
        assert!(!parent.starts_with(&child));
        assert!(child.starts_with(&Address::root()));
    }
}
