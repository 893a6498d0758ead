//! Management model versions.
//!
//! A [`ManagementVersion`] only selects between alternate payloads; it is
//! never stored anywhere.

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Namespace prefix of the root element of a server configuration file.
const DOMAIN_NAMESPACE_PREFIX: &str = "urn:jboss:domain:";

/// `major.minor.micro` version of the management model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ManagementVersion {
    /// Major version.
    pub major: u32,
    /// Minor version.
    pub minor: u32,
    /// Micro version.
    pub micro: u32,
}

impl ManagementVersion {
    /// AS 7.1.
    pub const VERSION_1_0_0: Self = Self::new(1, 0, 0);
    /// EAP 6.3.
    pub const VERSION_1_6_0: Self = Self::new(1, 6, 0);
    /// EAP 6.4.
    pub const VERSION_1_7_0: Self = Self::new(1, 7, 0);
    /// WildFly 8.
    pub const VERSION_2_0_0: Self = Self::new(2, 0, 0);
    /// WildFly 8.1.
    pub const VERSION_2_1_0: Self = Self::new(2, 1, 0);
    /// WildFly 9.
    pub const VERSION_3_0_0: Self = Self::new(3, 0, 0);
    /// WildFly 10 / EAP 7.0.
    pub const VERSION_4_0_0: Self = Self::new(4, 0, 0);
    /// WildFly 11 / EAP 7.1.
    pub const VERSION_5_0_0: Self = Self::new(5, 0, 0);

    /// Create a version.
    #[must_use]
    pub const fn new(major: u32, minor: u32, micro: u32) -> Self {
        Self {
            major,
            minor,
            micro,
        }
    }

    /// `self < other`
    pub fn less_than(&self, other: Self) -> bool {
        *self < other
    }

    /// `self >= other`
    pub fn greater_than_or_equal_to(&self, other: Self) -> bool {
        *self >= other
    }

    /// Half-open range check: `lo <= self < hi`.
    pub fn in_range(&self, lo: Self, hi: Self) -> bool {
        lo <= *self && *self < hi
    }

    /// Version carried by a configuration root namespace, e.g.
    /// `urn:jboss:domain:1.7` -> `1.7.0`.
    pub fn from_namespace(namespace: &str) -> Result<Self> {
        namespace
            .strip_prefix(DOMAIN_NAMESPACE_PREFIX)
            .and_then(|rest| rest.parse().ok())
            .ok_or_else(|| Error::InvalidNamespace(namespace.to_string()))
    }
}

impl fmt::Display for ManagementVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.micro)
    }
}

impl FromStr for ManagementVersion {
    type Err = Error;

    /// Parse `major.minor` or `major.minor.micro`.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidVersion(s.to_string());
        let parts: Vec<&str> = s.trim().split('.').collect();
        if !(2..=3).contains(&parts.len()) {
            return Err(invalid());
        }
        let number = |part: &str| part.parse::<u32>().map_err(|_| invalid());

        Ok(Self::new(
            number(parts[0])?,
            number(parts[1])?,
            parts.get(2).map_or(Ok(0), |micro| number(micro))?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comparisons() {
        let legacy = ManagementVersion::new(1, 6, 0);
        assert!(legacy.less_than(ManagementVersion::VERSION_2_0_0));
        assert!(!legacy.greater_than_or_equal_to(ManagementVersion::VERSION_2_0_0));

        let boundary = ManagementVersion::VERSION_2_0_0;
        assert!(!boundary.less_than(ManagementVersion::VERSION_2_0_0));
        assert!(boundary.greater_than_or_equal_to(ManagementVersion::VERSION_2_0_0));
    }

    #[test]
    fn test_ordering_is_lexicographic() {
        assert!(ManagementVersion::new(1, 7, 9) < ManagementVersion::new(2, 0, 0));
        assert!(ManagementVersion::new(2, 1, 0) > ManagementVersion::new(2, 0, 5));
    }

    #[test]
    fn test_in_range_half_open() {
        let lo = ManagementVersion::VERSION_1_0_0;
        let hi = ManagementVersion::VERSION_2_0_0;
        assert!(lo.in_range(lo, hi));
        assert!(ManagementVersion::VERSION_1_7_0.in_range(lo, hi));
        assert!(!hi.in_range(lo, hi));
    }

    #[test]
    fn test_parse() {
        assert_eq!(
            "1.7".parse::<ManagementVersion>().unwrap(),
            ManagementVersion::VERSION_1_7_0
        );
        assert_eq!(
            "2.1.0".parse::<ManagementVersion>().unwrap(),
            ManagementVersion::VERSION_2_1_0
        );
        assert!("2".parse::<ManagementVersion>().is_err());
        assert!("2.x".parse::<ManagementVersion>().is_err());
        assert!("1.2.3.4".parse::<ManagementVersion>().is_err());
    }

    #[test]
    fn test_from_namespace() {
        assert_eq!(
            ManagementVersion::from_namespace("urn:jboss:domain:1.7").unwrap(),
            ManagementVersion::VERSION_1_7_0
        );
        assert_eq!(
            ManagementVersion::from_namespace("urn:jboss:domain:4.0").unwrap(),
            ManagementVersion::VERSION_4_0_0
        );
        assert!(ManagementVersion::from_namespace("urn:example:1.0").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(ManagementVersion::new(2, 1, 0).to_string(), "2.1.0");
    }
}
