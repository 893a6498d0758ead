//! Database vendor defaults for data sources.
//!
//! Each vendor contributes the connection checker, stale connection checker
//! and exception sorter shipped with the server's JCA adapter, plus
//! background validation. Defaults are layered *under* caller values, so a
//! field the caller set always wins.

use crate::error::{Error, Result};
use model::Values;
use std::fmt;
use std::str::FromStr;

const EXTENSIONS: &str = "org.jboss.jca.adapters.jdbc.extensions";

/// Database vendors with known defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatabaseVendor {
    /// IBM DB2.
    Db2,
    /// Microsoft SQL Server.
    Mssql,
    /// MySQL and MariaDB.
    Mysql,
    /// Oracle Database.
    Oracle,
    /// PostgreSQL.
    Postgres,
    /// Sybase ASE.
    Sybase,
    /// H2; no vendor-specific classes.
    H2,
}

impl DatabaseVendor {
    /// All vendors.
    pub const ALL: [Self; 7] = [
        Self::Db2,
        Self::Mssql,
        Self::Mysql,
        Self::Oracle,
        Self::Postgres,
        Self::Sybase,
        Self::H2,
    ];

    /// Lowercase tag used on the command line.
    #[must_use]
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Db2 => "db2",
            Self::Mssql => "mssql",
            Self::Mysql => "mysql",
            Self::Oracle => "oracle",
            Self::Postgres => "postgres",
            Self::Sybase => "sybase",
            Self::H2 => "h2",
        }
    }

    /// `(valid-connection-checker, stale-connection-checker, exception-sorter)`
    /// class name suffixes below the adapter extension package.
    fn classes(self) -> (Option<&'static str>, Option<&'static str>, Option<&'static str>) {
        match self {
            Self::Db2 => (
                Some("db2.DB2ValidConnectionChecker"),
                Some("db2.DB2StaleConnectionChecker"),
                Some("db2.DB2ExceptionSorter"),
            ),
            Self::Mssql => (Some("mssql.MSSQLValidConnectionChecker"), None, None),
            Self::Mysql => (
                Some("mysql.MySQLValidConnectionChecker"),
                None,
                Some("mysql.MySQLExceptionSorter"),
            ),
            Self::Oracle => (
                Some("oracle.OracleValidConnectionChecker"),
                Some("oracle.OracleStaleConnectionChecker"),
                Some("oracle.OracleExceptionSorter"),
            ),
            Self::Postgres => (
                Some("postgres.PostgreSQLValidConnectionChecker"),
                None,
                Some("postgres.PostgreSQLExceptionSorter"),
            ),
            Self::Sybase => (
                Some("sybase.SybaseValidConnectionChecker"),
                None,
                Some("sybase.SybaseExceptionSorter"),
            ),
            Self::H2 => (None, None, None),
        }
    }
}

impl fmt::Display for DatabaseVendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

impl FromStr for DatabaseVendor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|vendor| vendor.tag().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::invalid(format!("unknown database vendor '{s}'")))
    }
}

/// Default data source attributes for a vendor.
pub fn vendor_defaults(vendor: DatabaseVendor) -> Values {
    let (checker, stale, sorter) = vendor.classes();
    let class = |suffix: Option<&str>| suffix.map(|suffix| format!("{EXTENSIONS}.{suffix}"));

    let values = Values::empty()
        .and_optional("valid-connection-checker-class-name", class(checker))
        .and_optional("stale-connection-checker-class-name", class(stale))
        .and_optional("exception-sorter-class-name", class(sorter));

    if values.is_empty() {
        values
    } else {
        values.and("background-validation", true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::ModelValue;

    #[test]
    fn test_postgres_defaults() {
        let defaults = vendor_defaults(DatabaseVendor::Postgres);
        assert_eq!(
            defaults
                .get("valid-connection-checker-class-name")
                .and_then(ModelValue::as_str),
            Some("org.jboss.jca.adapters.jdbc.extensions.postgres.PostgreSQLValidConnectionChecker")
        );
        assert!(!defaults.contains("stale-connection-checker-class-name"));
        assert_eq!(defaults.get("background-validation"), Some(&ModelValue::from(true)));
    }

    #[test]
    fn test_h2_has_no_defaults() {
        assert!(vendor_defaults(DatabaseVendor::H2).is_empty());
    }

    #[test]
    fn test_caller_values_win() {
        let caller = Values::empty().and("background-validation", false);
        let merged = vendor_defaults(DatabaseVendor::Oracle).merge(&caller);

        assert_eq!(merged.get("background-validation"), Some(&ModelValue::from(false)));
        assert!(merged.contains("exception-sorter-class-name"));
    }

    #[test]
    fn test_parse_tag() {
        assert_eq!("Oracle".parse::<DatabaseVendor>().unwrap(), DatabaseVendor::Oracle);
        assert!("informix".parse::<DatabaseVendor>().is_err());
        for vendor in DatabaseVendor::ALL {
            assert_eq!(vendor.tag().parse::<DatabaseVendor>().unwrap(), vendor);
        }
    }
}
