//! Where commands run: a live server or a configuration file.

use crate::error::Result;
use model::ManagementVersion;
use offline::ConfigFile;
use online::{Administration, Client, Operations};
use std::path::PathBuf;

/// A connected server and the management version it reports.
#[derive(Clone, Copy)]
pub struct OnlineContext<'a> {
    client: &'a dyn Client,
    version: ManagementVersion,
}

impl<'a> OnlineContext<'a> {
    /// Connect to a server, reading its management version once.
    pub fn connect(client: &'a dyn Client) -> Result<Self> {
        let version = online::read_version(client)?;
        Ok(Self { client, version })
    }

    /// A context with a known version; nothing is read from the server.
    pub fn with_version(client: &'a dyn Client, version: ManagementVersion) -> Self {
        Self { client, version }
    }

    /// The server connection.
    pub fn client(&self) -> &'a dyn Client {
        self.client
    }

    /// The server's management version.
    pub fn version(&self) -> ManagementVersion {
        self.version
    }

    /// Resource operations on this server.
    pub fn operations(&self) -> Operations<'a> {
        Operations::new(self.client)
    }

    /// Reload handling for this server.
    pub fn administration(&self) -> Administration<'a> {
        Administration::new(self.client)
    }
}

/// A configuration file and the management version its namespace declares.
#[derive(Debug, Clone)]
pub struct OfflineContext {
    file: ConfigFile,
    version: ManagementVersion,
}

impl OfflineContext {
    /// Open a configuration file, reading its version once.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let file = ConfigFile::new(path);
        let version = file.version()?;
        log::debug!("{} declares management version {version}", file.path().display());
        Ok(Self { file, version })
    }

    /// A context with a known version; the file is not read.
    pub fn with_version(file: ConfigFile, version: ManagementVersion) -> Self {
        Self { file, version }
    }

    /// The configuration file.
    pub fn file(&self) -> &ConfigFile {
        &self.file
    }

    /// The file's management version.
    pub fn version(&self) -> ManagementVersion {
        self.version
    }
}

/// The backend a command is applied to.
#[derive(Clone, Copy)]
pub enum Target<'a> {
    /// A running server.
    Online(&'a OnlineContext<'a>),
    /// A configuration file.
    Offline(&'a OfflineContext),
}

impl Target<'_> {
    /// The management version of the target.
    pub fn version(&self) -> ManagementVersion {
        match self {
            Self::Online(ctx) => ctx.version(),
            Self::Offline(ctx) => ctx.version(),
        }
    }

    /// Human-readable target description.
    pub fn describe(&self) -> String {
        match self {
            Self::Online(ctx) => ctx.client().describe(),
            Self::Offline(ctx) => ctx.file().path().display().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use online::MockClient;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_connect_reads_version() {
        let client = MockClient::standalone(ManagementVersion::VERSION_1_7_0);
        let ctx = OnlineContext::connect(&client).unwrap();
        assert_eq!(ctx.version(), ManagementVersion::VERSION_1_7_0);
        assert_eq!(Target::Online(&ctx).version(), ManagementVersion::VERSION_1_7_0);
    }

    #[test]
    fn test_open_reads_version() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("standalone.xml");
        fs::write(&path, r#"<server xmlns="urn:jboss:domain:4.0"/>"#).unwrap();

        let ctx = OfflineContext::open(&path).unwrap();
        assert_eq!(ctx.version(), ManagementVersion::VERSION_4_0_0);
        assert!(Target::Offline(&ctx).describe().ends_with("standalone.xml"));
    }

    #[test]
    fn test_open_missing_file() {
        assert!(OfflineContext::open("/nonexistent/standalone.xml").is_err());
    }
}
