//! Configuration files and all-or-nothing application of transforms.

use crate::error::{Error, Result};
use crate::transform::Transform;
use crate::xml::Document;
use model::ManagementVersion;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

impl Document {
    /// Apply a transform. On failure the document is left untouched.
    pub fn apply(&mut self, transform: &Transform) -> Result<()> {
        let mut root = self.root.clone();
        transform.run(&mut root)?;
        self.root = root;
        Ok(())
    }

    /// Management version encoded in the root namespace.
    pub fn version(&self) -> Result<ManagementVersion> {
        let namespace = self
            .namespace()
            .ok_or_else(|| Error::Structure(format!("<{}> has no xmlns", self.root.name)))?;
        Ok(ManagementVersion::from_namespace(namespace)?)
    }
}

/// A server configuration file on disk, e.g. `standalone.xml`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    path: PathBuf,
}

impl ConfigFile {
    /// Refer to a file. Nothing is read until used.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the file.
    pub fn load(&self) -> Result<Document> {
        let content = fs::read_to_string(&self.path).map_err(|e| Error::io(&self.path, e))?;
        Document::parse(&content)
    }

    /// Management version of the file.
    pub fn version(&self) -> Result<ManagementVersion> {
        self.load()?.version()
    }

    /// Apply a transform and write the result back.
    ///
    /// The new content goes to a temporary file in the same directory, which
    /// then replaces the original. If loading, the script or writing fails,
    /// the file is not touched.
    pub fn apply(&self, transform: &Transform) -> Result<()> {
        let mut document = self.load()?;
        document.apply(transform)?;
        self.save(&document)?;
        log::debug!(
            "applied {} to {}",
            transform.script_name(),
            self.path.display()
        );
        Ok(())
    }

    /// Content before and after applying `transform`, without writing.
    ///
    /// Both sides are normalized the same way, so they differ only where
    /// the transform changed something.
    pub fn preview(&self, transform: &Transform) -> Result<(String, String)> {
        let mut document = self.load()?;
        let before = document.to_xml_string()?;
        document.apply(transform)?;
        Ok((before, document.to_xml_string()?))
    }

    /// Write a document to this file atomically.
    pub fn save(&self, document: &Document) -> Result<()> {
        let xml = document.to_xml_string()?;
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut temp = NamedTempFile::new_in(dir).map_err(|e| Error::io(dir, e))?;
        temp.write_all(xml.as_bytes())
            .map_err(|e| Error::io(temp.path(), e))?;
        temp.persist(&self.path)
            .map_err(|e| Error::io(&self.path, e.error))?;
        Ok(())
    }
}
