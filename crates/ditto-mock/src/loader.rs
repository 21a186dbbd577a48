//! Loading mock definitions from JSON documents.
//!
//! A definition document is either a single mock object or an array of mock
//! objects. The outermost token decides which shape is decoded.

use crate::error::LoadError;
use crate::mock::DittoMock;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default extension of definition files.
pub const DEFAULT_EXTENSION: &str = "json";

/// Decoded definition document.
#[derive(Debug, Clone, PartialEq)]
pub enum MockDocument {
    One(DittoMock),
    Many(Vec<DittoMock>),
}

impl MockDocument {
    pub fn into_mocks(self) -> Vec<DittoMock> {
        match self {
            MockDocument::One(mock) => vec![mock],
            MockDocument::Many(mocks) => mocks,
        }
    }
}

/// Decode one definition document.
///
/// A document whose first structural token is `[` is decoded as an array of
/// mocks, anything else as a single mock.
pub fn parse_document(bytes: &[u8]) -> Result<MockDocument, serde_json::Error> {
    let first = bytes
        .iter()
        .find(|b| !matches!(**b, b' ' | b'\t' | b'\n' | b'\r'));

    match first {
        Some(b'[') => serde_json::from_slice(bytes).map(MockDocument::Many),
        _ => serde_json::from_slice(bytes).map(MockDocument::One),
    }
}

/// Decode one definition document, tagging failures with `origin`.
pub fn load_document(origin: &str, bytes: &[u8]) -> Result<Vec<DittoMock>, LoadError> {
    parse_document(bytes)
        .map(MockDocument::into_mocks)
        .map_err(|source| LoadError::Parse {
            origin: origin.to_string(),
            source,
        })
}

/// Raw definition document and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    pub origin: String,
    pub bytes: Vec<u8>,
}

impl SourceDocument {
    pub fn new(origin: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            origin: origin.into(),
            bytes: bytes.into(),
        }
    }

    pub fn load(&self) -> Result<Vec<DittoMock>, LoadError> {
        load_document(&self.origin, &self.bytes)
    }
}

/// Something that yields definition documents in a stable order.
pub trait DefinitionSource {
    fn documents(&self) -> Result<Vec<SourceDocument>, LoadError>;
}

impl DefinitionSource for Vec<SourceDocument> {
    fn documents(&self) -> Result<Vec<SourceDocument>, LoadError> {
        Ok(self.clone())
    }
}

/// Recursively discovers definition files under a root directory.
///
/// Entries are visited in lexical order, depth first. Every non-directory
/// entry with the configured extension is read; symlinked directories are not
/// followed. A root that is itself a file is read when its extension matches.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
    extension: String,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into().trim_start_matches('.').to_string();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Paths of all matching files, in traversal order.
    pub fn discover(&self) -> Result<Vec<PathBuf>, LoadError> {
        let mut files = Vec::new();
        let metadata = std::fs::symlink_metadata(&self.root).map_err(|source| LoadError::Io {
            path: self.root.clone(),
            source,
        })?;

        if metadata.is_dir() {
            self.walk(&self.root, &mut files)?;
        } else if self.has_extension(&self.root) {
            files.push(self.root.clone());
        }
        Ok(files)
    }

    fn walk(&self, dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), LoadError> {
        let io_err = |source| LoadError::Io {
            path: dir.to_path_buf(),
            source,
        };

        let mut entries = std::fs::read_dir(dir)
            .map_err(io_err)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(io_err)?;
        entries.sort_by_key(|entry| entry.file_name());

        for entry in entries {
            let path = entry.path();
            let file_type = entry.file_type().map_err(|source| LoadError::Io {
                path: path.clone(),
                source,
            })?;

            if file_type.is_dir() {
                self.walk(&path, files)?;
            } else if self.has_extension(&path) {
                files.push(path);
            }
        }
        Ok(())
    }

    fn has_extension(&self, path: &Path) -> bool {
        path.extension()
            .is_some_and(|ext| ext == self.extension.as_str())
    }
}

impl DefinitionSource for DirectorySource {
    fn documents(&self) -> Result<Vec<SourceDocument>, LoadError> {
        let files = self.discover()?;
        debug!(
            "Discovered {} definition file(s) under {}",
            files.len(),
            self.root.display()
        );

        files
            .into_iter()
            .map(|path| {
                let bytes = std::fs::read(&path).map_err(|source| LoadError::Io {
                    path: path.clone(),
                    source,
                })?;
                Ok(SourceDocument::new(path.display().to_string(), bytes))
            })
            .collect()
    }
}
