//! ResourceProvider trait for abstracting resource loading.
//!
//! Referenced SVG documents and raster images are fetched through this trait,
//! so the renderers never touch the filesystem directly.

use std::collections::HashMap;
use std::fmt::Debug;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, RwLock};
use thiserror::Error;

/// Error type for resource loading operations.
#[derive(Error, Debug, Clone)]
pub enum ResourceError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Failed to load resource '{path}': {message}")]
    LoadFailed { path: String, message: String },

    #[error("Invalid resource format: {0}")]
    InvalidFormat(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for ResourceError {
    fn from(err: std::io::Error) -> Self {
        ResourceError::Io(err.to_string())
    }
}

/// Shared resource data type (reference-counted bytes).
pub type SharedResourceData = Arc<Vec<u8>>;

/// Loads resource bytes by URI.
///
/// URIs may carry a `file:` scheme; providers strip it before resolving.
pub trait ResourceProvider: Send + Sync + Debug {
    /// Load a resource by its path/URI.
    fn load(&self, uri: &str) -> Result<SharedResourceData, ResourceError>;

    /// Returns a human-readable name for this provider (for logging/debugging).
    fn name(&self) -> &'static str;
}

fn strip_scheme(uri: &str) -> &str {
    uri.strip_prefix("file://")
        .or_else(|| uri.strip_prefix("file:"))
        .unwrap_or(uri)
}

/// An in-memory resource provider, keyed by the URI without its `file:` scheme.
#[derive(Debug, Default)]
pub struct InMemoryResourceProvider {
    resources: RwLock<HashMap<String, SharedResourceData>>,
}

impl InMemoryResourceProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a resource to the in-memory store.
    ///
    /// # Errors
    ///
    /// Returns `ResourceError::LoadFailed` if the internal lock is poisoned.
    pub fn add(&self, uri: impl Into<String>, data: Vec<u8>) -> Result<(), ResourceError> {
        let uri = uri.into();
        let mut resources = self
            .resources
            .write()
            .map_err(|_| ResourceError::LoadFailed {
                path: uri.clone(),
                message: "resource store lock poisoned".to_string(),
            })?;
        resources.insert(strip_scheme(&uri).to_string(), Arc::new(data));
        Ok(())
    }

    /// Returns 0 if the lock is poisoned.
    pub fn len(&self) -> usize {
        self.resources.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ResourceProvider for InMemoryResourceProvider {
    fn load(&self, uri: &str) -> Result<SharedResourceData, ResourceError> {
        let resources = self
            .resources
            .read()
            .map_err(|_| ResourceError::LoadFailed {
                path: uri.to_string(),
                message: "resource store lock poisoned".to_string(),
            })?;
        resources
            .get(strip_scheme(uri))
            .cloned()
            .ok_or_else(|| ResourceError::NotFound(uri.to_string()))
    }

    fn name(&self) -> &'static str {
        "InMemoryResourceProvider"
    }
}

/// Loads resources relative to a base directory.
///
/// Absolute paths and paths containing `..` are rejected so a document can
/// only reach files below its own directory.
#[derive(Debug, Clone)]
pub struct FilesystemResourceProvider {
    base_path: PathBuf,
}

impl FilesystemResourceProvider {
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    pub fn base(&self) -> &Path {
        &self.base_path
    }

    fn resolve(&self, uri: &str) -> Option<PathBuf> {
        let relative = Path::new(strip_scheme(uri));
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return None;
        }
        Some(self.base_path.join(relative))
    }
}

impl ResourceProvider for FilesystemResourceProvider {
    fn load(&self, uri: &str) -> Result<SharedResourceData, ResourceError> {
        let path = self
            .resolve(uri)
            .ok_or_else(|| ResourceError::NotFound(format!("{} (outside base directory)", uri)))?;

        std::fs::read(&path).map(Arc::new).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ResourceError::NotFound(uri.to_string())
            } else {
                ResourceError::LoadFailed {
                    path: uri.to_string(),
                    message: e.to_string(),
                }
            }
        })
    }

    fn name(&self) -> &'static str {
        "FilesystemResourceProvider"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn in_memory_ignores_file_scheme() {
        let provider = InMemoryResourceProvider::new();
        provider.add("shapes.svg", b"<svg/>".to_vec()).unwrap();
        assert_eq!(&*provider.load("file:shapes.svg").unwrap(), b"<svg/>");
        assert_eq!(provider.len(), 1);
        assert!(matches!(
            provider.load("missing.svg"),
            Err(ResourceError::NotFound(_))
        ));
    }

    #[test]
    fn filesystem_loads_relative_files() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("logo.jpg"), b"jpeg").unwrap();

        let provider = FilesystemResourceProvider::new(dir.path());
        assert_eq!(&*provider.load("logo.jpg").unwrap(), b"jpeg");
        assert_eq!(&*provider.load("file:logo.jpg").unwrap(), b"jpeg");
        assert!(matches!(
            provider.load("nope.jpg"),
            Err(ResourceError::NotFound(_))
        ));
    }

    #[test]
    fn filesystem_blocks_escaping_paths() {
        let dir = tempdir().unwrap();
        let provider = FilesystemResourceProvider::new(dir.path());
        assert!(provider.load("../../../etc/passwd").is_err());
        assert!(provider.load("/etc/passwd").is_err());
    }
}
