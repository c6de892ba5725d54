//! Where bundle payloads come from.
//!
//! Resolution probes candidate resource names against a [`BundleSource`].
//! The trait separates name-to-payload lookup from everything else, so the
//! resolver can run against a directory tree in production and an in-memory
//! map in tests without changing its fallback logic.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Supplies raw properties text for candidate resource names.
///
/// `Ok(None)` means the name does not exist and the next candidate should
/// be probed; `Err` means the source itself failed and resolution aborts.
pub trait BundleSource: Send + Sync {
    fn load(&self, name: &str) -> Result<Option<String>, io::Error>;
}

/// Map a logical resource name to a relative file path.
///
/// Both `.` and `::` act as path separators, so `app.Messages_en` and
/// `app::Messages_en` name the same `app/Messages_en.properties` file.
pub fn relative_path(name: &str, suffix: &str) -> PathBuf {
    PathBuf::from(format!(
        "{}{}",
        name.replace("::", "/").replace('.', "/"),
        suffix
    ))
}

/// Loads `.properties` files from a directory tree.
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> DirSource {
        DirSource { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl BundleSource for DirSource {
    fn load(&self, name: &str) -> Result<Option<String>, io::Error> {
        let path = self.root.join(relative_path(name, ".properties"));
        match std::fs::read_to_string(&path) {
            Ok(text) => {
                debug!("loaded resource {} from {}", name, path.display());
                Ok(Some(text))
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }
}

/// An in-memory source backed by a name → payload map.
#[derive(Default)]
pub struct StaticSource {
    payloads: HashMap<String, String>,
}

impl StaticSource {
    pub fn new() -> StaticSource {
        StaticSource::default()
    }

    /// Register a payload under a logical resource name (no suffix).
    pub fn with(mut self, name: &str, payload: &str) -> StaticSource {
        self.payloads.insert(name.to_string(), payload.to_string());
        self
    }
}

impl BundleSource for StaticSource {
    fn load(&self, name: &str) -> Result<Option<String>, io::Error> {
        Ok(self.payloads.get(name).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_relative_path_maps_separators() {
        assert_eq!(
            relative_path("app.Messages_en", ".properties"),
            PathBuf::from("app/Messages_en.properties")
        );
        assert_eq!(
            relative_path("app::ui::Messages", ".properties"),
            PathBuf::from("app/ui/Messages.properties")
        );
    }

    #[test]
    fn test_relative_path_empty_suffix() {
        assert_eq!(relative_path("Messages", ""), PathBuf::from("Messages"));
    }

    #[test]
    fn test_dir_source_loads_existing_file() {
        let dir = TempDir::new().unwrap();
        let package = dir.path().join("app");
        fs::create_dir_all(&package).unwrap();
        fs::write(package.join("Messages_en.properties"), "greeting=Hello\n").unwrap();

        let source = DirSource::new(dir.path());
        let payload = source.load("app.Messages_en").unwrap();
        assert_eq!(payload.as_deref(), Some("greeting=Hello\n"));
    }

    #[test]
    fn test_dir_source_missing_file_is_none() {
        let dir = TempDir::new().unwrap();
        let source = DirSource::new(dir.path());
        assert!(source.load("app.Missing").unwrap().is_none());
    }

    #[test]
    fn test_static_source_lookup() {
        let source = StaticSource::new().with("Messages_en", "key=value");
        assert_eq!(
            source.load("Messages_en").unwrap().as_deref(),
            Some("key=value")
        );
        assert!(source.load("Messages_fr").unwrap().is_none());
    }
}
