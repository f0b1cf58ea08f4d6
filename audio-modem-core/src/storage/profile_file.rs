use std::fs;
use std::path::{Path, PathBuf};

use crate::models::error::ModemError;
use crate::traits::profile_source::ProfileSource;

/// Loads profile documents from the filesystem.
///
/// Locations are paths, resolved against `root` when relative.
#[derive(Debug, Clone, Default)]
pub struct FileProfileSource {
    root: Option<PathBuf>,
}

impl FileProfileSource {
    pub fn new() -> Self {
        Self { root: None }
    }

    /// Resolve relative locations against `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    fn resolve(&self, location: &str) -> PathBuf {
        let path = Path::new(location);
        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl ProfileSource for FileProfileSource {
    fn fetch(&self, location: &str) -> Result<String, ModemError> {
        let path = self.resolve(location);
        fs::read_to_string(&path).map_err(|e| {
            ModemError::ProfileFetch(format!("failed to read {}: {}", path.display(), e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::profile::ProfileSet;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("audio_modem_test_{}_{}", name, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn fetches_relative_to_root() {
        let dir = temp_dir("root");
        fs::write(dir.join("profiles.json"), r#"{"audible": {}}"#).unwrap();

        let source = FileProfileSource::with_root(dir.clone());
        let document = source.fetch("profiles.json").unwrap();
        assert_eq!(ProfileSet::parse(&document).unwrap().len(), 1);

        let absolute = dir.join("profiles.json");
        assert!(FileProfileSource::new().fetch(absolute.to_str().unwrap()).is_ok());

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn missing_file_is_a_fetch_error() {
        let source = FileProfileSource::new();
        let err = source.fetch("/definitely/not/here/profiles.json").unwrap_err();
        assert!(matches!(err, ModemError::ProfileFetch(msg) if msg.contains("profiles.json")));
    }
}
