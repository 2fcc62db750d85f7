use std::path::{Path, PathBuf};

use crate::error::{PadError, PadResult};
use crate::network::network::Network;

/// A directory of `*.json` models addressed by file stem.
#[derive(Debug, Clone)]
pub struct ModelStore {
    dir: PathBuf,
}

impl ModelStore {
    pub fn new(dir: impl Into<PathBuf>) -> ModelStore {
        ModelStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the stem names of all *.json files in the directory, sorted
    /// alphabetically. A missing directory lists as empty.
    pub fn list(&self) -> Vec<String> {
        match std::fs::read_dir(&self.dir) {
            Ok(entries) => {
                let mut names: Vec<String> = entries
                    .flatten()
                    .filter_map(|e| {
                        let path = e.path();
                        if path.extension().and_then(|s| s.to_str()) == Some("json") {
                            path.file_stem().and_then(|s| s.to_str()).map(|s| s.to_owned())
                        } else {
                            None
                        }
                    })
                    .collect();
                names.sort();
                names
            }
            Err(_) => vec![],
        }
    }

    pub fn path_for(&self, name: &str) -> PadResult<PathBuf> {
        if name.is_empty() || name.contains('/') || name.contains('\\') || name.contains("..") {
            return Err(PadError::InvalidModelName(name.to_owned()));
        }
        Ok(self.dir.join(format!("{}.json", name)))
    }

    /// Path of an existing model file, checked without reading it.
    pub fn locate(&self, name: &str) -> PadResult<PathBuf> {
        let path = self.path_for(name)?;
        if !path.is_file() {
            return Err(PadError::ModelNotFound(name.to_owned()));
        }
        Ok(path)
    }

    pub fn load(&self, name: &str) -> PadResult<Network> {
        Network::load_json(&self.locate(name)?)
    }

    /// Picks `preferred` when given, otherwise the first listed model.
    pub fn resolve(&self, preferred: Option<&str>) -> PadResult<String> {
        match preferred {
            Some(name) => Ok(name.to_owned()),
            None => self.list().into_iter().next().ok_or_else(|| {
                PadError::ModelNotFound(format!("no models in {}", self.dir.display()))
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_sorted_json_only() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.json"), "{}").unwrap();
        std::fs::write(dir.path().join("a.json"), "{}").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "").unwrap();
        let store = ModelStore::new(dir.path());
        assert_eq!(store.list(), vec!["a".to_owned(), "b".to_owned()]);
        assert_eq!(store.resolve(None).unwrap(), "a");
    }

    #[test]
    fn test_missing_dir_lists_empty() {
        let store = ModelStore::new("/definitely/not/here");
        assert!(store.list().is_empty());
        assert!(matches!(store.resolve(None), Err(PadError::ModelNotFound(_))));
    }

    #[test]
    fn test_rejects_traversal() {
        let store = ModelStore::new("models");
        for bad in ["", "../x", "a/b", "a\\b"] {
            assert!(matches!(store.path_for(bad), Err(PadError::InvalidModelName(_))));
        }
    }

    #[test]
    fn test_locate_checks_name_and_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("seven.json"), "{}").unwrap();
        let store = ModelStore::new(dir.path());
        assert_eq!(store.locate("seven").unwrap(), dir.path().join("seven.json"));
        assert!(matches!(store.locate("eight"), Err(PadError::ModelNotFound(_))));
        assert!(matches!(store.locate("a/b"), Err(PadError::InvalidModelName(_))));
    }

    #[test]
    fn test_load_unknown_model() {
        let dir = tempfile::tempdir().unwrap();
        let store = ModelStore::new(dir.path());
        assert!(matches!(store.load("ghost"), Err(PadError::ModelNotFound(_))));
    }
}
