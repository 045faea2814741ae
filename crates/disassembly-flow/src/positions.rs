//! Persisted node positions.
//!
//! The file is a JSON object mapping node ids to `{"x": .., "y": ..}`. A
//! missing file is an empty map; saving overwrites the whole file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::FlowError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Node id to position, sorted by id.
pub type Positions = BTreeMap<String, Position>;

/// A node-position file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionStore {
    path: PathBuf,
}

impl PositionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Saved positions, or an empty map if the file does not exist yet.
    pub fn load(&self) -> Result<Positions, FlowError> {
        let data = match std::fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %self.path.display(), "No saved node positions");
                return Ok(Positions::new());
            }
            Err(source) => {
                return Err(FlowError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        serde_json::from_str(&data).map_err(|source| FlowError::Json {
            path: self.path.clone(),
            source,
        })
    }

    /// Overwrite the file with `positions`.
    pub fn save(&self, positions: &Positions) -> Result<(), FlowError> {
        let io_err = |source| FlowError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(positions).map_err(|source| FlowError::Json {
            path: self.path.clone(),
            source,
        })?;
        std::fs::write(&self.path, json).map_err(io_err)?;
        debug!(path = %self.path.display(), nodes = positions.len(), "Node positions saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = PositionStore::new(dir.path().join("node_positions.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = PositionStore::new(dir.path().join("out").join("node_positions.json"));
        let mut positions = Positions::new();
        positions.insert("car".to_string(), Position::new(10.0, -5.5));
        positions.insert("d1".to_string(), Position::new(170.0, 0.0));

        store.save(&positions).unwrap();
        assert_eq!(store.load().unwrap(), positions);

        positions.remove("d1");
        store.save(&positions).unwrap();
        assert_eq!(store.load().unwrap().len(), 1);
    }

    #[test]
    fn reads_plain_json_object() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("node_positions.json");
        std::fs::write(&path, r#"{"a2": {"x": 1, "y": 2.5}}"#).unwrap();
        let positions = PositionStore::new(&path).load().unwrap();
        assert_eq!(positions["a2"], Position::new(1.0, 2.5));
    }

    #[test]
    fn corrupt_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("node_positions.json");
        std::fs::write(&path, "[1, 2").unwrap();
        match PositionStore::new(&path).load() {
            Err(FlowError::Json { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected Json, got: {other:?}"),
        }
    }
}
