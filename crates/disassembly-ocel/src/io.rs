//! Reading and writing event-log files.

use std::path::Path;

use tracing::info;

use crate::error::OcelError;
use crate::model::OcelLog;

/// Write `log` as pretty-printed JSON, creating missing parent directories.
pub fn write_ocel(log: &OcelLog, path: &Path) -> Result<(), OcelError> {
    let io_err = |source| OcelError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(io_err)?;
    }
    let json = serde_json::to_string_pretty(log)?;
    std::fs::write(path, json).map_err(io_err)?;
    info!(path = %path.display(), events = log.events.len(), "Event log written");
    Ok(())
}

/// Read an event log written by [`write_ocel`] or any OCEL 2.0 JSON producer.
pub fn read_ocel(path: &Path) -> Result<OcelLog, OcelError> {
    let data = std::fs::read_to_string(path).map_err(|source| OcelError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&data).map_err(|source| OcelError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
