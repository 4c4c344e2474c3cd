//! Filesystem persistence helpers: atomic writes, JSON load, JSONL append.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

/// Serialize `data` as pretty-printed JSON and write it atomically.
///
/// The payload lands in a `.tmp` sibling first and is renamed into place, so
/// a crash mid-write never leaves a half-written file at the target path.
pub fn atomic_write_json<T: serde::Serialize>(path: &Path, data: &T) -> io::Result<()> {
    let json = serde_json::to_string_pretty(data).map_err(io::Error::other)?;
    atomic_write(path, json.as_bytes())
}

/// Write raw bytes to a `.tmp` sibling, then rename onto the target path.
///
/// Parent directories are created if missing.
pub fn atomic_write(path: &Path, data: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, data)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

/// Load JSON from `path`, returning `Ok(None)` when the file does not exist.
pub fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> io::Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let data = std::fs::read_to_string(path)?;
    let value =
        serde_json::from_str(&data).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    Ok(Some(value))
}

/// Append one JSON document as a single line to `path`.
///
/// Each appended record is flushed on its own, so an event stream survives a
/// crash up to the last completed append.
pub fn append_jsonl<T: serde::Serialize>(path: &Path, record: &T) -> io::Result<()> {
    let mut line = serde_json::to_string(record).map_err(io::Error::other)?;
    line.push('\n');
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(line.as_bytes())
}
