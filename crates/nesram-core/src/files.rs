//! # Data File I/O
//!
//! Bounded reads and atomic replacement for the ramdisk JSON files.
//!
//! Writers never touch the destination in place: the payload goes to a
//! temporary file in the same directory, is flushed, and is then renamed over
//! the target. A crash mid-write leaves the previous file intact.

use crate::primitives::MAX_DATA_FILE_SIZE;
use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Read a data file, refusing anything larger than `MAX_DATA_FILE_SIZE`.
pub fn read_limited(path: &Path) -> io::Result<Vec<u8>> {
    let metadata = std::fs::metadata(path)?;
    if metadata.len() > MAX_DATA_FILE_SIZE {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "file size {} bytes exceeds maximum allowed {} bytes",
                metadata.len(),
                MAX_DATA_FILE_SIZE
            ),
        ));
    }
    std::fs::read(path)
}

/// Replace `path` with `data` via write-to-temp-then-rename.
pub fn write_atomic(path: &Path, data: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Human-readable reason for a failed read, distinguishing a missing file.
pub fn describe_read_error(err: &io::Error) -> String {
    if err.kind() == io::ErrorKind::NotFound {
        "file not found".to_string()
    } else {
        err.to_string()
    }
}
