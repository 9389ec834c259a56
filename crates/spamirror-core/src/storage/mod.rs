//! Disk I/O for mirrored pages, assets and state files.
//!
//! Everything is written to a `.part` sibling first and renamed into place,
//! so a crash or forced stop never leaves a truncated page, asset or mapping
//! under its final name.

mod writer;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub use writer::PartFile;

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Path for the temp file: appends `.part` to the final path (e.g. `home.html` → `home.html.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

/// Writes `data` to `path` atomically (temp file, fsync, rename).
/// Creates the parent directory if needed.
pub fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create dir: {}", parent.display()))?;
    }
    let mut part = PartFile::create(path)
        .with_context(|| format!("create temp file for {}", path.display()))?;
    part.write_chunk(data)
        .with_context(|| format!("write {}", part.temp_path().display()))?;
    part.finalize()
        .with_context(|| format!("finalize {}", path.display()))?;
    Ok(())
}
