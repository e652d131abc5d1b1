//! IO Utilities for File Operations

use std::{
    fs::{self, File},
    io::Write,
    path::Path,
};

use tracing::{debug, instrument};

use crate::error::Result;

/// Writes a byte slice to a file, creating or overwriting it.
#[instrument(skip(data), fields(len = data.len()))]
pub fn write_file(path: &Path, data: &[u8]) -> Result<()> {
    ensure_parent_dir(path)?;
    let mut file = File::create(path)?;
    file.write_all(data)?;
    file.flush()?;
    debug!("Wrote {} bytes", data.len());
    Ok(())
}

/// Creates the parent directory of `path` when it does not exist yet.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
