//! Filesystem fixtures for exercising the process adapter.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Write an executable `/bin/sh` script named `name` into `dir`.
///
/// `body` is appended after the shebang line.
///
/// # Errors
///
/// Returns an error if the file cannot be written or made executable.
pub fn write_script(dir: &Path, name: &str, body: &str) -> Result<PathBuf> {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n"))
        .with_context(|| format!("failed to write script {}", path.display()))?;
    make_executable(&path)?;
    Ok(path)
}

/// Write an empty placeholder file (e.g. a snapraid.conf) into `dir`.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn touch_file(dir: &Path, name: &str) -> Result<PathBuf> {
    let path = dir.join(name);
    fs::write(&path, b"").with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut permissions = fs::metadata(path)?.permissions();
    permissions.set_mode(0o755);
    fs::set_permissions(path, permissions)
        .with_context(|| format!("failed to chmod {}", path.display()))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}
