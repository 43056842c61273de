//! Reads the YAML configuration file from disk.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::model::FileConfig;

/// Read and parse the configuration file at `path`.
///
/// Defaults are not applied; call [`FileConfig::resolve`] afterwards.
///
/// # Errors
///
/// Returns [`ConfigError::Read`] when the file cannot be read and
/// [`ConfigError::Parse`] when it is not valid YAML for [`FileConfig`].
pub fn load_config(path: &Path) -> ConfigResult<FileConfig> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse_config(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), "loaded configuration file");
    Ok(config)
}

fn parse_config(raw: &str) -> Result<FileConfig, serde_yaml::Error> {
    if raw.trim().is_empty() {
        return Ok(FileConfig::default());
    }
    serde_yaml::from_str(raw)
}
