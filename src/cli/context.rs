use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::core::errors::{Result, SigningKeyError};

static CONFIG_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Directory under the platform config dir used when nothing is given.
const APP_DIR_NAME: &str = "signkeys";

/// Resolve and remember the config directory for this process.
///
/// `custom` comes from `--config-dir` or `SIGNKEYS_CONFIG_DIR`; otherwise
/// the platform config dir is used (`~/.config/signkeys` on Linux).
pub fn init(custom: Option<&Path>) -> Result<&'static Path> {
    let dir = match custom {
        Some(dir) => dir.to_path_buf(),
        None => default_config_dir()?,
    };
    tracing::debug!(dir = %dir.display(), "using config directory");
    Ok(CONFIG_DIR.get_or_init(|| dir).as_path())
}

/// Get the config directory resolved by `init`.
pub fn config_dir() -> Result<&'static Path> {
    match CONFIG_DIR.get() {
        Some(dir) => Ok(dir.as_path()),
        None => init(None),
    }
}

fn default_config_dir() -> Result<PathBuf> {
    let base = dirs::config_dir().ok_or_else(|| SigningKeyError::InvalidConfig {
        detail: "Could not determine config directory. Set SIGNKEYS_CONFIG_DIR or pass --config-dir."
            .into(),
    })?;
    Ok(base.join(APP_DIR_NAME))
}
