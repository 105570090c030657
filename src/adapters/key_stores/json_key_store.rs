use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::core::errors::{Result, SigningKeyError};
use crate::core::models::signing_keys::SigningKeys;
use crate::core::traits::key_store::SigningKeyStore;

/// Name of the signing key document inside the config directory.
pub const SIGNING_KEYS_FILE: &str = "signingkeys.json";

/// Key store that persists the registry as a single JSON document.
///
/// Example `signingkeys.json`:
/// ```text
/// {
///   "default": "wabbit-networks",
///   "keys": [
///     {
///       "name": "wabbit-networks",
///       "x509KeyPair": { "keyPath": "...", "certificatePath": "..." }
///     },
///     {
///       "name": "hsm-key",
///       "externalKey": { "id": "key-1", "pluginName": "com.example.hsm" }
///     }
///   ]
/// }
/// ```
///
/// Writes go to a temporary file in the same directory which is then
/// renamed over the document, so readers never see a partial write.
/// There is no cross-process locking: concurrent writers race and the
/// last rename wins.
#[derive(Clone)]
pub struct JsonKeyStore {
    path: PathBuf,
}

impl JsonKeyStore {
    /// Create a key store backed by the given file path.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Create a key store for `signingkeys.json` inside `config_dir`.
    pub fn in_dir(config_dir: &Path) -> Self {
        Self::new(config_dir.join(SIGNING_KEYS_FILE))
    }

    /// Return the file path this store reads from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parent_dir(&self) -> &Path {
        match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        }
    }
}

impl SigningKeyStore for JsonKeyStore {
    fn load(&self) -> Result<SigningKeys> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no signing key document, starting empty");
                return Ok(SigningKeys::default());
            }
            Err(e) => return Err(e.into()),
        };

        let keys: SigningKeys =
            serde_json::from_str(&content).map_err(|source| SigningKeyError::MalformedDocument {
                path: self.path.clone(),
                source,
            })?;
        keys.validate()?;

        tracing::debug!(
            path = %self.path.display(),
            count = keys.keys.len(),
            default = ?keys.default,
            "loaded signing keys"
        );
        Ok(keys)
    }

    fn save(&self, keys: &SigningKeys) -> Result<()> {
        // Nothing touches the filesystem until the registry is known good.
        keys.validate()?;
        let json = serde_json::to_string_pretty(keys).map_err(std::io::Error::from)?;

        let dir = self.parent_dir();
        std::fs::create_dir_all(dir)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.write_all(b"\n")?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;

        tracing::debug!(
            path = %self.path.display(),
            count = keys.keys.len(),
            "saved signing keys"
        );
        Ok(())
    }
}
