use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::core::errors::{Result, SigningKeyError, ValidationError};

/// A private key and certificate stored on the local filesystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct X509KeyPair {
    pub key_path: String,
    pub certificate_path: String,
}

/// A key held by a signing plugin, referenced by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalKey {
    pub id: String,
    pub plugin_name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub plugin_config: BTreeMap<String, String>,
}

/// Where the signing material of a key lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyMaterial {
    X509KeyPair(X509KeyPair),
    ExternalKey(ExternalKey),
}

impl KeyMaterial {
    /// Short label used when listing keys.
    pub fn kind(&self) -> &'static str {
        match self {
            KeyMaterial::X509KeyPair(_) => "local",
            KeyMaterial::ExternalKey(_) => "plugin",
        }
    }
}

/// One named signing key configuration.
///
/// On disk an entry carries exactly one of `x509KeyPair` or `externalKey`
/// next to its name. Documents setting both or neither fail to parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawKeyEntry", into = "RawKeyEntry")]
pub struct KeyEntry {
    pub name: String,
    pub material: KeyMaterial,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawKeyEntry {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    x509_key_pair: Option<X509KeyPair>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    external_key: Option<ExternalKey>,
}

impl TryFrom<RawKeyEntry> for KeyEntry {
    type Error = String;

    fn try_from(raw: RawKeyEntry) -> std::result::Result<Self, Self::Error> {
        let material = match (raw.x509_key_pair, raw.external_key) {
            (Some(pair), None) => KeyMaterial::X509KeyPair(pair),
            (None, Some(ext)) if is_blank(&ext.id) => {
                return Err(format!("key '{}' has an empty plugin key id", raw.name));
            }
            (None, Some(ext)) if is_blank(&ext.plugin_name) => {
                return Err(format!("key '{}' has an empty plugin name", raw.name));
            }
            (None, Some(ext)) => KeyMaterial::ExternalKey(ext),
            (Some(_), Some(_)) => {
                return Err(format!(
                    "key '{}' sets both x509KeyPair and externalKey",
                    raw.name
                ));
            }
            (None, None) => {
                return Err(format!(
                    "key '{}' must set one of x509KeyPair or externalKey",
                    raw.name
                ));
            }
        };
        Ok(KeyEntry {
            name: raw.name,
            material,
        })
    }
}

impl From<KeyEntry> for RawKeyEntry {
    fn from(entry: KeyEntry) -> Self {
        let (x509_key_pair, external_key) = match entry.material {
            KeyMaterial::X509KeyPair(pair) => (Some(pair), None),
            KeyMaterial::ExternalKey(ext) => (None, Some(ext)),
        };
        RawKeyEntry {
            name: entry.name,
            x509_key_pair,
            external_key,
        }
    }
}

/// The full set of named signing keys plus the optional default selection.
///
/// Entry order is insertion order and is preserved through persistence.
/// The default is stored by name and resolved on every lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningKeys {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(default)]
    pub keys: Vec<KeyEntry>,
}

/// Whitespace-only names count as empty.
fn is_blank(name: &str) -> bool {
    name.trim().is_empty()
}

fn require_name(name: &str) -> Result<()> {
    if is_blank(name) {
        return Err(SigningKeyError::EmptyKeyName);
    }
    Ok(())
}

/// Check that `path` is a readable regular file and return it as stored.
/// Only existence is checked; the contents are not parsed.
fn readable_file(path: &Path) -> Result<String> {
    let stored = path.to_str().ok_or_else(|| SigningKeyError::InvalidConfig {
        detail: format!("key file path is not valid UTF-8: {}", path.display()),
    })?;
    let not_found = |source| SigningKeyError::KeyFileNotFound {
        path: path.to_path_buf(),
        source,
    };

    let file = std::fs::File::open(path).map_err(not_found)?;
    if !file.metadata().map_err(not_found)?.is_file() {
        return Err(not_found(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "not a regular file",
        )));
    }
    Ok(stored.to_string())
}

impl SigningKeys {
    /// Add a local key/certificate pair.
    ///
    /// The key becomes the default when `make_default` is set or when it
    /// is the first key in the registry.
    pub fn add(
        &mut self,
        name: &str,
        key_path: &Path,
        cert_path: &Path,
        make_default: bool,
    ) -> Result<()> {
        self.check_new_name(name)?;
        let key_path = readable_file(key_path)?;
        let certificate_path = readable_file(cert_path)?;

        self.push(
            KeyEntry {
                name: name.to_string(),
                material: KeyMaterial::X509KeyPair(X509KeyPair {
                    key_path,
                    certificate_path,
                }),
            },
            make_default,
        );
        Ok(())
    }

    /// Add a key held by a signing plugin.
    ///
    /// `cancel` is checked before anything else; the plugin itself is
    /// never contacted here.
    pub fn add_plugin(
        &mut self,
        cancel: &CancellationToken,
        name: &str,
        id: &str,
        plugin_name: &str,
        plugin_config: BTreeMap<String, String>,
        make_default: bool,
    ) -> Result<()> {
        if cancel.is_cancelled() {
            return Err(SigningKeyError::Cancelled);
        }
        require_name(name)?;
        if is_blank(id) {
            return Err(SigningKeyError::EmptyPluginId);
        }
        if is_blank(plugin_name) {
            return Err(SigningKeyError::EmptyPluginName);
        }
        self.check_new_name(name)?;

        self.push(
            KeyEntry {
                name: name.to_string(),
                material: KeyMaterial::ExternalKey(ExternalKey {
                    id: id.to_string(),
                    plugin_name: plugin_name.to_string(),
                    plugin_config,
                }),
            },
            make_default,
        );
        Ok(())
    }

    /// Look up a key by exact name.
    pub fn get(&self, name: &str) -> Result<&KeyEntry> {
        require_name(name)?;
        self.find(name).ok_or_else(|| SigningKeyError::KeyNotFound {
            name: name.to_string(),
        })
    }

    /// Return the default key.
    pub fn get_default(&self) -> Result<&KeyEntry> {
        let name = self.default.as_deref().ok_or(SigningKeyError::NoDefaultSet)?;
        self.find(name).ok_or_else(|| SigningKeyError::KeyNotFound {
            name: name.to_string(),
        })
    }

    /// Pick the key for a signing operation: the named one, or the default.
    pub fn resolve(&self, name: Option<&str>) -> Result<&KeyEntry> {
        match name {
            Some(name) => self.get(name),
            None => self.get_default(),
        }
    }

    /// Point the default at an existing key.
    pub fn update_default(&mut self, name: &str) -> Result<()> {
        self.get(name)?;
        self.default = Some(name.to_string());
        Ok(())
    }

    /// Remove a key and return the removed names in order.
    ///
    /// Removing the default leaves no default; no other key is promoted.
    pub fn remove(&mut self, name: &str) -> Result<Vec<String>> {
        require_name(name)?;
        let idx = self
            .keys
            .iter()
            .position(|k| k.name == name)
            .ok_or_else(|| SigningKeyError::KeyNotFound {
                name: name.to_string(),
            })?;

        let removed = self.keys.remove(idx);
        if self.is_default(&removed.name) {
            self.default = None;
        }
        Ok(vec![removed.name])
    }

    /// Whether `name` is the current default.
    pub fn is_default(&self, name: &str) -> bool {
        self.default.as_deref() == Some(name)
    }

    /// Check every registry invariant. Checks run in a fixed order so the
    /// reported problem is deterministic.
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        if self.keys.iter().any(|k| is_blank(&k.name)) {
            return Err(ValidationError::EmptyKeyName);
        }

        let mut seen = HashSet::with_capacity(self.keys.len());
        for key in &self.keys {
            if !seen.insert(key.name.as_str()) {
                return Err(ValidationError::DuplicateName {
                    name: key.name.clone(),
                });
            }
        }

        if let Some(default) = &self.default {
            if is_blank(default) {
                return Err(ValidationError::EmptyDefault);
            }
            if !seen.contains(default.as_str()) {
                return Err(ValidationError::InvalidDefault {
                    name: default.clone(),
                });
            }
        }

        Ok(())
    }

    fn find(&self, name: &str) -> Option<&KeyEntry> {
        self.keys.iter().find(|k| k.name == name)
    }

    fn check_new_name(&self, name: &str) -> Result<()> {
        require_name(name)?;
        if self.find(name).is_some() {
            return Err(SigningKeyError::DuplicateKeyName {
                name: name.to_string(),
            });
        }
        Ok(())
    }

    fn push(&mut self, entry: KeyEntry, make_default: bool) {
        if make_default || self.keys.is_empty() {
            self.default = Some(entry.name.clone());
        }
        self.keys.push(entry);
    }
}
