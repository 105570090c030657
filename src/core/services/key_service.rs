use std::collections::BTreeMap;
use std::path::Path;

use tokio_util::sync::CancellationToken;

use crate::core::errors::Result;
use crate::core::models::signing_keys::{KeyEntry, SigningKeys};
use crate::core::traits::key_store::SigningKeyStore;

/// Runs registry operations against a `SigningKeyStore`.
///
/// Each mutation loads the stored registry, applies the change to that
/// copy and saves it. Nothing is durable until the save succeeds, and a
/// failed change never reaches the store.
pub struct KeyService<S: SigningKeyStore> {
    pub store: S,
}

impl<S: SigningKeyStore> KeyService<S> {
    /// Add a local key/certificate pair.
    pub fn add_key(
        &self,
        name: &str,
        key_path: &Path,
        cert_path: &Path,
        make_default: bool,
    ) -> Result<SigningKeys> {
        self.mutate(|keys| keys.add(name, key_path, cert_path, make_default))
            .inspect(|_| tracing::debug!(name, "added local signing key"))
    }

    /// Add a plugin-backed key.
    pub fn add_plugin_key(
        &self,
        cancel: &CancellationToken,
        name: &str,
        id: &str,
        plugin_name: &str,
        plugin_config: BTreeMap<String, String>,
        make_default: bool,
    ) -> Result<SigningKeys> {
        self.mutate(|keys| {
            keys.add_plugin(cancel, name, id, plugin_name, plugin_config, make_default)
        })
        .inspect(|_| tracing::debug!(name, plugin_name, "added plugin signing key"))
    }

    /// Make `name` the default key.
    pub fn set_default(&self, name: &str) -> Result<()> {
        self.mutate(|keys| keys.update_default(name))?;
        tracing::debug!(name, "updated default signing key");
        Ok(())
    }

    /// Remove a key, returning the removed names.
    pub fn remove_key(&self, name: &str) -> Result<Vec<String>> {
        let mut removed = Vec::new();
        self.mutate(|keys| {
            removed = keys.remove(name)?;
            Ok(())
        })?;
        tracing::debug!(?removed, "removed signing keys");
        Ok(removed)
    }

    /// List the stored registry.
    pub fn list_keys(&self) -> Result<SigningKeys> {
        self.store.load()
    }

    /// Look up a key by name, or the default when `name` is `None`.
    pub fn resolve_key(&self, name: Option<&str>) -> Result<KeyEntry> {
        let keys = self.store.load()?;
        keys.resolve(name).cloned()
    }

    /// Load, apply `op` to a copy, save. Returns the saved registry.
    fn mutate<F>(&self, op: F) -> Result<SigningKeys>
    where
        F: FnOnce(&mut SigningKeys) -> Result<()>,
    {
        let mut keys = self.store.load()?;
        op(&mut keys)?;
        self.store.save(&keys)?;
        Ok(keys)
    }
}
