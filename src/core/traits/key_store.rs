use crate::core::errors::Result;
use crate::core::models::signing_keys::SigningKeys;

/// Port for persisting the signing key registry.
pub trait SigningKeyStore {
    /// Read the registry. A missing document yields an empty registry.
    fn load(&self) -> Result<SigningKeys>;

    /// Validate and overwrite the stored registry.
    fn save(&self, keys: &SigningKeys) -> Result<()>;
}
