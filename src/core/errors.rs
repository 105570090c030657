use std::path::PathBuf;

/// All domain errors for signkeys.
///
/// Input errors are deterministic, so nothing here is retried. I/O and
/// parse failures keep the underlying cause as their `source`.
#[derive(Debug, thiserror::Error)]
pub enum SigningKeyError {
    #[error("key name cannot be empty")]
    EmptyKeyName,

    #[error(
        "signing key with name '{name}' already exists\n\n  \
         Pick another name, or remove the existing key first:\n    \
         → signkeys keys remove {name}"
    )]
    DuplicateKeyName { name: String },

    #[error("signing key '{name}' not found")]
    KeyNotFound { name: String },

    #[error(
        "default signing key not set\n\n  \
         Solutions:\n    \
         → Mark a key as default: signkeys keys set-default <name>\n    \
         → Or name the key explicitly: signkeys keys show <name>"
    )]
    NoDefaultSet,

    #[error("plugin key id cannot be empty")]
    EmptyPluginId,

    #[error("plugin name cannot be empty")]
    EmptyPluginName,

    #[error("key file not found: {}: {source}", .path.display())]
    KeyFileNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    MalformedDocument {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed signingkeys.json: {0}")]
    Invalid(#[from] ValidationError),

    #[error("operation cancelled")]
    Cancelled,

    #[error("Invalid configuration: {detail}")]
    InvalidConfig { detail: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Registry invariant violations, reported in the order they are checked.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("key name cannot be empty")]
    EmptyKeyName,

    #[error("multiple keys with name '{name}' found")]
    DuplicateName { name: String },

    #[error("default key name cannot be empty")]
    EmptyDefault,

    #[error("default key '{name}' not found")]
    InvalidDefault { name: String },
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SigningKeyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_carry_document_prefix() {
        let err = SigningKeyError::from(ValidationError::DuplicateName {
            name: "wabbit-networks".into(),
        });
        assert_eq!(
            err.to_string(),
            "malformed signingkeys.json: multiple keys with name 'wabbit-networks' found"
        );
    }

    #[test]
    fn key_file_not_found_keeps_cause() {
        use std::error::Error;

        let err = SigningKeyError::KeyFileNotFound {
            path: PathBuf::from("/missing.key"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert!(err.to_string().starts_with("key file not found: /missing.key"));
        assert!(err.source().is_some());
    }
}
