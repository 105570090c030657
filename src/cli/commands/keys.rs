use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tokio_util::sync::CancellationToken;

use crate::adapters::key_stores::json_key_store::JsonKeyStore;
use crate::cli::KeysAction;
use crate::cli::output;
use crate::core::errors::{Result, SigningKeyError};
use crate::core::models::signing_keys::{KeyEntry, KeyMaterial};
use crate::core::services::key_service::KeyService;

/// Execute the `signkeys keys` command.
pub fn execute(action: &KeysAction) -> Result<()> {
    let service = KeyService {
        store: JsonKeyStore::in_dir(crate::cli::context::config_dir()?),
    };

    match action {
        KeysAction::Add {
            name,
            key,
            cert,
            plugin,
            id,
            plugin_config,
            default,
        } => match (key, cert, plugin, id) {
            (Some(key), Some(cert), _, _) => execute_add_local(&service, name, key, cert, *default),
            (_, _, Some(plugin), Some(id)) => {
                execute_add_plugin(&service, name, plugin, id, plugin_config, *default)
            }
            _ => Err(SigningKeyError::InvalidConfig {
                detail: "either --key and --cert, or --plugin and --id, are required".into(),
            }),
        },
        KeysAction::List => execute_list(&service),
        KeysAction::Show { name } => execute_show(&service, name.as_deref()),
        KeysAction::SetDefault { name } => execute_set_default(&service, name),
        KeysAction::Remove { name } => execute_remove(&service, name),
    }
}

fn execute_add_local(
    service: &KeyService<JsonKeyStore>,
    name: &str,
    key: &Path,
    cert: &Path,
    make_default: bool,
) -> Result<()> {
    let keys = service.add_key(name, &absolute(key), &absolute(cert), make_default)?;
    output::success(&format!("Added signing key: {name}"));
    if keys.is_default(name) {
        output::success(&format!("'{name}' is now the default signing key"));
    }
    Ok(())
}

fn execute_add_plugin(
    service: &KeyService<JsonKeyStore>,
    name: &str,
    plugin: &str,
    id: &str,
    raw_config: &[String],
    make_default: bool,
) -> Result<()> {
    let config = parse_plugin_config(raw_config)?;
    // Nothing cancels this yet; plugin lookups would take a token from the caller.
    let cancel = CancellationToken::new();
    let keys = service.add_plugin_key(&cancel, name, id, plugin, config, make_default)?;
    output::success(&format!("Added plugin signing key: {name} ({plugin})"));
    if keys.is_default(name) {
        output::success(&format!("'{name}' is now the default signing key"));
    }
    Ok(())
}

/// List all signing keys in insertion order.
fn execute_list(service: &KeyService<JsonKeyStore>) -> Result<()> {
    let keys = service.list_keys()?;

    if keys.keys.is_empty() {
        output::warning("No signing keys configured.");
        println!("  Run 'signkeys keys add <name> --key <path> --cert <path>' to add one.");
        return Ok(());
    }

    output::header(&format!(
        "Signing keys ({}) in {}",
        keys.keys.len(),
        service.store.path().display()
    ));
    for entry in &keys.keys {
        output::key_line(
            keys.is_default(&entry.name),
            &entry.name,
            entry.material.kind(),
            &summary(entry),
        );
    }
    if keys.default.is_none() {
        println!();
        output::warning("No default signing key set.");
    }

    Ok(())
}

fn execute_show(service: &KeyService<JsonKeyStore>, name: Option<&str>) -> Result<()> {
    let entry = service.resolve_key(name)?;

    output::header(&entry.name);
    match &entry.material {
        KeyMaterial::X509KeyPair(pair) => {
            output::field("Type", "local key pair");
            output::field("Key", &pair.key_path);
            output::field("Certificate", &pair.certificate_path);
        }
        KeyMaterial::ExternalKey(ext) => {
            output::field("Type", "plugin");
            output::field("Plugin", &ext.plugin_name);
            output::field("Key id", &ext.id);
            for (k, v) in &ext.plugin_config {
                output::field("Config", &format!("{k}={v}"));
            }
        }
    }
    Ok(())
}

fn execute_set_default(service: &KeyService<JsonKeyStore>, name: &str) -> Result<()> {
    service.set_default(name)?;
    output::success(&format!("Default signing key set to: {name}"));
    Ok(())
}

fn execute_remove(service: &KeyService<JsonKeyStore>, name: &str) -> Result<()> {
    for removed in service.remove_key(name)? {
        output::success(&format!("Removed signing key: {removed}"));
    }
    Ok(())
}

fn summary(entry: &KeyEntry) -> String {
    match &entry.material {
        KeyMaterial::X509KeyPair(pair) => pair.certificate_path.clone(),
        KeyMaterial::ExternalKey(ext) => format!("{} / {}", ext.plugin_name, ext.id),
    }
}

/// Store absolute paths so the document stays valid from any working dir.
fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Parse repeated `KEY=VALUE` arguments. Later duplicates win.
fn parse_plugin_config(raw: &[String]) -> Result<BTreeMap<String, String>> {
    raw.iter()
        .map(|pair| match pair.split_once('=') {
            Some((k, v)) if !k.trim().is_empty() => Ok((k.trim().to_string(), v.to_string())),
            _ => Err(SigningKeyError::InvalidConfig {
                detail: format!("invalid --plugin-config '{pair}', expected KEY=VALUE"),
            }),
        })
        .collect()
}
