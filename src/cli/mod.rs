pub mod commands;
pub mod context;
pub mod output;

use std::path::PathBuf;

use clap::{ArgGroup, Parser, Subcommand};

/// Manage named signing keys: local key/certificate pairs and plugin keys.
#[derive(Parser, Debug)]
#[command(name = "signkeys", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory holding signingkeys.json
    #[arg(long, global = true, env = "SIGNKEYS_CONFIG_DIR")]
    pub config_dir: Option<PathBuf>,

    /// Verbose output (debug diagnostics on stderr)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage signing keys
    Keys {
        #[command(subcommand)]
        action: KeysAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum KeysAction {
    /// Add a local key pair (--key/--cert) or a plugin key (--plugin/--id)
    #[command(group(ArgGroup::new("source").required(true).args(["key", "plugin"])))]
    Add {
        /// Name of the new signing key
        name: String,
        /// Path to the private key file
        #[arg(long, requires = "cert", conflicts_with = "plugin")]
        key: Option<PathBuf>,
        /// Path to the certificate file
        #[arg(long, requires = "key")]
        cert: Option<PathBuf>,
        /// Name of the signing plugin holding the key
        #[arg(long, requires = "id")]
        plugin: Option<String>,
        /// Key id understood by the plugin
        #[arg(long, requires = "plugin")]
        id: Option<String>,
        /// Plugin configuration entry. Repeatable.
        #[arg(long = "plugin-config", value_name = "KEY=VALUE", requires = "plugin")]
        plugin_config: Vec<String>,
        /// Mark the new key as the default
        #[arg(long)]
        default: bool,
    },
    /// List signing keys; the default is marked with *
    List,
    /// Show a signing key, or the default when no name is given
    Show {
        /// Name of the key
        name: Option<String>,
    },
    /// Set the default signing key
    SetDefault {
        /// Name of the key
        name: String,
    },
    /// Remove a signing key
    Remove {
        /// Name of the key
        name: String,
    },
}
