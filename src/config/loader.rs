// Configuration loader
// Layers an optional TOML file under CALLBOX_* environment variables

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use std::path::Path;

use super::settings::CallboxConfig;

/// Default config file looked up in the working directory
const DEFAULT_CONFIG_FILE: &str = "callbox.toml";

/// Load configuration from `path` (or ./callbox.toml if present) and the
/// process environment. Environment wins.
///
/// Nested keys use a double underscore:
/// `CALLBOX_PROVIDER__AUTH_TOKEN` sets `provider.auth_token`.
pub fn load_config(path: Option<&Path>) -> Result<CallboxConfig> {
    load_from_sources(path, callbox_environment())
}

pub(crate) fn callbox_environment() -> Environment {
    Environment::with_prefix("CALLBOX")
        .prefix_separator("_")
        .separator("__")
}

/// Build the config from an explicit environment source. Tests inject a
/// map here instead of mutating the process environment.
pub fn load_from_sources(path: Option<&Path>, env: Environment) -> Result<CallboxConfig> {
    let file = match path {
        Some(path) => File::from(path).format(FileFormat::Toml).required(true),
        None => File::with_name(DEFAULT_CONFIG_FILE)
            .format(FileFormat::Toml)
            .required(false),
    };

    let settings = Config::builder()
        .add_source(file)
        .add_source(env)
        .build()
        .context("Failed to read callbox configuration")?;

    let config: CallboxConfig = settings
        .try_deserialize()
        .context("Callbox configuration is incomplete (service_url, service_key and fallback_number are required)")?;

    config.validate()?;

    tracing::debug!(
        service_url = %config.service_url,
        bind = %config.bind_address,
        signatures = config.signature_validation_enabled(),
        "Configuration loaded"
    );

    Ok(config)
}
