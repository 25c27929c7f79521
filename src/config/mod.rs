// Configuration module
// Public interface for configuration loading

mod loader;
mod settings;

pub use loader::{load_config, load_from_sources};
pub use settings::{CallboxConfig, ProviderCredentials};
