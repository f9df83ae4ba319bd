use std::sync::{Arc, OnceLock};

use super::StaticConfig;

static CONFIG: OnceLock<Arc<StaticConfig>> = OnceLock::new();

/// Get the global configuration instance.
///
/// # Panics
/// If neither `init_config` nor `init_config_from` ran first.
pub fn get_config() -> Arc<StaticConfig> {
    CONFIG
        .get()
        .expect("Config not initialized. Call init_config() first.")
        .clone()
}

/// Load `config.toml` (if present) plus `LM__*` environment overrides.
pub fn init_config() {
    CONFIG.get_or_init(|| Arc::new(StaticConfig::load(None)));
}

/// Same as [`init_config`] but reads the given TOML file.
pub fn init_config_from(path: &str) {
    CONFIG.get_or_init(|| Arc::new(StaticConfig::load(Some(path))));
}
