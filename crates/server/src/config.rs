use shared_types::{AppConfig, FeatureFlags, NotificationSettings};
use std::sync::OnceLock;

static CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// Path to the config file, relative to the working directory.
const CONFIG_PATH: &str = "config.toml";

/// Read `config.toml` and store it in the global `OnceLock`. Only the first
/// call has effect.
///
/// If the file is missing or unparseable, every flag is off and the feed
/// limit keeps its default.
pub fn load_config() -> &'static AppConfig {
    CONFIG.get_or_init(|| match std::fs::read_to_string(CONFIG_PATH) {
        Ok(contents) => {
            let config: AppConfig = toml::from_str(&contents).unwrap_or_else(|e| {
                tracing::warn!(path = CONFIG_PATH, error = %e, "config parse failed, using defaults");
                AppConfig::default()
            });
            tracing::info!(features = ?config.features, "config loaded");
            config
        }
        Err(e) => {
            tracing::info!(path = CONFIG_PATH, error = %e, "config file not found, using defaults");
            AppConfig::default()
        }
    })
}

/// Loaded feature flags, or all-false defaults before `load_config()`.
pub fn feature_flags() -> &'static FeatureFlags {
    static DEFAULT: FeatureFlags = FeatureFlags {
        mailgun: false,
        telemetry: false,
    };
    CONFIG.get().map(|c| &c.features).unwrap_or(&DEFAULT)
}

pub fn notification_settings() -> NotificationSettings {
    CONFIG
        .get()
        .map(|c| c.notifications.clone())
        .unwrap_or_default()
}
