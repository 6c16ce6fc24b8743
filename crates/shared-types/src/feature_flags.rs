use serde::{Deserialize, Serialize};

/// Feature flags controlling which optional integrations are active.
///
/// Loaded from `config.toml` at server startup. Every field defaults to
/// `false` so that a missing or incomplete config file disables all
/// optional features.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct FeatureFlags {
    /// Send admin emails through Mailgun.
    #[serde(default)]
    pub mailgun: bool,
    /// Export traces over OTLP.
    #[serde(default)]
    pub telemetry: bool,
}

fn default_feed_limit() -> i64 {
    50
}

/// Settings for the admin notification feed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotificationSettings {
    /// How many notifications a feed page holds.
    #[serde(default = "default_feed_limit")]
    pub feed_limit: i64,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            feed_limit: default_feed_limit(),
        }
    }
}

/// Top-level config file structure matching `config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub features: FeatureFlags,
    #[serde(default)]
    pub notifications: NotificationSettings,
}
