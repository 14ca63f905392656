//! Configuration validation.
//!
//! Validates configuration values and provides helpful error messages.

use reqwest::Url;

use crate::common::error::ConfigError;
use crate::config::types::Config;

/// Validate a configuration and return detailed errors.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    // Validate Discord config
    if config.discord.webhook_url.is_empty() {
        errors.push("discord.webhook_url is required (or set DISCORD_WEBHOOK_URL)".to_string());
    } else {
        match Url::parse(&config.discord.webhook_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => errors.push(format!(
                "discord.webhook_url must use http or https (got '{}')",
                url.scheme()
            )),
            Err(e) => errors.push(format!("discord.webhook_url is not a valid URL: {}", e)),
        }
    }
    if config.discord.timeout_secs == 0 {
        errors.push("discord.timeout_secs must be non-zero".to_string());
    }

    // Validate server config
    if config.server.port == 0 {
        errors.push("server.port must be non-zero".to_string());
    }
    if matches!(config.server.webhook_secret.as_deref(), Some("")) {
        errors.push("server.webhook_secret is set but empty".to_string());
    }

    // Validate routing
    if config.routing.threads.is_empty() {
        errors.push("routing.threads is empty - no destination thread configured".to_string());
    } else if !config.routing.threads.contains_key(&config.routing.default) {
        errors.push(format!(
            "routing.default '{}' has no thread in routing.threads",
            config.routing.default
        ));
    }
    for (repo, thread) in &config.routing.threads {
        if thread.trim().is_empty() {
            errors.push(format!("routing.threads.{} is empty", repo));
        }
    }

    // Validate relay settings
    if config.relay.dedup_capacity == 0 {
        errors.push("relay.dedup_capacity must be non-zero".to_string());
    }
    if config.relay.default_org.is_empty() {
        errors.push("relay.default_org is required".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError {
            message: errors.join("\n"),
        })
    }
}
