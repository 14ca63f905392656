//! Environment variable overrides for configuration.
//!
//! Supports overriding config values with environment variables:
//! - `PORT` - HTTP listening port
//! - `DISCORD_WEBHOOK_URL` - Discord webhook the relay posts to
//! - `GITHUB_WEBHOOK_SECRET` - secret used to verify `X-Hub-Signature-256`
//! - `OLLIM_WEB_THREAD_ID` / `OLLIM_APP_THREAD_ID` - threads of the two main repositories
//! - `RELAY_THREAD_<REPO>` - thread for any other repository (`RELAY_THREAD_OLLIM_ADMIN` maps `ollim-admin`)
//! - `RELAY_DEFAULT_REPO` - repository whose thread receives unmapped repositories
//! - `RELAY_DEFAULT_ORG` - organization used when a payload names none
//! - `RELAY_DEDUP_CAPACITY` - number of remembered delivery ids

use std::collections::BTreeMap;
use std::env;

use tracing::warn;

use crate::config::types::Config;

/// Environment variable prefix for relay-specific overrides.
const ENV_PREFIX: &str = "RELAY";

/// Per-repository thread variables of the first deployment, with the repository they map.
const LEGACY_THREAD_VARS: [(&str, &str); 2] = [
    ("OLLIM_WEB_THREAD_ID", "ollim-web"),
    ("OLLIM_APP_THREAD_ID", "ollim-app"),
];

/// Apply environment variable overrides from the process environment.
pub fn apply_env_overrides(config: Config) -> Config {
    apply_overrides(config, env::vars())
}

/// Apply overrides from an explicit set of variables.
///
/// Empty values are ignored so that an exported-but-blank variable never
/// wipes a value from the config file.
pub fn apply_overrides<I>(mut config: Config, vars: I) -> Config
where
    I: IntoIterator<Item = (String, String)>,
{
    let vars: BTreeMap<String, String> = vars
        .into_iter()
        .filter(|(_, value)| !value.trim().is_empty())
        .collect();

    if let Some(port) = vars.get("PORT") {
        match port.parse() {
            Ok(port) => config.server.port = port,
            Err(_) => warn!("Ignoring invalid PORT value '{}'", port),
        }
    }

    if let Some(url) = vars.get("DISCORD_WEBHOOK_URL") {
        config.discord.webhook_url = url.clone();
    }

    if let Some(secret) = vars.get("GITHUB_WEBHOOK_SECRET") {
        config.server.webhook_secret = Some(secret.clone());
    }

    for (var, repo) in LEGACY_THREAD_VARS {
        if let Some(thread) = vars.get(var) {
            config.routing.threads.insert(repo.to_string(), thread.clone());
        }
    }

    let thread_prefix = format!("{}_THREAD_", ENV_PREFIX);
    for (var, thread) in &vars {
        if let Some(suffix) = var.strip_prefix(&thread_prefix) {
            if !suffix.is_empty() {
                config
                    .routing
                    .threads
                    .insert(repo_name_from_env(suffix), thread.clone());
            }
        }
    }

    if let Some(repo) = vars.get(&format!("{}_DEFAULT_REPO", ENV_PREFIX)) {
        config.routing.default = repo.clone();
    }

    if let Some(org) = vars.get(&format!("{}_DEFAULT_ORG", ENV_PREFIX)) {
        config.relay.default_org = org.clone();
    }

    if let Some(capacity) = vars.get(&format!("{}_DEDUP_CAPACITY", ENV_PREFIX)) {
        match capacity.parse() {
            Ok(capacity) => config.relay.dedup_capacity = capacity,
            Err(_) => warn!("Ignoring invalid {}_DEDUP_CAPACITY value '{}'", ENV_PREFIX, capacity),
        }
    }

    config
}

/// `OLLIM_ADMIN` -> `ollim-admin`
fn repo_name_from_env(suffix: &str) -> String {
    suffix.to_lowercase().replace('_', "-")
}

/// Check if any required environment variables are set but empty.
///
/// Returns a list of variable names that are set but empty.
pub fn check_empty_env_vars() -> Vec<String> {
    let vars = ["DISCORD_WEBHOOK_URL", "OLLIM_WEB_THREAD_ID", "OLLIM_APP_THREAD_ID"];

    vars.into_iter()
        .filter(|var| env::var(var).map(|v| v.is_empty()).unwrap_or(false))
        .map(str::to_string)
        .collect()
}

/// Get the config file path from environment or use default.
///
/// Checks `RELAY_CONFIG` environment variable, otherwise returns "relay.conf".
pub fn get_config_path() -> String {
    env::var(format!("{}_CONFIG", ENV_PREFIX)).unwrap_or_else(|_| "relay.conf".to_string())
}
