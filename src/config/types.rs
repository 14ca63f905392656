//! Configuration type definitions.

use std::collections::BTreeMap;

use serde::Deserialize;

/// Port the relay listens on when nothing else is configured.
pub const DEFAULT_PORT: u16 = 3000;

/// Repository whose thread receives events from unmapped repositories.
pub const DEFAULT_REPOSITORY: &str = "ollim-web";

/// Organization used to build `org/repo` names when a payload carries none.
pub const DEFAULT_ORG: &str = "ollim";

/// Number of recent delivery ids remembered for deduplication.
pub const DEFAULT_DEDUP_CAPACITY: usize = 100;

/// Timeout applied to each Discord delivery call.
pub const DEFAULT_DELIVERY_TIMEOUT_SECS: u64 = 10;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub discord: DiscordConfig,
    pub routing: RoutingConfig,
    pub relay: RelayConfig,
}

/// Inbound HTTP server settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    /// Secret configured on the GitHub webhook. Signatures are only checked when set.
    pub webhook_secret: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            webhook_secret: None,
        }
    }
}

/// Outbound Discord webhook settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DiscordConfig {
    /// Discord "execute webhook" URL of the forum/channel owning the threads.
    pub webhook_url: String,
    pub timeout_secs: u64,
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            webhook_url: String::new(),
            timeout_secs: DEFAULT_DELIVERY_TIMEOUT_SECS,
        }
    }
}

/// Repository to thread mapping.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Repository whose thread is used for unmapped repositories.
    pub default: String,
    /// Repository name -> Discord thread id.
    pub threads: BTreeMap<String, String>,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            default: DEFAULT_REPOSITORY.to_string(),
            threads: BTreeMap::new(),
        }
    }
}

/// Relay behaviour settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    pub dedup_capacity: usize,
    pub default_org: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            dedup_capacity: DEFAULT_DEDUP_CAPACITY,
            default_org: DEFAULT_ORG.to_string(),
        }
    }
}
