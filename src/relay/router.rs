//! Repository to Discord thread routing.
//!
//! Each repository posts into its own thread; repositories without a mapping
//! fall back to the thread of the configured default repository.

use std::collections::BTreeMap;

use tracing::warn;

use crate::common::ThreadId;
use crate::config::types::RoutingConfig;

/// Static repository -> thread mapping with a default destination.
#[derive(Debug, Clone)]
pub struct RepoRouter {
    /// Repository name -> thread.
    threads: BTreeMap<String, ThreadId>,
    /// Repository whose thread is used as fallback.
    default_repository: String,
    /// Thread used for repositories without a mapping.
    default_thread: ThreadId,
}

impl RepoRouter {
    /// Create a router from an explicit mapping and default thread.
    pub fn new(
        threads: impl IntoIterator<Item = (String, ThreadId)>,
        default_repository: impl Into<String>,
        default_thread: ThreadId,
    ) -> Self {
        Self {
            threads: threads.into_iter().collect(),
            default_repository: default_repository.into(),
            default_thread,
        }
    }

    /// Create a new router from configuration.
    ///
    /// Validation guarantees the default repository is mapped; if it is not,
    /// the first configured thread is used instead.
    pub fn from_config(config: &RoutingConfig) -> Self {
        let threads: BTreeMap<String, ThreadId> = config
            .threads
            .iter()
            .map(|(repo, thread)| (repo.clone(), ThreadId::new(thread.clone())))
            .collect();

        let default_thread = match threads.get(&config.default) {
            Some(thread) => thread.clone(),
            None => {
                warn!(
                    "Default repository '{}' has no thread, using first configured thread",
                    config.default
                );
                threads
                    .values()
                    .next()
                    .cloned()
                    .unwrap_or_else(|| ThreadId::new(String::new()))
            }
        };

        Self::new(threads, config.default.clone(), default_thread)
    }

    /// Get the thread that should receive events from `repo_name`.
    pub fn resolve_destination(&self, repo_name: &str) -> &ThreadId {
        self.threads.get(repo_name).unwrap_or(&self.default_thread)
    }

    /// Thread used for unmapped repositories.
    pub fn default_destination(&self) -> &ThreadId {
        &self.default_thread
    }

    /// Repository whose thread is the fallback.
    pub fn default_repository(&self) -> &str {
        &self.default_repository
    }

    /// All configured routes, ordered by repository name.
    pub fn routes(&self) -> impl Iterator<Item = (&str, &ThreadId)> {
        self.threads.iter().map(|(repo, thread)| (repo.as_str(), thread))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_config(default: &str, threads: &[(&str, &str)]) -> RoutingConfig {
        RoutingConfig {
            default: default.to_string(),
            threads: threads
                .iter()
                .map(|(repo, thread)| (repo.to_string(), thread.to_string()))
                .collect(),
        }
    }

    #[test]
    fn test_known_repositories_resolve_to_their_thread() {
        let config = make_config("ollim-web", &[("ollim-web", "111"), ("ollim-app", "222")]);
        let router = RepoRouter::from_config(&config);

        for (repo, thread) in &config.threads {
            assert_eq!(router.resolve_destination(repo).as_str(), thread.as_str());
        }
    }

    #[test]
    fn test_unknown_repositories_resolve_to_default() {
        let router = RepoRouter::from_config(&make_config(
            "ollim-web",
            &[("ollim-web", "111"), ("ollim-app", "222")],
        ));

        for repo in ["ollim-admin", "", "OLLIM-APP", "other/ollim-app"] {
            assert_eq!(router.resolve_destination(repo).as_str(), "111");
        }
        assert_eq!(router.default_destination().as_str(), "111");
        assert_eq!(router.default_repository(), "ollim-web");
    }

    #[test]
    fn test_unmapped_default_uses_first_thread() {
        let router = RepoRouter::from_config(&make_config("missing", &[("b-repo", "2"), ("a-repo", "1")]));
        assert_eq!(router.default_destination().as_str(), "1");
    }

    #[test]
    fn test_routes_are_ordered() {
        let router = RepoRouter::new(
            vec![
                ("ollim-web".to_string(), ThreadId::new("111")),
                ("ollim-app".to_string(), ThreadId::new("222")),
            ],
            "ollim-web",
            ThreadId::new("111"),
        );

        let repos: Vec<&str> = router.routes().map(|(repo, _)| repo).collect();
        assert_eq!(repos, vec!["ollim-app", "ollim-web"]);
    }
}
