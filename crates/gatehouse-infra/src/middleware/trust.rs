//! Trust policy: which origins may talk to the API and which hosts we answer for.
//!
//! Built once from [`Config`] at startup and shared read-only by every guard. The
//! localhost development sets are merged in only outside production.

use std::collections::HashSet;

use gatehouse_core::Config;

#[derive(Debug, Clone)]
pub struct TrustPolicy {
    allowed_origins: HashSet<String>,
    trusted_hosts: HashSet<String>,
    csrf_exempt_paths: HashSet<String>,
    is_production: bool,
}

impl TrustPolicy {
    pub fn new<O, H, E>(origins: O, hosts: H, csrf_exempt_paths: E, is_production: bool) -> Self
    where
        O: IntoIterator<Item = String>,
        H: IntoIterator<Item = String>,
        E: IntoIterator<Item = String>,
    {
        Self {
            allowed_origins: origins.into_iter().collect(),
            trusted_hosts: hosts.into_iter().map(|h| h.to_ascii_lowercase()).collect(),
            csrf_exempt_paths: csrf_exempt_paths.into_iter().collect(),
            is_production,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let is_production = config.is_production();

        let mut origins = config.allowed_origins.clone();
        let mut hosts = config.trusted_hosts.clone();
        if !is_production {
            origins.extend(config.dev_origins.iter().cloned());
            hosts.extend(config.dev_hosts.iter().cloned());
        }

        let policy = Self::new(
            origins,
            hosts,
            config.csrf_exempt_paths.iter().cloned(),
            is_production,
        );

        tracing::info!(
            origins = policy.allowed_origins.len(),
            hosts = policy.trusted_hosts.len(),
            csrf_exempt = policy.csrf_exempt_paths.len(),
            production = is_production,
            "Trust policy loaded"
        );

        policy
    }

    /// Exact match against the allowed set. `None` is never allowed.
    pub fn is_allowed_origin(&self, origin: Option<&str>) -> bool {
        origin.is_some_and(|o| self.allowed_origins.contains(o))
    }

    /// Host comparison is case-insensitive; the port is part of the host.
    pub fn is_trusted_host(&self, host: Option<&str>) -> bool {
        host.is_some_and(|h| self.trusted_hosts.contains(&h.to_ascii_lowercase()))
    }

    pub fn is_csrf_exempt(&self, path: &str) -> bool {
        self.csrf_exempt_paths.contains(path)
    }

    pub fn is_production(&self) -> bool {
        self.is_production
    }
}
