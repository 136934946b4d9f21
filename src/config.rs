// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use std::env;
use std::str::FromStr;
use tracing::warn;

pub const DEFAULT_BATCH_ENDPOINT: &str = "https://api.iextrading.com/1.0/stock/market/batch";
pub const DEFAULT_SYMBOLS_ENDPOINT: &str = "https://api.iextrading.com/1.0/ref-data/symbols";

/// What to do when a batch request fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchPolicy {
    /// Abort the whole fetch with the first batch error.
    #[default]
    FailFast,
    /// Log the failure and record every symbol of the batch as missing.
    BestEffort,
}

impl FromStr for FetchPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fail-fast" | "failfast" => Ok(FetchPolicy::FailFast),
            "best-effort" | "besteffort" => Ok(FetchPolicy::BestEffort),
            other => Err(format!("unknown fetch policy: {}", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub batch_endpoint: String,
    pub symbols_endpoint: String,
    pub policy: FetchPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            batch_endpoint: DEFAULT_BATCH_ENDPOINT.to_string(),
            symbols_endpoint: DEFAULT_SYMBOLS_ENDPOINT.to_string(),
            policy: FetchPolicy::default(),
        }
    }
}

impl ClientConfig {
    /// Build a config from `IEX_BATCH_ENDPOINT`, `IEX_SYMBOLS_ENDPOINT` and
    /// `IEX_FETCH_POLICY`, falling back to defaults for anything unset.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let policy = match lookup("IEX_FETCH_POLICY") {
            Some(raw) => raw.parse().unwrap_or_else(|e: String| {
                warn!("{}, using {:?}", e, defaults.policy);
                defaults.policy
            }),
            None => defaults.policy,
        };

        Self {
            batch_endpoint: lookup("IEX_BATCH_ENDPOINT").unwrap_or(defaults.batch_endpoint),
            symbols_endpoint: lookup("IEX_SYMBOLS_ENDPOINT").unwrap_or(defaults.symbols_endpoint),
            policy,
        }
    }

    /// Point both endpoints at a single base URL, e.g. a local mock server.
    pub fn with_base_url(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            batch_endpoint: format!("{}/stock/market/batch", base),
            symbols_endpoint: format!("{}/ref-data/symbols", base),
            policy: FetchPolicy::default(),
        }
    }

    pub fn policy(mut self, policy: FetchPolicy) -> Self {
        self.policy = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_when_env_empty() {
        let config = ClientConfig::from_lookup(|_| None);
        assert_eq!(config.batch_endpoint, DEFAULT_BATCH_ENDPOINT);
        assert_eq!(config.symbols_endpoint, DEFAULT_SYMBOLS_ENDPOINT);
        assert_eq!(config.policy, FetchPolicy::FailFast);
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("IEX_BATCH_ENDPOINT", "http://localhost:1234/batch"),
            ("IEX_FETCH_POLICY", "best-effort"),
        ]
        .into_iter()
        .collect();
        let config = ClientConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(config.batch_endpoint, "http://localhost:1234/batch");
        assert_eq!(config.symbols_endpoint, DEFAULT_SYMBOLS_ENDPOINT);
        assert_eq!(config.policy, FetchPolicy::BestEffort);
    }

    #[test]
    fn test_unknown_policy_falls_back() {
        let config = ClientConfig::from_lookup(|k| {
            (k == "IEX_FETCH_POLICY").then(|| "sometimes".to_string())
        });
        assert_eq!(config.policy, FetchPolicy::FailFast);
    }

    #[test]
    fn test_with_base_url() {
        let config =
            ClientConfig::with_base_url("http://127.0.0.1:9000/").policy(FetchPolicy::BestEffort);
        assert_eq!(config.batch_endpoint, "http://127.0.0.1:9000/stock/market/batch");
        assert_eq!(config.symbols_endpoint, "http://127.0.0.1:9000/ref-data/symbols");
        assert_eq!(config.policy, FetchPolicy::BestEffort);
    }
}
