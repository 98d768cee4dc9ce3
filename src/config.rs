use std::ops::RangeInclusive;

use anyhow::{bail, Context};

/// Accepted values for `DEFAULT_SHELF_LIFE_DAYS`.
pub const SHELF_LIFE_DAYS: RangeInclusive<i64> = 1..=3650;

/// Which [`DataGateway`](crate::gateway::DataGateway) implementation backs the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataBackend {
    /// The external JSON data API at `api_base_url`.
    Http,
    /// A process-local store, optionally seeded with `seed_count` products.
    Memory,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub host: String,
    pub port: u16,
    pub backend: DataBackend,
    pub request_timeout_secs: u64,
    pub seed_count: usize,
    pub recent_limit: usize,
    pub default_shelf_life_days: i64,
    pub metrics_capacity: usize,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key lookup; `from_env` passes the process
    /// environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let backend = match var_or("DATA_BACKEND", "http").to_ascii_lowercase().as_str() {
            "http" => DataBackend::Http,
            "memory" => DataBackend::Memory,
            other => bail!("DATA_BACKEND must be `http` or `memory`, got `{}`", other),
        };

        let default_shelf_life_days: i64 = var_or("DEFAULT_SHELF_LIFE_DAYS", "30")
            .parse()
            .context("DEFAULT_SHELF_LIFE_DAYS must be a valid number")?;
        if !SHELF_LIFE_DAYS.contains(&default_shelf_life_days) {
            bail!(
                "DEFAULT_SHELF_LIFE_DAYS must be between {} and {}, got {}",
                SHELF_LIFE_DAYS.start(),
                SHELF_LIFE_DAYS.end(),
                default_shelf_life_days
            );
        }

        let metrics_capacity: usize = var_or("METRICS_CAPACITY", "5000")
            .parse()
            .context("METRICS_CAPACITY must be a valid number")?;
        if metrics_capacity == 0 {
            bail!("METRICS_CAPACITY must be at least 1");
        }

        Ok(Self {
            api_base_url: var_or("API_BASE_URL", "http://localhost:3001")
                .trim_end_matches('/')
                .to_string(),
            host: var_or("HOST", "127.0.0.1"),
            port: var_or("PORT", "3000")
                .parse()
                .context("PORT must be a valid number")?,
            backend,
            request_timeout_secs: var_or("REQUEST_TIMEOUT_SECS", "10")
                .parse()
                .context("REQUEST_TIMEOUT_SECS must be a valid number")?,
            seed_count: var_or("SEED_COUNT", "0")
                .parse()
                .context("SEED_COUNT must be a valid number")?,
            recent_limit: var_or("RECENT_LIMIT", "5")
                .parse()
                .context("RECENT_LIMIT must be a valid number")?,
            default_shelf_life_days,
            metrics_capacity,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:3001".to_string(),
            host: "127.0.0.1".to_string(),
            port: 3000,
            backend: DataBackend::Http,
            request_timeout_secs: 10,
            seed_count: 0,
            recent_limit: 5,
            default_shelf_life_days: 30,
            metrics_capacity: crate::metrics::DEFAULT_CAPACITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn from_pairs(pairs: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = from_pairs(&[]).unwrap();
        assert_eq!(config.backend, DataBackend::Http);
        assert_eq!(config.port, 3000);
        assert_eq!(config.default_shelf_life_days, 30);
        assert_eq!(config.metrics_capacity, crate::metrics::DEFAULT_CAPACITY);
    }

    #[test]
    fn reads_overrides() {
        let config = from_pairs(&[
            ("API_BASE_URL", "http://api.local:4000/"),
            ("DATA_BACKEND", "Memory"),
            ("DEFAULT_SHELF_LIFE_DAYS", "3650"),
            ("METRICS_CAPACITY", "100"),
        ])
        .unwrap();
        assert_eq!(config.api_base_url, "http://api.local:4000");
        assert_eq!(config.backend, DataBackend::Memory);
        assert_eq!(config.default_shelf_life_days, 3650);
        assert_eq!(config.metrics_capacity, 100);
    }

    #[test]
    fn shelf_life_out_of_range_is_rejected() {
        for days in ["0", "-5", "3651", "200000000"] {
            let err = from_pairs(&[("DEFAULT_SHELF_LIFE_DAYS", days)]).unwrap_err();
            assert!(err.to_string().contains("between 1 and 3650"), "{days}: {err}");
        }
        assert!(from_pairs(&[("DEFAULT_SHELF_LIFE_DAYS", "mucho")]).is_err());
    }

    #[test]
    fn zero_metrics_capacity_and_unknown_backend_are_rejected() {
        assert!(from_pairs(&[("METRICS_CAPACITY", "0")]).is_err());
        assert!(from_pairs(&[("DATA_BACKEND", "postgres")]).is_err());
    }
}
