//! Application configuration management.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Default reconciliation matching parameters.
    #[serde(default)]
    pub matching: MatchingConfig,
    /// Exchange rate feed configuration.
    #[serde(default)]
    pub rates: RatesConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Reconciliation matching defaults. Requests may override each value.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Absolute tolerance for an exact amount match.
    pub amount_tolerance: Decimal,
    /// Looser tolerance, as a fraction of the remaining amount.
    pub near_amount_ratio: Decimal,
    /// Amount score awarded inside the looser tolerance.
    pub near_amount_score: u32,
    /// Date window in days.
    pub max_days: u32,
    /// Minimum total score for a candidate to be reported.
    pub min_score: u32,
    /// Candidates returned per payment or receipt.
    pub max_candidates: usize,
    /// Hard cap on auto-match actions per run.
    pub max_actions: usize,
    /// Only consider documents in the payment's currency.
    pub currency_strict: bool,
    /// Score non-exact amounts lower than exact ones.
    pub prefer_exact_amount: bool,
    /// Weight of the reference text overlap factor.
    pub text_weight: u32,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            amount_tolerance: Decimal::new(1, 2),
            near_amount_ratio: Decimal::new(5, 2),
            near_amount_score: 60,
            max_days: 30,
            min_score: 0,
            max_candidates: 3,
            max_actions: 50,
            currency_strict: false,
            prefer_exact_amount: true,
            text_weight: 0,
        }
    }
}

/// Exchange rate feed configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RatesConfig {
    /// Base URL of the live rate feed. No feed is used when unset.
    pub feed_url: Option<String>,
    /// Request timeout for the feed.
    pub timeout_secs: u64,
}

impl Default for RatesConfig {
    fn default() -> Self {
        Self {
            feed_url: None,
            timeout_secs: 5,
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("LEDGERWISE").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_matching_defaults() {
        let matching = MatchingConfig::default();
        assert_eq!(matching.amount_tolerance, dec!(0.01));
        assert_eq!(matching.near_amount_ratio, dec!(0.05));
        assert_eq!(matching.max_days, 30);
        assert_eq!(matching.max_candidates, 3);
        assert_eq!(matching.max_actions, 50);
        assert!(matching.prefer_exact_amount);
        assert!(!matching.currency_strict);
    }

    #[test]
    fn test_load_from_env() {
        temp_env::with_vars(
            [
                ("LEDGERWISE__DATABASE__URL", Some("postgres://localhost/ledgerwise")),
                ("LEDGERWISE__SERVER__PORT", Some("9090")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.database.url, "postgres://localhost/ledgerwise");
                assert_eq!(config.server.port, 9090);
                assert_eq!(config.server.host, "0.0.0.0");
                assert_eq!(config.database.max_connections, 10);
                assert_eq!(config.matching.max_days, 30);
                assert!(config.rates.feed_url.is_none());
            },
        );
    }

    #[test]
    fn test_load_requires_database_url() {
        temp_env::with_var_unset("LEDGERWISE__DATABASE__URL", || {
            assert!(AppConfig::load().is_err());
        });
    }
}
