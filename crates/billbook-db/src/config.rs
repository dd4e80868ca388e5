//! # Billing Configuration
//!
//! Where the database lives and which automatic discount bands apply.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     BILLBOOK_DB_PATH=/srv/billbook/billbook.db                         │
//! │     BILLBOOK_MAX_CONNECTIONS=8                                         │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/billbook/billbook.toml (Linux)                           │
//! │     ~/Library/Application Support/com.billbook.billbook/... (macOS)   │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     billbook.db in the data dir, 5 connections, 5% / 10% bands        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # billbook.toml
//! [database]
//! path = "/srv/billbook/billbook.db"
//! max_connections = 5
//!
//! [discounts]
//! # subtotal strictly above `threshold` rupees earns at least `rate` percent
//! tiers = [
//!     { threshold = 5000.0, rate = 10.0 },
//!     { threshold = 1000.0, rate = 5.0 },
//! ]
//! ```

use billbook_core::{DiscountPolicy, DiscountTier, Money, Rate};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::error::{ConfigError, ConfigResult};
use crate::pool::DbConfig;

pub const ENV_DB_PATH: &str = "BILLBOOK_DB_PATH";
pub const ENV_MAX_CONNECTIONS: &str = "BILLBOOK_MAX_CONNECTIONS";

const CONFIG_FILE_NAME: &str = "billbook.toml";
const DB_FILE_NAME: &str = "billbook.db";

// =============================================================================
// Database Settings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite file. Defaults to `billbook.db` in the platform data dir.
    #[serde(default)]
    pub path: Option<PathBuf>,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: None,
            max_connections: default_max_connections(),
        }
    }
}

// =============================================================================
// Discount Settings
// =============================================================================

/// One band as written in the config file: rupees and percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierSettings {
    pub threshold: f64,
    pub rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscountSettings {
    #[serde(default = "default_tiers")]
    pub tiers: Vec<TierSettings>,
}

fn default_tiers() -> Vec<TierSettings> {
    DiscountPolicy::default()
        .tiers()
        .iter()
        .map(|tier| TierSettings {
            threshold: tier.threshold.to_major_f64(),
            rate: tier.rate.percentage(),
        })
        .collect()
}

impl Default for DiscountSettings {
    fn default() -> Self {
        DiscountSettings {
            tiers: default_tiers(),
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BillingConfig {
    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub discounts: DiscountSettings,
}

impl BillingConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (billbook.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading billing config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = Self::from_toml(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load billing config: {}. Using defaults.", e);
            Self::default()
        })
    }

    pub fn from_toml(contents: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "database.max_connections must be at least 1".into(),
            ));
        }

        for (i, tier) in self.discounts.tiers.iter().enumerate() {
            if !tier.threshold.is_finite() || tier.threshold < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "discounts.tiers[{i}].threshold must be a non-negative amount, got {}",
                    tier.threshold
                )));
            }
            if !tier.rate.is_finite() || !(0.0..=100.0).contains(&tier.rate) {
                return Err(ConfigError::Invalid(format!(
                    "discounts.tiers[{i}].rate must be between 0 and 100, got {}",
                    tier.rate
                )));
            }
        }

        Ok(())
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Applies overrides from any key lookup. Unparseable values are logged
    /// and ignored.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_DB_PATH).filter(|p| !p.trim().is_empty()) {
            debug!(path = %path, "Database path overridden from environment");
            self.database.path = Some(PathBuf::from(path));
        }

        if let Some(raw) = lookup(ENV_MAX_CONNECTIONS) {
            match raw.trim().parse::<u32>() {
                Ok(max) => self.database.max_connections = max,
                Err(_) => warn!(value = %raw, "Ignoring invalid {}", ENV_MAX_CONNECTIONS),
            }
        }
    }

    /// `billbook.toml` in the platform config dir, if one can be determined.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "billbook", "billbook")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// The configured database file, falling back to the platform data dir
    /// and then the working directory.
    pub fn database_path(&self) -> PathBuf {
        self.database.path.clone().unwrap_or_else(|| {
            directories::ProjectDirs::from("com", "billbook", "billbook")
                .map(|dirs| dirs.data_dir().join(DB_FILE_NAME))
                .unwrap_or_else(|| PathBuf::from(DB_FILE_NAME))
        })
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(self.database_path()).max_connections(self.database.max_connections)
    }

    /// The configured bands in minor units and basis points.
    pub fn discount_policy(&self) -> DiscountPolicy {
        DiscountPolicy::new(
            self.discounts
                .tiers
                .iter()
                .map(|tier| {
                    DiscountTier::new(
                        Money::from_major_rounded(tier.threshold),
                        Rate::from_percentage(tier.rate),
                    )
                })
                .collect(),
        )
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_match_built_in_policy() {
        let config = BillingConfig::default();
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.discount_policy(), DiscountPolicy::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_file() {
        let config = BillingConfig::from_toml(
            r#"
            [database]
            path = "/srv/billbook/billbook.db"
            max_connections = 3

            [discounts]
            tiers = [{ threshold = 2500.0, rate = 7.5 }]
            "#,
        )
        .unwrap();

        assert_eq!(config.database_path(), PathBuf::from("/srv/billbook/billbook.db"));
        assert_eq!(config.db_config().max_connections, 3);

        let policy = config.discount_policy();
        assert_eq!(policy.tiers().len(), 1);
        assert_eq!(policy.tiers()[0].threshold, Money::from_major_minor(2500, 0));
        assert_eq!(policy.tiers()[0].rate, Rate::from_bps(750));
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config = BillingConfig::from_toml("[database]\nmax_connections = 2\n").unwrap();
        assert_eq!(config.database.max_connections, 2);
        assert_eq!(config.discounts, DiscountSettings::default());
    }

    #[test]
    fn test_empty_tiers_disable_discounts() {
        let config = BillingConfig::from_toml("[discounts]\ntiers = []\n").unwrap();
        assert_eq!(config.discount_policy(), DiscountPolicy::none());
    }

    #[test]
    fn test_validate_rejects_zero_connections() {
        let mut config = BillingConfig::default();
        config.database.max_connections = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_rejects_rate_above_hundred() {
        let mut config = BillingConfig::default();
        config.discounts.tiers.push(TierSettings {
            threshold: 100.0,
            rate: 120.0,
        });
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_rejects_negative_threshold() {
        let mut config = BillingConfig::default();
        config.discounts.tiers = vec![TierSettings {
            threshold: -1.0,
            rate: 5.0,
        }];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_DB_PATH, "/tmp/override.db"),
            (ENV_MAX_CONNECTIONS, "9"),
        ]
        .into_iter()
        .collect();

        let mut config = BillingConfig::default();
        config.apply_overrides_from(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.database_path(), PathBuf::from("/tmp/override.db"));
        assert_eq!(config.database.max_connections, 9);
    }

    #[test]
    fn test_invalid_override_is_ignored() {
        let mut config = BillingConfig::default();
        config.apply_overrides_from(|key| {
            (key == ENV_MAX_CONNECTIONS).then(|| "many".to_string())
        });
        assert_eq!(config.database.max_connections, 5);
    }

    #[test]
    fn test_load_from_file() {
        let dir = std::env::temp_dir().join(format!("billbook-config-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[discounts]\ntiers = [{ threshold = 100.0, rate = 2.0 }]\n").unwrap();

        let config = BillingConfig::load(Some(path)).unwrap();
        assert_eq!(config.discount_policy().tiers()[0].rate, Rate::from_bps(200));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_load_rejects_malformed_file() {
        let dir = std::env::temp_dir().join(format!("billbook-config-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[database\n").unwrap();

        assert!(matches!(
            BillingConfig::load(Some(path.clone())),
            Err(ConfigError::Parse(_))
        ));
        assert_eq!(
            BillingConfig::load_or_default(Some(path)).discounts,
            DiscountSettings::default()
        );

        let _ = std::fs::remove_dir_all(&dir);
    }
}
