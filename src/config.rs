use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;

use crate::fee::FeePolicy;
use crate::identity::StaticSession;
use crate::lifecycle::TransitionPolicy;
use crate::rates::RateSeed;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    /// Separate rolling file for `audit` target events
    #[serde(default)]
    pub audit_log_file: Option<String>,
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub fees: FeePolicy,
    #[serde(default)]
    pub lifecycle: LifecycleConfig,
    #[serde(default)]
    pub identity: IdentityConfig,
    #[serde(default)]
    pub persistence: PersistenceConfig,
    /// Initial rates, applied only to countries without an entry
    #[serde(default)]
    pub rates: Vec<RateSeed>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LifecycleConfig {
    /// Reject status moves off the PENDING → APPROVED → COMPLETED / REJECTED graph
    pub enforce_status_graph: bool,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            enforce_status_graph: true,
        }
    }
}

impl LifecycleConfig {
    pub fn policy(&self) -> TransitionPolicy {
        if self.enforce_status_graph {
            TransitionPolicy::Enforced
        } else {
            TransitionPolicy::Permissive
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct IdentityConfig {
    /// Per-lookup budget when joining owner profiles onto admin listings
    pub profile_timeout_ms: u64,
    /// Fixed bearer sessions (dev-sessions feature only)
    #[serde(default)]
    pub sessions: Vec<StaticSession>,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            profile_timeout_ms: 500,
            sessions: Vec::new(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PersistenceConfig {
    pub enabled: bool,
    pub data_dir: String,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            data_dir: "./data/store".to_string(),
        }
    }
}

impl AppConfig {
    pub fn load(env: &str) -> anyhow::Result<Self> {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path))?;
        Self::from_yaml(&content).with_context(|| format!("Failed to parse {}", config_path))
    }

    pub fn from_yaml(content: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corridor::Country;
    use rust_decimal::Decimal;

    const MINIMAL: &str = r#"
log_level: info
log_dir: ./logs
log_file: remit.log
use_json: false
rotation: daily
gateway:
  host: 127.0.0.1
  port: 8080
"#;

    #[test]
    fn test_defaults_applied() {
        let config = AppConfig::from_yaml(MINIMAL).unwrap();
        assert_eq!(config.fees, FeePolicy::default());
        assert_eq!(config.lifecycle.policy(), TransitionPolicy::Enforced);
        assert_eq!(config.identity.profile_timeout_ms, 500);
        assert!(!config.persistence.enabled);
        assert!(config.rates.is_empty());
    }

    #[test]
    fn test_full_config() {
        let yaml = format!(
            "{}{}",
            MINIMAL,
            r#"
fees:
  flat_fee: "1.50"
  charge_percentage_fee: true
lifecycle:
  enforce_status_graph: false
rates:
  - country: Somalia
    exchange_rate: "1.27"
    fee_percentage: "2"
"#
        );
        let config = AppConfig::from_yaml(&yaml).unwrap();
        assert_eq!(config.fees.flat_fee, Decimal::new(150, 2));
        assert!(config.fees.charge_percentage_fee);
        assert_eq!(config.lifecycle.policy(), TransitionPolicy::Permissive);
        assert_eq!(config.rates[0].country, Country::Somalia);
        assert_eq!(config.rates[0].exchange_rate, Decimal::new(127, 2));
    }

    #[test]
    fn test_missing_file_is_error() {
        assert!(AppConfig::load("does-not-exist").is_err());
    }
}
