//! Node configuration.
//!
//! Every component receives its configuration explicitly at construction
//! time; there is no ambient or global lookup, so tests can inject a
//! distinct configuration per scenario.

use crate::amount::Amount;
use crate::errors::{Result, TurretError};
use crate::identity::AccountId;
use serde::{Deserialize, Serialize};

/// Which ledger network this turret operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Network {
    /// Test network: uploads are open.
    Test,
    /// Public network: uploads are restricted to allow-listed hashes.
    Public,
}

impl Network {
    /// Network passphrase mixed into every transaction hash.
    pub fn passphrase(&self) -> &'static str {
        match self {
            Network::Test => "Turret Test Network ; April 2022",
            Network::Public => "Turret Public Network ; April 2022",
        }
    }

    /// Whether uploads must be allow-listed on this network.
    pub fn is_restricted(&self) -> bool {
        matches!(self, Network::Public)
    }
}

/// Configuration for one turret node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurretConfig {
    /// Ledger network this node serves.
    pub network: Network,
    /// Account receiving upload fee payments; also this turret's identity.
    pub turret_address: AccountId,
    /// Upload cost divisor: cost = payload bytes / divisor.
    pub upload_divisor: u64,
    /// Base URL of the ledger's query/submit API.
    pub horizon_url: String,
    /// Timeout applied to every outbound network call, in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Freshness window for heal request timestamps, in seconds.
    #[serde(default = "default_heal_window_secs")]
    pub heal_window_secs: u64,
    /// Lowest transaction fee a heal request may propose, in stroops.
    #[serde(default = "default_min_heal_fee")]
    pub min_heal_fee_stroops: u32,
    /// Highest transaction fee a heal request may propose, in stroops.
    #[serde(default = "default_max_heal_fee")]
    pub max_heal_fee_stroops: u32,
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_heal_window_secs() -> u64 {
    5 * 60
}

fn default_min_heal_fee() -> u32 {
    100
}

fn default_max_heal_fee() -> u32 {
    1_000_000
}

impl TurretConfig {
    /// Check internal consistency once at startup.
    pub fn validate(&self) -> Result<()> {
        if self.upload_divisor == 0 {
            return Err(TurretError::config("upload_divisor must be non-zero"));
        }
        if self.horizon_url.is_empty() {
            return Err(TurretError::config("horizon_url must be set"));
        }
        if self.min_heal_fee_stroops > self.max_heal_fee_stroops {
            return Err(TurretError::config(
                "min_heal_fee_stroops exceeds max_heal_fee_stroops",
            ));
        }
        if self.heal_window_secs == 0 {
            return Err(TurretError::config("heal_window_secs must be non-zero"));
        }
        Ok(())
    }

    /// Upload cost for a payload of `size_bytes`.
    pub fn upload_cost(&self, size_bytes: u64) -> Result<Amount> {
        Amount::upload_cost(size_bytes, self.upload_divisor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn base_config() -> TurretConfig {
        TurretConfig {
            network: Network::Test,
            turret_address: "aa00000000000000000000000000000000000000000000000000000000000000"
                .parse()
                .unwrap(),
            upload_divisor: 1000,
            horizon_url: "http://localhost:8000".into(),
            request_timeout_ms: default_request_timeout_ms(),
            heal_window_secs: default_heal_window_secs(),
            min_heal_fee_stroops: default_min_heal_fee(),
            max_heal_fee_stroops: default_max_heal_fee(),
        }
    }

    #[test]
    fn validate_catches_bad_fields() {
        assert!(base_config().validate().is_ok());

        let mut cfg = base_config();
        cfg.upload_divisor = 0;
        assert_matches!(cfg.validate(), Err(TurretError::Config { .. }));

        let mut cfg = base_config();
        cfg.min_heal_fee_stroops = 10;
        cfg.max_heal_fee_stroops = 5;
        assert_matches!(cfg.validate(), Err(TurretError::Config { .. }));
    }

    #[test]
    fn deserializes_from_toml_with_defaults() {
        let cfg: TurretConfig = toml::from_str(
            r#"
            network = "TEST"
            turret_address = "aa00000000000000000000000000000000000000000000000000000000000000"
            upload_divisor = 1000
            horizon_url = "http://localhost:8000"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.network, Network::Test);
        assert_eq!(cfg.heal_window_secs, 300);
        assert_eq!(cfg.request_timeout_ms, 10_000);
    }

    #[test]
    fn only_public_network_is_restricted() {
        assert!(Network::Public.is_restricted());
        assert!(!Network::Test.is_restricted());
        assert_ne!(Network::Test.passphrase(), Network::Public.passphrase());
    }
}
