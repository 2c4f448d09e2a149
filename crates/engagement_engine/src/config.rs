//! Engine configuration

use serde::Deserialize;

use domain_billing::ReceiptDeposit;
use domain_schedule::EligibilityPolicy;

/// Engine configuration
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// When a candidate period becomes eligible for materialization
    pub eligibility: EligibilityPolicy,
    /// Maximum candidate periods visited in one backfill pass
    pub backfill_cap: usize,
    /// Preferred deposit side for receipt vouchers
    pub receipt_deposit: ReceiptDeposit,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            eligibility: EligibilityPolicy::TaskDriven,
            backfill_cap: 200,
            receipt_deposit: ReceiptDeposit::Bank,
        }
    }
}

impl EngineConfig {
    /// Loads configuration from environment
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("ENGINE"))
            .build()?
            .try_deserialize()
    }
}
