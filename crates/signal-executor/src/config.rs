use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use signal_validation::ValidationConfig;
use std::env;
use wallet_trait::Network;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutorConfig {
    pub trading_enabled: bool,             // master switch
    pub network: Network,                  // preprod unless set
    pub partial_sign: bool,                // CIP-30 signTx partial flag
    pub blockfrost_fallback: bool,         // retry failed wallet submits via Blockfrost
    pub confirmation_timeout_secs: u64,    // 0 = don't wait for a block
    pub confirmation_poll_secs: u64,

    pub validation: ValidationConfig,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            trading_enabled: true,
            network: Network::Preprod,
            partial_sign: true,
            blockfrost_fallback: true,
            confirmation_timeout_secs: 0,
            confirmation_poll_secs: 5,
            validation: ValidationConfig::default(),
        }
    }
}

impl ExecutorConfig {
    pub fn from_env() -> Result<Self> {
        let network_name = env::var("CARDANO_NETWORK").unwrap_or_else(|_| "preprod".to_string());
        let network = Network::parse(&network_name)
            .ok_or_else(|| anyhow!("Unknown CARDANO_NETWORK: {}", network_name))?;

        let config = Self {
            trading_enabled: env::var("TRADING_ENABLED")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .context("TRADING_ENABLED must be true or false")?,
            network,
            partial_sign: env::var("WALLET_PARTIAL_SIGN")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .context("WALLET_PARTIAL_SIGN must be true or false")?,
            blockfrost_fallback: env::var("BLOCKFROST_FALLBACK")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .context("BLOCKFROST_FALLBACK must be true or false")?,
            confirmation_timeout_secs: env::var("CONFIRMATION_TIMEOUT_SECS")
                .unwrap_or_else(|_| "0".to_string())
                .parse()?,
            confirmation_poll_secs: env::var("CONFIRMATION_POLL_SECS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()?,
            validation: ValidationConfig::from_env()?,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.confirmation_timeout_secs > 0 && self.confirmation_poll_secs == 0 {
            return Err(anyhow!("CONFIRMATION_POLL_SECS must be > 0 when waiting for confirmation"));
        }
        if self.validation.min_confidence > self.validation.strong_confidence {
            return Err(anyhow!(
                "SIGNAL_MIN_CONFIDENCE ({}) exceeds SIGNAL_STRONG_CONFIDENCE ({})",
                self.validation.min_confidence,
                self.validation.strong_confidence
            ));
        }
        if self.validation.min_position_size > self.validation.max_position_size {
            return Err(anyhow!(
                "SIGNAL_MIN_POSITION_ADA ({}) exceeds SIGNAL_MAX_POSITION_ADA ({})",
                self.validation.min_position_size,
                self.validation.max_position_size
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = ExecutorConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.partial_sign);
        assert_eq!(config.network, Network::Preprod);
    }

    #[test]
    fn test_inverted_position_bounds_rejected() {
        let mut config = ExecutorConfig::default();
        config.validation.min_position_size = 500.0;
        config.validation.max_position_size = 100.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_waiting_requires_poll_interval() {
        let config = ExecutorConfig {
            confirmation_timeout_secs: 60,
            confirmation_poll_secs: 0,
            ..ExecutorConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
