use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Network
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Preprod,
    Preview,
}

impl Network {
    /// CIP-30 `getNetworkId` value.
    pub fn network_id(&self) -> u8 {
        match self {
            Network::Mainnet => 1,
            Network::Preprod | Network::Preview => 0,
        }
    }

    pub fn blockfrost_url(&self) -> &'static str {
        match self {
            Network::Mainnet => "https://cardano-mainnet.blockfrost.io/api/v0",
            Network::Preprod => "https://cardano-preprod.blockfrost.io/api/v0",
            Network::Preview => "https://cardano-preview.blockfrost.io/api/v0",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mainnet" => Some(Network::Mainnet),
            "preprod" => Some(Network::Preprod),
            "preview" => Some(Network::Preview),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Error)]
pub enum WalletError {
    #[error("Wallet not enabled")]
    NotEnabled,
    #[error("User declined to sign")]
    UserDeclined,
    #[error("Wallet has no used addresses")]
    NoAddresses,
    #[error("Wallet API error: {0}")]
    Api(String),
}

#[derive(Debug, Clone, Error)]
pub enum SubmitError {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("Submission rejected ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

// ---------------------------------------------------------------------------
// CIP-30 wallet
// ---------------------------------------------------------------------------

/// The subset of the CIP-30 wallet API used for trading.
///
/// Transactions and witnesses cross this boundary as hex-encoded CBOR, the
/// same way browser wallets exchange them.
#[async_trait]
pub trait Cip30Wallet: Send + Sync {
    /// Request access. Must succeed before any other call.
    async fn enable(&self) -> Result<(), WalletError>;

    async fn network_id(&self) -> Result<u8, WalletError>;

    /// Bech32 or hex addresses that have appeared on chain
    async fn used_addresses(&self) -> Result<Vec<String>, WalletError>;

    async fn change_address(&self) -> Result<String, WalletError>;

    /// Sign `tx_cbor_hex`, returning the witness set as hex CBOR.
    /// With `partial_sign` the wallet signs only the inputs it controls.
    async fn sign_tx(&self, tx_cbor_hex: &str, partial_sign: bool) -> Result<String, WalletError>;

    /// Submit a signed transaction, returning its hash.
    async fn submit_tx(&self, tx_cbor_hex: &str) -> Result<String, WalletError>;

    /// Wallet name for logging
    fn wallet_name(&self) -> &str;
}

// ---------------------------------------------------------------------------
// Submission fallback
// ---------------------------------------------------------------------------

#[async_trait]
pub trait TxSubmitter: Send + Sync {
    /// Submit raw signed transaction bytes, returning the transaction hash.
    async fn submit(&self, tx_cbor: &[u8]) -> Result<String, SubmitError>;

    /// Submitter name for logging
    fn submitter_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_parse() {
        assert_eq!(Network::parse("Mainnet"), Some(Network::Mainnet));
        assert_eq!(Network::parse(" preprod "), Some(Network::Preprod));
        assert_eq!(Network::parse("testnet"), None);
        assert_eq!(Network::Mainnet.network_id(), 1);
        assert_eq!(Network::Preview.network_id(), 0);
        assert!(Network::Preprod.blockfrost_url().contains("preprod"));
    }
}
