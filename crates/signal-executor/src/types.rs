use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use signal_validation::{SignalError, SignalStatus};
use strike_client::StrikeError;
use thiserror::Error;
use tx_codec::TxError;
use uuid::Uuid;
use wallet_trait::WalletError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmittedVia {
    Wallet,
    Fallback,
}

#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("Trading is disabled")]
    TradingDisabled,

    #[error("Signal expired at {0}")]
    Expired(DateTime<Utc>),

    #[error("Signal failed validation: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error(transparent)]
    Lifecycle(#[from] SignalError),

    #[error("Wallet is on network {actual}, expected {expected}")]
    NetworkMismatch { expected: u8, actual: u8 },

    #[error("Wallet error: {0}")]
    Wallet(#[from] WalletError),

    #[error("Trade API error: {0}")]
    TradeApi(#[from] StrikeError),

    #[error("Could not combine witnesses: {0}")]
    Combine(#[from] TxError),

    #[error("Submission failed (wallet: {wallet}; fallback: {fallback})")]
    Submission { wallet: String, fallback: String },
}

/// Outcome of one execution attempt, shaped for the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub signal_id: Option<Uuid>,
    pub success: bool,
    pub status: Option<SignalStatus>,
    pub tx_hash: Option<String>,
    pub submitted_via: Option<SubmittedVia>,
    pub error: Option<String>,
}

impl ExecutionResult {
    pub fn submitted(tx_hash: String, via: SubmittedVia) -> Self {
        Self {
            signal_id: None,
            success: true,
            status: None,
            tx_hash: Some(tx_hash),
            submitted_via: Some(via),
            error: None,
        }
    }

    pub fn failed(error: &ExecutionError) -> Self {
        Self {
            signal_id: None,
            success: false,
            status: None,
            tx_hash: None,
            submitted_via: None,
            error: Some(error.to_string()),
        }
    }

    pub fn for_signal(mut self, id: Uuid, status: SignalStatus) -> Self {
        self.signal_id = Some(id);
        self.status = Some(status);
        self
    }
}
