use std::sync::Arc;

use chrono::{DateTime, Utc};
use signal_validation::{validate_signal, SignalStatus, TradingSignal};
use strike_client::{ClosePositionRequest, OpenPositionRequest, TradeApi, UnsignedTx};
use wallet_trait::{Cip30Wallet, TxSubmitter, WalletError};

use crate::config::ExecutorConfig;
use crate::types::{ExecutionError, ExecutionResult, SubmittedVia};

/// Drives a signal from `pending` to an on-chain transaction: build with the
/// trade API, sign with the wallet, splice the witnesses in, submit.
pub struct SignalExecutor {
    config: ExecutorConfig,
    wallet: Arc<dyn Cip30Wallet>,
    trade_api: Arc<dyn TradeApi>,
    fallback: Option<Arc<dyn TxSubmitter>>,
}

impl SignalExecutor {
    pub fn new(
        config: ExecutorConfig,
        wallet: Arc<dyn Cip30Wallet>,
        trade_api: Arc<dyn TradeApi>,
    ) -> Self {
        Self {
            config,
            wallet,
            trade_api,
            fallback: None,
        }
    }

    /// Submit through `submitter` when the wallet refuses to.
    pub fn with_fallback(mut self, submitter: Arc<dyn TxSubmitter>) -> Self {
        self.fallback = Some(submitter);
        self
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Execute `signal`, updating its status in place.
    ///
    /// Rejected signals (disabled trading, failed validation) stay `pending`;
    /// expired ones become `expired`. Once the signal reaches `executing` it
    /// always ends `executed` or `failed`.
    pub async fn execute(&self, signal: &mut TradingSignal, now: DateTime<Utc>) -> ExecutionResult {
        let result = match self.try_execute(signal, now).await {
            Ok((tx_hash, via)) => ExecutionResult::submitted(tx_hash, via),
            Err(e) => {
                tracing::error!(signal_id = %signal.id, "Signal execution failed: {}", e);
                ExecutionResult::failed(&e)
            }
        };
        result.for_signal(signal.id, signal.status)
    }

    async fn try_execute(
        &self,
        signal: &mut TradingSignal,
        now: DateTime<Utc>,
    ) -> Result<(String, SubmittedVia), ExecutionError> {
        if !self.config.trading_enabled {
            return Err(ExecutionError::TradingDisabled);
        }

        // 1. Expiry
        if signal.expire_if_due(now) {
            return Err(ExecutionError::Expired(signal.expires_at));
        }

        // 2. Validation
        let validation = validate_signal(signal, &self.config.validation, now);
        for warning in &validation.warnings {
            tracing::warn!(signal_id = %signal.id, "{}", warning);
        }
        if !validation.is_valid {
            return Err(ExecutionError::Validation(validation.errors));
        }

        tracing::info!(
            signal_id = %signal.id,
            "Executing {} {} - {} ADA @ {}x (score {})",
            signal.signal_type.position_label(),
            signal.symbol,
            signal.risk.position_size,
            signal.risk.leverage,
            validation.score
        );

        // 3. Claim the signal
        signal.transition(SignalStatus::Executing, now)?;

        // 4. Build, sign, submit
        match self.open_position(signal, now).await {
            Ok((tx_hash, via)) => {
                signal.mark_executed(tx_hash.clone(), now)?;
                tracing::info!(signal_id = %signal.id, "Signal executed: {}", tx_hash);
                Ok((tx_hash, via))
            }
            Err(e) => {
                signal.mark_failed(e.to_string(), now)?;
                Err(e)
            }
        }
    }

    async fn open_position(
        &self,
        signal: &TradingSignal,
        now: DateTime<Utc>,
    ) -> Result<(String, SubmittedVia), ExecutionError> {
        let address = self.connect_wallet().await?;
        let request = OpenPositionRequest::from_signal(signal, address, now);
        let unsigned = self.trade_api.open_position(&request).await?;
        self.sign_and_submit(&unsigned).await
    }

    /// Close an open position through the same sign-and-submit path.
    pub async fn close_position(&self, request: &ClosePositionRequest) -> ExecutionResult {
        if !self.config.trading_enabled {
            return ExecutionResult::failed(&ExecutionError::TradingDisabled);
        }

        match self.try_close(request).await {
            Ok((tx_hash, via)) => ExecutionResult::submitted(tx_hash, via),
            Err(e) => {
                tracing::error!("Close position failed: {}", e);
                ExecutionResult::failed(&e)
            }
        }
    }

    async fn try_close(&self, request: &ClosePositionRequest) -> Result<(String, SubmittedVia), ExecutionError> {
        self.connect_wallet().await?;
        let unsigned = self.trade_api.close_position(request).await?;
        self.sign_and_submit(&unsigned).await
    }

    /// Enable the wallet, check its network and pick the trading address.
    async fn connect_wallet(&self) -> Result<String, ExecutionError> {
        self.wallet.enable().await?;

        let expected = self.config.network.network_id();
        let actual = self.wallet.network_id().await?;
        if actual != expected {
            return Err(ExecutionError::NetworkMismatch { expected, actual });
        }

        let address = match self.wallet.used_addresses().await?.into_iter().next() {
            Some(address) => address,
            None => self.wallet.change_address().await?,
        };
        if address.is_empty() {
            return Err(WalletError::NoAddresses.into());
        }
        Ok(address)
    }

    async fn sign_and_submit(&self, unsigned: &UnsignedTx) -> Result<(String, SubmittedVia), ExecutionError> {
        let witness_hex = self
            .wallet
            .sign_tx(&unsigned.cbor, self.config.partial_sign)
            .await?;

        let signed_hex = tx_codec::combine_witnesses(&unsigned.cbor, &witness_hex)?;
        let expected_id = tx_codec::summarize(&signed_hex)?.tx_id;
        tracing::debug!("Signed transaction {} ({} hex chars)", expected_id, signed_hex.len());

        self.submit(&signed_hex, &expected_id).await
    }

    /// Submit through the wallet, then the fallback submitter if one is set.
    pub async fn submit(
        &self,
        signed_hex: &str,
        expected_id: &str,
    ) -> Result<(String, SubmittedVia), ExecutionError> {
        let wallet_err = match self.wallet.submit_tx(signed_hex).await {
            Ok(tx_hash) => {
                check_tx_hash(&tx_hash, expected_id);
                return Ok((tx_hash, SubmittedVia::Wallet));
            }
            Err(e) => e,
        };

        let fallback = match (&self.fallback, self.config.blockfrost_fallback) {
            (Some(fallback), true) => fallback,
            _ => {
                return Err(ExecutionError::Submission {
                    wallet: wallet_err.to_string(),
                    fallback: "not configured".to_string(),
                })
            }
        };

        tracing::warn!(
            "{} submit failed ({}), retrying via {}",
            self.wallet.wallet_name(),
            wallet_err,
            fallback.submitter_name()
        );

        let bytes = tx_codec::decode_hex(signed_hex)?;
        match fallback.submit(&bytes).await {
            Ok(tx_hash) => {
                check_tx_hash(&tx_hash, expected_id);
                Ok((tx_hash, SubmittedVia::Fallback))
            }
            Err(e) => Err(ExecutionError::Submission {
                wallet: wallet_err.to_string(),
                fallback: e.to_string(),
            }),
        }
    }
}

fn check_tx_hash(returned: &str, expected: &str) {
    if !returned.eq_ignore_ascii_case(expected) {
        tracing::warn!(
            "Submitted hash {} differs from locally computed id {}",
            returned,
            expected
        );
    }
}
