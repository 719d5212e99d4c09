use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use signal_validation::TradingSignal;

/// Native ADA: empty policy id and asset name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub policy_id: String,
    pub asset_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenPositionRequest {
    pub address: String,
    pub asset: Asset,
    pub asset_ticker: String,
    /// Collateral, ADA
    pub collateral_amount: f64,
    pub leverage: f64,
    /// "Long" or "Short"
    pub position: String,
    /// Unix millis
    pub entered_position_time: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_loss_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub take_profit_price: Option<f64>,
}

impl OpenPositionRequest {
    pub fn from_signal(signal: &TradingSignal, address: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            address: address.into(),
            asset: Asset::default(),
            asset_ticker: "ADA".to_string(),
            collateral_amount: signal.risk.position_size,
            leverage: signal.risk.leverage,
            position: signal.signal_type.position_label().to_string(),
            entered_position_time: now.timestamp_millis(),
            stop_loss_price: Some(signal.risk.stop_loss),
            take_profit_price: Some(signal.risk.take_profit),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutRef {
    pub tx_hash: String,
    pub output_index: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClosePositionRequest {
    pub address: String,
    pub asset: Asset,
    pub out_ref: OutRef,
    pub position_size: f64,
    pub position_type: String,
    pub entered_position_time: i64,
}

/// Request bodies are wrapped as `{ "request": ... }`.
#[derive(Debug, Serialize)]
pub(crate) struct Envelope<'a, T> {
    pub request: &'a T,
}

/// Unsigned transaction returned by the trade endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnsignedTx {
    pub cbor: String,
}
