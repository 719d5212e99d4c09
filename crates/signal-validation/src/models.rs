use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalType {
    Long,
    Short,
}

impl SignalType {
    /// Position label used by the perpetuals API.
    pub fn position_label(&self) -> &'static str {
        match self {
            SignalType::Long => "Long",
            SignalType::Short => "Short",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalStatus {
    Pending,
    Executing,
    Executed,
    Failed,
    Cancelled,
    Expired,
}

impl SignalStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SignalStatus::Executed
                | SignalStatus::Failed
                | SignalStatus::Cancelled
                | SignalStatus::Expired
        )
    }
}

impl fmt::Display for SignalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SignalStatus::Pending => "pending",
            SignalStatus::Executing => "executing",
            SignalStatus::Executed => "executed",
            SignalStatus::Failed => "failed",
            SignalStatus::Cancelled => "cancelled",
            SignalStatus::Expired => "expired",
        };
        f.write_str(s)
    }
}

/// Risk parameters attached to a signal. Prices are quoted in USD per ADA,
/// position size is collateral in ADA.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskParameters {
    pub stop_loss: f64,
    pub take_profit: f64,
    pub position_size: f64,
    /// Maximum account risk for this trade, percent
    pub max_risk_percent: f64,
    #[serde(default = "default_leverage")]
    pub leverage: f64,
}

fn default_leverage() -> f64 {
    10.0
}

impl RiskParameters {
    /// Distance from entry to stop loss as a percentage of entry.
    pub fn stop_loss_percent(&self, entry: f64) -> f64 {
        ((entry - self.stop_loss).abs() / entry) * 100.0
    }

    /// Distance from entry to take profit as a percentage of entry.
    pub fn take_profit_percent(&self, entry: f64) -> f64 {
        ((self.take_profit - entry).abs() / entry) * 100.0
    }

    pub fn reward_risk_ratio(&self, entry: f64) -> f64 {
        let risk = (entry - self.stop_loss).abs();
        if risk == 0.0 {
            return 0.0;
        }
        (self.take_profit - entry).abs() / risk
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlgorithmMetadata {
    pub name: String,
    pub version: String,
    pub timeframe: String,
    #[serde(default)]
    pub indicators: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradingSignal {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub signal_type: SignalType,
    pub symbol: String,
    /// Entry price, USD per ADA
    pub price: f64,
    /// 0-100
    pub confidence: f64,
    pub pattern: String,
    #[serde(default)]
    pub reasoning: String,
    pub risk: RiskParameters,
    pub algorithm: AlgorithmMetadata,
    pub status: SignalStatus,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    #[serde(default)]
    pub executed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tx_hash: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl TradingSignal {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        signal_type: SignalType,
        price: f64,
        confidence: f64,
        pattern: impl Into<String>,
        risk: RiskParameters,
        algorithm: AlgorithmMetadata,
        now: DateTime<Utc>,
        time_to_live: Duration,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            signal_type,
            symbol: "ADAUSD".to_string(),
            price,
            confidence,
            pattern: pattern.into(),
            reasoning: String::new(),
            risk,
            algorithm,
            status: SignalStatus::Pending,
            created_at: now,
            expires_at: now + time_to_live,
            executed_at: None,
            tx_hash: None,
            error: None,
        }
    }

    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = reasoning.into();
        self
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Minutes between creation and expiry.
    pub fn expiry_window_minutes(&self) -> f64 {
        (self.expires_at - self.created_at).num_seconds() as f64 / 60.0
    }

    pub fn time_remaining(&self, now: DateTime<Utc>) -> Duration {
        (self.expires_at - now).max(Duration::zero())
    }
}
