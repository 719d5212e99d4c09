use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::env;

use crate::fees::FeeSchedule;
use crate::models::{SignalType, TradingSignal};

/// Thresholds applied before a signal may be executed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    pub min_price: f64,
    pub max_price: f64,
    /// Below this confidence (0-100) a signal is rejected outright
    pub min_confidence: f64,
    /// Below this confidence a signal passes with a warning
    pub strong_confidence: f64,
    /// Minimum collateral in ADA accepted by the venue
    pub min_position_size: f64,
    pub max_position_size: f64,
    pub min_stop_loss_percent: f64,
    pub max_stop_loss_percent: f64,
    pub min_take_profit_percent: f64,
    pub max_take_profit_percent: f64,
    pub min_expiry_minutes: f64,
    pub max_expiry_minutes: f64,
    pub max_leverage: f64,
    pub min_reward_risk: f64,
    pub max_fee_impact_percent: f64,
    pub fees: FeeSchedule,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_price: 0.01,
            max_price: 100.0,
            min_confidence: 70.0,
            strong_confidence: 85.0,
            min_position_size: 40.0,
            max_position_size: 10_000.0,
            min_stop_loss_percent: 0.5,
            max_stop_loss_percent: 20.0,
            min_take_profit_percent: 1.0,
            max_take_profit_percent: 50.0,
            min_expiry_minutes: 1.0,
            max_expiry_minutes: 60.0,
            max_leverage: 10.0,
            min_reward_risk: 1.5,
            max_fee_impact_percent: 15.0,
            fees: FeeSchedule::default(),
        }
    }
}

impl ValidationConfig {
    pub fn conservative() -> Self {
        Self {
            min_confidence: 80.0,
            strong_confidence: 90.0,
            max_position_size: 1_000.0,
            max_stop_loss_percent: 10.0,
            max_leverage: 5.0,
            min_reward_risk: 2.0,
            max_fee_impact_percent: 10.0,
            ..Self::default()
        }
    }

    /// Override defaults from `SIGNAL_*` environment variables.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            min_confidence: env_or("SIGNAL_MIN_CONFIDENCE", defaults.min_confidence)?,
            strong_confidence: env_or("SIGNAL_STRONG_CONFIDENCE", defaults.strong_confidence)?,
            min_position_size: env_or("SIGNAL_MIN_POSITION_ADA", defaults.min_position_size)?,
            max_position_size: env_or("SIGNAL_MAX_POSITION_ADA", defaults.max_position_size)?,
            max_stop_loss_percent: env_or("SIGNAL_MAX_STOP_LOSS_PCT", defaults.max_stop_loss_percent)?,
            max_take_profit_percent: env_or(
                "SIGNAL_MAX_TAKE_PROFIT_PCT",
                defaults.max_take_profit_percent,
            )?,
            max_expiry_minutes: env_or("SIGNAL_MAX_EXPIRY_MINUTES", defaults.max_expiry_minutes)?,
            max_leverage: env_or("SIGNAL_MAX_LEVERAGE", defaults.max_leverage)?,
            ..defaults
        })
    }
}

fn env_or(key: &str, default: f64) -> Result<f64> {
    match env::var(key) {
        Ok(v) => Ok(v.parse()?),
        Err(_) => Ok(default),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    /// 0-100
    pub score: u8,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

const ERROR_PENALTY: i32 = 25;
const WARNING_PENALTY: i32 = 5;

/// Range-check a signal against `config` as of `now`.
///
/// Pure: the same signal, config and clock always give the same result.
pub fn validate_signal(
    signal: &TradingSignal,
    config: &ValidationConfig,
    now: DateTime<Utc>,
) -> ValidationResult {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    // Price
    let price = signal.price;
    let price_ok = price.is_finite() && price > 0.0;
    if !price_ok {
        errors.push(format!("Price must be a positive number, got {}", price));
    } else if price < config.min_price || price > config.max_price {
        errors.push(format!(
            "Price {:.4} outside [{}, {}]",
            price, config.min_price, config.max_price
        ));
    }

    // Confidence
    let confidence = signal.confidence;
    if !confidence.is_finite() || !(0.0..=100.0).contains(&confidence) {
        errors.push(format!("Confidence must be within 0-100, got {}", confidence));
    } else if confidence < config.min_confidence {
        errors.push(format!(
            "Confidence {:.1}% below minimum {:.1}%",
            confidence, config.min_confidence
        ));
    } else if confidence < config.strong_confidence {
        warnings.push(format!(
            "Confidence {:.1}% below strong level {:.1}%",
            confidence, config.strong_confidence
        ));
    }

    // Position size
    let risk = &signal.risk;
    if !risk.position_size.is_finite() || risk.position_size < config.min_position_size {
        errors.push(format!(
            "Position size {} ADA below minimum {} ADA",
            risk.position_size, config.min_position_size
        ));
    } else if risk.position_size > config.max_position_size {
        errors.push(format!(
            "Position size {} ADA above maximum {} ADA",
            risk.position_size, config.max_position_size
        ));
    }

    if !risk.leverage.is_finite() || risk.leverage < 1.0 || risk.leverage > config.max_leverage {
        errors.push(format!(
            "Leverage {}x outside [1, {}]",
            risk.leverage, config.max_leverage
        ));
    }

    // Stop loss / take profit, only meaningful with a usable entry price
    if price_ok {
        let (sl_side_ok, tp_side_ok) = match signal.signal_type {
            SignalType::Long => (risk.stop_loss < price, risk.take_profit > price),
            SignalType::Short => (risk.stop_loss > price, risk.take_profit < price),
        };
        if !sl_side_ok {
            errors.push(format!(
                "Stop loss {:.4} on wrong side of entry {:.4} for {:?}",
                risk.stop_loss, price, signal.signal_type
            ));
        } else {
            let pct = risk.stop_loss_percent(price);
            if pct < config.min_stop_loss_percent || pct > config.max_stop_loss_percent {
                errors.push(format!(
                    "Stop loss distance {:.2}% outside [{}%, {}%]",
                    pct, config.min_stop_loss_percent, config.max_stop_loss_percent
                ));
            }
        }

        if !tp_side_ok {
            errors.push(format!(
                "Take profit {:.4} on wrong side of entry {:.4} for {:?}",
                risk.take_profit, price, signal.signal_type
            ));
        } else {
            let pct = risk.take_profit_percent(price);
            if pct < config.min_take_profit_percent || pct > config.max_take_profit_percent {
                errors.push(format!(
                    "Take profit distance {:.2}% outside [{}%, {}%]",
                    pct, config.min_take_profit_percent, config.max_take_profit_percent
                ));
            }
        }

        if sl_side_ok && tp_side_ok {
            let rr = risk.reward_risk_ratio(price);
            if rr < config.min_reward_risk {
                warnings.push(format!(
                    "Reward/risk {:.2} below {:.2}",
                    rr, config.min_reward_risk
                ));
            }

            if risk.position_size.is_finite() && risk.position_size > 0.0 {
                let impact = config.fees.fee_impact_percent(
                    risk.position_size,
                    risk.leverage,
                    risk.take_profit_percent(price),
                );
                if impact > config.max_fee_impact_percent {
                    warnings.push(format!(
                        "Fees would consume {:.1}% of expected profit",
                        impact
                    ));
                }
            }
        }
    }

    // Expiry
    if signal.is_expired(now) {
        errors.push(format!("Signal expired at {}", signal.expires_at.to_rfc3339()));
    }
    let window = signal.expiry_window_minutes();
    if window < config.min_expiry_minutes || window > config.max_expiry_minutes {
        errors.push(format!(
            "Expiry window {:.1} min outside [{}, {}]",
            window, config.min_expiry_minutes, config.max_expiry_minutes
        ));
    }

    let penalty = errors.len() as i32 * ERROR_PENALTY + warnings.len() as i32 * WARNING_PENALTY;
    let score = (100 - penalty).clamp(0, 100) as u8;

    ValidationResult {
        is_valid: errors.is_empty(),
        score,
        errors,
        warnings,
    }
}
