use serde::{Deserialize, Serialize};

/// Costs of a round trip (open + close) on the perpetuals venue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeeSchedule {
    /// Cardano network fee per transaction, ADA
    pub network_fee_ada: f64,
    /// Transactions per trade (open and close)
    pub transactions_per_trade: u32,
    /// Venue fee as percent of collateral
    pub venue_fee_percent: f64,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            network_fee_ada: 3.0,
            transactions_per_trade: 2,
            venue_fee_percent: 0.1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeeEstimate {
    pub network_fees: f64,
    pub venue_fee: f64,
    pub total: f64,
    /// Total fees as percent of collateral
    pub percent_of_position: f64,
}

impl FeeSchedule {
    pub fn estimate(&self, position_size: f64) -> FeeEstimate {
        let network_fees = self.network_fee_ada * self.transactions_per_trade as f64;
        let venue_fee = position_size * (self.venue_fee_percent / 100.0);
        let total = network_fees + venue_fee;
        let percent_of_position = if position_size > 0.0 {
            total / position_size * 100.0
        } else {
            100.0
        };

        FeeEstimate {
            network_fees,
            venue_fee,
            total,
            percent_of_position,
        }
    }

    /// Fees as a percent of the gross profit the signal expects if the take
    /// profit is hit. 100 when no profit is expected.
    pub fn fee_impact_percent(&self, position_size: f64, leverage: f64, take_profit_percent: f64) -> f64 {
        let gross = position_size * leverage * (take_profit_percent / 100.0);
        if gross <= 0.0 {
            return 100.0;
        }
        (self.estimate(position_size).total / gross * 100.0).min(100.0)
    }

    /// Win rate (0-1) at which expected profit covers fees.
    ///
    /// Solves `p * avg_win - (1 - p) * avg_loss = fees`.
    pub fn break_even_win_rate(&self, avg_win: f64, avg_loss: f64, position_size: f64) -> f64 {
        let denom = avg_win + avg_loss;
        if denom <= 0.0 {
            return 1.0;
        }
        ((avg_loss + self.estimate(position_size).total) / denom).clamp(0.0, 1.0)
    }
}
