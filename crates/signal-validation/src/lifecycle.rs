use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{SignalStatus, TradingSignal};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignalError {
    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: SignalStatus, to: SignalStatus },

    #[error("Signal expired at {0}")]
    Expired(DateTime<Utc>),
}

fn is_allowed(from: SignalStatus, to: SignalStatus) -> bool {
    use SignalStatus::*;
    matches!(
        (from, to),
        (Pending, Executing)
            | (Pending, Cancelled)
            | (Pending, Expired)
            | (Executing, Executed)
            | (Executing, Failed)
    )
}

impl TradingSignal {
    /// Move the signal to `to`, enforcing the status graph.
    ///
    /// Pending signals past their expiry can only move to `Expired`.
    pub fn transition(&mut self, to: SignalStatus, now: DateTime<Utc>) -> Result<(), SignalError> {
        if !is_allowed(self.status, to) {
            warn!(signal_id = %self.id, from = %self.status, to = %to, "rejected status transition");
            return Err(SignalError::InvalidTransition {
                from: self.status,
                to,
            });
        }
        if to == SignalStatus::Executing && self.is_expired(now) {
            return Err(SignalError::Expired(self.expires_at));
        }

        debug!(signal_id = %self.id, from = %self.status, to = %to, "signal status change");
        self.status = to;
        if to == SignalStatus::Executed {
            self.executed_at = Some(now);
        }
        Ok(())
    }

    pub fn mark_executed(&mut self, tx_hash: impl Into<String>, now: DateTime<Utc>) -> Result<(), SignalError> {
        self.transition(SignalStatus::Executed, now)?;
        self.tx_hash = Some(tx_hash.into());
        self.error = None;
        Ok(())
    }

    pub fn mark_failed(&mut self, error: impl Into<String>, now: DateTime<Utc>) -> Result<(), SignalError> {
        self.transition(SignalStatus::Failed, now)?;
        self.error = Some(error.into());
        Ok(())
    }

    pub fn cancel(&mut self, now: DateTime<Utc>) -> Result<(), SignalError> {
        self.transition(SignalStatus::Cancelled, now)
    }

    /// Expire a pending signal whose deadline has passed. Returns whether the
    /// status changed.
    pub fn expire_if_due(&mut self, now: DateTime<Utc>) -> bool {
        if self.status != SignalStatus::Pending || !self.is_expired(now) {
            return false;
        }
        self.transition(SignalStatus::Expired, now).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::sample_signal;
    use chrono::Duration;

    #[test]
    fn test_happy_path() {
        let now = Utc::now();
        let mut signal = sample_signal(now);
        signal.transition(SignalStatus::Executing, now).unwrap();
        signal.mark_executed("abc123", now).unwrap();
        assert_eq!(signal.status, SignalStatus::Executed);
        assert_eq!(signal.tx_hash.as_deref(), Some("abc123"));
        assert_eq!(signal.executed_at, Some(now));
    }

    #[test]
    fn test_failure_records_error() {
        let now = Utc::now();
        let mut signal = sample_signal(now);
        signal.transition(SignalStatus::Executing, now).unwrap();
        signal.mark_failed("wallet declined", now).unwrap();
        assert_eq!(signal.status, SignalStatus::Failed);
        assert_eq!(signal.error.as_deref(), Some("wallet declined"));
        assert!(signal.status.is_terminal());
    }

    #[test]
    fn test_cannot_execute_twice() {
        let now = Utc::now();
        let mut signal = sample_signal(now);
        signal.transition(SignalStatus::Executing, now).unwrap();
        signal.mark_executed("abc", now).unwrap();
        let err = signal.transition(SignalStatus::Executing, now).unwrap_err();
        assert_eq!(
            err,
            SignalError::InvalidTransition {
                from: SignalStatus::Executed,
                to: SignalStatus::Executing
            }
        );
    }

    #[test]
    fn test_cannot_skip_executing() {
        let now = Utc::now();
        let mut signal = sample_signal(now);
        assert!(signal.mark_executed("abc", now).is_err());
        assert_eq!(signal.status, SignalStatus::Pending);
    }

    #[test]
    fn test_expired_signal_cannot_start() {
        let now = Utc::now();
        let mut signal = sample_signal(now);
        let later = now + Duration::hours(2);
        assert!(matches!(
            signal.transition(SignalStatus::Executing, later),
            Err(SignalError::Expired(_))
        ));
        assert!(signal.expire_if_due(later));
        assert_eq!(signal.status, SignalStatus::Expired);
        assert!(!signal.expire_if_due(later));
    }

    #[test]
    fn test_in_flight_signal_is_not_expired() {
        let now = Utc::now();
        let mut signal = sample_signal(now);
        signal.transition(SignalStatus::Executing, now).unwrap();

        let later = now + Duration::hours(2);
        assert!(!signal.expire_if_due(later));
        assert_eq!(signal.status, SignalStatus::Executing);
        signal.mark_executed("abc", later).unwrap();
        assert!(!signal.expire_if_due(later));
        assert_eq!(signal.status, SignalStatus::Executed);
    }

    #[test]
    fn test_cancel_only_from_pending() {
        let now = Utc::now();
        let mut signal = sample_signal(now);
        signal.cancel(now).unwrap();
        assert_eq!(signal.status, SignalStatus::Cancelled);
        assert!(signal.cancel(now).is_err());
    }
}
