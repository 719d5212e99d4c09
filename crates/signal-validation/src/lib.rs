pub mod fees;
pub mod lifecycle;
pub mod models;
pub mod validator;

pub use fees::{FeeEstimate, FeeSchedule};
pub use lifecycle::SignalError;
pub use models::{AlgorithmMetadata, RiskParameters, SignalStatus, SignalType, TradingSignal};
pub use validator::{validate_signal, ValidationConfig, ValidationResult};
