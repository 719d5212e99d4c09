pub mod config;
pub mod executor;
pub mod types;

pub use config::ExecutorConfig;
pub use executor::SignalExecutor;
pub use types::{ExecutionError, ExecutionResult, SubmittedVia};
