pub mod client;
pub mod models;

pub use client::BlockfrostClient;
pub use models::*;
pub use wallet_trait::TxSubmitter;
