pub mod client;
pub mod error;
pub mod models;

pub use client::{StrikeClient, TradeApi};
pub use error::{StrikeError, StrikeResult};
pub use models::{Asset, ClosePositionRequest, OpenPositionRequest, OutRef, UnsignedTx};
