use serde::{Deserialize, Serialize};

/// Error payload returned by every Blockfrost endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockfrostError {
    pub status_code: u16,
    pub error: String,
    pub message: String,
}

/// `GET /txs/{hash}` response (fields we use).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TxInfo {
    pub hash: String,
    pub block: String,
    pub block_height: Option<u64>,
    pub block_time: u64,
    pub slot: u64,
    pub index: u32,
    /// Lovelace, as a decimal string
    pub fees: String,
    pub size: u32,
    #[serde(default = "default_valid")]
    pub valid_contract: bool,
}

fn default_valid() -> bool {
    true
}

impl TxInfo {
    pub fn fees_lovelace(&self) -> u64 {
        self.fees.parse().unwrap_or_default()
    }
}
