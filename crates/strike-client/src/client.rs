use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

use crate::error::{StrikeError, StrikeResult};
use crate::models::*;

/// Anything that can build unsigned perpetuals transactions.
#[async_trait]
pub trait TradeApi: Send + Sync {
    async fn open_position(&self, request: &OpenPositionRequest) -> StrikeResult<UnsignedTx>;

    async fn close_position(&self, request: &ClosePositionRequest) -> StrikeResult<UnsignedTx>;
}

#[derive(Clone)]
pub struct StrikeClient {
    client: reqwest::Client,
    base_url: String,
}

impl StrikeClient {
    pub fn new(base_url: String, timeout: Duration) -> StrikeResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_env() -> StrikeResult<Self> {
        let base_url = std::env::var("STRIKE_API_URL")
            .unwrap_or_else(|_| "https://app.strikefinance.org".to_string());
        let timeout = std::env::var("STRIKE_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);
        Self::new(base_url, Duration::from_secs(timeout))
    }

    async fn post_for_cbor<T: Serialize + Sync>(&self, path: &str, request: &T) -> StrikeResult<UnsignedTx> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .post(&url)
            .json(&Envelope { request })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Strike {} failed ({}): {}", path, status, body);
            return Err(StrikeError::ServiceUnavailable(format!(
                "Status: {} {}",
                status, body
            )));
        }

        let unsigned = response.json::<UnsignedTx>().await?;
        if unsigned.cbor.trim().is_empty() {
            return Err(StrikeError::InvalidResponse(
                "empty transaction CBOR".to_string(),
            ));
        }
        Ok(unsigned)
    }
}

#[async_trait]
impl TradeApi for StrikeClient {
    async fn open_position(&self, request: &OpenPositionRequest) -> StrikeResult<UnsignedTx> {
        tracing::info!(
            "Opening {} position: {} ADA @ {}x",
            request.position,
            request.collateral_amount,
            request.leverage
        );
        self.post_for_cbor("/api/perpetuals/openPosition", request).await
    }

    async fn close_position(&self, request: &ClosePositionRequest) -> StrikeResult<UnsignedTx> {
        tracing::info!(
            "Closing {} position {}#{}",
            request.position_type,
            request.out_ref.tx_hash,
            request.out_ref.output_index
        );
        self.post_for_cbor("/api/perpetuals/closePosition", request).await
    }
}
