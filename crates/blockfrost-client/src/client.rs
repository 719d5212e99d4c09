use crate::models::*;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::{header, Client};
use std::time::{Duration, Instant};
use wallet_trait::{Network, SubmitError, TxSubmitter};

pub struct BlockfrostClient {
    client: Client,
    base_url: String,
    project_id: String,
}

impl BlockfrostClient {
    /// Create a new Blockfrost client
    pub fn new(project_id: String, base_url: String) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(15)).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            project_id,
        })
    }

    /// Create client from environment variables.
    ///
    /// `BLOCKFROST_PROJECT_ID` is required. The network comes from
    /// `BLOCKFROST_NETWORK`, falling back to the project id prefix
    /// (Blockfrost ids start with `mainnet`, `preprod` or `preview`).
    /// `BLOCKFROST_BASE_URL` overrides the URL entirely.
    pub fn from_env() -> Result<Self> {
        let project_id = std::env::var("BLOCKFROST_PROJECT_ID")
            .map_err(|_| anyhow!("BLOCKFROST_PROJECT_ID not set"))?;

        let network = match std::env::var("BLOCKFROST_NETWORK") {
            Ok(name) => Network::parse(&name)
                .ok_or_else(|| anyhow!("Unknown BLOCKFROST_NETWORK: {}", name))?,
            Err(_) => network_from_project_id(&project_id),
        };
        let base_url = std::env::var("BLOCKFROST_BASE_URL")
            .unwrap_or_else(|_| network.blockfrost_url().to_string());

        Self::new(project_id, base_url)
    }

    /// Submit a signed transaction (raw CBOR bytes).
    pub async fn submit_tx(&self, tx_cbor: &[u8]) -> Result<String, SubmitError> {
        let url = format!("{}/tx/submit", self.base_url);

        tracing::info!("Submitting transaction to Blockfrost ({} bytes)", tx_cbor.len());

        let response = self
            .client
            .post(&url)
            .header("project_id", &self.project_id)
            .header(header::CONTENT_TYPE, "application/cbor")
            .body(tx_cbor.to_vec())
            .send()
            .await
            .map_err(|e| SubmitError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<BlockfrostError>(&error_text)
                .map(|e| e.message)
                .unwrap_or(error_text);
            tracing::error!("Blockfrost submission failed ({}): {}", status, message);
            return Err(SubmitError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let tx_hash = response
            .json::<String>()
            .await
            .map_err(|e| SubmitError::InvalidResponse(e.to_string()))?;
        if tx_hash.len() != 64 || !tx_hash.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(SubmitError::InvalidResponse(format!(
                "not a transaction hash: {}",
                tx_hash
            )));
        }

        tracing::info!("Transaction submitted successfully: {}", tx_hash);
        Ok(tx_hash)
    }

    /// Look up a transaction. `None` until it lands in a block.
    pub async fn get_transaction(&self, tx_hash: &str) -> Result<Option<TxInfo>> {
        let url = format!("{}/txs/{}", self.base_url, tx_hash);

        let response = self
            .client
            .get(&url)
            .header("project_id", &self.project_id)
            .send()
            .await?;

        if response.status().as_u16() == 404 {
            return Ok(None);
        }

        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(anyhow!("Failed to get transaction: {}", error_text));
        }

        let info = response.json::<TxInfo>().await?;
        Ok(Some(info))
    }

    /// Poll until the transaction is in a block or `timeout` elapses.
    pub async fn await_confirmation(
        &self,
        tx_hash: &str,
        timeout: Duration,
        poll_interval: Duration,
    ) -> Result<Option<TxInfo>> {
        let started = Instant::now();
        loop {
            if let Some(info) = self.get_transaction(tx_hash).await? {
                tracing::info!(
                    "Transaction {} confirmed in block {:?}",
                    tx_hash,
                    info.block_height
                );
                return Ok(Some(info));
            }
            if started.elapsed() + poll_interval > timeout {
                tracing::warn!("Transaction {} not confirmed after {:?}", tx_hash, timeout);
                return Ok(None);
            }
            tokio::time::sleep(poll_interval).await;
        }
    }

    /// Get the base URL (for logging/diagnostics)
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

fn network_from_project_id(project_id: &str) -> Network {
    if project_id.starts_with("preprod") {
        Network::Preprod
    } else if project_id.starts_with("preview") {
        Network::Preview
    } else {
        Network::Mainnet
    }
}

#[async_trait]
impl TxSubmitter for BlockfrostClient {
    async fn submit(&self, tx_cbor: &[u8]) -> Result<String, SubmitError> {
        self.submit_tx(tx_cbor).await
    }

    fn submitter_name(&self) -> &str {
        "blockfrost"
    }
}
