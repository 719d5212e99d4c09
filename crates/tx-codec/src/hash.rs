use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use serde::{Deserialize, Serialize};

use crate::cbor;
use crate::error::TxResult;
use crate::transaction::Transaction;
use crate::witness::{field_name, WitnessSet};

type Blake2b256 = Blake2b<U32>;

/// Transaction id: Blake2b-256 over the raw body bytes.
pub fn transaction_id(body: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&Blake2b256::digest(body));
    out
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TxSummary {
    pub tx_id: String,
    pub size: usize,
    pub body_size: usize,
    pub witness_fields: Vec<String>,
    pub vkey_witnesses: Vec<String>,
    pub is_valid: Option<bool>,
    pub has_auxiliary_data: bool,
}

impl TxSummary {
    pub fn is_signed(&self) -> bool {
        !self.vkey_witnesses.is_empty()
    }
}

/// Decode a transaction hex string and report what it carries.
pub fn summarize(tx_hex: &str) -> TxResult<TxSummary> {
    let bytes = cbor::decode_hex(tx_hex)?;
    let tx = Transaction::decode(&bytes)?;
    let witnesses = WitnessSet::decode(tx.witness_set())?;

    Ok(TxSummary {
        tx_id: hex::encode(transaction_id(tx.body())),
        size: bytes.len(),
        body_size: tx.body().len(),
        witness_fields: witnesses
            .keys()
            .into_iter()
            .map(|k| field_name(k).to_string())
            .collect(),
        vkey_witnesses: witnesses
            .vkey_witnesses()
            .iter()
            .map(|w| w.vkey_hex())
            .collect(),
        is_valid: tx.is_valid()?,
        has_auxiliary_data: tx.has_auxiliary_data(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{combine_witnesses, fixtures};

    #[test]
    fn test_transaction_id_depends_only_on_body() {
        let body = fixtures::tx_body();
        assert_eq!(transaction_id(&body), transaction_id(&body.clone()));
        assert_ne!(transaction_id(&body), transaction_id(&[0xa0]));
        assert_eq!(hex::encode(transaction_id(&body)).len(), 64);
    }

    #[test]
    fn test_summary_before_and_after_signing() {
        let unsigned = hex::encode(fixtures::unsigned_tx());
        let before = summarize(&unsigned).unwrap();
        assert!(!before.is_signed());
        assert!(before.witness_fields.is_empty());
        assert_eq!(before.is_valid, Some(true));
        assert!(!before.has_auxiliary_data);

        let witness = hex::encode(fixtures::wallet_witness_set(&[[8u8; 32]], false));
        let signed = combine_witnesses(&unsigned, &witness).unwrap();
        let after = summarize(&signed).unwrap();
        assert!(after.is_signed());
        assert_eq!(after.tx_id, before.tx_id);
        assert_eq!(after.body_size, before.body_size);
        assert_eq!(after.witness_fields, vec!["vkeywitnesses".to_string()]);
        assert_eq!(after.vkey_witnesses, vec![hex::encode([8u8; 32])]);
    }

    #[test]
    fn test_summary_json_shape() {
        let summary = summarize(&hex::encode(fixtures::script_tx())).unwrap();
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["tx_id"].as_str().unwrap().len(), 64);
        assert_eq!(json["witness_fields"], serde_json::json!(["plutus_data"]));
        assert_eq!(json["vkey_witnesses"], serde_json::json!([]));
        assert!(json["size"].as_u64().unwrap() > json["body_size"].as_u64().unwrap());
    }
}
