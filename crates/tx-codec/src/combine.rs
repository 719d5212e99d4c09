use minicbor::Decoder;
use tracing::{debug, info};

use crate::cbor;
use crate::error::{TxError, TxResult};
use crate::hash::transaction_id;
use crate::transaction::Transaction;
use crate::witness::WitnessSet;

/// Combine a wallet's `signTx` result with the unsigned transaction it signed.
///
/// Both arguments are hex strings. Returns the signed transaction as hex,
/// ready for `submitTx` or `/tx/submit`.
pub fn combine_witnesses(unsigned_tx_hex: &str, wallet_witness_hex: &str) -> TxResult<String> {
    let tx_bytes = cbor::decode_hex(unsigned_tx_hex)?;
    let wallet_bytes = cbor::decode_hex(wallet_witness_hex)?;
    let signed = combine_witness_bytes(&tx_bytes, &wallet_bytes)?;
    Ok(hex::encode(signed))
}

/// Byte-level form of [`combine_witnesses`].
pub fn combine_witness_bytes(tx_bytes: &[u8], wallet_bytes: &[u8]) -> TxResult<Vec<u8>> {
    let tx = Transaction::decode(tx_bytes)?;
    let wallet_raw = wallet_witness_set(&tx, wallet_bytes)?;
    let wallet_set = WitnessSet::decode(wallet_raw)?;
    if wallet_set.is_empty() {
        return Err(TxError::EmptyWitnessSet);
    }

    let existing = WitnessSet::decode(tx.witness_set())?;
    let signed = if existing.is_empty() {
        tx.encode_with_witness_set(wallet_raw)?
    } else {
        let mut merged = existing;
        let added = merged.merge(&wallet_set)?;
        debug!(
            added,
            total = merged.vkey_witnesses().len(),
            "merged wallet vkey witnesses into existing witness set"
        );
        tx.encode_with_witness_set(&merged.encode()?)?
    };

    verify_combined(&tx, &wallet_set, &signed)?;
    info!(
        tx_id = %hex::encode(transaction_id(tx.body())),
        signatures = wallet_set.vkey_witnesses().len(),
        size = signed.len(),
        "combined wallet witnesses into transaction"
    );
    Ok(signed)
}

/// Wallets are supposed to return a bare witness set, but some hand back the
/// whole signed transaction. Accept both; in the latter case the body must be
/// the one we asked them to sign.
fn wallet_witness_set<'a>(tx: &Transaction<'_>, wallet_bytes: &'a [u8]) -> TxResult<&'a [u8]> {
    let d = Decoder::new(wallet_bytes);
    if cbor::is_map(&d)? {
        return Ok(wallet_bytes);
    }
    if cbor::is_array(&d)? {
        let wallet_tx = Transaction::decode(wallet_bytes)?;
        if wallet_tx.body() != tx.body() {
            return Err(TxError::BodyMismatch);
        }
        debug!("wallet returned a full transaction, using its witness set");
        return Ok(wallet_tx.witness_set());
    }
    Err(TxError::MalformedWitnessSet(
        "wallet response is neither a witness set nor a transaction".to_string(),
    ))
}

fn verify_combined(original: &Transaction<'_>, wallet_set: &WitnessSet, signed: &[u8]) -> TxResult<()> {
    let combined = Transaction::decode(signed)?;
    if combined.body() != original.body()
        || combined.auxiliary_data() != original.auxiliary_data()
        || combined.is_valid()? != original.is_valid()?
    {
        return Err(TxError::MalformedTransaction(
            "combined transaction does not preserve the original fields".to_string(),
        ));
    }
    let witnesses = WitnessSet::decode(combined.witness_set())?;
    if let Some(missing) = wallet_set
        .vkey_witnesses()
        .iter()
        .find(|w| !witnesses.contains_vkey(&w.vkey))
    {
        return Err(TxError::MalformedWitnessSet(format!(
            "vkey {} missing from combined witness set",
            missing.vkey_hex()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn test_combine_into_empty_witness_set() {
        let unsigned = fixtures::unsigned_tx();
        let witness = fixtures::wallet_witness_set(&[[3u8; 32]], false);

        let signed = combine_witness_bytes(&unsigned, &witness).unwrap();
        let tx = Transaction::decode(&signed).unwrap();
        let original = Transaction::decode(&unsigned).unwrap();

        assert_eq!(tx.body(), original.body());
        assert_eq!(tx.witness_set(), witness.as_slice());
        assert_eq!(
            WitnessSet::decode(tx.witness_set()).unwrap(),
            WitnessSet::decode(&witness).unwrap()
        );
        assert_eq!(tx.is_valid().unwrap(), Some(true));
        assert_eq!(tx.auxiliary_data(), original.auxiliary_data());
        assert_eq!(transaction_id(tx.body()), transaction_id(original.body()));
    }

    #[test]
    fn test_combine_hex_entry_point() {
        let unsigned = hex::encode(fixtures::unsigned_tx());
        let witness = hex::encode(fixtures::wallet_witness_set(&[[3u8; 32]], true));
        let signed = combine_witnesses(&unsigned, &format!(" {witness}\n")).unwrap();
        assert_ne!(signed, unsigned);

        let bytes = hex::decode(&signed).unwrap();
        let tx = Transaction::decode(&bytes).unwrap();
        assert_eq!(hex::encode(tx.witness_set()), witness);
    }

    #[test]
    fn test_combine_legacy_tx_keeps_metadata() {
        let unsigned = fixtures::legacy_unsigned_tx();
        let witness = fixtures::wallet_witness_set(&[[4u8; 32]], false);
        let signed = combine_witness_bytes(&unsigned, &witness).unwrap();
        let tx = Transaction::decode(&signed).unwrap();
        let original = Transaction::decode(&unsigned).unwrap();
        assert_eq!(tx.is_valid().unwrap(), None);
        assert_eq!(tx.auxiliary_data(), original.auxiliary_data());
    }

    #[test]
    fn test_combine_merges_into_script_witnesses() {
        let unsigned = fixtures::script_tx();
        let witness = fixtures::wallet_witness_set(&[[5u8; 32]], false);
        let signed = combine_witness_bytes(&unsigned, &witness).unwrap();

        let tx = Transaction::decode(&signed).unwrap();
        let set = WitnessSet::decode(tx.witness_set()).unwrap();
        assert_eq!(set.keys(), vec![0, 4]);
        assert!(set.contains_vkey(&[5u8; 32]));
        assert_eq!(
            set.field(4),
            WitnessSet::decode(&fixtures::script_witness_set())
                .unwrap()
                .field(4)
        );
    }

    #[test]
    fn test_empty_wallet_witness_fails_loudly() {
        let unsigned = fixtures::unsigned_tx();
        let err = combine_witness_bytes(&unsigned, &[0xa0]).unwrap_err();
        assert!(matches!(err, TxError::EmptyWitnessSet));
    }

    #[test]
    fn test_repeated_wallet_vkey_not_spliced() {
        let unsigned = fixtures::unsigned_tx();
        let witness = fixtures::wallet_witness_set(&[[3u8; 32], [3u8; 32]], true);
        let err = combine_witness_bytes(&unsigned, &witness).unwrap_err();
        assert!(matches!(err, TxError::MalformedWitnessSet(_)));
    }

    #[test]
    fn test_wallet_full_transaction_accepted() {
        let unsigned = fixtures::unsigned_tx();
        let wallet_tx = fixtures::wallet_signed_tx(&fixtures::tx_body(), &[[6u8; 32]]);
        let signed = combine_witness_bytes(&unsigned, &wallet_tx).unwrap();
        let set = WitnessSet::decode(Transaction::decode(&signed).unwrap().witness_set()).unwrap();
        assert!(set.contains_vkey(&[6u8; 32]));
    }

    #[test]
    fn test_wallet_transaction_for_other_body_rejected() {
        let unsigned = fixtures::unsigned_tx();
        // {2: 1}: a different body
        let wallet_tx = fixtures::wallet_signed_tx(&[0xa1, 0x02, 0x01], &[[6u8; 32]]);
        let err = combine_witness_bytes(&unsigned, &wallet_tx).unwrap_err();
        assert!(matches!(err, TxError::BodyMismatch));
    }

    #[test]
    fn test_garbage_inputs_rejected() {
        assert!(matches!(
            combine_witnesses("not hex", "a0"),
            Err(TxError::InvalidHex(_))
        ));
        let unsigned = hex::encode(fixtures::unsigned_tx());
        // a bare unsigned integer is neither a map nor an array
        assert!(matches!(
            combine_witnesses(&unsigned, "01"),
            Err(TxError::MalformedWitnessSet(_))
        ));
    }

    #[test]
    fn test_combine_is_deterministic() {
        let unsigned = fixtures::script_tx();
        let witness = fixtures::wallet_witness_set(&[[1u8; 32], [2u8; 32]], true);
        let a = combine_witness_bytes(&unsigned, &witness).unwrap();
        let b = combine_witness_bytes(&unsigned, &witness).unwrap();
        assert_eq!(a, b);
    }
}
