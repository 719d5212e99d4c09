use minicbor::data::Type;
use minicbor::{Decoder, Encoder};

use crate::cbor;
use crate::error::{TxError, TxResult};

/// Borrowed structural view over a serialized transaction.
///
/// Alonzo and later encode `[body, witness_set, is_valid, auxiliary_data]`;
/// earlier eras drop the validity flag. Fields are kept as raw slices of the
/// input so re-encoding never touches the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transaction<'a> {
    body: &'a [u8],
    witness_set: &'a [u8],
    is_valid: Option<&'a [u8]>,
    auxiliary_data: &'a [u8],
}

impl<'a> Transaction<'a> {
    pub fn decode(bytes: &'a [u8]) -> TxResult<Self> {
        let mut d = Decoder::new(bytes);
        if !cbor::is_array(&d)? {
            return Err(TxError::MalformedTransaction(
                "transaction is not a CBOR array".to_string(),
            ));
        }
        let items = cbor::array_items(&mut d)?;
        cbor::ensure_consumed(&d)?;

        let tx = match items[..] {
            [body, witness_set, auxiliary_data] => Self {
                body,
                witness_set,
                is_valid: None,
                auxiliary_data,
            },
            [body, witness_set, is_valid, auxiliary_data] => Self {
                body,
                witness_set,
                is_valid: Some(is_valid),
                auxiliary_data,
            },
            _ => {
                return Err(TxError::MalformedTransaction(format!(
                    "expected 3 or 4 elements, found {}",
                    items.len()
                )))
            }
        };

        if !cbor::is_map(&Decoder::new(tx.body))? {
            return Err(TxError::MalformedTransaction(
                "transaction body is not a map".to_string(),
            ));
        }
        if !cbor::is_map(&Decoder::new(tx.witness_set))? {
            return Err(TxError::MalformedTransaction(
                "witness set is not a map".to_string(),
            ));
        }
        if let Some(flag) = tx.is_valid {
            if Decoder::new(flag).datatype()? != Type::Bool {
                return Err(TxError::MalformedTransaction(
                    "validity flag is not a boolean".to_string(),
                ));
            }
        }
        Ok(tx)
    }

    pub fn body(&self) -> &'a [u8] {
        self.body
    }

    pub fn witness_set(&self) -> &'a [u8] {
        self.witness_set
    }

    pub fn auxiliary_data(&self) -> &'a [u8] {
        self.auxiliary_data
    }

    /// `None` for pre-Alonzo transactions without a validity flag.
    pub fn is_valid(&self) -> TxResult<Option<bool>> {
        self.is_valid
            .map(|raw| Decoder::new(raw).bool())
            .transpose()
            .map_err(TxError::from)
    }

    pub fn has_auxiliary_data(&self) -> bool {
        self.auxiliary_data != [0xf6]
    }

    /// Emit the transaction with `witness_set` in place of the current one.
    /// Every other element is copied verbatim.
    pub fn encode_with_witness_set(&self, witness_set: &[u8]) -> TxResult<Vec<u8>> {
        let len = if self.is_valid.is_some() { 4 } else { 3 };
        let mut e = Encoder::new(Vec::with_capacity(
            self.body.len() + witness_set.len() + self.auxiliary_data.len() + 2,
        ));
        e.array(len)?;
        let w = e.writer_mut();
        w.extend_from_slice(self.body);
        w.extend_from_slice(witness_set);
        if let Some(flag) = self.is_valid {
            w.extend_from_slice(flag);
        }
        w.extend_from_slice(self.auxiliary_data);
        Ok(e.into_writer())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn test_decode_unsigned_conway_tx() {
        let bytes = fixtures::unsigned_tx();
        let tx = Transaction::decode(&bytes).unwrap();
        assert_eq!(tx.witness_set(), &[0xa0u8][..]);
        assert_eq!(tx.is_valid().unwrap(), Some(true));
        assert!(!tx.has_auxiliary_data());
        assert_eq!(tx.body(), fixtures::tx_body().as_slice());
    }

    #[test]
    fn test_decode_legacy_three_element_tx() {
        let bytes = fixtures::legacy_unsigned_tx();
        let tx = Transaction::decode(&bytes).unwrap();
        assert_eq!(tx.is_valid().unwrap(), None);
        assert!(tx.has_auxiliary_data());
    }

    #[test]
    fn test_reencode_with_same_witness_is_identity() {
        let bytes = fixtures::unsigned_tx();
        let tx = Transaction::decode(&bytes).unwrap();
        assert_eq!(tx.encode_with_witness_set(tx.witness_set()).unwrap(), bytes);
    }

    #[test]
    fn test_rejects_wrong_shapes() {
        // a bare map
        assert!(matches!(
            Transaction::decode(&[0xa0]),
            Err(TxError::MalformedTransaction(_))
        ));
        // [{}, {}]
        assert!(matches!(
            Transaction::decode(&[0x82, 0xa0, 0xa0]),
            Err(TxError::MalformedTransaction(_))
        ));
        // [[], {}, true, null]: body is not a map
        assert!(matches!(
            Transaction::decode(&[0x84, 0x80, 0xa0, 0xf5, 0xf6]),
            Err(TxError::MalformedTransaction(_))
        ));
        // [{}, {}, 1, null]: flag is not a bool
        assert!(matches!(
            Transaction::decode(&[0x84, 0xa0, 0xa0, 0x01, 0xf6]),
            Err(TxError::MalformedTransaction(_))
        ));
    }

    #[test]
    fn test_rejects_trailing_bytes() {
        let mut bytes = fixtures::unsigned_tx();
        bytes.push(0x00);
        assert!(matches!(
            Transaction::decode(&bytes),
            Err(TxError::TrailingBytes { .. })
        ));
    }

    #[test]
    fn test_truncated_input_is_cbor_error() {
        let bytes = fixtures::unsigned_tx();
        let truncated = &bytes[..bytes.len() / 2];
        assert!(matches!(
            Transaction::decode(truncated),
            Err(TxError::Cbor(_))
        ));
    }
}
