//! Low-level helpers for walking CBOR items without re-encoding them.
//!
//! Everything here hands back borrowed slices of the original input so that
//! fields we do not touch (transaction body, auxiliary data) keep their exact
//! byte representation.

use minicbor::data::Type;
use minicbor::Decoder;

use crate::error::{TxError, TxResult};

/// CBOR tag used by Conway-era encoders for sets.
pub const SET_TAG: u64 = 258;

const BREAK: u8 = 0xff;

/// Decode a hex string, tolerating surrounding whitespace and a `0x` prefix.
pub fn decode_hex(input: &str) -> TxResult<Vec<u8>> {
    let trimmed = input.trim();
    let trimmed = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    Ok(hex::decode(trimmed)?)
}

/// Return the raw bytes of the next item and advance past it.
pub fn raw_item<'b>(d: &mut Decoder<'b>) -> TxResult<&'b [u8]> {
    let start = d.position();
    d.skip()?;
    Ok(&d.input()[start..d.position()])
}

pub fn is_array(d: &Decoder<'_>) -> TxResult<bool> {
    Ok(matches!(d.datatype()?, Type::Array | Type::ArrayIndef))
}

pub fn is_map(d: &Decoder<'_>) -> TxResult<bool> {
    Ok(matches!(d.datatype()?, Type::Map | Type::MapIndef))
}

fn at_break(d: &Decoder<'_>) -> bool {
    d.input().get(d.position()) == Some(&BREAK)
}

/// Read an array header and collect the raw bytes of each element.
/// Handles both definite and indefinite length encodings.
pub fn array_items<'b>(d: &mut Decoder<'b>) -> TxResult<Vec<&'b [u8]>> {
    let mut items = Vec::new();
    match d.array()? {
        Some(len) => {
            for _ in 0..len {
                items.push(raw_item(d)?);
            }
        }
        None => {
            while !at_break(d) {
                items.push(raw_item(d)?);
            }
            d.set_position(d.position() + 1);
        }
    }
    Ok(items)
}

/// Read a map with unsigned integer keys and collect `(key, raw value)` pairs
/// in encounter order.
pub fn uint_map_entries<'b>(d: &mut Decoder<'b>) -> TxResult<Vec<(u64, &'b [u8])>> {
    let mut entries = Vec::new();
    match d.map()? {
        Some(len) => {
            for _ in 0..len {
                let key = d.u64()?;
                entries.push((key, raw_item(d)?));
            }
        }
        None => {
            while !at_break(d) {
                let key = d.u64()?;
                entries.push((key, raw_item(d)?));
            }
            d.set_position(d.position() + 1);
        }
    }
    Ok(entries)
}

/// Fail if the decoder has not consumed the whole input.
pub fn ensure_consumed(d: &Decoder<'_>) -> TxResult<()> {
    if d.position() != d.input().len() {
        return Err(TxError::TrailingBytes {
            offset: d.position(),
        });
    }
    Ok(())
}
