//! Hand-built transactions for unit tests.

use minicbor::data::Tag;
use minicbor::Encoder;

use crate::cbor::SET_TAG;

/// Body with inputs, outputs, fee and ttl. Several values encode to bytes
/// containing `0xa0` so anything matching on raw byte patterns would misfire.
pub fn tx_body() -> Vec<u8> {
    let mut e = Encoder::new(Vec::new());
    e.map(4).unwrap();
    // inputs: [[tx_hash, index]]
    e.u8(0).unwrap();
    e.array(1).unwrap().array(2).unwrap();
    e.bytes(&[0xa0; 32]).unwrap().u8(1).unwrap();
    // outputs: [[address, amount]]
    e.u8(1).unwrap();
    e.array(1).unwrap().array(2).unwrap();
    let mut address = vec![0x61];
    address.extend_from_slice(&[0xa0; 28]);
    e.bytes(&address).unwrap().u64(40_000_160).unwrap();
    // fee
    e.u8(2).unwrap().u64(0xa0a0).unwrap();
    // ttl
    e.u8(3).unwrap().u64(150_000_000).unwrap();
    e.into_writer()
}

fn tx(body: &[u8], witness_set: &[u8], is_valid: Option<bool>, aux: &[u8]) -> Vec<u8> {
    let mut e = Encoder::new(Vec::new());
    e.array(if is_valid.is_some() { 4 } else { 3 }).unwrap();
    e.writer_mut().extend_from_slice(body);
    e.writer_mut().extend_from_slice(witness_set);
    if let Some(flag) = is_valid {
        e.bool(flag).unwrap();
    }
    e.writer_mut().extend_from_slice(aux);
    e.into_writer()
}

/// `[body, {}, true, null]`
pub fn unsigned_tx() -> Vec<u8> {
    tx(&tx_body(), &[0xa0], Some(true), &[0xf6])
}

/// `[body, {}, {674: {"msg": ["hi"]}}]` without a validity flag.
pub fn legacy_unsigned_tx() -> Vec<u8> {
    let mut e = Encoder::new(Vec::new());
    e.map(1).unwrap().u16(674).unwrap();
    e.map(1).unwrap().str("msg").unwrap();
    e.array(1).unwrap().str("hi").unwrap();
    tx(&tx_body(), &[0xa0], None, &e.into_writer())
}

/// `[body, {4: [datum]}, true, null]`, as a script-spending trade would be built.
pub fn script_tx() -> Vec<u8> {
    tx(&tx_body(), &script_witness_set(), Some(true), &[0xf6])
}

/// `{4: [h'deadbeef']}`
pub fn script_witness_set() -> Vec<u8> {
    let mut e = Encoder::new(Vec::new());
    e.map(1).unwrap().u8(4).unwrap();
    e.array(1).unwrap().bytes(&[0xde, 0xad, 0xbe, 0xef]).unwrap();
    e.into_writer()
}

/// `{0: [[vkey, sig], ...]}` with an optional set tag.
pub fn wallet_witness_set(vkeys: &[[u8; 32]], tagged: bool) -> Vec<u8> {
    let mut e = Encoder::new(Vec::new());
    e.map(1).unwrap().u8(0).unwrap();
    if tagged {
        e.tag(Tag::new(SET_TAG)).unwrap();
    }
    e.array(vkeys.len() as u64).unwrap();
    for vkey in vkeys {
        e.array(2).unwrap();
        e.bytes(vkey).unwrap().bytes(&[0x5a; 64]).unwrap();
    }
    e.into_writer()
}

/// A fully signed transaction as some wallets return from `signTx`.
pub fn wallet_signed_tx(body: &[u8], vkeys: &[[u8; 32]]) -> Vec<u8> {
    tx(body, &wallet_witness_set(vkeys, false), Some(true), &[0xf6])
}
