use std::collections::BTreeMap;

use minicbor::data::{Tag, Type};
use minicbor::{Decoder, Encoder};

use crate::cbor::{self, SET_TAG};
use crate::error::{TxError, TxResult};

/// Witness set map key for verification-key witnesses.
pub const VKEY_WITNESSES: u64 = 0;

/// Human-readable names for the witness set keys defined up to Conway.
pub fn field_name(key: u64) -> &'static str {
    match key {
        0 => "vkeywitnesses",
        1 => "native_scripts",
        2 => "bootstrap_witnesses",
        3 => "plutus_v1_scripts",
        4 => "plutus_data",
        5 => "redeemers",
        6 => "plutus_v2_scripts",
        7 => "plutus_v3_scripts",
        _ => "unknown",
    }
}

/// A `[vkey, signature]` pair. The original encoding is kept so merged
/// witness sets re-emit the wallet's bytes untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VKeyWitness {
    pub vkey: Vec<u8>,
    pub signature: Vec<u8>,
    raw: Vec<u8>,
}

impl VKeyWitness {
    fn decode(raw: &[u8]) -> TxResult<Self> {
        let mut d = Decoder::new(raw);
        let items = cbor::array_items(&mut d)?;
        if items.len() != 2 {
            return Err(TxError::MalformedWitnessSet(format!(
                "vkey witness has {} elements, expected 2",
                items.len()
            )));
        }
        let vkey = Decoder::new(items[0]).bytes()?.to_vec();
        let signature = Decoder::new(items[1]).bytes()?.to_vec();
        if vkey.len() != 32 {
            return Err(TxError::MalformedWitnessSet(format!(
                "vkey is {} bytes, expected 32",
                vkey.len()
            )));
        }
        Ok(Self {
            vkey,
            signature,
            raw: raw.to_vec(),
        })
    }

    pub fn vkey_hex(&self) -> String {
        hex::encode(&self.vkey)
    }
}

/// Decoded transaction witness set.
///
/// Only the vkey witnesses are parsed; every other field is carried as raw
/// CBOR so scripts, datums and redeemers survive a merge byte-for-byte.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WitnessSet {
    vkey_witnesses: Vec<VKeyWitness>,
    vkeys_tagged: bool,
    fields: BTreeMap<u64, Vec<u8>>,
}

impl WitnessSet {
    pub fn decode(bytes: &[u8]) -> TxResult<Self> {
        let mut d = Decoder::new(bytes);
        if !cbor::is_map(&d)? {
            return Err(TxError::MalformedWitnessSet(
                "witness set is not a CBOR map".to_string(),
            ));
        }
        let entries = cbor::uint_map_entries(&mut d)?;
        cbor::ensure_consumed(&d)?;

        let mut set = WitnessSet::default();
        let mut seen_vkeys = false;
        for (key, raw) in entries {
            if key == VKEY_WITNESSES {
                if seen_vkeys {
                    return Err(TxError::MalformedWitnessSet(
                        "duplicate vkeywitnesses entry".to_string(),
                    ));
                }
                seen_vkeys = true;
                let (tagged, witnesses) = decode_vkey_witnesses(raw)?;
                set.vkeys_tagged = tagged;
                set.vkey_witnesses = witnesses;
            } else if set.fields.insert(key, raw.to_vec()).is_some() {
                return Err(TxError::MalformedWitnessSet(format!(
                    "duplicate {} entry",
                    field_name(key)
                )));
            }
        }
        Ok(set)
    }

    pub fn is_empty(&self) -> bool {
        self.vkey_witnesses.is_empty() && self.fields.is_empty()
    }

    pub fn vkey_witnesses(&self) -> &[VKeyWitness] {
        &self.vkey_witnesses
    }

    pub fn contains_vkey(&self, vkey: &[u8]) -> bool {
        self.vkey_witnesses.iter().any(|w| w.vkey == vkey)
    }

    /// Keys present in the map, ascending.
    pub fn keys(&self) -> Vec<u64> {
        let mut keys: Vec<u64> = self.fields.keys().copied().collect();
        if !self.vkey_witnesses.is_empty() {
            keys.push(VKEY_WITNESSES);
        }
        keys.sort_unstable();
        keys
    }

    pub fn field(&self, key: u64) -> Option<&[u8]> {
        self.fields.get(&key).map(Vec::as_slice)
    }

    /// Fold `other` into this set.
    ///
    /// Vkey witnesses are unioned by verification key (existing entries win).
    /// Other fields are carried over when absent here; when present on both
    /// sides they must be byte-identical. Returns how many vkey witnesses
    /// were added.
    pub fn merge(&mut self, other: &WitnessSet) -> TxResult<usize> {
        for (key, value) in &other.fields {
            match self.fields.get(key) {
                Some(existing) if existing != value => {
                    return Err(TxError::ConflictingWitnessField { key: *key });
                }
                Some(_) => {}
                None => {
                    self.fields.insert(*key, value.clone());
                }
            }
        }

        let mut added = 0;
        for witness in &other.vkey_witnesses {
            if !self.contains_vkey(&witness.vkey) {
                self.vkey_witnesses.push(witness.clone());
                added += 1;
            }
        }
        self.vkeys_tagged |= other.vkeys_tagged;
        Ok(added)
    }

    pub fn encode(&self) -> TxResult<Vec<u8>> {
        let mut e = Encoder::new(Vec::new());
        e.map(self.keys().len() as u64)?;

        if !self.vkey_witnesses.is_empty() {
            e.u64(VKEY_WITNESSES)?;
            if self.vkeys_tagged {
                e.tag(Tag::new(SET_TAG))?;
            }
            e.array(self.vkey_witnesses.len() as u64)?;
            for witness in &self.vkey_witnesses {
                e.writer_mut().extend_from_slice(&witness.raw);
            }
        }

        for (key, value) in &self.fields {
            e.u64(*key)?;
            e.writer_mut().extend_from_slice(value);
        }
        Ok(e.into_writer())
    }
}

fn decode_vkey_witnesses(raw: &[u8]) -> TxResult<(bool, Vec<VKeyWitness>)> {
    let mut d = Decoder::new(raw);
    let mut tagged = false;
    if d.datatype()? == Type::Tag {
        let tag = d.tag()?;
        if tag.as_u64() != SET_TAG {
            return Err(TxError::MalformedWitnessSet(format!(
                "unexpected tag {} on vkeywitnesses",
                tag.as_u64()
            )));
        }
        tagged = true;
    }
    if !cbor::is_array(&d)? {
        return Err(TxError::MalformedWitnessSet(
            "vkeywitnesses is not an array".to_string(),
        ));
    }
    let witnesses = cbor::array_items(&mut d)?
        .into_iter()
        .map(VKeyWitness::decode)
        .collect::<TxResult<Vec<_>>>()?;
    cbor::ensure_consumed(&d)?;

    for (i, witness) in witnesses.iter().enumerate() {
        if witnesses[..i].iter().any(|w| w.vkey == witness.vkey) {
            return Err(TxError::MalformedWitnessSet(format!(
                "vkey {} appears more than once",
                witness.vkey_hex()
            )));
        }
    }
    Ok((tagged, witnesses))
}
