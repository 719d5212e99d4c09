//! Structural CBOR handling for Cardano transactions.
//!
//! The trade API hands out unsigned transactions with an empty witness set and
//! CIP-30 wallets answer `signTx` with a witness set. This crate decodes both,
//! swaps (or merges) the witness set and re-emits the transaction with every
//! other field byte-for-byte intact.

pub mod cbor;
pub mod combine;
pub mod error;
pub mod hash;
pub mod transaction;
pub mod witness;

#[cfg(test)]
mod fixtures;

pub use cbor::decode_hex;
pub use combine::{combine_witness_bytes, combine_witnesses};
pub use error::{TxError, TxResult};
pub use hash::{summarize, transaction_id, TxSummary};
pub use transaction::Transaction;
pub use witness::{VKeyWitness, WitnessSet};
