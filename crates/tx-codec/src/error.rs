use thiserror::Error;

#[derive(Error, Debug)]
pub enum TxError {
    #[error("Invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("CBOR decode error: {0}")]
    Cbor(#[from] minicbor::decode::Error),

    #[error("CBOR encode error: {0}")]
    Encode(String),

    #[error("Malformed transaction: {0}")]
    MalformedTransaction(String),

    #[error("Malformed witness set: {0}")]
    MalformedWitnessSet(String),

    #[error("Wallet returned an empty witness set")]
    EmptyWitnessSet,

    #[error("Witness field {key} differs between transaction and wallet")]
    ConflictingWitnessField { key: u64 },

    #[error("Wallet signed a different transaction body")]
    BodyMismatch,

    #[error("Unexpected trailing bytes at offset {offset}")]
    TrailingBytes { offset: usize },
}

pub type TxResult<T> = Result<T, TxError>;

impl<E: std::fmt::Display> From<minicbor::encode::Error<E>> for TxError {
    fn from(err: minicbor::encode::Error<E>) -> Self {
        TxError::Encode(err.to_string())
    }
}
