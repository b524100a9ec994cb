use thiserror::Error;

use crate::signature::PublicKey;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    #[error("Malformed encoding: {0}")]
    MalformedEncoding(String),

    #[error("Unknown transaction compression algorithm: {0}")]
    UnknownCompression(u8),

    #[error("Exceeded maximum decompressed transaction size of {limit} bytes")]
    DecompressionBomb { limit: usize },

    #[error("Invalid quantity or size: {0}")]
    InvalidQuantityOrSize(String),

    #[error("Transaction includes more than one signature signed using the same key associated with public key: {0}")]
    DuplicateSigningKey(PublicKey),

    #[error("Precondition violated: {0}")]
    PreconditionViolation(String),

    #[error("Cryptographic error: {0}")]
    Crypto(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ChainError>;

impl From<secp256k1::Error> for ChainError {
    fn from(err: secp256k1::Error) -> Self {
        ChainError::Crypto(err.to_string())
    }
}

impl From<bincode::Error> for ChainError {
    fn from(err: bincode::Error) -> Self {
        ChainError::MalformedEncoding(err.to_string())
    }
}
