//! Canonical binary encoding and digest encoder.
//!
//! Every hash and signature in the chain is computed over these bytes, so the format
//! must never depend on platform or configuration: fixed-width little-endian
//! integers, `u64` length prefixes for sequences and byte blobs, struct fields in
//! declaration order, no trailing bytes.

use bincode::Options;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest as _, Sha256};

use crate::error::Result;
use crate::signature::Digest;

fn options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_little_endian()
        .reject_trailing_bytes()
}

/// Canonical bytes of `value`.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    Ok(options().serialize(value)?)
}

/// Decodes canonical bytes. A length prefix can never claim more bytes than `data` holds.
pub fn decode<T: DeserializeOwned>(data: &[u8]) -> Result<T> {
    Ok(options().with_limit(data.len() as u64).deserialize(data)?)
}

/// Size of the canonical encoding without materialising it.
pub fn encoded_size<T: Serialize + ?Sized>(value: &T) -> Result<u64> {
    Ok(options().serialized_size(value)?)
}

/// Digest of the canonical encoding of a single value.
pub fn digest_of<T: Serialize + ?Sized>(value: &T) -> Result<Digest> {
    let mut enc = DigestEncoder::new();
    enc.pack(value)?;
    Ok(enc.result())
}

/// Hashes the concatenated canonical encodings of several values.
#[derive(Clone, Default)]
pub struct DigestEncoder {
    hasher: Sha256,
}

impl DigestEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pack<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<&mut Self> {
        self.hasher.update(encode(value)?);
        Ok(self)
    }

    pub fn result(self) -> Digest {
        Digest::new(self.hasher.finalize().into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChainError;

    #[test]
    fn test_fixed_width_layout() {
        let bytes = encode(&(1u32, vec![7u8, 8u8])).unwrap();
        assert_eq!(bytes, vec![1, 0, 0, 0, 2, 0, 0, 0, 0, 0, 0, 0, 7, 8]);
        assert_eq!(encoded_size(&(1u32, vec![7u8, 8u8])).unwrap(), 14);
    }

    #[test]
    fn test_decode_rejects_trailing_bytes() {
        let mut bytes = encode(&5u32).unwrap();
        bytes.push(0);
        assert!(matches!(decode::<u32>(&bytes), Err(ChainError::MalformedEncoding(_))));
    }

    #[test]
    fn test_decode_rejects_truncated() {
        let bytes = encode(&vec![1u8, 2, 3]).unwrap();
        assert!(decode::<Vec<u8>>(&bytes[..bytes.len() - 1]).is_err());
    }

    #[test]
    fn test_decode_rejects_oversized_length_prefix() {
        let mut bytes = u64::MAX.to_le_bytes().to_vec();
        bytes.extend_from_slice(&[1, 2, 3]);
        assert!(matches!(decode::<Vec<u8>>(&bytes), Err(ChainError::MalformedEncoding(_))));
    }

    #[test]
    fn test_digest_encoder_matches_concatenation() {
        let mut enc = DigestEncoder::new();
        enc.pack(&1u64).unwrap().pack("abc").unwrap();
        let mut joined = encode(&1u64).unwrap();
        joined.extend(encode("abc").unwrap());
        assert_eq!(enc.result(), Digest::hash(&joined));
    }
}
