//! Digests, keys and recoverable secp256k1 signatures.
//!
//! All values here are opaque fixed-size byte strings. They serialise as hex in
//! human-readable formats (JSON) and as raw length-prefixed bytes in the canonical
//! binary encoding.

use secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
use secp256k1::{Message, SecretKey, SECP256K1};
use serde::de::{self, Deserialize, Deserializer, Error as _};
use serde::{Serialize, Serializer};
use sha2::{Digest as _, Sha256};
use std::fmt;
use std::str::FromStr;

use crate::error::{ChainError, Result};

pub const DIGEST_LEN: usize = 32;
pub const PUBLIC_KEY_LEN: usize = 33;
pub const SIGNATURE_LEN: usize = 65;

fn serialize_fixed<S: Serializer>(bytes: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error> {
    if serializer.is_human_readable() {
        serializer.serialize_str(&hex::encode(bytes))
    } else {
        serializer.serialize_bytes(bytes)
    }
}

fn deserialize_fixed<'de, D: Deserializer<'de>, const N: usize>(
    deserializer: D,
) -> std::result::Result<[u8; N], D::Error> {
    let bytes = if deserializer.is_human_readable() {
        let s = String::deserialize(deserializer)?;
        hex::decode(s).map_err(D::Error::custom)?
    } else {
        Vec::<u8>::deserialize(deserializer)?
    };
    let len = bytes.len();
    bytes
        .try_into()
        .map_err(|_| de::Error::invalid_length(len, &"a fixed-size byte string"))
}

fn parse_hex<const N: usize>(s: &str, what: &str) -> Result<[u8; N]> {
    let bytes = hex::decode(s)
        .map_err(|e| ChainError::MalformedEncoding(format!("Invalid {} hex: {}", what, e)))?;
    let len = bytes.len();
    bytes.try_into().map_err(|_| {
        ChainError::MalformedEncoding(format!("Invalid {} length: expected {} bytes, got {}", what, N, len))
    })
}

/// SHA-256 output. Transaction ids, chain ids and block ids are all digests.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Digest([u8; DIGEST_LEN]);

pub type TransactionId = Digest;
pub type ChainId = Digest;
pub type BlockId = Digest;

impl Digest {
    pub const fn new(bytes: [u8; DIGEST_LEN]) -> Self {
        Self(bytes)
    }

    /// Hashes raw bytes.
    pub fn hash(data: &[u8]) -> Self {
        Self(Sha256::digest(data).into())
    }

    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }
}

impl From<[u8; DIGEST_LEN]> for Digest {
    fn from(bytes: [u8; DIGEST_LEN]) -> Self {
        Self(bytes)
    }
}

impl FromStr for Digest {
    type Err = ChainError;

    fn from_str(s: &str) -> Result<Self> {
        parse_hex(s, "digest").map(Self)
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self)
    }
}

impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serialize_fixed(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Digest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserialize_fixed(deserializer).map(Self)
    }
}

/// Compressed secp256k1 public key.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PublicKey([u8; PUBLIC_KEY_LEN]);

impl PublicKey {
    pub fn from_bytes(bytes: [u8; PUBLIC_KEY_LEN]) -> Result<Self> {
        secp256k1::PublicKey::from_slice(&bytes)?;
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_LEN] {
        &self.0
    }
}

impl From<secp256k1::PublicKey> for PublicKey {
    fn from(key: secp256k1::PublicKey) -> Self {
        Self(key.serialize())
    }
}

impl FromStr for PublicKey {
    type Err = ChainError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_bytes(parse_hex(s, "public key")?)
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self)
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serialize_fixed(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserialize_fixed(deserializer).map(Self)
    }
}

/// Recoverable ECDSA signature: recovery id byte followed by compact `r || s`.
///
/// The bytes are not validated on construction; a malformed signature only
/// fails when a key is recovered from it.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Signature([u8; SIGNATURE_LEN]);

impl Signature {
    pub const fn from_bytes(bytes: [u8; SIGNATURE_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LEN] {
        &self.0
    }

    fn to_recoverable(self) -> Result<RecoverableSignature> {
        let recid = RecoveryId::from_i32(i32::from(self.0[0]))?;
        Ok(RecoverableSignature::from_compact(&self.0[1..], recid)?)
    }
}

impl From<RecoverableSignature> for Signature {
    fn from(sig: RecoverableSignature) -> Self {
        let (recid, compact) = sig.serialize_compact();
        let mut bytes = [0u8; SIGNATURE_LEN];
        bytes[0] = recid.to_i32() as u8;
        bytes[1..].copy_from_slice(&compact);
        Self(bytes)
    }
}

impl FromStr for Signature {
    type Err = ChainError;

    fn from_str(s: &str) -> Result<Self> {
        parse_hex(s, "signature").map(Self)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", self)
    }
}

impl Serialize for Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serialize_fixed(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserialize_fixed(deserializer).map(Self)
    }
}

/// secp256k1 signing key.
#[derive(Clone)]
pub struct PrivateKey(SecretKey);

impl PrivateKey {
    pub fn generate() -> Self {
        Self(SecretKey::new(&mut rand::thread_rng()))
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        Ok(Self(SecretKey::from_slice(bytes)?))
    }

    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = hex::decode(s.trim())
            .map_err(|e| ChainError::Crypto(format!("Invalid private key hex: {}", e)))?;
        Self::from_slice(&bytes)
    }

    pub fn public_key(&self) -> PublicKey {
        secp256k1::PublicKey::from_secret_key(SECP256K1, &self.0).into()
    }

    /// Signs a digest with deterministic (RFC 6979) nonces.
    pub fn sign(&self, digest: &Digest) -> Result<Signature> {
        let msg = Message::from_digest_slice(digest.as_bytes())?;
        Ok(SECP256K1.sign_ecdsa_recoverable(&msg, &self.0).into())
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(..)")
    }
}

/// Recovers the public key that produced `signature` over `digest`.
pub fn recover(signature: &Signature, digest: &Digest) -> Result<PublicKey> {
    let msg = Message::from_digest_slice(digest.as_bytes())?;
    let sig = signature.to_recoverable()?;
    Ok(SECP256K1.recover_ecdsa(&msg, &sig)?.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_and_recover() {
        let key = PrivateKey::from_slice(&[1; 32]).unwrap();
        let digest = Digest::hash(b"message");
        let sig = key.sign(&digest).unwrap();
        assert_eq!(recover(&sig, &digest).unwrap(), key.public_key());
    }

    #[test]
    fn test_recover_other_digest_gives_other_key() {
        let key = PrivateKey::from_slice(&[2; 32]).unwrap();
        let sig = key.sign(&Digest::hash(b"a")).unwrap();
        let recovered = recover(&sig, &Digest::hash(b"b")).unwrap();
        assert_ne!(recovered, key.public_key());
    }

    #[test]
    fn test_invalid_recovery_id() {
        let mut bytes = [0u8; SIGNATURE_LEN];
        bytes[0] = 9;
        let sig = Signature::from_bytes(bytes);
        let err = recover(&sig, &Digest::hash(b"x")).unwrap_err();
        assert!(matches!(err, ChainError::Crypto(_)));
    }

    #[test]
    fn test_digest_hex_roundtrip() {
        let digest = Digest::hash(b"chain");
        let parsed: Digest = digest.to_string().parse().unwrap();
        assert_eq!(parsed, digest);
        assert!("abcd".parse::<Digest>().is_err());
    }

    #[test]
    fn test_json_uses_hex() {
        let key = PrivateKey::from_slice(&[3; 32]).unwrap().public_key();
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, format!("\"{}\"", key));
        let back: PublicKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
    }

    #[test]
    fn test_generated_keys_differ() {
        let a = PrivateKey::generate();
        let b = PrivateKey::generate();
        assert_ne!(a.public_key(), b.public_key());
        let digest = Digest::hash(b"fresh");
        assert_eq!(recover(&a.sign(&digest).unwrap(), &digest).unwrap(), a.public_key());
    }

    #[test]
    fn test_private_key_from_hex() {
        let key = PrivateKey::from_hex(&"11".repeat(32)).unwrap();
        assert_eq!(key.public_key(), PrivateKey::from_slice(&[0x11; 32]).unwrap().public_key());
        assert!(PrivateKey::from_hex("zz").is_err());
        assert!(PrivateKey::from_hex(&"00".repeat(32)).is_err());
    }
}
