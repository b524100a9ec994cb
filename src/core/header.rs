//! Transaction header: expiration, resource limits and the reference-block binding
//! that ties a transaction to one fork.
//!
//! A block id starts with the block height encoded big-endian, so the header's
//! `ref_block_num` is the referenced height and `ref_block_prefix` is 32 bits of the
//! id's hash material.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::signature::BlockId;

/// Seconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct TimePointSec(pub u32);

impl TimePointSec {
    pub const fn from_secs(secs: u32) -> Self {
        Self(secs)
    }

    pub const fn secs(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for TimePointSec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TransactionHeader {
    /// The transaction is rejected once the chain head passes this time
    pub expiration: TimePointSec,
    pub ref_block_num: u32,
    pub ref_block_prefix: u32,
    /// Upper bound on billed network usage, in 8-byte words (0 = no limit)
    pub max_net_usage_words: u32,
    /// Upper bound on billed CPU time (0 = no limit)
    pub max_cpu_usage_ms: u8,
    pub delay_sec: u32,
}

fn id_word(block_id: &BlockId, index: usize) -> u64 {
    let bytes = block_id.as_bytes();
    let mut word = [0u8; 8];
    word.copy_from_slice(&bytes[index * 8..index * 8 + 8]);
    u64::from_le_bytes(word)
}

fn reference_fields(block_id: &BlockId) -> (u32, u32) {
    let num = (id_word(block_id, 0) as u32).swap_bytes();
    let prefix = id_word(block_id, 1) as u32;
    (num, prefix)
}

impl TransactionHeader {
    pub fn set_reference_block(&mut self, reference_block: &BlockId) {
        let (num, prefix) = reference_fields(reference_block);
        self.ref_block_num = num;
        self.ref_block_prefix = prefix;
    }

    pub fn verify_reference_block(&self, reference_block: &BlockId) -> bool {
        let (num, prefix) = reference_fields(reference_block);
        self.ref_block_num == num && self.ref_block_prefix == prefix
    }

    pub fn is_expired(&self, now: TimePointSec) -> bool {
        now > self.expiration
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::Digest;

    fn block_id(height: u32, seed: &[u8]) -> BlockId {
        let mut bytes = *Digest::hash(seed).as_bytes();
        bytes[..4].copy_from_slice(&height.to_be_bytes());
        Digest::new(bytes)
    }

    #[test]
    fn test_reference_block_num_is_height() {
        let id = block_id(123_456, b"block");
        let mut header = TransactionHeader::default();
        header.set_reference_block(&id);
        assert_eq!(header.ref_block_num, 123_456);
        assert_eq!(header.ref_block_prefix, u32::from_le_bytes(id.as_bytes()[8..12].try_into().unwrap()));
    }

    #[test]
    fn test_verify_reference_block() {
        let id = block_id(10, b"a");
        let mut header = TransactionHeader::default();
        header.set_reference_block(&id);
        assert!(header.verify_reference_block(&id));
        assert!(!header.verify_reference_block(&block_id(10, b"b")));
        assert!(!header.verify_reference_block(&block_id(11, b"a")));
    }

    #[test]
    fn test_expiration() {
        let header = TransactionHeader {
            expiration: TimePointSec::from_secs(100),
            ..Default::default()
        };
        assert!(!header.is_expired(TimePointSec::from_secs(100)));
        assert!(header.is_expired(TimePointSec::from_secs(101)));
    }
}
