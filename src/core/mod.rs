// Core module for transaction processing
// Canonical encoding, signing, key recovery and packing of ledger transactions.
//
// DETERMINISM GUARANTEES:
// =======================
// 1. Same transaction fields → same canonical bytes → same id
// 2. Ids and digests are recomputed on every call; nothing is memoised on a transaction
// 3. Fees use integer arithmetic only
// 4. The recovery cache changes speed, never outcomes
//
// INVARIANTS:
// - Every byte received from a peer is decoded through `codec` and, when compressed,
//   through a size-bounded decompressor
// - An unknown compression tag is an error on every read path

pub mod action;
pub mod codec;
pub mod compression;
pub mod fee;
pub mod header;
pub mod name;
pub mod packed;
pub mod recovery_cache;
pub mod transaction;

use std::collections::BTreeSet;
use tracing::debug;

use crate::config::CoreConfig;
use crate::core::compression::BoundedDecompressor;
use crate::core::fee::{Amount, FeeSchedule};
use crate::core::name::Name;
use crate::core::packed::PackedTransaction;
use crate::core::recovery_cache::RecoveryCache;
use crate::core::transaction::SignedTransaction;
use crate::error::Result;
use crate::signature::{ChainId, Digest, PublicKey, TransactionId};

/// Outcome of validating a packed transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedTransaction {
    pub id: TransactionId,
    pub packed_digest: Digest,
    pub billable_size: u32,
    pub transaction: SignedTransaction,
    pub signing_keys: BTreeSet<PublicKey>,
}

impl ValidatedTransaction {
    pub fn sender(&self) -> Result<Name> {
        self.transaction.get_transaction_sender()
    }
}

/// Validation context for one chain.
/// Owns the recovery cache shared by every transaction it validates.
///
/// The context is `Sync`; validation workers can share it behind an `Arc`.
#[derive(Debug)]
pub struct Core {
    chain_id: ChainId,
    decompressor: BoundedDecompressor,
    recovery_cache: RecoveryCache,
    fee_schedule: FeeSchedule,
}

impl Core {
    /// Creates a context with default limits and an empty cache.
    pub fn new(chain_id: ChainId) -> Self {
        Self::with_config(chain_id, &CoreConfig::default())
    }

    pub fn with_config(chain_id: ChainId, config: &CoreConfig) -> Self {
        Self {
            chain_id,
            decompressor: config.decompressor(),
            recovery_cache: config.recovery_cache(),
            fee_schedule: config.fee.clone(),
        }
    }

    pub fn chain_id(&self) -> &ChainId {
        &self.chain_id
    }

    pub fn recovery_cache(&self) -> &RecoveryCache {
        &self.recovery_cache
    }

    pub fn fee_schedule(&self) -> &FeeSchedule {
        &self.fee_schedule
    }

    /// Decodes a packed transaction and recovers its signing keys.
    ///
    /// Flow:
    /// 1. Canonical size must fit the billing range
    /// 2. Blobs are decoded under the configured decompression ceiling
    /// 3. Signing keys are recovered through the shared cache
    pub fn validate_packed(
        &self,
        packed: &PackedTransaction,
        allow_duplicate_keys: bool,
    ) -> Result<ValidatedTransaction> {
        let billable_size = packed.get_billable_size()?;
        let transaction = packed.unpacker_with(self.decompressor).get_signed_transaction()?;
        let id = transaction.id()?;
        let signing_keys = transaction.get_signature_keys(&self.recovery_cache, &self.chain_id, allow_duplicate_keys)?;
        debug!(%id, keys = signing_keys.len(), billable_size, "validated packed transaction");
        Ok(ValidatedTransaction {
            id,
            packed_digest: packed.packed_digest()?,
            billable_size,
            transaction,
            signing_keys,
        })
    }

    /// Parses wire bytes and validates the envelope they hold.
    pub fn validate_bytes(&self, bytes: &[u8], allow_duplicate_keys: bool) -> Result<ValidatedTransaction> {
        self.validate_packed(&PackedTransaction::from_bytes(bytes)?, allow_duplicate_keys)
    }

    pub fn transaction_fee(&self, transaction: &SignedTransaction) -> Result<Amount> {
        transaction.get_transaction_fee(&self.fee_schedule)
    }
}
