//! Unsigned and signed transactions.
//!
//! **Identity:** a transaction's id is the SHA-256 of its canonical encoding. It is recomputed from the
//! current field values on every call to [`Transaction::id`]; no id is stored on the struct, so an edit
//! made while building a transaction is always reflected. `id()` is not cheap.
//!
//! **Signing:** signatures cover `chain_id ‖ transaction ‖ context_free_data`, where the context-free data
//! is left out entirely (not encoded as an empty list) when there is none.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

use crate::core::action::Action;
use crate::core::codec::{digest_of, DigestEncoder};
use crate::core::fee::{Amount, FeeSchedule};
use crate::core::header::TransactionHeader;
use crate::core::name::Name;
use crate::core::recovery_cache::{CachedRecovery, RecoveryCache};
use crate::error::{ChainError, Result};
use crate::signature::{recover, BlockId, ChainId, Digest, PrivateKey, PublicKey, Signature, TransactionId};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Transaction {
    pub header: TransactionHeader,
    pub context_free_actions: Vec<Action>,
    pub actions: Vec<Action>,
    /// Fee level; see [`FeeSchedule::scale`]
    pub fee_multiple_level: u32,
}

impl Transaction {
    pub fn new(header: TransactionHeader, actions: Vec<Action>) -> Self {
        Self {
            header,
            actions,
            ..Default::default()
        }
    }

    pub fn id(&self) -> Result<TransactionId> {
        digest_of(self)
    }

    pub fn sig_digest(&self, chain_id: &ChainId, context_free_data: &[Vec<u8>]) -> Result<Digest> {
        let mut enc = DigestEncoder::new();
        enc.pack(chain_id)?.pack(self)?;
        if !context_free_data.is_empty() {
            enc.pack(context_free_data)?;
        }
        Ok(enc.result())
    }

    pub fn set_reference_block(&mut self, reference_block: &BlockId) {
        self.header.set_reference_block(reference_block);
    }

    pub fn verify_reference_block(&self, reference_block: &BlockId) -> bool {
        self.header.verify_reference_block(reference_block)
    }

    /// Recovers the set of keys that signed this transaction.
    ///
    /// Recoveries are served from `cache` when it holds an entry for the same signature recorded
    /// under this transaction's id and signing digest. With `allow_duplicate_keys == false`, two signatures from the
    /// same key fail with [`ChainError::DuplicateSigningKey`].
    pub fn get_signature_keys(
        &self,
        cache: &RecoveryCache,
        signatures: &[Signature],
        chain_id: &ChainId,
        context_free_data: &[Vec<u8>],
        allow_duplicate_keys: bool,
    ) -> Result<BTreeSet<PublicKey>> {
        let digest = self.sig_digest(chain_id, context_free_data)?;
        let trx_id = self.id()?;

        let mut keys = BTreeSet::new();
        let mut fresh = Vec::new();
        let outcome = collect_keys(cache, signatures, &digest, &trx_id, allow_duplicate_keys, &mut keys, &mut fresh);
        cache.insert_batch(fresh);
        outcome.map(|_| keys)
    }

    pub fn get_transaction_fee(&self, schedule: &FeeSchedule) -> Result<Amount> {
        debug!(fee_multiple_level = self.fee_multiple_level, actions = self.actions.len(), "computing transaction fee");
        schedule.fee_for(self.actions.len(), self.fee_multiple_level)
    }

    /// Actor of the first authorization of the first action.
    pub fn get_transaction_sender(&self) -> Result<Name> {
        let action = self
            .actions
            .first()
            .ok_or_else(|| ChainError::PreconditionViolation("transaction has no actions".to_string()))?;
        let level = action.authorization.first().ok_or_else(|| {
            ChainError::PreconditionViolation("first action has no authorization".to_string())
        })?;
        Ok(level.actor)
    }
}

fn collect_keys(
    cache: &RecoveryCache,
    signatures: &[Signature],
    digest: &Digest,
    trx_id: &TransactionId,
    allow_duplicate_keys: bool,
    keys: &mut BTreeSet<PublicKey>,
    fresh: &mut Vec<CachedRecovery>,
) -> Result<()> {
    for signature in signatures {
        let key = match cache.lookup(signature, trx_id, digest) {
            Some(key) => key,
            None => {
                let key = recover(signature, digest)?;
                fresh.push(CachedRecovery {
                    trx_id: *trx_id,
                    sig_digest: *digest,
                    public_key: key,
                    signature: *signature,
                });
                key
            }
        };
        if !keys.insert(key) && !allow_duplicate_keys {
            return Err(ChainError::DuplicateSigningKey(key));
        }
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SignedTransaction {
    pub transaction: Transaction,
    pub signatures: Vec<Signature>,
    pub context_free_data: Vec<Vec<u8>>,
}

impl SignedTransaction {
    pub fn new(transaction: Transaction, signatures: Vec<Signature>, context_free_data: Vec<Vec<u8>>) -> Self {
        Self {
            transaction,
            signatures,
            context_free_data,
        }
    }

    pub fn id(&self) -> Result<TransactionId> {
        self.transaction.id()
    }

    /// Signs with `key` and appends the signature.
    pub fn sign(&mut self, key: &PrivateKey, chain_id: &ChainId) -> Result<&Signature> {
        let signature = self.signature_for(key, chain_id)?;
        self.signatures.push(signature);
        Ok(&self.signatures[self.signatures.len() - 1])
    }

    /// Signature `key` would produce, without appending it.
    pub fn signature_for(&self, key: &PrivateKey, chain_id: &ChainId) -> Result<Signature> {
        key.sign(&self.transaction.sig_digest(chain_id, &self.context_free_data)?)
    }

    pub fn get_signature_keys(
        &self,
        cache: &RecoveryCache,
        chain_id: &ChainId,
        allow_duplicate_keys: bool,
    ) -> Result<BTreeSet<PublicKey>> {
        self.transaction.get_signature_keys(
            cache,
            &self.signatures,
            chain_id,
            &self.context_free_data,
            allow_duplicate_keys,
        )
    }

    pub fn get_transaction_fee(&self, schedule: &FeeSchedule) -> Result<Amount> {
        self.transaction.get_transaction_fee(schedule)
    }

    pub fn get_transaction_sender(&self) -> Result<Name> {
        self.transaction.get_transaction_sender()
    }
}

impl From<Transaction> for SignedTransaction {
    fn from(transaction: Transaction) -> Self {
        Self::new(transaction, Vec::new(), Vec::new())
    }
}
