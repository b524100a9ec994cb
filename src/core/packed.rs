//! Packed transaction: the wire and storage envelope.
//!
//! The envelope holds a compression tag, the canonical bytes of a transaction and of its
//! context-free data (both compressed when the tag says so) and the signatures, which are
//! never compressed. The owned bytes are authoritative.
//!
//! # Decode-on-read
//! Every read accessor decodes the blobs again; nothing decoded is cached on the envelope.
//! Callers that need a value several times should keep the decoded result themselves.
//!
//! # Identity
//! [`PackedTransaction::id`] hashes the decoded transaction and is the same however it was packed.
//! [`PackedTransaction::packed_digest`] hashes the envelope bytes, so the same transaction packed
//! with different compression has different packed digests.

use serde::{Deserialize, Serialize};

use crate::core::codec::{decode, digest_of, encode, encoded_size};
use crate::core::compression::{compress, BoundedDecompressor, Compression};
use crate::core::transaction::{SignedTransaction, Transaction};
use crate::error::{ChainError, Result};
use crate::signature::{Digest, Signature, TransactionId};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PackedTransaction {
    signatures: Vec<Signature>,
    /// Raw wire tag; interpreted through [`Compression`] on every read
    compression: u8,
    packed_context_free_data: Vec<u8>,
    packed_trx: Vec<u8>,
}

fn pack_transaction(transaction: &Transaction, compression: Compression) -> Result<Vec<u8>> {
    let raw = encode(transaction)?;
    match compression {
        Compression::None => Ok(raw),
        Compression::Zlib => compress(&raw),
    }
}

fn pack_context_free_data(context_free_data: &[Vec<u8>], compression: Compression) -> Result<Vec<u8>> {
    if context_free_data.is_empty() {
        return Ok(Vec::new());
    }
    let raw = encode(context_free_data)?;
    match compression {
        Compression::None => Ok(raw),
        Compression::Zlib => compress(&raw),
    }
}

impl PackedTransaction {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assembles an envelope from wire fields. The tag is not checked until the blobs are read.
    pub fn from_parts(
        signatures: Vec<Signature>,
        compression: u8,
        packed_context_free_data: Vec<u8>,
        packed_trx: Vec<u8>,
    ) -> Self {
        Self {
            signatures,
            compression,
            packed_context_free_data,
            packed_trx,
        }
    }

    pub fn from_transaction(transaction: &Transaction, compression: Compression) -> Result<Self> {
        let mut packed = Self::new();
        packed.set_transaction(transaction, compression)?;
        Ok(packed)
    }

    pub fn from_signed(signed: &SignedTransaction, compression: Compression) -> Result<Self> {
        let mut packed = Self::new();
        packed.set_transaction_with_cfd(&signed.transaction, &signed.context_free_data, compression)?;
        packed.signatures = signed.signatures.clone();
        Ok(packed)
    }

    /// Parses the canonical encoding of an envelope.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        decode(bytes)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        encode(self)
    }

    pub fn signatures(&self) -> &[Signature] {
        &self.signatures
    }

    pub fn compression_tag(&self) -> u8 {
        self.compression
    }

    pub fn compression(&self) -> Result<Compression> {
        Compression::try_from(self.compression)
    }

    pub fn packed_trx(&self) -> &[u8] {
        &self.packed_trx
    }

    pub fn packed_context_free_data(&self) -> &[u8] {
        &self.packed_context_free_data
    }

    /// Replaces the transaction blob and tag and clears the context-free data blob.
    pub fn set_transaction(&mut self, transaction: &Transaction, compression: Compression) -> Result<()> {
        let packed_trx = pack_transaction(transaction, compression)?;
        self.packed_trx = packed_trx;
        self.packed_context_free_data.clear();
        self.compression = compression.tag();
        Ok(())
    }

    /// Replaces both blobs and the tag. On error the envelope is left unchanged.
    pub fn set_transaction_with_cfd(
        &mut self,
        transaction: &Transaction,
        context_free_data: &[Vec<u8>],
        compression: Compression,
    ) -> Result<()> {
        let packed_trx = pack_transaction(transaction, compression)?;
        let packed_cfd = pack_context_free_data(context_free_data, compression)?;
        self.packed_trx = packed_trx;
        self.packed_context_free_data = packed_cfd;
        self.compression = compression.tag();
        Ok(())
    }

    /// Reader that decompresses with the given ceiling instead of the default one.
    pub fn unpacker_with(&self, decompressor: BoundedDecompressor) -> Unpacker<'_> {
        Unpacker {
            packed: self,
            decompressor,
        }
    }

    pub fn unpacker(&self) -> Unpacker<'_> {
        self.unpacker_with(BoundedDecompressor::default())
    }

    pub fn get_raw_transaction(&self) -> Result<Vec<u8>> {
        self.unpacker().get_raw_transaction()
    }

    pub fn get_context_free_data(&self) -> Result<Vec<Vec<u8>>> {
        self.unpacker().get_context_free_data()
    }

    pub fn get_transaction(&self) -> Result<Transaction> {
        self.unpacker().get_transaction()
    }

    pub fn get_signed_transaction(&self) -> Result<SignedTransaction> {
        self.unpacker().get_signed_transaction()
    }

    pub fn id(&self) -> Result<TransactionId> {
        self.unpacker().id()
    }

    /// Digest of the envelope's own canonical encoding.
    pub fn packed_digest(&self) -> Result<Digest> {
        digest_of(self)
    }

    /// Canonical size of the envelope, which is what the sender is billed for.
    pub fn get_billable_size(&self) -> Result<u32> {
        let size = encoded_size(self)?;
        u32::try_from(size).map_err(|_| ChainError::InvalidQuantityOrSize(format!("packed_transaction is too big: {} bytes", size)))
    }
}

/// Decode-on-read view of a [`PackedTransaction`] with a fixed decompression ceiling.
#[derive(Debug, Clone, Copy)]
pub struct Unpacker<'a> {
    packed: &'a PackedTransaction,
    decompressor: BoundedDecompressor,
}

impl Unpacker<'_> {
    fn inflate(&self, blob: &[u8]) -> Result<Vec<u8>> {
        match self.packed.compression()? {
            Compression::None => Ok(blob.to_vec()),
            Compression::Zlib => self.decompressor.decompress(blob),
        }
    }

    pub fn get_raw_transaction(&self) -> Result<Vec<u8>> {
        self.inflate(&self.packed.packed_trx)
    }

    /// An empty blob means no context-free data, whatever the tag.
    pub fn get_context_free_data(&self) -> Result<Vec<Vec<u8>>> {
        let compression = self.packed.compression()?;
        if self.packed.packed_context_free_data.is_empty() {
            return Ok(Vec::new());
        }
        let raw = match compression {
            Compression::None => return decode(&self.packed.packed_context_free_data),
            Compression::Zlib => self.decompressor.decompress(&self.packed.packed_context_free_data)?,
        };
        decode(&raw)
    }

    pub fn get_transaction(&self) -> Result<Transaction> {
        match self.packed.compression()? {
            Compression::None => decode(&self.packed.packed_trx),
            Compression::Zlib => decode(&self.decompressor.decompress(&self.packed.packed_trx)?),
        }
    }

    pub fn get_signed_transaction(&self) -> Result<SignedTransaction> {
        Ok(SignedTransaction::new(
            self.get_transaction()?,
            self.packed.signatures.clone(),
            self.get_context_free_data()?,
        ))
    }

    pub fn id(&self) -> Result<TransactionId> {
        self.get_transaction()?.id()
    }
}
