pub mod config;
pub mod core;
pub mod error;
pub mod logging;
pub mod signature;

pub use config::CoreConfig;
pub use error::{ChainError, Result};
pub use signature::{recover, BlockId, ChainId, Digest, PrivateKey, PublicKey, Signature, TransactionId};

// Core API exports
pub use crate::core::{Core, ValidatedTransaction};
pub use crate::core::action::{Action, PermissionLevel};
pub use crate::core::codec::{decode, digest_of, encode, encoded_size, DigestEncoder};
pub use crate::core::compression::{compress, BoundedDecompressor, Compression, DEFAULT_MAX_DECOMPRESSED_SIZE};
pub use crate::core::fee::{Amount, FeeSchedule, DEFAULT_FEE_PER_ACTION, FEE_SCALE_DENOMINATOR, UNITS_PER_TOKEN};
pub use crate::core::header::{TimePointSec, TransactionHeader};
pub use crate::core::name::Name;
pub use crate::core::packed::{PackedTransaction, Unpacker};
pub use crate::core::recovery_cache::{CacheStats, CachedRecovery, RecoveryCache, DEFAULT_RECOVERY_CACHE_CAPACITY};
pub use crate::core::transaction::{SignedTransaction, Transaction};
