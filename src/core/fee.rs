//! Transaction fee schedule. All arithmetic is integer; no float, RNG, or system time. Same inputs yield the same fee.
//!
//! **Model:** `fee = action_count × base_fee_per_action × scale(fee_multiple_level)`. The scale is a
//! fixed-point multiplier with denominator [`FEE_SCALE_DENOMINATOR`]. Levels listed in the schedule's
//! table use the table value; any other level scales linearly, i.e. level `10_000` means ×1.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{ChainError, Result};

/// Number of decimal places of the native token.
pub const AMOUNT_PRECISION: u32 = 4;

/// Minimal units per whole token (10^AMOUNT_PRECISION).
pub const UNITS_PER_TOKEN: u64 = 10_000;

/// Denominator of fee multipliers: a multiplier of `FEE_SCALE_DENOMINATOR` is ×1.
pub const FEE_SCALE_DENOMINATOR: u64 = 10_000;

/// Default fee charged per action, before scaling: 1.0000 token.
pub const DEFAULT_FEE_PER_ACTION: Amount = Amount(UNITS_PER_TOKEN);

/// Fixed-point amount of the native token in minimal units.
///
/// # Examples
/// ```
/// use chainex_core::core::fee::Amount;
///
/// let fee = Amount::new(15_000);
/// assert_eq!(fee.to_string(), "1.5000");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Amount(u64);

impl Amount {
    pub const fn new(units: u64) -> Self {
        Self(units)
    }

    pub const fn units(&self) -> u64 {
        self.0
    }

    /// Rejects zero where a positive quantity is required.
    pub fn require_positive(self) -> Result<Amount> {
        if self.0 == 0 {
            return Err(ChainError::InvalidQuantityOrSize("amount must be positive".to_string()));
        }
        Ok(self)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{:0width$}",
            self.0 / UNITS_PER_TOKEN,
            self.0 % UNITS_PER_TOKEN,
            width = AMOUNT_PRECISION as usize
        )
    }
}

/// Fee policy: the per-action base fee and the multiplier table for fee levels.
///
/// The multiplier table is external policy; nodes load it from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeeSchedule {
    pub base_fee_per_action: Amount,
    /// fee_multiple_level -> multiplier in 1/FEE_SCALE_DENOMINATOR units
    pub multipliers: BTreeMap<u32, u64>,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            base_fee_per_action: DEFAULT_FEE_PER_ACTION,
            multipliers: BTreeMap::new(),
        }
    }
}

impl FeeSchedule {
    pub fn new(base_fee_per_action: Amount) -> Self {
        Self {
            base_fee_per_action,
            multipliers: BTreeMap::new(),
        }
    }

    pub fn with_multiplier(mut self, level: u32, multiplier: u64) -> Self {
        self.multipliers.insert(level, multiplier);
        self
    }

    /// Fixed-point multiplier for a fee level.
    pub fn scale(&self, fee_multiple_level: u32) -> u64 {
        self.multipliers
            .get(&fee_multiple_level)
            .copied()
            .unwrap_or(u64::from(fee_multiple_level))
    }

    /// `action_count × base_fee_per_action × scale(level)`, rounded down to minimal units.
    ///
    /// # Examples
    /// ```
    /// use chainex_core::core::fee::{Amount, FeeSchedule};
    ///
    /// let schedule = FeeSchedule::new(Amount::new(10_000));
    /// // level 20_000 doubles the base fee
    /// assert_eq!(schedule.fee_for(3, 20_000).unwrap(), Amount::new(60_000));
    /// ```
    pub fn fee_for(&self, action_count: usize, fee_multiple_level: u32) -> Result<Amount> {
        let scale = self.scale(fee_multiple_level);
        let scaled = u128::from(self.base_fee_per_action.units())
            .checked_mul(action_count as u128)
            .and_then(|v| v.checked_mul(u128::from(scale)))
            .map(|v| v / u128::from(FEE_SCALE_DENOMINATOR))
            .ok_or_else(|| ChainError::InvalidQuantityOrSize("transaction fee overflow".to_string()))?;
        u64::try_from(scaled)
            .map(Amount)
            .map_err(|_| ChainError::InvalidQuantityOrSize(format!("transaction fee {} exceeds amount range", scaled)))
    }
}
