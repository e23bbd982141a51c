//! Capability interfaces to the external collaborators.
//!
//! The engine never talks to a live chain; it is handed two capabilities
//! at construction. Both are synchronous: a call either completes or the
//! enclosing claim fails atomically. Test doubles implement these traits
//! without any blockchain runtime.

use harvest_types::{Address, Amount};

/// The external lending market's accrual tracker, one instance per market.
pub trait AccrualSource {
    /// Units per whole accrual unit (power of ten), or `None` for an
    /// unknown market.
    fn base_accrual_scale(&self, market: &Address) -> Option<u64>;

    /// The monotonically non-decreasing tracked accrual for `account`.
    fn base_tracking_accrued(&self, market: &Address, account: &Address) -> Amount;

    /// Refresh the tracker's internal accrual state for `account`.
    /// Idempotent when no time has elapsed.
    fn accrue_account(&mut self, market: &Address, account: &Address);

    /// Whether `spender` holds delegated permission from `owner`.
    fn has_permission(&self, market: &Address, owner: &Address, spender: &Address) -> bool;
}

/// The external token service, one logical instance per reward token.
pub trait ValueTransfer {
    /// The token's decimal count, or `None` for an unknown token.
    fn decimals(&self, token: &Address) -> Option<u32>;

    /// Transfer `amount` token units to `to`. Returns `false` on
    /// insufficient balance rather than raising.
    fn transfer(&mut self, token: &Address, to: &Address, amount: Amount) -> bool;
}
