//! Tracked-accrual to token-unit conversion.
//!
//! A raw accrual delta is taken either from the live tracker (open
//! campaign) or from the proof-supplied finish snapshot (closed campaign),
//! rescaled into the token's decimal scale, then multiplied by the
//! campaign's fixed-point reward multiplier.
//!
//! Truncation happens per step — first the rescale division, then the
//! multiplier division by [`FACTOR_SCALE`] — to stay bit-exact with the
//! reference behavior. Deferring to one combined division would lose less
//! to rounding but would change observable results.

use harvest_campaign::registry::AssetConfig;
use harvest_types::{Amount, FACTOR_SCALE};

use crate::{ClaimError, Result};

/// Convert a tracked-accrual delta into owed token units.
///
/// When `finish_accrued > 0` the delta is `finish_accrued - start_accrued`
/// (closed campaign, snapshot source); otherwise it is
/// `tracked_now - start_accrued` (live campaign). A tracked value below
/// the start baseline is a caller/tracker inconsistency and fails loudly.
///
/// # Errors
///
/// - [`ClaimError::AccrualUnderflow`] if the accrual source is below the
///   start baseline
/// - [`ClaimError::BadData`] on a zero rescale factor
/// - [`ClaimError::Overflow`] if an intermediate product exceeds `u128`
pub fn compute_accrued(
    tracked_now: Amount,
    start_accrued: Amount,
    finish_accrued: Amount,
    config: &AssetConfig,
) -> Result<Amount> {
    let source = if finish_accrued > 0 { finish_accrued } else { tracked_now };
    let raw_delta = source
        .checked_sub(start_accrued)
        .ok_or(ClaimError::AccrualUnderflow { tracked: source, start: start_accrued })?;

    let factor = config.rescale_factor as u128;
    if factor == 0 {
        // The registry refuses zero factors, but the config fields are
        // public; never divide by a hand-built zero.
        return Err(ClaimError::BadData("zero rescale factor".to_string()));
    }
    let rescaled = if config.should_upscale {
        raw_delta.checked_mul(factor).ok_or(ClaimError::Overflow)?
    } else {
        // Truncates toward zero.
        raw_delta / factor
    };

    let owed = rescaled
        .checked_mul(config.multiplier)
        .ok_or(ClaimError::Overflow)?
        / FACTOR_SCALE;
    Ok(owed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(multiplier: u128, factor: u64, upscale: bool) -> AssetConfig {
        AssetConfig { multiplier, rescale_factor: factor, should_upscale: upscale }
    }

    #[test]
    fn test_live_source_upscale() {
        // Tracker at 1e6, 18-decimal token, multiplier 1e18: one day of
        // accrual (86400 units) from a baseline of 100 pays 86400e18.
        let cfg = config(FACTOR_SCALE, 1_000_000_000_000, true);
        let owed = compute_accrued(86_500, 100, 0, &cfg).expect("accrued");
        assert_eq!(owed, 86_400_000_000_000_000_000_000);
    }

    #[test]
    fn test_snapshot_source_overrides_tracker() {
        // finish_accrued > 0 selects the snapshot delta; the live value
        // must not be consulted.
        let cfg = config(FACTOR_SCALE, 1, true);
        let owed = compute_accrued(999_999_999, 100, 1_000, &cfg).expect("accrued");
        assert_eq!(owed, 900);
    }

    #[test]
    fn test_identity_rescale_reduces_to_multiplier_division() {
        let cfg = config(FACTOR_SCALE / 2, 1, true);
        let owed = compute_accrued(1_000, 0, 0, &cfg).expect("accrued");
        assert_eq!(owed, 500);
    }

    #[test]
    fn test_downscale_truncates_toward_zero() {
        // 999 / 1000 truncates to 0 before the multiplier is applied.
        let cfg = config(FACTOR_SCALE, 1_000, false);
        assert_eq!(compute_accrued(999, 0, 0, &cfg).expect("accrued"), 0);
        assert_eq!(compute_accrued(1_999, 0, 0, &cfg).expect("accrued"), 1);
    }

    #[test]
    fn test_truncation_is_per_step() {
        // rescaled = 1500 / 1000 = 1 (truncated), then 1 * 1.5e18 / 1e18
        // = 1. A combined division would give 2; per-step must win.
        let cfg = config(FACTOR_SCALE + FACTOR_SCALE / 2, 1_000, false);
        assert_eq!(compute_accrued(1_500, 0, 0, &cfg).expect("accrued"), 1);
    }

    #[test]
    fn test_zero_rescale_factor_rejected() {
        for upscale in [true, false] {
            let cfg = config(FACTOR_SCALE, 0, upscale);
            assert!(matches!(
                compute_accrued(1_000, 0, 0, &cfg),
                Err(ClaimError::BadData(_))
            ));
        }
    }

    #[test]
    fn test_tracker_below_baseline_fails_loudly() {
        let cfg = config(FACTOR_SCALE, 1, true);
        let result = compute_accrued(99, 100, 0, &cfg);
        assert!(matches!(
            result,
            Err(ClaimError::AccrualUnderflow { tracked: 99, start: 100 })
        ));
    }

    #[test]
    fn test_finish_below_baseline_fails_loudly() {
        let cfg = config(FACTOR_SCALE, 1, true);
        let result = compute_accrued(0, 500, 100, &cfg);
        assert!(matches!(result, Err(ClaimError::AccrualUnderflow { .. })));
    }

    #[test]
    fn test_upscale_overflow_detected() {
        let cfg = config(FACTOR_SCALE, u64::MAX, true);
        let result = compute_accrued(u128::MAX / 2, 0, 0, &cfg);
        assert!(matches!(result, Err(ClaimError::Overflow)));
    }

    #[test]
    fn test_zero_delta_owes_nothing() {
        let cfg = config(FACTOR_SCALE, 1_000_000, true);
        assert_eq!(compute_accrued(100, 100, 0, &cfg).expect("accrued"), 0);
    }
}
