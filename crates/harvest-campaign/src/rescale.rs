//! Accrual-scale to token-scale conversion.
//!
//! The external lending market tracks accrual in its own power-of-ten
//! scale (e.g. 1e6 units per whole accrual unit) while each reward token
//! has its own decimal scale (e.g. 1e18 for an 18-decimal token). The
//! resolver derives the integer ratio between the two and the direction
//! in which raw deltas must be converted.
//!
//! The division is truncating integer division: scales that are not exact
//! multiples of one another still resolve, at the cost of a documented
//! rounding error in the downscale direction.

use serde::{Deserialize, Serialize};

use crate::{CampaignError, Result};

/// Largest token decimal count whose power of ten fits `u64`.
pub const MAX_TOKEN_DECIMALS: u32 = 19;

/// How a raw tracked-accrual delta converts into token units.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RescaleConfig {
    /// Positive integer ratio between the two scales.
    pub factor: u64,
    /// `true`: multiply deltas by `factor`; `false`: divide (truncating).
    pub should_upscale: bool,
}

/// Resolve the rescale config for a market/token pair.
///
/// # Arguments
///
/// * `accrual_scale` - The tracker's units per whole accrual unit (power of ten)
/// * `token_decimals` - The reward token's decimal count
///
/// # Errors
///
/// - [`CampaignError::InvalidScale`] if `accrual_scale` is zero or
///   `token_decimals` exceeds [`MAX_TOKEN_DECIMALS`]
pub fn resolve(accrual_scale: u64, token_decimals: u32) -> Result<RescaleConfig> {
    if accrual_scale == 0 {
        return Err(CampaignError::InvalidScale(
            "accrual scale must be non-zero".to_string(),
        ));
    }
    let token_scale = if token_decimals <= MAX_TOKEN_DECIMALS {
        10u64.pow(token_decimals)
    } else {
        return Err(CampaignError::InvalidScale(format!(
            "token decimals {token_decimals} exceed the 64-bit range"
        )));
    };

    if accrual_scale > token_scale {
        Ok(RescaleConfig {
            factor: accrual_scale / token_scale,
            should_upscale: false,
        })
    } else {
        Ok(RescaleConfig {
            factor: token_scale / accrual_scale,
            should_upscale: true,
        })
    }
}
