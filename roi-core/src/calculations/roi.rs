//! Return on investment over a fixed horizon.
//!
//! ```
//! use rust_decimal_macros::dec;
//! use roi_core::Metric;
//! use roi_core::calculations::calculate_roi;
//!
//! // 100 invested, 60 gained per year: -40% after one year, 200% after five.
//! assert_eq!(calculate_roi(dec!(100), dec!(60), 1), Metric::Finite(dec!(-40)));
//! assert_eq!(calculate_roi(dec!(100), dec!(60), 5), Metric::Finite(dec!(200)));
//! assert_eq!(calculate_roi(dec!(0), dec!(60), 5), Metric::Undefined);
//! ```

use rust_decimal::Decimal;

use crate::calculations::common::ONE_HUNDRED;
use crate::models::Metric;

/// Percentage return of `investment` after `years` of `annual_gain`:
/// `((annual_gain * years - investment) / |investment|) * 100`.
///
/// Returns [`Metric::Undefined`] when `investment` is zero or negative, and
/// when any step of the arithmetic cannot be represented.
pub fn calculate_roi(
    investment: Decimal,
    annual_gain: Decimal,
    years: u32,
) -> Metric {
    if investment <= Decimal::ZERO {
        return Metric::Undefined;
    }

    let roi = annual_gain
        .checked_mul(Decimal::from(years))
        .and_then(|total_gain| total_gain.checked_sub(investment))
        .and_then(|net_gain| net_gain.checked_div(investment.abs()))
        .and_then(|ratio| ratio.checked_mul(ONE_HUNDRED));

    Metric::from_option(roi)
}
