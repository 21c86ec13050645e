//! Common utility functions for ROI calculations.
//!
//! Shared conversions used by the report builder, the persisted row and the
//! display layer.

use rust_decimal::{Decimal, RoundingStrategy};

/// Months in a year, used to annualize monthly savings.
pub const MONTHS_PER_YEAR: Decimal = Decimal::from_parts(12, 0, 0, false, 0);

/// `100`, the percentage scale.
pub const ONE_HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Rounds a value to one decimal place using half-up rounding.
///
/// Values exactly halfway are rounded away from zero, which is how headline
/// percentages and payback months are displayed.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use roi_core::calculations::common::round_one_decimal;
///
/// assert_eq!(round_one_decimal(dec!(12.34)), dec!(12.3));
/// assert_eq!(round_one_decimal(dec!(12.35)), dec!(12.4));
/// assert_eq!(round_one_decimal(dec!(-12.35)), dec!(-12.4)); // Away from zero
/// ```
pub fn round_one_decimal(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
}

/// Converts a percentage (`15` for 15%) into a fraction (`0.15`).
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use roi_core::calculations::common::percent_to_fraction;
///
/// assert_eq!(percent_to_fraction(dec!(15)), dec!(0.15));
/// assert_eq!(percent_to_fraction(dec!(37.5)), dec!(0.375));
/// ```
pub fn percent_to_fraction(percent: Decimal) -> Decimal {
    percent / ONE_HUNDRED
}

/// Converts a fraction (`0.15`) into a percentage (`15`).
pub fn fraction_to_percent(fraction: Decimal) -> Decimal {
    (fraction * ONE_HUNDRED).normalize()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    // =========================================================================
    // round_one_decimal tests
    // =========================================================================

    #[test]
    fn round_one_decimal_rounds_down_below_midpoint() {
        let result = round_one_decimal(dec!(123.44));

        assert_eq!(result, dec!(123.4));
    }

    #[test]
    fn round_one_decimal_rounds_up_at_midpoint() {
        let result = round_one_decimal(dec!(123.45));

        assert_eq!(result, dec!(123.5));
    }

    #[test]
    fn round_one_decimal_handles_negative_values() {
        let result = round_one_decimal(dec!(-123.45));

        assert_eq!(result, dec!(-123.5)); // Away from zero
    }

    #[test]
    fn round_one_decimal_handles_repeating_fractions() {
        let result = round_one_decimal(dec!(100) / dec!(3));

        assert_eq!(result, dec!(33.3));
    }

    #[test]
    fn round_one_decimal_handles_zero() {
        let result = round_one_decimal(dec!(0.00));

        assert_eq!(result, dec!(0.0));
    }

    // =========================================================================
    // percentage conversion tests
    // =========================================================================

    #[test]
    fn months_per_year_is_twelve() {
        assert_eq!(MONTHS_PER_YEAR, dec!(12));
    }

    #[test]
    fn percent_to_fraction_divides_by_hundred() {
        assert_eq!(percent_to_fraction(dec!(30)), dec!(0.30));
        assert_eq!(percent_to_fraction(dec!(0)), dec!(0));
    }

    #[test]
    fn fraction_to_percent_multiplies_by_hundred() {
        assert_eq!(fraction_to_percent(dec!(0.15)), dec!(15));
        assert_eq!(fraction_to_percent(dec!(0.375)), dec!(37.5));
    }
}
