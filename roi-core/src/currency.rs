//! Rupiah display formatting.
//!
//! Amounts are shown as `Rp 1.234.567`: the currency symbol, a dot as the
//! thousands separator and no decimal places. A list of locale identifiers
//! is consulted first; when none of them is known the manual format is used,
//! and that manual format is the guaranteed baseline. English identifiers
//! keep the symbol but group with commas.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::debug;

/// Locale identifiers tried in order, matching common system spellings.
pub const DEFAULT_LOCALE_CANDIDATES: &[&str] = &[
    "id_ID.UTF-8",
    "Indonesian_Indonesia.1252",
    "id_ID",
    "ind",
    "Indonesian",
];

/// Symbol and grouping convention used to render an amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrencyLocale {
    pub symbol: &'static str,
    pub grouping_separator: char,
}

impl CurrencyLocale {
    /// Manual format used when no candidate locale is recognised.
    pub const BASELINE: Self = Self {
        symbol: "Rp",
        grouping_separator: '.',
    };

    pub const INDONESIAN: Self = Self {
        symbol: "Rp",
        grouping_separator: '.',
    };

    pub const ENGLISH: Self = Self {
        symbol: "Rp",
        grouping_separator: ',',
    };

    /// Looks up a locale identifier such as `id_ID.UTF-8`.
    pub fn lookup(identifier: &str) -> Option<Self> {
        let language = identifier
            .split(['.', '@'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match language.as_str() {
            "id_id" | "id" | "ind" | "indonesian" | "indonesian_indonesia" => Some(Self::INDONESIAN),
            "en" | "en_us" | "en_gb" | "en_au" | "en_sg" | "english" | "english_united states" => {
                Some(Self::ENGLISH)
            }
            _ => None,
        }
    }

    /// First recognised candidate, or [`CurrencyLocale::BASELINE`].
    pub fn resolve<S: AsRef<str>>(candidates: &[S]) -> Self {
        candidates
            .iter()
            .find_map(|candidate| Self::lookup(candidate.as_ref()))
            .unwrap_or_else(|| {
                debug!("no currency locale recognised, using manual format");
                Self::BASELINE
            })
    }

    /// Formats an amount rounded to whole units (half to even).
    pub fn format(
        &self,
        amount: Decimal,
    ) -> String {
        let rounded = amount
            .round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven)
            .normalize();
        let digits = rounded.abs().trunc().to_string();
        let grouped = group_digits(&digits, self.grouping_separator);

        if rounded.is_sign_negative() && !rounded.is_zero() {
            format!("{} -{}", self.symbol, grouped)
        } else {
            format!("{} {}", self.symbol, grouped)
        }
    }

    /// Non-finite values format as zero.
    pub fn format_f64(
        &self,
        amount: f64,
    ) -> String {
        if !amount.is_finite() {
            return self.zero();
        }
        Decimal::from_f64(amount).map_or_else(|| self.zero(), |value| self.format(value))
    }

    /// Text that is not a number formats as zero.
    pub fn format_str(
        &self,
        amount: &str,
    ) -> String {
        let trimmed = amount.trim();
        if let Ok(value) = trimmed.parse::<Decimal>() {
            return self.format(value);
        }
        match trimmed.parse::<f64>() {
            Ok(value) => self.format_f64(value),
            Err(_) => self.zero(),
        }
    }

    fn zero(&self) -> String {
        format!("{} 0", self.symbol)
    }
}

impl Default for CurrencyLocale {
    fn default() -> Self {
        Self::resolve(DEFAULT_LOCALE_CANDIDATES)
    }
}

fn group_digits(
    digits: &str,
    separator: char,
) -> String {
    let len = digits.len();
    let mut grouped = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push(separator);
        }
        grouped.push(ch);
    }
    grouped
}

/// Formats with the default locale resolution.
///
/// ```
/// use roi_core::format_currency;
/// use rust_decimal::Decimal;
///
/// assert_eq!(format_currency(Decimal::from(48_000_000)), "Rp 48.000.000");
/// ```
pub fn format_currency(amount: Decimal) -> String {
    CurrencyLocale::default().format(amount)
}

pub fn format_currency_f64(amount: f64) -> String {
    CurrencyLocale::default().format_f64(amount)
}

pub fn format_currency_str(amount: &str) -> String {
    CurrencyLocale::default().format_str(amount)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn zero_formats_without_grouping() {
        assert_eq!(format_currency(Decimal::ZERO), "Rp 0");
    }

    #[test]
    fn groups_thousands_with_dots() {
        assert_eq!(format_currency(dec!(999)), "Rp 999");
        assert_eq!(format_currency(dec!(1000)), "Rp 1.000");
        assert_eq!(format_currency(dec!(720000000)), "Rp 720.000.000");
        assert_eq!(format_currency(dec!(1234567.00)), "Rp 1.234.567");
    }

    #[test]
    fn drops_decimals_with_half_to_even_rounding() {
        assert_eq!(format_currency(dec!(1499.5)), "Rp 1.500");
        assert_eq!(format_currency(dec!(2.5)), "Rp 2");
        assert_eq!(format_currency(dec!(0.4)), "Rp 0");
    }

    #[test]
    fn negative_amounts_keep_the_sign() {
        assert_eq!(format_currency(dec!(-1500)), "Rp -1.500");
        assert_eq!(format_currency(dec!(-0.2)), "Rp 0");
    }

    #[test]
    fn non_numeric_text_formats_as_zero() {
        assert_eq!(format_currency_str("abc"), "Rp 0");
        assert_eq!(format_currency_str(""), "Rp 0");
        assert_eq!(format_currency_str("nan"), "Rp 0");
        assert_eq!(format_currency_str(" 2500000 "), "Rp 2.500.000");
    }

    #[test]
    fn non_finite_floats_format_as_zero() {
        assert_eq!(format_currency_f64(f64::NAN), "Rp 0");
        assert_eq!(format_currency_f64(f64::INFINITY), "Rp 0");
        assert_eq!(format_currency_f64(f64::NEG_INFINITY), "Rp 0");
        assert_eq!(format_currency_f64(12500.0), "Rp 12.500");
    }

    #[test]
    fn lookup_recognises_indonesian_identifiers() {
        assert!(CurrencyLocale::lookup("id_ID.UTF-8").is_some());
        assert!(CurrencyLocale::lookup("Indonesian_Indonesia.1252").is_some());
        assert!(CurrencyLocale::lookup("fr_FR.UTF-8").is_none());
    }

    #[test]
    fn english_identifiers_group_with_commas() {
        let locale = CurrencyLocale::resolve(&["xx_XX", "en_US.UTF-8", "id_ID"]);

        assert_eq!(locale, CurrencyLocale::ENGLISH);
        assert_eq!(locale.format(dec!(720000000)), "Rp 720,000,000");
        assert_eq!(locale.format(dec!(-1500)), "Rp -1,500");
    }

    #[test]
    fn unknown_candidates_fall_back_to_baseline() {
        let locale = CurrencyLocale::resolve(&["xx_XX", "C"]);

        assert_eq!(locale, CurrencyLocale::BASELINE);
        assert_eq!(locale.format(dec!(5000000)), "Rp 5.000.000");
    }
}
