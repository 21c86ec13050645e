use rust_decimal::Decimal;
use thiserror::Error;

/// Error returned when a string cannot be parsed as a [`Decimal`].
#[derive(Debug, Error)]
#[error("invalid decimal '{input}': {source}")]
pub struct ParseDecimalError {
    input: String,
    #[source]
    source: rust_decimal::Error,
}

/// Normalizes input for decimal parsing: trims whitespace and removes
/// grouping characters (`,` and `_`).
fn normalize_decimal_input(s: &str) -> String {
    s.trim().replace([',', '_'], "")
}

/// Parses a string into a [`Decimal`].
///
/// Handles comma as thousands separator (e.g. `"8,000,000"`).
/// Empty or whitespace-only input is treated as 0.
pub fn parse_decimal(s: &str) -> Result<Decimal, ParseDecimalError> {
    let normalized = normalize_decimal_input(s);
    if normalized.is_empty() {
        return Ok(Decimal::ZERO);
    }
    normalized.parse().map_err(|e| {
        tracing::debug!(input = %s, "invalid decimal: {}", e);
        ParseDecimalError {
            input: s.to_string(),
            source: e,
        }
    })
}

/// Parses a percentage (`"15"`, `"15%"`, `"12.5 %"`) into a fraction
/// (`0.15`, `0.15`, `0.125`).
pub fn parse_percent(s: &str) -> Result<Decimal, ParseDecimalError> {
    let trimmed = s.trim();
    let number = trimmed.strip_suffix('%').unwrap_or(trimmed);
    Ok(parse_decimal(number)? / Decimal::ONE_HUNDRED)
}

/// Formats optional text for display, using "-" when `None` or empty.
pub fn opt_text_display(s: Option<&str>) -> String {
    match s {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => "-".to_string(),
    }
}
