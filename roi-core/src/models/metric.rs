use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Serialize, Serializer};

use crate::calculations::common::round_one_decimal;

/// A derived figure that may have no meaningful value.
///
/// ROI is `Undefined` when nothing was invested; payback is `Undefined`
/// when the project never saves money. `Undefined` is displayed as `N/A`
/// and persisted as `NULL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Finite(Decimal),
    Undefined,
}

impl Metric {
    pub fn from_option(value: Option<Decimal>) -> Self {
        value.map_or(Self::Undefined, Self::Finite)
    }

    pub fn as_option(&self) -> Option<Decimal> {
        match self {
            Self::Finite(value) => Some(*value),
            Self::Undefined => None,
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    /// `"12.3%"`, or `"N/A"`.
    pub fn display_percent(&self) -> String {
        match self {
            Self::Finite(value) => format!("{:.1}%", round_one_decimal(*value)),
            Self::Undefined => "N/A".to_string(),
        }
    }

    /// `"12.3"`, or `"N/A"`.
    pub fn display_number(&self) -> String {
        match self {
            Self::Finite(value) => format!("{:.1}", round_one_decimal(*value)),
            Self::Undefined => "N/A".to_string(),
        }
    }
}

impl From<Option<Decimal>> for Metric {
    fn from(value: Option<Decimal>) -> Self {
        Self::from_option(value)
    }
}

impl Serialize for Metric {
    fn serialize<S>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.as_option().and_then(|value| value.to_f64()) {
            Some(value) => serializer.serialize_f64(value),
            None => serializer.serialize_none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn display_percent_rounds_to_one_decimal() {
        assert_eq!(Metric::Finite(dec!(33.333)).display_percent(), "33.3%");
        assert_eq!(Metric::Finite(dec!(-12.35)).display_percent(), "-12.4%");
        assert_eq!(Metric::Finite(dec!(100)).display_percent(), "100.0%");
    }

    #[test]
    fn undefined_displays_as_not_available() {
        assert_eq!(Metric::Undefined.display_percent(), "N/A");
        assert_eq!(Metric::Undefined.display_number(), "N/A");
    }

    #[test]
    fn display_number_has_no_suffix() {
        assert_eq!(Metric::Finite(dec!(7.04)).display_number(), "7.0");
    }

    #[test]
    fn option_round_trip() {
        assert_eq!(Metric::from(Some(dec!(1.5))).as_option(), Some(dec!(1.5)));
        assert_eq!(Metric::from(None).as_option(), None);
        assert!(Metric::from(None).is_undefined());
    }

    #[test]
    fn serializes_as_number_or_null() {
        assert_eq!(
            serde_json::to_string(&Metric::Finite(dec!(12.5))).unwrap(),
            "12.5"
        );
        assert_eq!(serde_json::to_string(&Metric::Undefined).unwrap(), "null");
    }
}
