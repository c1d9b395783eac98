//! Decimal-place normalization of cost values.
//!
//! Summed costs differ in how many decimals they carry. The normalizer pads
//! every cost with trailing zeros up to the precision of the most precise unit
//! price in the input, so all cost columns line up. Padding never rounds.

use rust_decimal::Decimal;

use crate::models::UsageRow;

/// Number of decimals of a value written without trailing zeros.
///
/// `0.0080` and `0.008` both have 3; `2.0` and `2` have 0.
pub fn decimal_places(value: Decimal) -> u32 {
    value.normalize().scale()
}

/// Highest number of decimals of any unit price, or 0 for no rows.
pub fn max_decimal_places(rows: &[UsageRow]) -> u32 {
    rows.iter()
        .map(|row| decimal_places(row.unit_price_dollar))
        .max()
        .unwrap_or(0)
}

/// Renders costs with a fixed number of decimals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrecisionNormalizer {
    places: u32,
}

impl PrecisionNormalizer {
    /// Create a normalizer for a fixed number of decimals.
    pub fn new(places: u32) -> Self {
        Self { places }
    }

    /// Create a normalizer matching the most precise unit price of `rows`.
    pub fn from_rows(rows: &[UsageRow]) -> Self {
        Self::new(max_decimal_places(rows))
    }

    /// Target number of decimals.
    pub fn places(&self) -> u32 {
        self.places
    }

    /// Render a cost padded with trailing zeros to the target precision.
    ///
    /// A value that already carries more decimals than the target keeps them.
    pub fn format(&self, cost: Decimal) -> String {
        let mut padded = cost.normalize();
        let places = self.places.max(padded.scale());
        padded.rescale(places);
        padded.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::test_support::row;
    use std::str::FromStr;

    fn dec(value: &str) -> Decimal {
        Decimal::from_str(value).unwrap()
    }

    #[test]
    fn test_decimal_places() {
        assert_eq!(decimal_places(dec("0.008")), 3);
        assert_eq!(decimal_places(dec("0.0080")), 3);
        assert_eq!(decimal_places(dec("0.16")), 2);
        assert_eq!(decimal_places(dec("2.0")), 0);
        assert_eq!(decimal_places(dec("2")), 0);
    }

    #[test]
    fn test_max_decimal_places() {
        let rows = vec![
            row("2024-01-01", "alice", "r1", "ci", 1, "0.16"),
            row("2024-01-01", "alice", "r1", "ci", 1, "0.008"),
            row("2024-01-01", "alice", "r1", "ci", 1, "1"),
        ];
        assert_eq!(max_decimal_places(&rows), 3);
        assert_eq!(max_decimal_places(&[]), 0);
    }

    #[test]
    fn test_format_pads_with_zeros() {
        let normalizer = PrecisionNormalizer::new(3);
        assert_eq!(normalizer.format(dec("0.12")), "0.120");
        assert_eq!(normalizer.format(dec("0.080")), "0.080");
        assert_eq!(normalizer.format(dec("1.6")), "1.600");
        assert_eq!(normalizer.format(dec("4")), "4.000");
        assert_eq!(normalizer.format(Decimal::ZERO), "0.000");
    }

    #[test]
    fn test_format_without_decimals() {
        let normalizer = PrecisionNormalizer::new(0);
        assert_eq!(normalizer.format(dec("12")), "12");
        assert_eq!(normalizer.format(dec("12.00")), "12");
    }

    #[test]
    fn test_format_never_rounds() {
        let normalizer = PrecisionNormalizer::new(2);
        assert_eq!(normalizer.format(dec("0.125")), "0.125");
    }

    #[test]
    fn test_padding_preserves_value() {
        let normalizer = PrecisionNormalizer::new(5);
        for value in ["0.12", "7", "0.00001", "123.4"] {
            let formatted = normalizer.format(dec(value));
            let stripped = formatted.trim_end_matches('0').trim_end_matches('.');
            assert_eq!(dec(stripped), dec(value));
            assert_eq!(formatted.split('.').nth(1).map(str::len), Some(5));
        }
    }

    #[test]
    fn test_from_rows() {
        let rows = vec![row("2024-01-01", "alice", "r1", "ci", 10, "0.008")];
        assert_eq!(PrecisionNormalizer::from_rows(&rows).places(), 3);
    }
}
