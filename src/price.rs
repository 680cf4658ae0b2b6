// 💰 Price resolution + numeric coercion
//
// Resolution order for a date:
// 1. Explicit per-date override
// 2. LastEnteredPrice (rolling default, seeded from the commodity default once)

use crate::error::InputError;
use crate::model::DateKey;
use std::collections::BTreeMap;

/// Explicit user-set prices, by day
pub type PriceOverrides = BTreeMap<DateKey, f64>;

/// Effective unit price for `date`
pub fn resolve(date: &DateKey, overrides: &PriceOverrides, last_entered_price: f64) -> f64 {
    overrides.get(date).copied().unwrap_or(last_entered_price)
}

/// Parse user-typed decimal text.
///
/// Lenient the way form inputs are: surrounding whitespace is ignored and
/// the longest leading decimal prefix wins (`"2.5L"` → 2.5, `"1."` → 1).
/// Text with no numeric prefix, negative numbers and non-finite results
/// are rejected.
pub fn parse_decimal(text: &str) -> Result<f64, InputError> {
    let invalid = || InputError::InvalidNumber {
        input: text.to_string(),
    };

    let trimmed = text.trim();
    let prefix = &trimmed[..decimal_prefix_len(trimmed)];
    if prefix.is_empty() {
        return Err(invalid());
    }

    let value: f64 = prefix.parse().map_err(|_| invalid())?;
    if !value.is_finite() || value < 0.0 {
        return Err(invalid());
    }

    // "-0" parses to negative zero
    Ok(value + 0.0)
}

/// Byte length of the longest `[+-]?(digits[.digits]|.digits)([eE][+-]?digits)?` prefix
fn decimal_prefix_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    let mut i = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        i += 1;
    }

    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let int_digits = i - int_start;

    let mut frac_digits = 0;
    if i < bytes.len() && bytes[i] == b'.' {
        let mut j = i + 1;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        frac_digits = j - i - 1;
        if int_digits > 0 || frac_digits > 0 {
            i = j;
        }
    }

    if int_digits == 0 && frac_digits == 0 {
        return 0;
    }

    // Exponent only counts when it carries digits
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        let exp_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            i = j;
        }
    }

    i
}

/// Render a price the way the cost input shows it (`140`, `42.5`)
pub fn format_price(value: f64) -> String {
    format!("{}", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> DateKey {
        s.parse().unwrap()
    }

    #[test]
    fn test_override_wins() {
        let mut overrides = PriceOverrides::new();
        overrides.insert(day("2024-07-01"), 150.0);

        assert_eq!(resolve(&day("2024-07-01"), &overrides, 140.0), 150.0);
        assert_eq!(resolve(&day("2024-07-02"), &overrides, 140.0), 140.0);
    }

    #[test]
    fn test_resolution_matches_definition_for_every_day() {
        let mut overrides = PriceOverrides::new();
        for d in [3, 9, 17] {
            overrides.insert(DateKey::from_ymd(2024, 7, d).unwrap(), d as f64 * 10.0);
        }
        let last = 55.0;

        for d in 1..=31 {
            let date = DateKey::from_ymd(2024, 7, d).unwrap();
            let expected = overrides.get(&date).copied().unwrap_or(last);
            assert_eq!(resolve(&date, &overrides, last), expected, "day {}", d);
        }
    }

    #[test]
    fn test_zero_override_still_wins() {
        let mut overrides = PriceOverrides::new();
        overrides.insert(day("2024-07-01"), 0.0);
        assert_eq!(resolve(&day("2024-07-01"), &overrides, 140.0), 0.0);
    }

    #[test]
    fn test_parse_decimal_accepts() {
        assert_eq!(parse_decimal("2").unwrap(), 2.0);
        assert_eq!(parse_decimal(" 1.5 ").unwrap(), 1.5);
        assert_eq!(parse_decimal(".5").unwrap(), 0.5);
        assert_eq!(parse_decimal("1.").unwrap(), 1.0);
        assert_eq!(parse_decimal("2.5L").unwrap(), 2.5);
        assert_eq!(parse_decimal("1e2").unwrap(), 100.0);
        assert_eq!(parse_decimal("3e").unwrap(), 3.0);
        assert_eq!(parse_decimal("0").unwrap(), 0.0);
        assert!(parse_decimal("-0").unwrap().is_sign_positive());
    }

    #[test]
    fn test_parse_decimal_rejects() {
        for bad in ["", "   ", ".", "-", "abc", "L2", "-1", "-0.5", "1e999"] {
            assert!(
                matches!(parse_decimal(bad), Err(InputError::InvalidNumber { .. })),
                "{:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(140.0), "140");
        assert_eq!(format_price(42.5), "42.5");
    }
}
