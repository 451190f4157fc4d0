//! Money helpers for the presentation boundary
//!
//! Inside the crate every amount is an `i64` count of minor units (cents).
//! These helpers convert to and from the two-decimal text shown to operators.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AmountParseError {
    #[error("Amount is empty")]
    Empty,

    #[error("Amount '{0}' is not a decimal number")]
    Malformed(String),

    #[error("Amount '{0}' has more than two decimals")]
    TooPrecise(String),

    #[error("Amount '{0}' is out of range")]
    OutOfRange(String),
}

/// Render cents as a two-decimal string
///
/// # Example
/// ```
/// use taxi_stand_core_rs::models::money::format_amount;
///
/// assert_eq!(format_amount(250_000), "2500.00");
/// assert_eq!(format_amount(-5), "-0.05");
/// ```
pub fn format_amount(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

/// Parse operator input such as `"2500"`, `"12.5"` or `"12.50"` into cents
///
/// Only non-negative values are accepted; positivity is checked by the engine.
///
/// # Example
/// ```
/// use taxi_stand_core_rs::models::money::parse_amount;
///
/// assert_eq!(parse_amount("12.5"), Ok(1250));
/// assert_eq!(parse_amount(" 3000 "), Ok(300_000));
/// assert!(parse_amount("1.234").is_err());
/// ```
pub fn parse_amount(input: &str) -> Result<i64, AmountParseError> {
    let text = input.trim();
    if text.is_empty() {
        return Err(AmountParseError::Empty);
    }

    let (whole, fraction) = match text.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (text, ""),
    };

    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !all_digits(whole) || !all_digits(fraction) {
        return Err(AmountParseError::Malformed(text.to_string()));
    }
    if fraction.len() > 2 {
        return Err(AmountParseError::TooPrecise(text.to_string()));
    }

    let out_of_range = || AmountParseError::OutOfRange(text.to_string());
    let units: i64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| out_of_range())?
    };
    let cents: i64 = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<i64>().map_err(|_| out_of_range())? * 10,
        _ => fraction.parse().map_err(|_| out_of_range())?,
    };

    units
        .checked_mul(100)
        .and_then(|v| v.checked_add(cents))
        .ok_or_else(out_of_range)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_whole_and_fraction() {
        assert_eq!(format_amount(0), "0.00");
        assert_eq!(format_amount(7), "0.07");
        assert_eq!(format_amount(123_456), "1234.56");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_amount(""), Err(AmountParseError::Empty));
        assert!(matches!(parse_amount("12a"), Err(AmountParseError::Malformed(_))));
        assert!(matches!(parse_amount("-3"), Err(AmountParseError::Malformed(_))));
        assert!(matches!(parse_amount("."), Err(AmountParseError::Malformed(_))));
        assert!(matches!(
            parse_amount("99999999999999999999"),
            Err(AmountParseError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_parse_leading_dot() {
        assert_eq!(parse_amount(".75"), Ok(75));
    }
}
