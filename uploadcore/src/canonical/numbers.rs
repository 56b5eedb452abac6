//! Exact numeric coercions.
//!
//! JSON numbers are handled through their decimal text, never through `f64`,
//! so integer truncation and decimal preservation are exact.

use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use serde_json::Number;
use std::str::FromStr;

/// Widest integer, in decimal digits, that truncation will materialize.
pub const MAX_INTEGER_DIGITS: i64 = 1024;

/// True if the number's text has no fraction or exponent.
#[must_use]
pub fn is_integral(number: &Number) -> bool {
    !number.to_string().contains(['.', 'e', 'E'])
}

/// Parses decimal text exactly. Returns `None` for anything that isn't a number.
#[must_use]
pub fn parse_decimal(text: &str) -> Option<BigDecimal> {
    if text.is_empty() || text.contains('_') {
        return None;
    }
    BigDecimal::from_str(text).ok()
}

/// Truncates toward zero.
///
/// Returns `None` when the integer part would exceed [`MAX_INTEGER_DIGITS`].
#[must_use]
pub fn truncate(decimal: &BigDecimal) -> Option<BigInt> {
    let (_, scale) = decimal.as_bigint_and_exponent();
    let integer_digits = i64::try_from(decimal.digits()).ok()? - scale;
    if integer_digits > MAX_INTEGER_DIGITS {
        return None;
    }
    if integer_digits <= 0 {
        return Some(BigInt::default());
    }
    let (integer, _) = decimal.with_scale(0).into_bigint_and_exponent();
    Some(integer)
}

/// The number as an exact integer, truncating any fraction.
#[must_use]
pub fn number_to_integer(number: &Number) -> Option<BigInt> {
    parse_decimal(&number.to_string()).and_then(|decimal| truncate(&decimal))
}

/// Builds a JSON number with exactly the given text.
#[must_use]
pub fn number_from_text(text: &str) -> Option<Number> {
    serde_json::from_str::<Number>(text).ok()
}

/// Builds a JSON number from an integer.
#[must_use]
pub fn number_from_integer(integer: &BigInt) -> Option<Number> {
    number_from_text(&integer.to_string())
}

/// Builds a JSON number from numeric text, keeping the text when it is valid
/// JSON and falling back to the decimal's own rendering otherwise.
#[must_use]
pub fn number_from_decimal_text(text: &str, decimal: &BigDecimal) -> Option<Number> {
    number_from_text(text).or_else(|| number_from_text(&decimal.to_string()))
}
