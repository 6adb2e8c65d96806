//! Fixed-precision money helpers.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Ledger amounts are `rust_decimal::Decimal` stored at two decimal places.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

/// Number of decimal places kept for ledger amounts.
pub const MONEY_SCALE: u32 = 2;

/// Largest amount a `NUMERIC(19, 2)` column holds: `99999999999999999.99`.
pub const MAX_MONEY: Decimal = Decimal::from_parts(2_313_682_943, 2_328_306_436, 0, false, 2);

/// Errors raised while reading a monetary amount from user input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyError {
    /// The input is not a decimal number.
    #[error("invalid amount: {0}")]
    Invalid(String),

    /// The amount is below zero.
    #[error("amount cannot be negative: {0}")]
    Negative(Decimal),

    /// The amount does not fit the ledger's storage precision.
    #[error("amount exceeds 99999999999999999.99: {0}")]
    TooLarge(Decimal),
}

/// Rounds an amount to the ledger scale.
///
/// Midpoints round away from zero, so `100.005` becomes `100.01`.
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Parses a non-negative amount and rounds it to the ledger scale.
///
/// # Errors
///
/// Returns `MoneyError::Invalid` for non-numeric input,
/// `MoneyError::Negative` for amounts below zero and `MoneyError::TooLarge`
/// for amounts above [`MAX_MONEY`] once rounded.
pub fn parse_money(input: &str) -> Result<Decimal, MoneyError> {
    let amount =
        Decimal::from_str(input.trim()).map_err(|_| MoneyError::Invalid(input.to_string()))?;
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(MoneyError::Negative(amount));
    }
    let rounded = round_money(amount.abs());
    if rounded > MAX_MONEY {
        return Err(MoneyError::TooLarge(amount));
    }
    Ok(rounded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(dec!(100.005), dec!(100.01))]
    #[case(dec!(100.004), dec!(100.00))]
    #[case(dec!(-100.005), dec!(-100.01))]
    #[case(dec!(150), dec!(150))]
    #[case(dec!(0.125), dec!(0.13))]
    fn test_round_money(#[case] input: Decimal, #[case] expected: Decimal) {
        assert_eq!(round_money(input), expected);
    }

    #[test]
    fn test_round_money_sets_scale() {
        assert_eq!(round_money(dec!(1.23456)).scale(), MONEY_SCALE);
    }

    #[test]
    fn test_parse_money() {
        assert_eq!(parse_money("150.00").unwrap(), dec!(150.00));
        assert_eq!(parse_money(" 12.345 ").unwrap(), dec!(12.35));
        assert_eq!(parse_money("0").unwrap(), Decimal::ZERO);
        assert_eq!(parse_money("-0").unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_parse_money_rejects_bad_input() {
        assert!(matches!(parse_money("abc"), Err(MoneyError::Invalid(_))));
        assert!(matches!(parse_money(""), Err(MoneyError::Invalid(_))));
        assert!(matches!(parse_money("-1.00"), Err(MoneyError::Negative(_))));
    }

    #[test]
    fn test_max_money_matches_column() {
        assert_eq!(MAX_MONEY, dec!(99999999999999999.99));
    }

    #[rstest]
    #[case("99999999999999999.99", true)]
    #[case("99999999999999999.994", true)]
    #[case("99999999999999999.995", false)]
    #[case("100000000000000000000", false)]
    fn test_parse_money_upper_bound(#[case] input: &str, #[case] accepted: bool) {
        let parsed = parse_money(input);
        if accepted {
            assert_eq!(parsed.unwrap(), MAX_MONEY);
        } else {
            assert!(matches!(parsed, Err(MoneyError::TooLarge(_))));
        }
    }
}
