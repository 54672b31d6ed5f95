//! Format and range checks on user input, run before any database work.

use std::sync::OnceLock;

use regex::Regex;
use rust_decimal::Decimal;

use crate::messages;

/// Check that a monetary amount is strictly positive.
///
/// Pure function, no side effects. Returns the user-facing error message
/// on failure so callers can render it directly.
pub fn validate_amount(amount: Decimal) -> Result<(), &'static str> {
    if amount > Decimal::ZERO {
        Ok(())
    } else {
        Err(messages::AMOUNT_NOT_POSITIVE)
    }
}

/// Check that `iban` matches the expected account number format: two
/// letters, four groups of four digits, a two-digit group and a trailing
/// uppercase letter. Single spaces between the groups are tolerated.
pub fn validate_iban(iban: &str) -> Result<(), &'static str> {
    if iban_regex().is_match(iban) {
        Ok(())
    } else {
        Err(messages::IBAN_INVALID)
    }
}

/// Strip the spaces an IBAN is usually written with, e.g.
/// "CH 9300 7620 1162 3852 95A" becomes "CH930076201162385295A".
///
/// Accounts store the IBAN without spaces, so lookups normalize first.
pub fn normalize_iban(iban: &str) -> String {
    iban.replace(' ', "")
}

fn iban_regex() -> &'static Regex {
    static IBAN_REGEX: OnceLock<Regex> = OnceLock::new();

    IBAN_REGEX.get_or_init(|| Regex::new(r"^[CH]{2}\s?(\d{4}\s?){4}\d{2}\s?[A-Z]").unwrap())
}
