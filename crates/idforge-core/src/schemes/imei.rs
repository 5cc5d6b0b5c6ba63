use std::sync::LazyLock;

use rand::{Rng, RngCore};
use regex::Regex;

use crate::checksum::{digits_to_string, luhn_check_digit, parse_digits};
use crate::errors::ValidationError;
use crate::schemes::{expect_len, random_digits};

static TAC_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"^\d{8}$").ok());

const FALLBACK_TAC_PREFIX: &str = "35";

/// True when `tac` is exactly eight ASCII digits.
pub fn is_valid_tac(tac: &str) -> bool {
    tac.is_ascii()
        && TAC_PATTERN
            .as_ref()
            .is_some_and(|pattern| pattern.is_match(tac))
}

/// Generate a 15-digit IMEI: TAC + 6-digit serial + Luhn digit.
///
/// A TAC that is not exactly eight digits is treated as absent and replaced by
/// `35` followed by a random number in `100000..=999999`.
pub fn generate_imei(tac: Option<&str>, rng: &mut dyn RngCore) -> String {
    let tac = match tac.filter(|tac| is_valid_tac(tac)) {
        Some(tac) => tac.to_string(),
        None => {
            let model: u32 = rng.random_range(100_000..=999_999);
            format!("{FALLBACK_TAC_PREFIX}{model}")
        }
    };

    let mut digits: Vec<u8> = tac.bytes().map(|b| b - b'0').collect();
    digits.extend(random_digits(rng, 6));
    digits.push(luhn_check_digit(&digits));
    digits_to_string(&digits)
}

pub fn validate_imei(value: &str) -> Result<(), ValidationError> {
    expect_len(value, 15)?;
    let digits = parse_digits(value)?;
    let expected = luhn_check_digit(&digits[..14]);
    if expected != digits[14] {
        return Err(ValidationError::CheckDigit {
            expected,
            found: digits[14],
        });
    }
    Ok(())
}
