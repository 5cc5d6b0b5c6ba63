use rand::RngCore;

use crate::checksum::{digits_to_string, parse_digits};
use crate::errors::ValidationError;
use crate::schemes::{expect_len, random_digits};

const PASSPORT_PREFIX: char = 'P';

/// `P` followed by 8 random digits. The scheme carries no check digit.
pub fn generate_passport(rng: &mut dyn RngCore) -> String {
    let mut value = String::with_capacity(9);
    value.push(PASSPORT_PREFIX);
    value.push_str(&digits_to_string(&random_digits(rng, 8)));
    value
}

pub fn validate_passport(value: &str) -> Result<(), ValidationError> {
    expect_len(value, 9)?;
    let rest = value
        .strip_prefix(PASSPORT_PREFIX)
        .ok_or_else(|| ValidationError::Prefix(value.chars().take(1).collect()))?;
    parse_digits(rest)?;
    Ok(())
}
