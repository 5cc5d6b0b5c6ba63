//! Check-digit kernel.
//!
//! Two independent algorithms live here: the generic Luhn digit used by ICCID,
//! IMEI and the MTN subscriber scheme, and the national ID variant which sums
//! odd-position digits directly and doubles the even-position digits as one
//! concatenated number. They produce different digits for most inputs and must
//! stay separate.

use crate::errors::ChecksumError;

/// Luhn check digit for `digits`, weighting 2,1,2,1... from the rightmost digit.
pub fn luhn_check_digit(digits: &[u8]) -> u8 {
    let sum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(idx, digit)| {
            let digit = u32::from(*digit);
            if idx % 2 == 0 {
                let doubled = digit * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                digit
            }
        })
        .sum();
    ((10 - sum % 10) % 10) as u8
}

/// National ID check digit over the 12-digit base.
pub fn national_id_check_digit(digits: &[u8]) -> u8 {
    let mut odd_sum = 0_u32;
    let mut even_digits = Vec::with_capacity(digits.len() / 2);
    for (idx, digit) in digits.iter().enumerate() {
        if idx % 2 == 0 {
            odd_sum += u32::from(*digit);
        } else {
            even_digits.push(*digit);
        }
    }
    let doubled_sum: u32 = double_decimal(&even_digits)
        .iter()
        .map(|digit| u32::from(*digit))
        .sum();
    let total = odd_sum + doubled_sum;
    ((10 - total % 10) % 10) as u8
}

/// Parse a string of ASCII decimal digits into digit values.
pub fn parse_digits(value: &str) -> Result<Vec<u8>, ChecksumError> {
    if value.is_empty() {
        return Err(ChecksumError::Empty);
    }
    value
        .chars()
        .enumerate()
        .map(|(position, ch)| match ch.to_digit(10) {
            Some(digit) if ch.is_ascii_digit() => Ok(digit as u8),
            _ => Err(ChecksumError::NonDigit {
                position,
                found: ch,
            }),
        })
        .collect()
}

/// Luhn check digit for a digit string.
pub fn try_luhn_check_digit(value: &str) -> Result<u8, ChecksumError> {
    Ok(luhn_check_digit(&parse_digits(value)?))
}

/// National ID check digit for a 12-digit string.
pub fn try_national_id_check_digit(value: &str) -> Result<u8, ChecksumError> {
    let digits = parse_digits(value)?;
    if digits.len() != 12 {
        return Err(ChecksumError::Length {
            expected: 12,
            actual: digits.len(),
        });
    }
    Ok(national_id_check_digit(&digits))
}

/// Standard Luhn validation: the last digit is the check digit of the rest.
pub fn luhn_is_valid(value: &str) -> bool {
    match parse_digits(value) {
        Ok(digits) if digits.len() >= 2 => {
            let (body, check) = digits.split_at(digits.len() - 1);
            luhn_check_digit(body) == check[0]
        }
        _ => false,
    }
}

/// True when `value` is 13 digits ending in its national ID check digit.
pub fn national_id_is_valid(value: &str) -> bool {
    match parse_digits(value) {
        Ok(digits) if digits.len() == 13 => national_id_check_digit(&digits[..12]) == digits[12],
        _ => false,
    }
}

pub(crate) fn digits_to_string(digits: &[u8]) -> String {
    digits.iter().map(|d| char::from(b'0' + *d)).collect()
}

// Doubles a big-endian decimal number held as digits, dropping leading zeros.
fn double_decimal(digits: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(digits.len() + 1);
    let mut carry = 0_u8;
    for digit in digits.iter().rev() {
        let value = digit * 2 + carry;
        out.push(value % 10);
        carry = value / 10;
    }
    if carry > 0 {
        out.push(carry);
    }
    while out.len() > 1 && out.last() == Some(&0) {
        out.pop();
    }
    out.reverse();
    out
}
