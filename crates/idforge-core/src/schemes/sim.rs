use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::checksum::{digits_to_string, luhn_check_digit, parse_digits};
use crate::errors::ValidationError;
use crate::schemes::{coin_flip, expect_len, random_digits};

const ICCID_LEN: usize = 20;

// Literals prepended to MTN candidate digits before the Luhn digit is taken.
// They never appear in the output.
const MTN_SHORT_REFERENCE: &str = "892700001";
const MTN_LONG_REFERENCE: &str = "89270000";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Carrier {
    Vodacom,
    #[serde(rename = "MTN")]
    Mtn,
    Telkom,
    CellC,
    #[serde(rename = "8ta")]
    EightTa,
}

/// How a carrier's SIM numbers are built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimScheme {
    /// ICCID: fixed prefix, random fill, Luhn digit over everything before it.
    Iccid { prefix: &'static str, length: usize },
    /// MTN subscriber number, 10 or 11 digits, with its check digit taken over
    /// a reference string that is not part of the output.
    MtnMsisdn,
}

impl Carrier {
    pub const ALL: [Carrier; 5] = [
        Carrier::Vodacom,
        Carrier::Mtn,
        Carrier::Telkom,
        Carrier::CellC,
        Carrier::EightTa,
    ];

    pub fn scheme(self) -> SimScheme {
        let iccid = |prefix| SimScheme::Iccid {
            prefix,
            length: ICCID_LEN,
        };
        match self {
            Carrier::Vodacom => iccid("892701"),
            Carrier::Mtn => SimScheme::MtnMsisdn,
            Carrier::Telkom => iccid("892703"),
            Carrier::CellC => iccid("892707"),
            Carrier::EightTa => iccid("892702"),
        }
    }

    /// Identifier used in params and persisted settings.
    pub fn as_str(self) -> &'static str {
        match self {
            Carrier::Vodacom => "Vodacom",
            Carrier::Mtn => "MTN",
            Carrier::Telkom => "Telkom",
            Carrier::CellC => "CellC",
            Carrier::EightTa => "8ta",
        }
    }

    /// Human-facing name.
    pub fn label(self) -> &'static str {
        match self {
            Carrier::CellC => "Cell C",
            other => other.as_str(),
        }
    }
}

impl std::fmt::Display for Carrier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Carrier {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized: String = value
            .chars()
            .filter(|ch| !ch.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "vodacom" => Ok(Carrier::Vodacom),
            "mtn" => Ok(Carrier::Mtn),
            "telkom" => Ok(Carrier::Telkom),
            "cellc" => Ok(Carrier::CellC),
            "8ta" => Ok(Carrier::EightTa),
            _ => Err(format!("unknown carrier: {value}")),
        }
    }
}

/// Generate a SIM number for `carrier`.
pub fn generate_sim(carrier: Carrier, rng: &mut dyn RngCore) -> String {
    match carrier.scheme() {
        SimScheme::Iccid { prefix, length } => {
            let mut digits: Vec<u8> = prefix.bytes().map(|b| b - b'0').collect();
            let fill = length - digits.len() - 1;
            digits.extend(random_digits(rng, fill));
            digits.push(luhn_check_digit(&digits));
            digits_to_string(&digits)
        }
        SimScheme::MtnMsisdn => {
            let candidates = if coin_flip(rng) {
                let mut candidates = vec![0];
                candidates.extend(random_digits(rng, 8));
                candidates
            } else {
                random_digits(rng, 10)
            };
            let check = mtn_check_digit(&candidates);
            let mut digits = candidates;
            digits.push(check);
            digits_to_string(&digits)
        }
    }
}

/// Reference string the MTN check digit is computed over: `892700001` ahead
/// of 9 candidate digits, `89270000` ahead of 10.
pub fn mtn_reference(candidates: &str) -> Option<String> {
    let prefix = match candidates.len() {
        9 => MTN_SHORT_REFERENCE,
        10 => MTN_LONG_REFERENCE,
        _ => return None,
    };
    Some(format!("{prefix}{candidates}"))
}

fn mtn_check_digit(candidates: &[u8]) -> u8 {
    let prefix = if candidates.len() == 9 {
        MTN_SHORT_REFERENCE
    } else {
        MTN_LONG_REFERENCE
    };
    let mut reference: Vec<u8> = prefix.bytes().map(|b| b - b'0').collect();
    reference.extend_from_slice(candidates);
    luhn_check_digit(&reference)
}

/// Validate `value` as a SIM number issued under `carrier`'s scheme.
pub fn validate_sim(carrier: Carrier, value: &str) -> Result<(), ValidationError> {
    match carrier.scheme() {
        SimScheme::Iccid { prefix, length } => {
            expect_len(value, length)?;
            let digits = parse_digits(value)?;
            if !value.starts_with(prefix) {
                return Err(ValidationError::Prefix(value[..prefix.len()].to_string()));
            }
            check_last_digit(&digits, luhn_check_digit(&digits[..digits.len() - 1]))
        }
        SimScheme::MtnMsisdn => {
            let actual = value.chars().count();
            if actual != 10 && actual != 11 {
                return Err(ValidationError::Length {
                    expected: "10 or 11".to_string(),
                    actual,
                });
            }
            let digits = parse_digits(value)?;
            check_last_digit(&digits, mtn_check_digit(&digits[..digits.len() - 1]))
        }
    }
}

/// Validate against every carrier, returning the first one whose scheme matches.
pub fn validate_any_carrier(value: &str) -> Result<Carrier, ValidationError> {
    let mut first_error = None;
    for carrier in Carrier::ALL {
        match validate_sim(carrier, value) {
            Ok(()) => return Ok(carrier),
            Err(ValidationError::Prefix(_)) | Err(ValidationError::Length { .. }) => {}
            Err(err) => {
                first_error.get_or_insert(err);
            }
        }
    }
    Err(first_error.unwrap_or_else(|| {
        ValidationError::Format(format!("{value:?} matches no carrier scheme"))
    }))
}

fn check_last_digit(digits: &[u8], expected: u8) -> Result<(), ValidationError> {
    let found = digits[digits.len() - 1];
    if expected != found {
        return Err(ValidationError::CheckDigit { expected, found });
    }
    Ok(())
}
