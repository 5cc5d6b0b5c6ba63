use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::checksum::{digits_to_string, parse_digits};
use crate::errors::ValidationError;
use crate::schemes::{coin_flip, random_digits};

/// Mobile prefixes numbers are drawn from, in allowlist order.
pub const MOBILE_PREFIXES: [&str; 20] = [
    "060", "061", "062", "063", "064", "065", "066", "067", "068", "071", "072", "073", "074",
    "076", "078", "079", "081", "082", "083", "084",
];

const COUNTRY_CODE: &str = "+27";
const LOCAL_LEN: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhoneFormat {
    Local,
    International,
    Random,
}

impl std::str::FromStr for PhoneFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "local" => Ok(PhoneFormat::Local),
            "international" | "intl" => Ok(PhoneFormat::International),
            "random" => Ok(PhoneFormat::Random),
            other => Err(format!("unknown phone format: {other}")),
        }
    }
}

/// Generate a mobile number: allowlisted prefix + 7 random digits, optionally
/// rewritten to `+27` form.
pub fn generate_phone_number(format: PhoneFormat, rng: &mut dyn RngCore) -> String {
    let prefix = MOBILE_PREFIXES[rng.random_range(0..MOBILE_PREFIXES.len())];
    let local = format!("{prefix}{}", digits_to_string(&random_digits(rng, 7)));

    let international = match format {
        PhoneFormat::Local => false,
        PhoneFormat::International => true,
        PhoneFormat::Random => !coin_flip(rng),
    };
    if international {
        to_international(&local)
    } else {
        local
    }
}

/// Replace the leading trunk `0` of a local number with `+27`.
pub fn to_international(local: &str) -> String {
    let national = local.strip_prefix('0').unwrap_or(local);
    format!("{COUNTRY_CODE}{national}")
}

/// Accepts either the 10-digit local form or the `+27` form.
pub fn validate_phone_number(value: &str) -> Result<(), ValidationError> {
    let local = match value.strip_prefix(COUNTRY_CODE) {
        Some(rest) => format!("0{rest}"),
        None => value.to_string(),
    };
    if local.chars().count() != LOCAL_LEN {
        return Err(ValidationError::Length {
            expected: format!("{LOCAL_LEN} (local) or {} (international)", LOCAL_LEN + 2),
            actual: value.chars().count(),
        });
    }
    parse_digits(&local)?;
    if !MOBILE_PREFIXES.iter().any(|prefix| local.starts_with(prefix)) {
        return Err(ValidationError::Prefix(local[..3].to_string()));
    }
    Ok(())
}
