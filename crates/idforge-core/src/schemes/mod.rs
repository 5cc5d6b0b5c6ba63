use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;

pub mod imei;
pub mod national_id;
pub mod passport;
pub mod phone;
pub mod sim;

/// Identifier schemes known to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scheme {
    NationalId,
    Passport,
    Sim,
    Imei,
    Phone,
}

impl Scheme {
    pub const ALL: [Scheme; 5] = [
        Scheme::NationalId,
        Scheme::Passport,
        Scheme::Sim,
        Scheme::Imei,
        Scheme::Phone,
    ];

    /// Registry id of the generator for this scheme.
    pub fn generator_id(self) -> &'static str {
        match self {
            Scheme::NationalId => "rsa.national_id",
            Scheme::Passport => "rsa.passport",
            Scheme::Sim => "rsa.sim",
            Scheme::Imei => "imei",
            Scheme::Phone => "rsa.phone",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Scheme::NationalId => "national_id",
            Scheme::Passport => "passport",
            Scheme::Sim => "sim",
            Scheme::Imei => "imei",
            Scheme::Phone => "phone",
        }
    }

    /// Title used for exported documents.
    pub fn export_title(self) -> &'static str {
        match self {
            Scheme::NationalId => "RSA ID Numbers",
            Scheme::Passport => "RSA Passport Numbers",
            Scheme::Sim => "SIM Numbers",
            Scheme::Imei => "IMEI Numbers",
            Scheme::Phone => "RSA Phone Numbers",
        }
    }

    /// Validate `value` against this scheme.
    ///
    /// SIM values are checked against every carrier and accepted when any
    /// carrier's scheme matches; use [`sim::validate_sim`] to pin the carrier.
    pub fn validate(self, value: &str) -> Result<(), ValidationError> {
        match self {
            Scheme::NationalId => national_id::validate_national_id(value),
            Scheme::Passport => passport::validate_passport(value),
            Scheme::Imei => imei::validate_imei(value),
            Scheme::Phone => phone::validate_phone_number(value),
            Scheme::Sim => sim::validate_any_carrier(value).map(|_| ()),
        }
    }
}

impl std::fmt::Display for Scheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Scheme {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "national_id" | "id" => Ok(Scheme::NationalId),
            "passport" => Ok(Scheme::Passport),
            "sim" => Ok(Scheme::Sim),
            "imei" => Ok(Scheme::Imei),
            "phone" => Ok(Scheme::Phone),
            other => Err(format!("unknown scheme: {other}")),
        }
    }
}

pub(crate) fn random_digits(rng: &mut dyn RngCore, count: usize) -> Vec<u8> {
    (0..count).map(|_| rng.random_range(0..=9)).collect()
}

pub(crate) fn coin_flip(rng: &mut dyn RngCore) -> bool {
    rng.random_bool(0.5)
}

pub(crate) fn expect_len(value: &str, expected: usize) -> Result<(), ValidationError> {
    let actual = value.chars().count();
    if actual != expected {
        return Err(ValidationError::Length {
            expected: expected.to_string(),
            actual,
        });
    }
    Ok(())
}
