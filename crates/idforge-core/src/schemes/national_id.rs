use chrono::{Datelike, Local, NaiveDate};
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::checksum::{digits_to_string, national_id_check_digit, parse_digits};
use crate::errors::ValidationError;
use crate::schemes::{coin_flip, expect_len};

const CITIZEN_DIGIT: u8 = 0;
const FIXED_DIGIT: u8 = 8;

/// Oldest age the generator accepts.
pub const MAX_AGE: u32 = 150;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Random,
}

impl Gender {
    fn resolve(self, rng: &mut dyn RngCore) -> Gender {
        match self {
            Gender::Random if coin_flip(rng) => Gender::Male,
            Gender::Random => Gender::Female,
            fixed => fixed,
        }
    }
}

impl std::str::FromStr for Gender {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "male" | "m" => Ok(Gender::Male),
            "female" | "f" => Ok(Gender::Female),
            "random" => Ok(Gender::Random),
            other => Err(format!("unknown gender: {other}")),
        }
    }
}

/// Inputs for [`generate_national_id`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NationalIdOptions {
    pub min_age: u32,
    pub max_age: u32,
    pub gender: Gender,
    /// Year ages are measured against.
    pub current_year: i32,
}

impl NationalIdOptions {
    pub fn new(min_age: u32, max_age: u32, gender: Gender) -> Self {
        Self {
            min_age,
            max_age,
            gender,
            current_year: Local::now().year(),
        }
    }

    pub fn with_current_year(mut self, year: i32) -> Self {
        self.current_year = year;
        self
    }

    /// Clamp ages the way the input form does: `min_age >= 1`, `max_age >= min_age`.
    pub fn clamped(mut self) -> Self {
        self.min_age = self.min_age.max(1);
        self.max_age = self.max_age.max(self.min_age);
        self
    }
}

impl Default for NationalIdOptions {
    fn default() -> Self {
        Self::new(20, 40, Gender::Random)
    }
}

/// Generate a 13-digit national ID number.
///
/// Layout is `YYMMDD` + `GSSS` + citizenship `0` + `8` + check digit, where
/// `G` encodes gender (`5..=9` male, `0..=4` female). Ages are expected to be
/// clamped by the caller.
pub fn generate_national_id(options: &NationalIdOptions, rng: &mut dyn RngCore) -> String {
    let age = rng.random_range(options.min_age..=options.max_age);
    let birth_year = i32::try_from(age)
        .map_or(i32::MIN, |age| options.current_year.saturating_sub(age));
    let month: u32 = rng.random_range(1..=12);
    let day: u32 = rng.random_range(1..=28);
    let yy = birth_year.rem_euclid(100) as u32;

    let gender_digit: u8 = match options.gender.resolve(rng) {
        Gender::Male => rng.random_range(5..=9),
        _ => rng.random_range(0..=4),
    };
    let sequence: u16 = rng.random_range(0..1000);

    let mut digits = Vec::with_capacity(13);
    for part in [yy, month, day] {
        digits.push((part / 10) as u8);
        digits.push((part % 10) as u8);
    }
    digits.push(gender_digit);
    digits.push((sequence / 100) as u8);
    digits.push((sequence / 10 % 10) as u8);
    digits.push((sequence % 10) as u8);
    digits.push(CITIZEN_DIGIT);
    digits.push(FIXED_DIGIT);
    digits.push(national_id_check_digit(&digits));
    digits_to_string(&digits)
}

/// Fields recovered from a national ID number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedNationalId {
    pub birth_date: NaiveDate,
    pub gender: Gender,
    pub sequence: u16,
    pub citizenship: u8,
    pub check_digit: u8,
}

impl DecodedNationalId {
    /// Age in whole calendar years relative to `year`.
    pub fn age_in(&self, year: i32) -> i32 {
        year - self.birth_date.year()
    }
}

/// Decode `value`, placing the two-digit year in the century that keeps the
/// age relative to `reference_year` within `0..=99`.
///
/// The number only carries two year digits, so an ID issued for an age of
/// 100 or more decodes a whole number of centuries too young.
pub fn decode_national_id(
    value: &str,
    reference_year: i32,
) -> Result<DecodedNationalId, ValidationError> {
    expect_len(value, 13)?;
    let digits = parse_digits(value)?;

    let expected = national_id_check_digit(&digits[..12]);
    if expected != digits[12] {
        return Err(ValidationError::CheckDigit {
            expected,
            found: digits[12],
        });
    }

    let pair = |idx: usize| u32::from(digits[idx]) * 10 + u32::from(digits[idx + 1]);
    let yy = pair(0) as i32;
    let mut year = reference_year.div_euclid(100) * 100 + yy;
    if year > reference_year {
        year -= 100;
    }
    let birth_date = NaiveDate::from_ymd_opt(year, pair(2), pair(4))
        .ok_or_else(|| ValidationError::Date(value[..6].to_string()))?;

    let gender = if digits[6] >= 5 {
        Gender::Male
    } else {
        Gender::Female
    };
    let sequence = digits[7..10]
        .iter()
        .fold(0_u16, |acc, d| acc * 10 + u16::from(*d));

    Ok(DecodedNationalId {
        birth_date,
        gender,
        sequence,
        citizenship: digits[10],
        check_digit: digits[12],
    })
}

pub(crate) fn validate_national_id(value: &str) -> Result<(), ValidationError> {
    decode_national_id(value, Local::now().year()).map(|_| ())
}
