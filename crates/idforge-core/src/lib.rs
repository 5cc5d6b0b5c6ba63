//! Identifier synthesis engine for idforge.
//!
//! This crate produces checksum-correct fake identifiers (South African ID
//! numbers, passports, SIM/ICCID numbers, IMEIs and phone numbers) for test
//! data, and validates values against the same schemes.

pub mod batch;
pub mod checksum;
pub mod errors;
pub mod generators;
pub mod params;
pub mod schemes;

pub use batch::{MAX_BATCH, MIN_BATCH, clamp_count, generate_batch, group_by_label};
pub use checksum::{luhn_check_digit, luhn_is_valid, national_id_check_digit, national_id_is_valid};
pub use errors::{ChecksumError, GenerationError, ValidationError};
pub use generators::{GeneratedId, Generator, GeneratorContext, GeneratorRegistry};
pub use schemes::Scheme;
pub use schemes::imei::{generate_imei, validate_imei};
pub use schemes::national_id::{
    DecodedNationalId, Gender, MAX_AGE, NationalIdOptions, decode_national_id,
    generate_national_id,
};
pub use schemes::passport::{generate_passport, validate_passport};
pub use schemes::phone::{
    MOBILE_PREFIXES, PhoneFormat, generate_phone_number, validate_phone_number,
};
pub use schemes::sim::{Carrier, SimScheme, generate_sim, validate_sim};
