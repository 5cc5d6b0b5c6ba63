use serde::{Deserialize, Serialize};
use thiserror::Error;

const CODE39_EXTRA: &str = " -.$/+%";

/// Barcode symbologies the exporter can hand values to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Symbology {
    #[serde(rename = "CODE128")]
    Code128,
    #[serde(rename = "CODE39")]
    Code39,
    #[serde(rename = "EAN13")]
    Ean13,
}

/// A value the symbology cannot encode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{symbology} cannot encode {value:?}: {reason}")]
pub struct RenderError {
    pub symbology: Symbology,
    pub value: String,
    pub reason: String,
}

impl Symbology {
    pub const ALL: [Symbology; 3] = [Symbology::Code128, Symbology::Code39, Symbology::Ean13];

    pub fn tag(self) -> &'static str {
        match self {
            Symbology::Code128 => "CODE128",
            Symbology::Code39 => "CODE39",
            Symbology::Ean13 => "EAN13",
        }
    }

    /// Check that `value` only uses characters this symbology can encode.
    pub fn check(self, value: &str) -> Result<(), RenderError> {
        let reject = |reason: String| RenderError {
            symbology: self,
            value: value.to_string(),
            reason,
        };
        if value.is_empty() {
            return Err(reject("empty value".to_string()));
        }

        match self {
            Symbology::Code128 => match value.chars().find(|ch| !ch.is_ascii()) {
                Some(ch) => Err(reject(format!("non-ASCII character {ch:?}"))),
                None => Ok(()),
            },
            Symbology::Code39 => {
                let illegal = value.chars().find(|ch| {
                    !(ch.is_ascii_uppercase() || ch.is_ascii_digit() || CODE39_EXTRA.contains(*ch))
                });
                match illegal {
                    Some(ch) => Err(reject(format!("character {ch:?} not in the Code 39 set"))),
                    None => Ok(()),
                }
            }
            Symbology::Ean13 => {
                if !value.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(reject("EAN-13 takes digits only".to_string()));
                }
                let digits: Vec<u8> = value.bytes().map(|b| b - b'0').collect();
                match digits.len() {
                    12 => Ok(()),
                    13 => {
                        let expected = ean13_check_digit(&digits[..12]);
                        if expected == digits[12] {
                            Ok(())
                        } else {
                            Err(reject(format!(
                                "EAN-13 check digit should be {expected}, found {}",
                                digits[12]
                            )))
                        }
                    }
                    len => Err(reject(format!("EAN-13 takes 12 or 13 digits, got {len}"))),
                }
            }
        }
    }

    /// The exact string handed to the rasterizer for `value`.
    ///
    /// Values pass through unchanged, except that a 12-digit EAN-13 value gets
    /// its check digit appended the way the rasterizer completes it.
    pub fn encoded_payload(self, value: &str) -> Result<String, RenderError> {
        self.check(value)?;
        if self == Symbology::Ean13 && value.len() == 12 {
            let digits: Vec<u8> = value.bytes().map(|b| b - b'0').collect();
            return Ok(format!("{value}{}", ean13_check_digit(&digits)));
        }
        Ok(value.to_string())
    }
}

impl std::fmt::Display for Symbology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

impl std::str::FromStr for Symbology {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized: String = value
            .chars()
            .filter(|ch| ch.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_uppercase();
        match normalized.as_str() {
            "CODE128" => Ok(Symbology::Code128),
            "CODE39" => Ok(Symbology::Code39),
            "EAN13" => Ok(Symbology::Ean13),
            _ => Err(format!("unknown barcode type: {value}")),
        }
    }
}

// Weights 1,3,1,3... from the left over the 12 data digits.
fn ean13_check_digit(digits: &[u8]) -> u8 {
    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(idx, digit)| u32::from(*digit) * if idx % 2 == 0 { 1 } else { 3 })
        .sum();
    ((10 - sum % 10) % 10) as u8
}
