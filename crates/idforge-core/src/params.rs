use std::str::FromStr;

use serde_json::{Map, Value};

use crate::errors::GenerationError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamKind {
    Int,
    String,
    StringList,
}

#[derive(Clone, Copy, Debug)]
pub struct ParamSpec {
    pub key: &'static str,
    pub kind: ParamKind,
    pub required: bool,
}

impl ParamSpec {
    pub const fn new(key: &'static str, kind: ParamKind, required: bool) -> Self {
        Self {
            key,
            kind,
            required,
        }
    }
}

pub struct ParamMap<'a> {
    ctx: &'static str,
    map: Option<&'a Map<String, Value>>,
}

/// Check `params` against `specs`: must be an object (or absent), with only
/// known keys of the declared kinds, and every required key present.
pub fn validate_params<'a>(
    params: Option<&'a Value>,
    specs: &[ParamSpec],
    ctx: &'static str,
) -> Result<ParamMap<'a>, GenerationError> {
    let map = match params {
        None | Some(Value::Null) => None,
        Some(Value::Object(map)) => Some(map),
        Some(_) => {
            return Err(GenerationError::InvalidParams(format!(
                "{ctx}: params must be a JSON object"
            )));
        }
    };

    if let Some(map) = map {
        for (key, value) in map {
            let Some(spec) = specs.iter().find(|spec| spec.key == key.as_str()) else {
                return Err(GenerationError::InvalidParams(format!(
                    "{ctx}: unknown param '{key}'"
                )));
            };
            validate_kind(ctx, key, spec.kind, value)?;
        }
    }

    for spec in specs {
        if spec.required && !map.is_some_and(|map| map.contains_key(spec.key)) {
            return Err(GenerationError::InvalidParams(format!(
                "{ctx}: missing required param '{}'",
                spec.key
            )));
        }
    }

    Ok(ParamMap { ctx, map })
}

impl<'a> ParamMap<'a> {
    pub fn get_u32(&self, key: &str) -> Result<Option<u32>, GenerationError> {
        let Some(value) = self.map.and_then(|map| map.get(key)) else {
            return Ok(None);
        };
        value
            .as_u64()
            .and_then(|value| u32::try_from(value).ok())
            .map(Some)
            .ok_or_else(|| self.invalid(key))
    }

    pub fn get_str(&self, key: &str) -> Option<&'a str> {
        self.map
            .and_then(|map| map.get(key))
            .and_then(|value| value.as_str())
    }

    /// Parse a string param through `FromStr`.
    pub fn get_parsed<T: FromStr>(&self, key: &str) -> Result<Option<T>, GenerationError> {
        self.get_str(key)
            .map(|raw| raw.parse::<T>().map_err(|_| self.invalid(key)))
            .transpose()
    }

    /// Parse every entry of a string-list param through `FromStr`.
    pub fn get_parsed_list<T: FromStr>(&self, key: &str) -> Result<Option<Vec<T>>, GenerationError> {
        let Some(values) = self
            .map
            .and_then(|map| map.get(key))
            .and_then(|value| value.as_array())
        else {
            return Ok(None);
        };
        values
            .iter()
            .map(|value| {
                value
                    .as_str()
                    .and_then(|raw| raw.parse::<T>().ok())
                    .ok_or_else(|| self.invalid(key))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }

    fn invalid(&self, key: &str) -> GenerationError {
        GenerationError::InvalidParams(format!("{}: invalid value for param '{key}'", self.ctx))
    }
}

fn validate_kind(
    ctx: &'static str,
    key: &str,
    kind: ParamKind,
    value: &Value,
) -> Result<(), GenerationError> {
    let valid = match kind {
        ParamKind::Int => value.as_i64().is_some(),
        ParamKind::String => value.is_string(),
        ParamKind::StringList => value
            .as_array()
            .is_some_and(|values| values.iter().all(Value::is_string)),
    };

    if valid {
        Ok(())
    } else {
        Err(GenerationError::InvalidParams(format!(
            "{ctx}: invalid value for param '{key}'"
        )))
    }
}
