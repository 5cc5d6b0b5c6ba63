use std::collections::BTreeMap;

use chrono::{Datelike, Local};
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::GenerationError;
use crate::params::{ParamKind, ParamSpec, validate_params};
use crate::schemes::Scheme;
use crate::schemes::imei::generate_imei;
use crate::schemes::national_id::{Gender, MAX_AGE, NationalIdOptions, generate_national_id};
use crate::schemes::passport::generate_passport;
use crate::schemes::phone::{PhoneFormat, generate_phone_number};
use crate::schemes::sim::{Carrier, generate_sim};

const NATIONAL_ID_PARAMS: &[ParamSpec] = &[
    ParamSpec::new("min_age", ParamKind::Int, false),
    ParamSpec::new("max_age", ParamKind::Int, false),
    ParamSpec::new("gender", ParamKind::String, false),
];
const SIM_PARAMS: &[ParamSpec] = &[
    ParamSpec::new("carrier", ParamKind::String, false),
    ParamSpec::new("carriers", ParamKind::StringList, false),
];
const IMEI_PARAMS: &[ParamSpec] = &[ParamSpec::new("tac", ParamKind::String, false)];
const PHONE_PARAMS: &[ParamSpec] = &[ParamSpec::new("format", ParamKind::String, false)];

const DEFAULT_MIN_AGE: u32 = 20;
const DEFAULT_MAX_AGE: u32 = 40;

/// One generated identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedId {
    pub scheme: Scheme,
    /// Sub-kind the value was drawn from, e.g. the SIM carrier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub value: String,
}

impl GeneratedId {
    fn new(scheme: Scheme, value: String) -> Self {
        Self {
            scheme,
            label: None,
            value,
        }
    }
}

/// Ambient inputs shared by every generator call.
#[derive(Debug, Clone, Copy)]
pub struct GeneratorContext {
    pub current_year: i32,
}

impl Default for GeneratorContext {
    fn default() -> Self {
        Self {
            current_year: Local::now().year(),
        }
    }
}

pub trait Generator: Send + Sync {
    fn id(&self) -> &'static str;

    fn scheme(&self) -> Scheme;

    fn generate(
        &self,
        ctx: &GeneratorContext,
        params: Option<&Value>,
        rng: &mut dyn RngCore,
    ) -> Result<GeneratedId, GenerationError>;
}

/// Generators keyed by id.
pub struct GeneratorRegistry {
    generators: BTreeMap<&'static str, Box<dyn Generator>>,
}

impl GeneratorRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            generators: BTreeMap::new(),
        };
        registry.register_generator(Box::new(NationalIdGenerator));
        registry.register_generator(Box::new(PassportGenerator));
        registry.register_generator(Box::new(SimGenerator));
        registry.register_generator(Box::new(ImeiGenerator));
        registry.register_generator(Box::new(PhoneGenerator));
        registry
    }

    pub fn register_generator(&mut self, generator: Box<dyn Generator>) {
        self.generators.insert(generator.id(), generator);
    }

    pub fn generator(&self, id: &str) -> Option<&dyn Generator> {
        self.generators.get(id).map(|generator| generator.as_ref())
    }

    pub fn generator_for(&self, scheme: Scheme) -> Option<&dyn Generator> {
        self.generator(scheme.generator_id())
    }

    pub fn generator_ids(&self) -> Vec<&'static str> {
        self.generators.keys().copied().collect()
    }

    pub fn generate(
        &self,
        id: &str,
        ctx: &GeneratorContext,
        params: Option<&Value>,
        rng: &mut dyn RngCore,
    ) -> Result<GeneratedId, GenerationError> {
        let generator = self
            .generator(id)
            .ok_or_else(|| GenerationError::UnknownGenerator(id.to_string()))?;
        generator.generate(ctx, params, rng)
    }
}

impl Default for GeneratorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

struct NationalIdGenerator;

impl Generator for NationalIdGenerator {
    fn id(&self) -> &'static str {
        "rsa.national_id"
    }

    fn scheme(&self) -> Scheme {
        Scheme::NationalId
    }

    fn generate(
        &self,
        ctx: &GeneratorContext,
        params: Option<&Value>,
        rng: &mut dyn RngCore,
    ) -> Result<GeneratedId, GenerationError> {
        let params = validate_params(params, NATIONAL_ID_PARAMS, self.id())?;
        let min_age = params.get_u32("min_age")?.unwrap_or(DEFAULT_MIN_AGE);
        let max_age = params.get_u32("max_age")?.unwrap_or(DEFAULT_MAX_AGE);
        let gender = params.get_parsed::<Gender>("gender")?.unwrap_or(Gender::Random);

        let options = NationalIdOptions::new(min_age, max_age, gender)
            .with_current_year(ctx.current_year)
            .clamped();
        if options.max_age > MAX_AGE {
            return Err(GenerationError::InvalidParams(format!(
                "{}: ages above {MAX_AGE} are not supported (got {})",
                self.id(),
                options.max_age
            )));
        }
        Ok(GeneratedId::new(
            self.scheme(),
            generate_national_id(&options, rng),
        ))
    }
}

struct PassportGenerator;

impl Generator for PassportGenerator {
    fn id(&self) -> &'static str {
        "rsa.passport"
    }

    fn scheme(&self) -> Scheme {
        Scheme::Passport
    }

    fn generate(
        &self,
        _ctx: &GeneratorContext,
        params: Option<&Value>,
        rng: &mut dyn RngCore,
    ) -> Result<GeneratedId, GenerationError> {
        validate_params(params, &[], self.id())?;
        Ok(GeneratedId::new(self.scheme(), generate_passport(rng)))
    }
}

struct SimGenerator;

impl Generator for SimGenerator {
    fn id(&self) -> &'static str {
        "rsa.sim"
    }

    fn scheme(&self) -> Scheme {
        Scheme::Sim
    }

    fn generate(
        &self,
        _ctx: &GeneratorContext,
        params: Option<&Value>,
        rng: &mut dyn RngCore,
    ) -> Result<GeneratedId, GenerationError> {
        let params = validate_params(params, SIM_PARAMS, self.id())?;
        let mut carriers = params
            .get_parsed_list::<Carrier>("carriers")?
            .unwrap_or_default();
        if let Some(carrier) = params.get_parsed::<Carrier>("carrier")? {
            carriers.push(carrier);
        }
        // An empty selection falls back to the default carrier.
        if carriers.is_empty() {
            carriers.push(Carrier::Vodacom);
        }

        let carrier = carriers[rng.random_range(0..carriers.len())];
        Ok(GeneratedId {
            scheme: self.scheme(),
            label: Some(carrier.as_str().to_string()),
            value: generate_sim(carrier, rng),
        })
    }
}

struct ImeiGenerator;

impl Generator for ImeiGenerator {
    fn id(&self) -> &'static str {
        "imei"
    }

    fn scheme(&self) -> Scheme {
        Scheme::Imei
    }

    fn generate(
        &self,
        _ctx: &GeneratorContext,
        params: Option<&Value>,
        rng: &mut dyn RngCore,
    ) -> Result<GeneratedId, GenerationError> {
        let params = validate_params(params, IMEI_PARAMS, self.id())?;
        let tac = params.get_str("tac");
        Ok(GeneratedId::new(self.scheme(), generate_imei(tac, rng)))
    }
}

struct PhoneGenerator;

impl Generator for PhoneGenerator {
    fn id(&self) -> &'static str {
        "rsa.phone"
    }

    fn scheme(&self) -> Scheme {
        Scheme::Phone
    }

    fn generate(
        &self,
        _ctx: &GeneratorContext,
        params: Option<&Value>,
        rng: &mut dyn RngCore,
    ) -> Result<GeneratedId, GenerationError> {
        let params = validate_params(params, PHONE_PARAMS, self.id())?;
        let format = params
            .get_parsed::<PhoneFormat>("format")?
            .unwrap_or(PhoneFormat::Random);
        Ok(GeneratedId::new(
            self.scheme(),
            generate_phone_number(format, rng),
        ))
    }
}
