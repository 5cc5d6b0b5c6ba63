use std::collections::HashSet;

use chrono::Datelike;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use idforge_core::checksum::try_luhn_check_digit;
use idforge_core::schemes::phone::to_international;
use idforge_core::schemes::sim::{mtn_reference, validate_any_carrier};
use idforge_core::{
    Carrier, Gender, MOBILE_PREFIXES, NationalIdOptions, PhoneFormat, Scheme, SimScheme,
    ValidationError, decode_national_id, generate_imei, generate_national_id, generate_passport,
    generate_phone_number, generate_sim, luhn_is_valid, national_id_is_valid, validate_imei,
    validate_sim,
};

const YEAR: i32 = 2026;

fn options(min_age: u32, max_age: u32, gender: Gender) -> NationalIdOptions {
    NationalIdOptions::new(min_age, max_age, gender).with_current_year(YEAR)
}

#[test]
fn national_id_male_scenario_holds_for_a_thousand_draws() {
    let mut rng = ChaCha8Rng::seed_from_u64(30);
    let options = options(30, 30, Gender::Male);
    for _ in 0..1000 {
        let id = generate_national_id(&options, &mut rng);
        assert_eq!(id.len(), 13);
        assert!(national_id_is_valid(&id), "{id}");
        let decoded = decode_national_id(&id, YEAR).expect("decodes");
        assert_eq!(decoded.age_in(YEAR), 30);
        assert_eq!(decoded.gender, Gender::Male);
        let gender_digit = id.as_bytes()[6] - b'0';
        assert!((5..=9).contains(&gender_digit), "{id}");
    }
}

#[test]
fn national_id_female_digit_and_age_range() {
    let mut rng = ChaCha8Rng::seed_from_u64(4);
    let options = options(20, 40, Gender::Female);
    for _ in 0..500 {
        let id = generate_national_id(&options, &mut rng);
        let gender_digit = id.as_bytes()[6] - b'0';
        assert!(gender_digit <= 4, "{id}");
        let decoded = decode_national_id(&id, YEAR).expect("decodes");
        assert!((20..=40).contains(&decoded.age_in(YEAR)));
        assert!(decoded.birth_date.day() <= 28);
        assert_eq!(decoded.citizenship, 0);
        assert_eq!(&id[10..12], "08");
    }
}

#[test]
fn national_id_random_gender_yields_both() {
    let mut rng = ChaCha8Rng::seed_from_u64(99);
    let options = options(20, 40, Gender::Random);
    let genders: HashSet<_> = (0..200)
        .map(|_| {
            let id = generate_national_id(&options, &mut rng);
            decode_national_id(&id, YEAR).expect("decodes").gender
        })
        .collect();
    assert!(genders.contains(&Gender::Male));
    assert!(genders.contains(&Gender::Female));
}

#[test]
fn national_id_options_clamp_like_the_form() {
    let clamped = options(0, 0, Gender::Male).clamped();
    assert_eq!((clamped.min_age, clamped.max_age), (1, 1));
    let clamped = options(50, 20, Gender::Male).clamped();
    assert_eq!((clamped.min_age, clamped.max_age), (50, 50));
}

#[test]
fn national_id_survives_extreme_ages() {
    let mut rng = ChaCha8Rng::seed_from_u64(12);
    for age in [u32::MAX, i32::MAX as u32 + 2, 5000] {
        let id = generate_national_id(&options(age, age, Gender::Female), &mut rng);
        assert_eq!(id.len(), 13);
        assert!(national_id_is_valid(&id), "{id}");
    }
}

#[test]
fn national_id_decode_wraps_centenarians() {
    let mut rng = ChaCha8Rng::seed_from_u64(13);
    let id = generate_national_id(&options(100, 100, Gender::Male), &mut rng);
    let decoded = decode_national_id(&id, YEAR).expect("valid id");
    assert_eq!(decoded.age_in(YEAR), 0);
}

#[test]
fn national_id_decode_rejects_bad_dates_and_digits() {
    // 13th month with a matching check digit.
    assert!(matches!(
        decode_national_id("8013015009082", YEAR),
        Err(ValidationError::Date(_))
    ));
    assert!(matches!(
        decode_national_id("8001015009086", YEAR),
        Err(ValidationError::CheckDigit {
            expected: 7,
            found: 6
        })
    ));
    assert!(matches!(
        decode_national_id("800101", YEAR),
        Err(ValidationError::Length { .. })
    ));
}

#[test]
fn iccid_carriers_produce_twenty_digit_luhn_numbers() {
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    for carrier in Carrier::ALL {
        let SimScheme::Iccid { prefix, length } = carrier.scheme() else {
            continue;
        };
        for _ in 0..200 {
            let sim = generate_sim(carrier, &mut rng);
            assert_eq!(sim.len(), length);
            assert!(sim.starts_with(prefix), "{sim}");
            assert!(luhn_is_valid(&sim), "{sim}");
            assert_eq!(validate_sim(carrier, &sim), Ok(()));
        }
    }
}

#[test]
fn carrier_prefixes_are_fixed() {
    let prefix = |carrier: Carrier| match carrier.scheme() {
        SimScheme::Iccid { prefix, .. } => Some(prefix),
        SimScheme::MtnMsisdn => None,
    };
    assert_eq!(prefix(Carrier::Vodacom), Some("892701"));
    assert_eq!(prefix(Carrier::EightTa), Some("892702"));
    assert_eq!(prefix(Carrier::Telkom), Some("892703"));
    assert_eq!(prefix(Carrier::CellC), Some("892707"));
    assert_eq!(prefix(Carrier::Mtn), None);
}

#[test]
fn mtn_check_digit_reproduces_from_reference_string() {
    let mut rng = ChaCha8Rng::seed_from_u64(12);
    let mut lengths = HashSet::new();
    for _ in 0..300 {
        let sim = generate_sim(Carrier::Mtn, &mut rng);
        lengths.insert(sim.len());
        let (candidates, check) = sim.split_at(sim.len() - 1);
        let reference = mtn_reference(candidates).expect("10 or 11 digits");
        match sim.len() {
            10 => {
                assert!(sim.starts_with('0'), "{sim}");
                assert!(reference.starts_with("892700001"));
                assert_eq!(reference.len(), 18);
            }
            11 => {
                assert!(reference.starts_with("89270000"));
                assert_eq!(reference.len(), 18);
            }
            other => panic!("unexpected MTN length {other}"),
        }
        let expected = try_luhn_check_digit(&reference).expect("digits");
        assert_eq!(check, expected.to_string());
        assert_eq!(validate_sim(Carrier::Mtn, &sim), Ok(()));
    }
    assert_eq!(lengths, HashSet::from([10, 11]));
}

#[test]
fn mtn_reference_prefix_changes_the_check_digit() {
    // The 10-digit form uses `892700001`, not `89270000`.
    assert_eq!(mtn_reference("012345678").as_deref(), Some("892700001012345678"));
    assert_eq!(mtn_reference("0123456789").as_deref(), Some("892700000123456789"));
    assert_eq!(mtn_reference("12"), None);
}

#[test]
fn sim_validation_identifies_carrier() {
    let mut rng = ChaCha8Rng::seed_from_u64(8);
    let sim = generate_sim(Carrier::CellC, &mut rng);
    assert_eq!(validate_any_carrier(&sim), Ok(Carrier::CellC));
    assert!(matches!(
        validate_sim(Carrier::Vodacom, &sim),
        Err(ValidationError::Prefix(_))
    ));
    assert!(Scheme::Sim.validate("1234").is_err());
}

#[test]
fn imei_is_fifteen_luhn_digits_for_any_tac() {
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    for tac in [None, Some(""), Some("abc"), Some("1234567"), Some("490154203"), Some("49015420")] {
        for _ in 0..100 {
            let imei = generate_imei(tac, &mut rng);
            assert_eq!(imei.len(), 15, "{imei}");
            assert!(luhn_is_valid(&imei), "{imei}");
            assert_eq!(validate_imei(&imei), Ok(()));
        }
    }
}

#[test]
fn imei_keeps_valid_tac_and_replaces_invalid_one() {
    let mut rng = ChaCha8Rng::seed_from_u64(21);
    let imei = generate_imei(Some("49015420"), &mut rng);
    assert!(imei.starts_with("49015420"));

    for tac in ["abc", "١٢٣٤٥٦٧٨", "4901542a"] {
        let imei = generate_imei(Some(tac), &mut rng);
        assert!(imei.starts_with("35"), "{imei}");
        assert_ne!(&imei[2..3], "0", "{imei}");
    }
}

#[test]
fn phone_formats_follow_the_allowlist() {
    let mut rng = ChaCha8Rng::seed_from_u64(10);
    for _ in 0..300 {
        let local = generate_phone_number(PhoneFormat::Local, &mut rng);
        assert_eq!(local.len(), 10);
        assert!(MOBILE_PREFIXES.iter().any(|p| local.starts_with(p)), "{local}");

        let intl = generate_phone_number(PhoneFormat::International, &mut rng);
        assert!(intl.starts_with("+27"), "{intl}");
        assert_eq!(intl.len(), 12);
        assert!(Scheme::Phone.validate(&intl).is_ok());
    }
}

#[test]
fn phone_random_format_yields_both_forms() {
    let mut rng = ChaCha8Rng::seed_from_u64(17);
    let forms: HashSet<bool> = (0..100)
        .map(|_| generate_phone_number(PhoneFormat::Random, &mut rng).starts_with("+27"))
        .collect();
    assert_eq!(forms.len(), 2);
}

#[test]
fn phone_international_strips_trunk_zero() {
    assert_eq!(to_international("0821234567"), "+27821234567");
    assert!(matches!(
        Scheme::Phone.validate("0501234567"),
        Err(ValidationError::Prefix(_))
    ));
    assert_eq!(MOBILE_PREFIXES.len(), 20);
}

#[test]
fn passport_is_p_and_eight_digits() {
    let mut rng = ChaCha8Rng::seed_from_u64(2);
    for _ in 0..100 {
        let passport = generate_passport(&mut rng);
        assert_eq!(passport.len(), 9);
        assert!(passport.starts_with('P'));
        assert!(passport[1..].bytes().all(|b| b.is_ascii_digit()));
        assert!(Scheme::Passport.validate(&passport).is_ok());
    }
    assert!(Scheme::Passport.validate("A12345678").is_err());
}

#[test]
fn seeded_generation_is_deterministic() {
    let run = |seed| {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        (0..5)
            .map(|_| generate_sim(Carrier::Mtn, &mut rng))
            .collect::<Vec<_>>()
    };
    assert_eq!(run(42), run(42));
}
