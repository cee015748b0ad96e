//! Generation context and per-document profile resolution.
//!
//! Cross-field consistency is enforced by construction: before any field is
//! synthesized, [`DocumentProfile::resolve`] walks the document's dependency
//! graph in one fixed order (scenario, identifiers, hospitals, personas,
//! addresses, admission window, diagnoses, allergies, medications). Every
//! later synthesis call is then a lookup into the resolved profile, so
//! "discharge after admit" and "town belongs to county" cannot be violated
//! by call ordering.

use crate::catalogs;
use crate::error::GenerateError;
use crate::identifiers::{IdClass, IdentifierRegistry};
use crate::ips::IpsBundle;
use crate::scenarios::{self, Scenario};
use chrono::{DateTime, Duration, Utc};
use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;
use std::collections::{HashMap, HashSet};
use synth_core::Classification;

/// Fixed time anchor for seeded batches (2025-01-01T00:00:00Z).
///
/// Seeded runs must be byte-identical across invocations, so they cannot
/// anchor admission windows to the wall clock.
pub const SEEDED_ANCHOR_SECS: i64 = 1_735_689_600;

/// Render a chrono instant as an HL7 TS value.
pub fn hl7_timestamp(at: &DateTime<Utc>) -> String {
    at.format("%Y%m%d%H%M%S").to_string()
}

/// Render a chrono instant as an HL7 date.
pub fn hl7_date(at: &DateTime<Utc>) -> String {
    at.format("%Y%m%d").to_string()
}

/// Batch-wide mutable state: the identifier registry, narrative phrase
/// usage (to keep outputs from looking copied), and scenario rotation.
/// Owned exclusively by one in-progress batch.
#[derive(Debug)]
pub struct BatchState {
    pub registry: IdentifierRegistry,
    /// Reference instant the admission window hangs off.
    pub anchor: DateTime<Utc>,
    used_text: HashMap<String, HashSet<String>>,
    used_scenarios: HashSet<&'static str>,
}

impl BatchState {
    pub fn new(anchor: DateTime<Utc>) -> Self {
        Self {
            registry: IdentifierRegistry::new(),
            anchor,
            used_text: HashMap::new(),
            used_scenarios: HashSet::new(),
        }
    }

    /// Draw one option, preferring options not yet used under `key` in this
    /// batch. Once all options are spent the full pool is reused.
    pub fn pick_unique<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        key: &str,
        options: &[&str],
    ) -> String {
        if options.is_empty() {
            return String::new();
        }
        let bucket = self.used_text.entry(key.to_string()).or_default();
        let remaining: Vec<&str> = options
            .iter()
            .copied()
            .filter(|o| !bucket.contains(*o))
            .collect();
        let choice = if remaining.is_empty() {
            *options.choose(rng).unwrap_or(&options[0])
        } else {
            *remaining.choose(rng).unwrap_or(&remaining[0])
        };
        bucket.insert(choice.to_string());
        choice.to_string()
    }

    /// Pick the primary scenario for the next document: forced code first,
    /// then the IPS problem list, then rotation through the built-in pool
    /// without repeats until the pool is exhausted.
    pub fn next_scenario<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        forced: Option<&str>,
        ips: Option<&IpsBundle>,
    ) -> &'static Scenario {
        if let Some(code) = forced {
            if let Some(s) = scenarios::from_coding(code, code) {
                return s;
            }
        }
        if let Some(bundle) = ips {
            if let Some(condition) = bundle.conditions.first() {
                if let Some(s) = scenarios::from_coding(&condition.code, &condition.display) {
                    return s;
                }
            }
        }
        let available: Vec<&'static Scenario> = scenarios::SCENARIOS
            .iter()
            .filter(|s| !self.used_scenarios.contains(s.code))
            .collect();
        let picked = if available.is_empty() {
            scenarios::SCENARIOS
                .choose(rng)
                .unwrap_or(&scenarios::SCENARIOS[0])
        } else {
            available.choose(rng).copied().unwrap_or(available[0])
        };
        self.used_scenarios.insert(picked.code);
        picked
    }
}

/// A generated person name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonName {
    pub given: String,
    pub family: String,
}

/// The treating clinician used across PV1-7/8/9.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoctorPersona {
    pub prefix: String,
    pub given: String,
    pub family: String,
}

/// Patient identity, either synthetic or IPS-derived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientPersona {
    /// `M`, `F` or `U`.
    pub sex: String,
    pub given: String,
    pub family: String,
    /// HL7 date, `YYYYMMDD`.
    pub birth_date: String,
    pub mrn: String,
    /// 18-digit IHI.
    pub national_id: String,
}

/// County-consistent postal address, uppercased the way the feed writes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleAddress {
    pub line1: String,
    pub town: String,
    pub county: String,
    pub eircode: String,
}

impl LocaleAddress {
    fn draw<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let (county, town) = catalogs::county_and_town(rng);
        Self {
            line1: catalogs::address_line(rng),
            town: town.to_uppercase(),
            county: county.to_string(),
            eircode: catalogs::eircode(rng),
        }
    }
}

/// One DG1 entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnosis {
    pub code: String,
    pub display: String,
    pub system: String,
}

/// One AL1 entry, internally consistent (category matches allergen,
/// no-known-allergy blanks severity and reaction).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allergy {
    pub category_code: String,
    pub category_text: String,
    pub allergen: String,
    pub severity: String,
    pub reaction: String,
}

const SEVERITIES: &[&str] = &["MILD", "MODERATE", "SEVERE"];
const REACTIONS: &[&str] = &[
    "Rash", "Urticaria", "Angioedema", "Wheeze", "Anaphylaxis", "Nausea", "Vomiting", "Rhinitis",
];

struct AllergyCategory {
    code: &'static str,
    type_text: &'static str,
    allergens: &'static [&'static str],
}

const DRUG: AllergyCategory = AllergyCategory {
    code: "DA",
    type_text: "DRUG",
    allergens: &["Penicillin", "Aspirin", "Contrast media"],
};
const FOOD: AllergyCategory = AllergyCategory {
    code: "FA",
    type_text: "FOOD",
    allergens: &["Peanuts", "Shellfish"],
};
const ENVIRONMENTAL: AllergyCategory = AllergyCategory {
    code: "EA",
    type_text: "ENVIRONMENTAL",
    allergens: &["Latex", "Pollen"],
};
const NO_KNOWN_ALLERGY: AllergyCategory = AllergyCategory {
    code: "NA",
    type_text: "N/A",
    allergens: &["No known allergy"],
};

fn category_for_allergen(text: &str) -> &'static AllergyCategory {
    let t = text.trim().to_lowercase();
    if t.contains("no known") || t == "none" || t == "nka" {
        return &NO_KNOWN_ALLERGY;
    }
    if ["penicillin", "aspirin", "contrast"].iter().any(|w| t.contains(w)) {
        return &DRUG;
    }
    if ["peanut", "shellfish", "nut"].iter().any(|w| t.contains(w)) {
        return &FOOD;
    }
    if ["latex", "pollen", "dust", "mite"].iter().any(|w| t.contains(w)) {
        return &ENVIRONMENTAL;
    }
    &DRUG
}

fn draw_allergy<R: Rng + ?Sized>(
    rng: &mut R,
    known_allergen: Option<&str>,
    allow_nka: bool,
) -> Allergy {
    let (category, allergen) = match known_allergen {
        Some(text) => (category_for_allergen(text), text.trim().to_string()),
        None => {
            let category = if allow_nka && rng.random_bool(0.12) {
                &NO_KNOWN_ALLERGY
            } else {
                *[&DRUG, &FOOD, &ENVIRONMENTAL].choose(rng).unwrap_or(&&DRUG)
            };
            (category, catalogs::pick(rng, category.allergens).to_string())
        }
    };

    if category.code == "NA" {
        return Allergy {
            category_code: category.code.to_string(),
            category_text: category.type_text.to_string(),
            allergen,
            severity: "N/A".to_string(),
            reaction: "N/A".to_string(),
        };
    }

    Allergy {
        category_code: category.code.to_string(),
        category_text: category.type_text.to_string(),
        allergen,
        severity: catalogs::pick(rng, SEVERITIES).to_string(),
        reaction: catalogs::pick(rng, REACTIONS).to_string(),
    }
}

/// All correlated choices for one document, resolved before mutation.
#[derive(Debug, Clone)]
pub struct DocumentProfile {
    pub message_id: String,
    pub message_time: DateTime<Utc>,
    pub visit_number: String,
    pub filler_base: String,
    pub sending_hospital: &'static str,
    pub care_hospital: &'static str,
    pub gp: PersonName,
    pub gp_id: String,
    pub provider_addresses: Vec<LocaleAddress>,
    pub provider_phones: Vec<String>,
    pub doctor: DoctorPersona,
    pub patient: PatientPersona,
    pub patient_address: LocaleAddress,
    pub patient_phone: String,
    pub admit: DateTime<Utc>,
    pub discharge: DateTime<Utc>,
    pub discharge_disposition: &'static str,
    pub destination_id: String,
    pub scenario: &'static Scenario,
    pub diagnoses: Vec<Diagnosis>,
    pub allergies: Vec<Allergy>,
    pub medications: Vec<String>,
}

impl DocumentProfile {
    /// Resolve every correlated choice for one document.
    ///
    /// Draw order is fixed; with a seeded RNG the whole profile is
    /// reproducible.
    pub fn resolve<R: Rng + ?Sized>(
        rng: &mut R,
        state: &mut BatchState,
        classification: &Classification,
        ips: Option<&IpsBundle>,
        forced_scenario: Option<&str>,
    ) -> Result<Self, GenerateError> {
        let scenario = state.next_scenario(rng, forced_scenario, ips);

        let message_id = state.registry.next(IdClass::MessageControlId, rng)?;
        let visit_number = state.registry.next(IdClass::VisitNumber, rng)?;
        let filler_base = state.registry.next(IdClass::FillerOrderBase, rng)?;
        let mrn = state.registry.next(IdClass::MedicalRecordNumber, rng)?;

        let sending_hospital = catalogs::pick(rng, catalogs::HOSPITALS);
        let care_hospital = catalogs::pick(rng, catalogs::HOSPITALS);

        let gp_given = if rng.random_bool(0.5) {
            catalogs::pick(rng, catalogs::MALE_GIVEN_NAMES)
        } else {
            catalogs::pick(rng, catalogs::FEMALE_GIVEN_NAMES)
        };
        let gp = PersonName {
            given: gp_given.to_string(),
            family: catalogs::pick(rng, catalogs::SURNAMES).to_string(),
        };
        let gp_id = format!("{}", rng.random_range(100_000..1_000_000u32));

        let provider_count = classification.group_count("PRD");
        let provider_addresses: Vec<LocaleAddress> = (0..provider_count)
            .map(|_| LocaleAddress::draw(rng))
            .collect();
        let provider_phones: Vec<String> = (0..provider_count)
            .map(|_| catalogs::phone_number(rng))
            .collect();

        let doctor = DoctorPersona {
            prefix: catalogs::pick(rng, catalogs::DOCTOR_PREFIXES).to_string(),
            given: catalogs::pick(rng, catalogs::MALE_GIVEN_NAMES).to_uppercase(),
            family: catalogs::pick(rng, catalogs::SURNAMES).to_uppercase(),
        };

        let patient = match ips.and_then(|b| b.patient.as_ref()) {
            Some(p) => PatientPersona {
                sex: p.sex.clone(),
                given: p.given.to_uppercase(),
                family: p.family.to_uppercase(),
                birth_date: p.birth_date.clone(),
                mrn,
                national_id: format!("{}", rng.random_range(100_000_000_000_000_000..1_000_000_000_000_000_000u64)),
            },
            None => {
                let sex = if rng.random_bool(0.5) { "M" } else { "F" };
                let given = if sex == "M" {
                    catalogs::pick(rng, catalogs::MALE_GIVEN_NAMES)
                } else {
                    catalogs::pick(rng, catalogs::FEMALE_GIVEN_NAMES)
                };
                let age_days = rng.random_range(1..=95) * 365 + rng.random_range(0..365i64);
                PatientPersona {
                    sex: sex.to_string(),
                    given: given.to_uppercase(),
                    family: catalogs::pick(rng, catalogs::SURNAMES).to_uppercase(),
                    birth_date: hl7_date(&(state.anchor - Duration::days(age_days))),
                    mrn,
                    national_id: format!("{}", rng.random_range(100_000_000_000_000_000..1_000_000_000_000_000_000u64)),
                }
            }
        };

        let patient_address = LocaleAddress::draw(rng);
        let patient_phone = catalogs::phone_number(rng);

        // Admission window: admitted 2-60 days before the anchor, discharged
        // 12-240 hours later but at least a day before the anchor. Discharge
        // strictly after admit holds by construction.
        let admit_offset_secs = rng.random_range(2 * 86_400..=60 * 86_400i64);
        let admit = state.anchor - Duration::seconds(admit_offset_secs);
        let stay = Duration::hours(rng.random_range(12..=240i64));
        let latest = state.anchor - Duration::days(1);
        let discharge = std::cmp::min(admit + stay, latest);

        // The summary message goes out within half a day of discharge, so
        // each document in a batch carries its own MSH-7 timestamp. The
        // offset stays under the day of headroom discharge keeps from the
        // anchor.
        let message_time = discharge + Duration::minutes(rng.random_range(30..=720));

        let discharge_disposition = catalogs::pick(rng, catalogs::DISCHARGE_DISPOSITIONS);
        let destination_id = format!("{}", rng.random_range(100_000..1_000_000u32));

        let diagnosis_count = classification.group_count("DG1");
        let mut diagnoses = Vec::with_capacity(diagnosis_count);
        for index in 0..diagnosis_count {
            if index == 0 {
                diagnoses.push(Diagnosis {
                    code: scenario.code.to_string(),
                    display: scenario.display.to_string(),
                    system: scenario.system.to_string(),
                });
                continue;
            }
            let from_ips = ips.and_then(|b| b.conditions.get(index - 1));
            let diagnosis = match from_ips {
                Some(coding) => Diagnosis {
                    code: if coding.code.is_empty() {
                        format!("DX{}", rng.random_range(1000..10_000u32))
                    } else {
                        coding.code.clone()
                    },
                    display: if coding.display.is_empty() {
                        "Condition".to_string()
                    } else {
                        coding.display.clone()
                    },
                    system: if coding.system.is_empty() {
                        "SCT".to_string()
                    } else {
                        coding.system.clone()
                    },
                },
                None => {
                    let (code, display, system) = *scenarios::DIAGNOSIS_POOL
                        .choose(rng)
                        .unwrap_or(&scenarios::DIAGNOSIS_POOL[0]);
                    Diagnosis {
                        code: code.to_string(),
                        display: display.to_string(),
                        system: system.to_string(),
                    }
                }
            };
            diagnoses.push(diagnosis);
        }

        let allergy_count = classification.group_count("AL1");
        // No-known-allergy only makes sense when the template carries a
        // single AL1 instance.
        let allow_nka = allergy_count <= 1;
        let mut allergies = Vec::with_capacity(allergy_count);
        for index in 0..allergy_count {
            let known = ips
                .and_then(|b| b.allergies.get(index))
                .map(|c| c.display.as_str())
                .filter(|d| !d.is_empty());
            allergies.push(draw_allergy(rng, known, allow_nka));
        }

        let medications = match ips.filter(|b| !b.medications.is_empty()) {
            Some(bundle) => bundle.medications.iter().take(12).cloned().collect(),
            None => {
                let mut meds: Vec<String> =
                    scenario.medications.iter().map(|m| m.to_string()).collect();
                meds.shuffle(rng);
                if meds.len() >= 2 {
                    let keep = rng.random_range(2..=meds.len().min(5));
                    meds.truncate(keep);
                }
                meds
            }
        };

        Ok(Self {
            message_id,
            message_time,
            visit_number,
            filler_base,
            sending_hospital,
            care_hospital,
            gp,
            gp_id,
            provider_addresses,
            provider_phones,
            doctor,
            patient,
            patient_address,
            patient_phone,
            admit,
            discharge,
            discharge_disposition,
            destination_id,
            scenario,
            diagnoses,
            allergies,
            medications,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use synth_core::{Classification, TemplateDocument};

    fn anchor() -> DateTime<Utc> {
        DateTime::from_timestamp(SEEDED_ANCHOR_SECS, 0).unwrap()
    }

    fn classification() -> Classification {
        let template = TemplateDocument::parse(synth_core::testing::SAMPLE_TEMPLATE).unwrap();
        Classification::classify(&template).unwrap()
    }

    fn resolve(seed: u64) -> DocumentProfile {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut state = BatchState::new(anchor());
        DocumentProfile::resolve(&mut rng, &mut state, &classification(), None, None).unwrap()
    }

    #[test]
    fn test_discharge_strictly_after_admit() {
        for seed in 0..50 {
            let profile = resolve(seed);
            assert!(profile.discharge > profile.admit, "seed {seed}");
            assert!(profile.discharge <= anchor() - Duration::days(1));
        }
    }

    #[test]
    fn test_message_time_varies_per_document() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut state = BatchState::new(anchor());
        let classification = classification();
        let mut times = HashSet::new();
        for _ in 0..5 {
            let profile =
                DocumentProfile::resolve(&mut rng, &mut state, &classification, None, None)
                    .unwrap();
            assert!(profile.message_time > profile.discharge);
            assert!(profile.message_time <= anchor());
            times.insert(hl7_timestamp(&profile.message_time));
        }
        assert_eq!(times.len(), 5);
    }

    #[test]
    fn test_address_is_county_consistent() {
        for seed in 0..50 {
            let profile = resolve(seed);
            let towns = catalogs::towns_in_county(&profile.patient_address.county);
            assert!(towns
                .iter()
                .any(|t| t.to_uppercase() == profile.patient_address.town));
        }
    }

    #[test]
    fn test_counts_follow_classification() {
        let profile = resolve(1);
        assert_eq!(profile.provider_addresses.len(), 2);
        assert_eq!(profile.diagnoses.len(), 2);
        assert_eq!(profile.allergies.len(), 1);
        // Primary diagnosis carries the scenario coding.
        assert_eq!(profile.diagnoses[0].code, profile.scenario.code);
    }

    #[test]
    fn test_profile_is_deterministic() {
        let a = resolve(42);
        let b = resolve(42);
        assert_eq!(a.message_id, b.message_id);
        assert_eq!(a.patient, b.patient);
        assert_eq!(a.admit, b.admit);
        assert_eq!(a.discharge, b.discharge);
        assert_eq!(a.medications, b.medications);
    }

    #[test]
    fn test_nka_blanks_severity_and_reaction() {
        let mut rng = StdRng::seed_from_u64(3);
        let allergy = draw_allergy(&mut rng, Some("No known allergy"), true);
        assert_eq!(allergy.category_code, "NA");
        assert_eq!(allergy.severity, "N/A");
        assert_eq!(allergy.reaction, "N/A");
    }

    #[test]
    fn test_scenario_rotation_avoids_repeats() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut state = BatchState::new(anchor());
        let mut codes = HashSet::new();
        for _ in 0..scenarios::SCENARIOS.len() {
            codes.insert(state.next_scenario(&mut rng, None, None).code);
        }
        assert_eq!(codes.len(), scenarios::SCENARIOS.len());
    }

    #[test]
    fn test_forced_scenario_wins() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut state = BatchState::new(anchor());
        let s = state.next_scenario(&mut rng, Some("N39.0"), None);
        assert_eq!(s.code, "N39.0");
    }

    #[test]
    fn test_pick_unique_exhausts_pool_before_reuse() {
        let mut rng = StdRng::seed_from_u64(6);
        let mut state = BatchState::new(anchor());
        let options = &["a", "b", "c"];
        let mut seen = HashSet::new();
        for _ in 0..3 {
            seen.insert(state.pick_unique(&mut rng, "k", options));
        }
        assert_eq!(seen.len(), 3);
    }
}
