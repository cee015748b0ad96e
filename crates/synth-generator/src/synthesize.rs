//! Field value synthesis.
//!
//! Maps one classified role onto its replacement text. All correlated
//! choices were fixed when the [`DocumentProfile`] was resolved; this
//! module is mostly lookups, with narrative text as the one place fresh
//! randomness is still drawn.

use crate::context::{hl7_timestamp, BatchState, DocumentProfile};
use crate::ips::IpsBundle;
use crate::narrative::{self, Investigations};
use rand::Rng;
use synth_core::FieldRole;

/// Per-document value source for classified roles.
pub struct FieldSynthesizer<'a> {
    pub profile: &'a DocumentProfile,
    pub investigations: &'a Investigations,
    pub ips: Option<&'a IpsBundle>,
}

impl<'a> FieldSynthesizer<'a> {
    /// Replacement text for one role. Absent profile entries (an instance
    /// index beyond what was resolved) synthesize to an empty string; the
    /// profile is resolved from the same classification that produced the
    /// roles, so that does not happen in practice.
    pub fn value<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        state: &mut BatchState,
        role: &FieldRole,
    ) -> String {
        let p = self.profile;
        match role {
            FieldRole::MessageTimestamp => hl7_timestamp(&p.message_time),
            FieldRole::MessageControlId => p.message_id.clone(),
            FieldRole::SendingFacility => p.sending_hospital.to_string(),
            FieldRole::ReceivingProviderName => self.receiving_provider(),
            FieldRole::ReceivingProviderId => format!("{}.1234", p.gp_id),

            FieldRole::ProviderFamilyName => p.gp.family.to_uppercase(),
            FieldRole::ProviderGivenName => p.gp.given.clone(),
            FieldRole::ProviderId => p.gp_id.clone(),
            FieldRole::ProviderIdName => self.receiving_provider(),
            FieldRole::ProviderAddressLine { instance } => self
                .provider_address(*instance, |a| a.line1.clone()),
            FieldRole::ProviderTown { instance } => {
                self.provider_address(*instance, |a| a.town.clone())
            }
            FieldRole::ProviderCounty { instance } => {
                self.provider_address(*instance, |a| a.county.clone())
            }
            FieldRole::ProviderPostcode { instance } => {
                self.provider_address(*instance, |a| a.eircode.clone())
            }
            FieldRole::ProviderPhone { instance } => p
                .provider_phones
                .get(*instance)
                .cloned()
                .unwrap_or_default(),

            FieldRole::PatientFamilyName => p.patient.family.clone(),
            FieldRole::PatientGivenName => p.patient.given.clone(),
            FieldRole::PatientBirthDate => p.patient.birth_date.clone(),
            FieldRole::PatientSex => p.patient.sex.clone(),
            FieldRole::PatientNationalId => p.patient.national_id.clone(),
            FieldRole::PatientMedicalRecordNumber => p.patient.mrn.clone(),
            FieldRole::PatientAddressLine => p.patient_address.line1.clone(),
            FieldRole::PatientTown => p.patient_address.town.clone(),
            FieldRole::PatientCounty => p.patient_address.county.clone(),
            FieldRole::PatientPostcode => p.patient_address.eircode.clone(),
            FieldRole::PatientPhone => p.patient_phone.clone(),

            FieldRole::VisitNumber => p.visit_number.clone(),
            FieldRole::AdmitTimestamp => hl7_timestamp(&p.admit),
            FieldRole::DischargeTimestamp => hl7_timestamp(&p.discharge),
            FieldRole::DischargeDisposition => p.discharge_disposition.to_string(),
            FieldRole::DischargeDestinationId => p.destination_id.clone(),
            FieldRole::CareFacility => p.care_hospital.to_string(),

            FieldRole::AttendingDoctorId => format!("{} 1", p.care_hospital.to_uppercase()),
            FieldRole::AttendingDoctorFamily | FieldRole::ReferringDoctorFamily => {
                p.doctor.family.clone()
            }
            FieldRole::AttendingDoctorGiven | FieldRole::ReferringDoctorGiven => {
                p.doctor.given.clone()
            }
            FieldRole::AttendingDoctorPrefix | FieldRole::ReferringDoctorPrefix => {
                p.doctor.prefix.clone()
            }
            // PV1-8 carries the same clinician without a local ID.
            FieldRole::ReferringDoctorId => " ".to_string(),
            FieldRole::ConsultingDoctorShortCode => {
                p.doctor.family.chars().take(4).collect()
            }
            FieldRole::ConsultingDoctorCombinedName => {
                format!("{} {}", p.doctor.family, p.doctor.given)
            }

            FieldRole::DiagnosisSetId { instance } => (instance + 1).to_string(),
            FieldRole::DiagnosisCode { instance } => {
                self.diagnosis(*instance, |d| d.code.clone())
            }
            FieldRole::DiagnosisDisplay { instance }
            | FieldRole::DiagnosisDescription { instance } => {
                self.diagnosis(*instance, |d| d.display.clone())
            }
            FieldRole::DiagnosisCodeSystem { instance } => {
                self.diagnosis(*instance, |d| d.system.clone())
            }

            FieldRole::AllergySetId { instance } => (instance + 1).to_string(),
            FieldRole::AllergyCategoryCode { instance } => {
                self.allergy(*instance, |a| a.category_code.clone())
            }
            FieldRole::AllergyCategoryText { instance } => {
                self.allergy(*instance, |a| a.category_text.clone())
            }
            FieldRole::AllergyAllergen { instance } => {
                self.allergy(*instance, |a| a.allergen.clone())
            }
            FieldRole::AllergySeverity { instance } => {
                self.allergy(*instance, |a| a.severity.clone())
            }
            FieldRole::AllergyReaction { instance } => {
                self.allergy(*instance, |a| a.reaction.clone())
            }

            FieldRole::ProcedureCode { instance } => {
                self.procedure(*instance, |e| e.code.to_string())
            }
            FieldRole::ProcedureLabel { instance } => {
                self.procedure(*instance, |e| e.label.to_string())
            }
            FieldRole::ProcedureCodeSystem { instance } => {
                self.procedure(*instance, |e| e.system.to_string())
            }
            FieldRole::ProcedureDescription { instance } => {
                self.procedure(*instance, |e| e.description.to_string())
            }

            FieldRole::ObservationFillerId { group } => {
                format!("{}{:02}", p.filler_base, group + 1)
            }
            FieldRole::ObservationTimestamp => hl7_timestamp(&p.discharge),

            FieldRole::NarrativeText { section, heading } => {
                self.narrative(rng, state, section, heading)
            }

            FieldRole::Cleared => String::new(),
        }
    }

    fn receiving_provider(&self) -> String {
        format!(
            "{}, {}",
            self.profile.gp.family.to_uppercase(),
            self.profile.gp.given
        )
    }

    fn provider_address(
        &self,
        instance: usize,
        f: impl Fn(&crate::context::LocaleAddress) -> String,
    ) -> String {
        self.profile
            .provider_addresses
            .get(instance)
            .map(f)
            .unwrap_or_default()
    }

    fn diagnosis(&self, instance: usize, f: impl Fn(&crate::context::Diagnosis) -> String) -> String {
        self.profile.diagnoses.get(instance).map(f).unwrap_or_default()
    }

    fn allergy(&self, instance: usize, f: impl Fn(&crate::context::Allergy) -> String) -> String {
        self.profile.allergies.get(instance).map(f).unwrap_or_default()
    }

    fn procedure(
        &self,
        instance: usize,
        f: impl Fn(&crate::scenarios::ProcedureEntry) -> String,
    ) -> String {
        let procedures = self.profile.scenario.procedures;
        if procedures.is_empty() {
            return String::new();
        }
        f(&procedures[instance % procedures.len()])
    }

    fn narrative<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        state: &mut BatchState,
        section: &str,
        heading: &str,
    ) -> String {
        // Investigation groups keep their per-row headings; the result text
        // is matched to whichever heading the template carries.
        if narrative::is_investigations_section(section) {
            return narrative::investigation_result(self.profile.scenario, heading);
        }
        let label = [heading, section]
            .into_iter()
            .find(|l| !l.trim().is_empty())
            .unwrap_or("Narrative");
        let lowered = label.to_lowercase();
        if lowered.contains("investig") || lowered.contains("evaluat") {
            return self.investigations.narrative.clone();
        }
        narrative::section_text(rng, state, self.profile, self.ips, label)
    }
}
