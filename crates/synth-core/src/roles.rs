//! Node roles assigned by the template classifier.
//!
//! Every leaf the classifier touches gets exactly one role. Structural
//! nodes and identifier-preserved nodes (section headings, observation
//! labels, code-table tags) receive no assignment at all and are therefore
//! copied verbatim into every generated document.

/// Which of the two template encodings a dual-encoding field uses.
///
/// The allergy severity and reaction fields can be written either as plain
/// text (`<AL1.4>MODERATE</AL1.4>`) or in coded form
/// (`<AL1.4><CE.2>MODERATE</CE.2></AL1.4>`). The classifier detects the
/// form from the template and the mutator preserves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldEncoding {
    /// Value carried directly as element text.
    Plain,
    /// Value carried in a CE.2 child component.
    Coded,
}

/// Semantic role of a regenerated (VALUE) node.
///
/// Repeating-group roles carry the zero-based instance index so the field
/// synthesizer can keep per-instance values independent while drawing
/// correlated fields (for example a diagnosis code and its description)
/// from the same resolved choice.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldRole {
    // MSH
    MessageTimestamp,
    MessageControlId,
    SendingFacility,
    ReceivingProviderName,
    ReceivingProviderId,

    // PRD provider contacts (repeating)
    ProviderFamilyName,
    ProviderGivenName,
    ProviderId,
    ProviderIdName,
    ProviderAddressLine { instance: usize },
    ProviderTown { instance: usize },
    ProviderCounty { instance: usize },
    ProviderPostcode { instance: usize },
    ProviderPhone { instance: usize },

    // PID
    PatientFamilyName,
    PatientGivenName,
    PatientBirthDate,
    PatientSex,
    PatientNationalId,
    PatientMedicalRecordNumber,
    PatientAddressLine,
    PatientTown,
    PatientCounty,
    PatientPostcode,
    PatientPhone,

    // PV1
    VisitNumber,
    AdmitTimestamp,
    DischargeTimestamp,
    DischargeDisposition,
    DischargeDestinationId,
    CareFacility,
    AttendingDoctorId,
    AttendingDoctorFamily,
    AttendingDoctorGiven,
    AttendingDoctorPrefix,
    ReferringDoctorId,
    ReferringDoctorFamily,
    ReferringDoctorGiven,
    ReferringDoctorPrefix,
    ConsultingDoctorShortCode,
    ConsultingDoctorCombinedName,

    // DG1 diagnoses (repeating)
    DiagnosisSetId { instance: usize },
    DiagnosisCode { instance: usize },
    DiagnosisDisplay { instance: usize },
    DiagnosisCodeSystem { instance: usize },
    DiagnosisDescription { instance: usize },

    // AL1 allergies (repeating)
    AllergySetId { instance: usize },
    AllergyCategoryCode { instance: usize },
    AllergyCategoryText { instance: usize },
    AllergyAllergen { instance: usize },
    AllergySeverity { instance: usize },
    AllergyReaction { instance: usize },

    // PR1 procedures (one per procedure group)
    ProcedureCode { instance: usize },
    ProcedureLabel { instance: usize },
    ProcedureCodeSystem { instance: usize },
    ProcedureDescription { instance: usize },

    // OBR/OBX observation groups (repeating)
    ObservationFillerId { group: usize },
    ObservationTimestamp,
    NarrativeText { section: String, heading: String },

    /// Template carries a placeholder that must be blanked in output
    /// (e.g. the diagnosing-clinician name components in DG1-16).
    Cleared,
}
