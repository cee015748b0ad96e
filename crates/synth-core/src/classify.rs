//! Template classification.
//!
//! Runs once per template and produces a role assignment for every
//! regenerated node plus the enumerated repeat structure of the template's
//! repeating groups. The walk is read-only; its cost is paid once and the
//! result is reused for the whole batch.
//!
//! Classification rules:
//! - Fields carrying code/heading semantics (OBR-4 section headings, OBX-3
//!   labels, OBX-2 data types, the fixed code-table tags of DG1/AL1/PR1)
//!   get no assignment and are copied verbatim into every output.
//! - Demographic, contact, timing and narrative fields become VALUE
//!   assignments with a [`FieldRole`].
//! - Repeating segments (PRD, DG1, AL1, procedure and observation groups)
//!   keep their template instance count and order; per-instance roles carry
//!   the instance index.
//! - Fields absent from the template are simply skipped; the template's
//!   shape decides what exists.

use crate::error::TemplateShapeError;
use crate::roles::{FieldEncoding, FieldRole};
use crate::template::TemplateDocument;
use crate::tree::{find_descendants, find_first, NodePath, XmlElement};
use tracing::debug;

/// One VALUE node: where it lives and what to generate there.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub path: NodePath,
    pub role: FieldRole,
}

/// Instance count of one repeating group, as found in the template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepeatGroup {
    pub segment: &'static str,
    pub count: usize,
}

/// Classification result for one template, reused across a batch.
#[derive(Debug, Clone)]
pub struct Classification {
    /// VALUE assignments in document order.
    pub assignments: Vec<Assignment>,
    /// Repeat structure of the template's repeating groups.
    pub groups: Vec<RepeatGroup>,
    /// Detected encoding of the allergy severity field, if any AL1-4 exists.
    pub severity_encoding: Option<FieldEncoding>,
    /// Detected encoding of the allergy reaction field, if any AL1-5 exists.
    pub reaction_encoding: Option<FieldEncoding>,
}

impl Classification {
    /// Classify a parsed template.
    ///
    /// Fails with [`TemplateShapeError::MissingSegment`] when MSH, PID or
    /// PV1 is absent, and with [`TemplateShapeError::MixedEncoding`] when
    /// AL1 instances disagree on the encoding of a dual-encoding field.
    pub fn classify(template: &TemplateDocument) -> Result<Self, TemplateShapeError> {
        let root = template.root();
        let mut c = Classifier::default();

        c.classify_msh(root)?;
        c.classify_providers(root);
        c.classify_pid(root)?;
        c.classify_pv1(root)?;
        c.classify_diagnoses(root);
        c.classify_allergies(root)?;
        c.classify_procedures(root);
        c.classify_observations(root);

        debug!(
            assignments = c.assignments.len(),
            groups = c.groups.len(),
            "template classified"
        );

        Ok(Classification {
            assignments: c.assignments,
            groups: c.groups,
            severity_encoding: c.severity_encoding,
            reaction_encoding: c.reaction_encoding,
        })
    }

    /// Instance count recorded for a repeating group segment.
    pub fn group_count(&self, segment: &str) -> usize {
        self.groups
            .iter()
            .find(|g| g.segment == segment)
            .map(|g| g.count)
            .unwrap_or(0)
    }
}

#[derive(Default)]
struct Classifier {
    assignments: Vec<Assignment>,
    groups: Vec<RepeatGroup>,
    severity_encoding: Option<FieldEncoding>,
    reaction_encoding: Option<FieldEncoding>,
}

impl Classifier {
    /// Record a role for the leaf reached by `components` under `base`,
    /// skipping silently when the template does not carry the field.
    fn assign(&mut self, base: &NodePath, element: &XmlElement, components: &[&str], role: FieldRole) {
        if let Some(path) = leaf_path(base, element, components) {
            self.assignments.push(Assignment { path, role });
        }
    }

    fn classify_msh(&mut self, root: &XmlElement) -> Result<(), TemplateShapeError> {
        let (path, msh) =
            find_first(root, "MSH").ok_or(TemplateShapeError::MissingSegment("MSH"))?;
        self.assign(&path, msh, &["MSH.7", "TS.1"], FieldRole::MessageTimestamp);
        self.assign(&path, msh, &["MSH.10"], FieldRole::MessageControlId);
        self.assign(&path, msh, &["MSH.4", "HD.1"], FieldRole::SendingFacility);
        self.assign(&path, msh, &["MSH.6", "HD.1"], FieldRole::ReceivingProviderName);
        self.assign(&path, msh, &["MSH.6", "HD.2"], FieldRole::ReceivingProviderId);
        Ok(())
    }

    fn classify_providers(&mut self, root: &XmlElement) {
        let prds = find_descendants(root, "PRD");
        self.groups.push(RepeatGroup {
            segment: "PRD",
            count: prds.len(),
        });
        for (instance, (path, prd)) in prds.into_iter().enumerate() {
            self.assign(&path, prd, &["PRD.2", "XPN.1", "FN.1"], FieldRole::ProviderFamilyName);
            self.assign(&path, prd, &["PRD.2", "XPN.2"], FieldRole::ProviderGivenName);
            self.assign(&path, prd, &["PRD.7", "PI.1"], FieldRole::ProviderId);
            self.assign(&path, prd, &["PRD.7", "PI.3"], FieldRole::ProviderIdName);
            self.assign(
                &path,
                prd,
                &["PRD.3", "XAD.1", "SAD.1"],
                FieldRole::ProviderAddressLine { instance },
            );
            self.assign(&path, prd, &["PRD.3", "XAD.2"], FieldRole::ProviderTown { instance });
            self.assign(&path, prd, &["PRD.3", "XAD.3"], FieldRole::ProviderCounty { instance });
            self.assign(&path, prd, &["PRD.3", "XAD.5"], FieldRole::ProviderPostcode { instance });
            self.assign(&path, prd, &["PRD.5", "XTN.1"], FieldRole::ProviderPhone { instance });
        }
    }

    fn classify_pid(&mut self, root: &XmlElement) -> Result<(), TemplateShapeError> {
        let (path, pid) =
            find_first(root, "PID").ok_or(TemplateShapeError::MissingSegment("PID"))?;
        self.assign(&path, pid, &["PID.5", "XPN.1", "FN.1"], FieldRole::PatientFamilyName);
        self.assign(&path, pid, &["PID.5", "XPN.2"], FieldRole::PatientGivenName);
        self.assign(&path, pid, &["PID.7", "TS.1"], FieldRole::PatientBirthDate);
        self.assign(&path, pid, &["PID.8"], FieldRole::PatientSex);

        // PID-3 repetitions: the IHI repetition is recognised by its CX-5
        // qualifier; everything else gets the MRN plus the care hospital as
        // assigning authority.
        for (index, rep) in pid.children_named("PID.3") {
            let rep_path = path.child(index);
            let is_ihi = rep
                .child("CX.5")
                .map(|(_, q)| q.text().trim() == "IHINumber")
                .unwrap_or(false);
            if is_ihi {
                self.assign(&rep_path, rep, &["CX.1"], FieldRole::PatientNationalId);
            } else {
                self.assign(&rep_path, rep, &["CX.1"], FieldRole::PatientMedicalRecordNumber);
                self.assign(&rep_path, rep, &["CX.4", "HD.1"], FieldRole::CareFacility);
            }
        }

        self.assign(
            &path,
            pid,
            &["PID.11", "XAD.1", "SAD.1"],
            FieldRole::PatientAddressLine,
        );
        self.assign(&path, pid, &["PID.11", "XAD.2"], FieldRole::PatientTown);
        self.assign(&path, pid, &["PID.11", "XAD.3"], FieldRole::PatientCounty);
        self.assign(&path, pid, &["PID.11", "XAD.5"], FieldRole::PatientPostcode);
        self.assign(&path, pid, &["PID.13", "XTN.1"], FieldRole::PatientPhone);
        Ok(())
    }

    fn classify_pv1(&mut self, root: &XmlElement) -> Result<(), TemplateShapeError> {
        let (path, pv1) =
            find_first(root, "PV1").ok_or(TemplateShapeError::MissingSegment("PV1"))?;
        self.assign(&path, pv1, &["PV1.19", "CX.1"], FieldRole::VisitNumber);
        self.assign(&path, pv1, &["PV1.44", "TS.1"], FieldRole::AdmitTimestamp);
        self.assign(&path, pv1, &["PV1.45", "TS.1"], FieldRole::DischargeTimestamp);
        self.assign(&path, pv1, &["PV1.36"], FieldRole::DischargeDisposition);
        self.assign(&path, pv1, &["PV1.3", "PL.9"], FieldRole::CareFacility);

        // PV1-37 is another dual-shape field: some templates nest a DLD-1
        // component, others carry the code as plain text.
        if let Some((index, dest)) = pv1.child("PV1.37") {
            let dest_path = path.child(index);
            if dest.child("DLD.1").is_some() {
                self.assign(&dest_path, dest, &["DLD.1"], FieldRole::DischargeDestinationId);
            } else {
                self.assignments.push(Assignment {
                    path: dest_path,
                    role: FieldRole::DischargeDestinationId,
                });
            }
        }

        if let Some((index, attending)) = pv1.child("PV1.7") {
            let base = path.child(index);
            self.assign(&base, attending, &["XCN.1"], FieldRole::AttendingDoctorId);
            self.assign(&base, attending, &["XCN.2", "FN.1"], FieldRole::AttendingDoctorFamily);
            self.assign(&base, attending, &["XCN.3"], FieldRole::AttendingDoctorGiven);
            self.assign(&base, attending, &["XCN.6"], FieldRole::AttendingDoctorPrefix);
        }
        if let Some((index, referring)) = pv1.child("PV1.8") {
            let base = path.child(index);
            self.assign(&base, referring, &["XCN.1"], FieldRole::ReferringDoctorId);
            self.assign(&base, referring, &["XCN.2", "FN.1"], FieldRole::ReferringDoctorFamily);
            self.assign(&base, referring, &["XCN.3"], FieldRole::ReferringDoctorGiven);
            self.assign(&base, referring, &["XCN.6"], FieldRole::ReferringDoctorPrefix);
        }
        if let Some((index, consulting)) = pv1.child("PV1.9") {
            let base = path.child(index);
            self.assign(&base, consulting, &["XCN.1"], FieldRole::ConsultingDoctorShortCode);
            self.assign(
                &base,
                consulting,
                &["XCN.2", "FN.1"],
                FieldRole::ConsultingDoctorCombinedName,
            );
            self.assign(&base, consulting, &["XCN.3"], FieldRole::Cleared);
            self.assign(&base, consulting, &["XCN.6"], FieldRole::Cleared);
        }
        Ok(())
    }

    fn classify_diagnoses(&mut self, root: &XmlElement) {
        let dg1s = find_descendants(root, "DG1");
        self.groups.push(RepeatGroup {
            segment: "DG1",
            count: dg1s.len(),
        });
        for (instance, (path, dg1)) in dg1s.into_iter().enumerate() {
            self.assign(&path, dg1, &["DG1.1"], FieldRole::DiagnosisSetId { instance });
            self.assign(&path, dg1, &["DG1.3", "CE.1"], FieldRole::DiagnosisCode { instance });
            self.assign(&path, dg1, &["DG1.3", "CE.2"], FieldRole::DiagnosisDisplay { instance });
            self.assign(&path, dg1, &["DG1.3", "CE.3"], FieldRole::DiagnosisCodeSystem { instance });
            self.assign(&path, dg1, &["DG1.4"], FieldRole::DiagnosisDescription { instance });
            // The diagnosing-clinician components carry template values that
            // must not leak into generated output.
            self.assign(&path, dg1, &["DG1.16", "XCN.2", "FN.1"], FieldRole::Cleared);
            self.assign(&path, dg1, &["DG1.16", "XCN.3"], FieldRole::Cleared);
            self.assign(&path, dg1, &["DG1.16", "XCN.6"], FieldRole::Cleared);
        }
    }

    fn classify_allergies(&mut self, root: &XmlElement) -> Result<(), TemplateShapeError> {
        let al1s = find_descendants(root, "AL1");
        self.groups.push(RepeatGroup {
            segment: "AL1",
            count: al1s.len(),
        });
        for (instance, (path, al1)) in al1s.into_iter().enumerate() {
            // Set id: coded or plain depending on template shape.
            if let Some((index, set_id)) = al1.child("AL1.1") {
                if set_id.child("CE.1").is_some() {
                    self.assign(&path.child(index), set_id, &["CE.1"], FieldRole::AllergySetId { instance });
                } else {
                    self.assignments.push(Assignment {
                        path: path.child(index),
                        role: FieldRole::AllergySetId { instance },
                    });
                }
            }
            self.assign(&path, al1, &["AL1.2", "CE.1"], FieldRole::AllergyCategoryCode { instance });
            self.assign(&path, al1, &["AL1.2", "CE.2"], FieldRole::AllergyCategoryText { instance });
            if leaf_path(&path, al1, &["AL1.3", "CE.2"]).is_some() {
                self.assign(&path, al1, &["AL1.3", "CE.2"], FieldRole::AllergyAllergen { instance });
            } else {
                self.assign(&path, al1, &["AL1.3"], FieldRole::AllergyAllergen { instance });
            }

            let severity = self.classify_dual(
                &path,
                al1,
                "AL1.4",
                FieldRole::AllergySeverity { instance },
            );
            merge_encoding(&mut self.severity_encoding, severity, "AL1.4")?;

            let reaction = self.classify_dual(
                &path,
                al1,
                "AL1.5",
                FieldRole::AllergyReaction { instance },
            );
            merge_encoding(&mut self.reaction_encoding, reaction, "AL1.5")?;
        }
        Ok(())
    }

    /// Classify a field that supports plain-text and coded encodings.
    /// Returns the encoding found, or None when the field is absent.
    fn classify_dual(
        &mut self,
        base: &NodePath,
        segment: &XmlElement,
        field: &str,
        role: FieldRole,
    ) -> Option<FieldEncoding> {
        let (index, element) = segment.child(field)?;
        let field_path = base.child(index);
        if element.child("CE.2").is_some() {
            self.assign(&field_path, element, &["CE.2"], role);
            Some(FieldEncoding::Coded)
        } else {
            self.assignments.push(Assignment {
                path: field_path,
                role,
            });
            Some(FieldEncoding::Plain)
        }
    }

    fn classify_procedures(&mut self, root: &XmlElement) {
        let groups = find_suffix(root, ".PROCEDURE");
        self.groups.push(RepeatGroup {
            segment: "PROCEDURE",
            count: groups.len(),
        });
        for (instance, (group_path, group)) in groups.into_iter().enumerate() {
            let Some((rel, pr1)) = find_first(group, "PR1") else {
                continue;
            };
            let path = group_path.join(&rel);
            self.assign(&path, pr1, &["PR1.3", "CE.1"], FieldRole::ProcedureCode { instance });
            self.assign(&path, pr1, &["PR1.3", "CE.2"], FieldRole::ProcedureLabel { instance });
            self.assign(&path, pr1, &["PR1.3", "CE.3"], FieldRole::ProcedureCodeSystem { instance });
            self.assign(&path, pr1, &["PR1.4"], FieldRole::ProcedureDescription { instance });
        }
    }

    fn classify_observations(&mut self, root: &XmlElement) {
        let groups = find_suffix(root, ".OBSERVATION");
        self.groups.push(RepeatGroup {
            segment: "OBSERVATION",
            count: groups.len(),
        });

        let mut obx_total = 0;
        for (group_index, (group_path, group)) in groups.into_iter().enumerate() {
            let section = find_first(group, "OBR")
                .and_then(|(_, obr)| obr.child("OBR.4"))
                .and_then(|(_, ce)| ce.child("CE.2"))
                .map(|(_, label)| label.text().trim().to_string())
                .unwrap_or_default();

            if let Some((rel, obr)) = find_first(group, "OBR") {
                let path = group_path.join(&rel);
                self.assign(
                    &path,
                    obr,
                    &["OBR.3", "EI.1"],
                    FieldRole::ObservationFillerId { group: group_index },
                );
                self.assign(&path, obr, &["OBR.7", "TS.1"], FieldRole::ObservationTimestamp);
                self.assign(&path, obr, &["OBR.22", "TS.1"], FieldRole::ObservationTimestamp);
            }

            for (rel, obx) in find_descendants(group, "OBX") {
                obx_total += 1;
                // Only free-text observations are narrative VALUE nodes;
                // numeric and coded results keep their template content.
                let data_type = obx
                    .child("OBX.2")
                    .map(|(_, dt)| dt.text().trim().to_uppercase())
                    .unwrap_or_default();
                if !matches!(data_type.as_str(), "FT" | "TX" | "ST") {
                    continue;
                }
                let heading = obx
                    .child("OBX.3")
                    .and_then(|(_, ce)| ce.child("CE.2"))
                    .map(|(_, label)| label.text().trim().to_string())
                    .unwrap_or_default();
                let path = group_path.join(&rel);
                self.assign(
                    &path,
                    obx,
                    &["OBX.5"],
                    FieldRole::NarrativeText {
                        section: section.clone(),
                        heading,
                    },
                );
            }
        }

        self.groups.push(RepeatGroup {
            segment: "OBX",
            count: obx_total,
        });
    }
}

fn merge_encoding(
    slot: &mut Option<FieldEncoding>,
    found: Option<FieldEncoding>,
    field: &'static str,
) -> Result<(), TemplateShapeError> {
    match (slot.as_ref(), found) {
        (_, None) => Ok(()),
        (None, Some(encoding)) => {
            *slot = Some(encoding);
            Ok(())
        }
        (Some(existing), Some(encoding)) if *existing == encoding => Ok(()),
        _ => Err(TemplateShapeError::MixedEncoding(field)),
    }
}

/// Walk `components` child-by-child under `element`, returning the full path.
fn leaf_path(base: &NodePath, element: &XmlElement, components: &[&str]) -> Option<NodePath> {
    let mut path = base.clone();
    let mut current = element;
    for name in components {
        let (index, child) = current.child(name)?;
        path = path.child(index);
        current = child;
    }
    Some(path)
}

/// Descendant elements whose local name ends with `suffix` (group wrappers
/// like `REF_I12.PROCEDURE` regardless of the message name prefix).
fn find_suffix<'a>(root: &'a XmlElement, suffix: &str) -> Vec<(NodePath, &'a XmlElement)> {
    let mut found = Vec::new();
    collect_suffix(root, &NodePath::root(), suffix, &mut found);
    found
}

fn collect_suffix<'a>(
    element: &'a XmlElement,
    path: &NodePath,
    suffix: &str,
    found: &mut Vec<(NodePath, &'a XmlElement)>,
) {
    for (index, child) in element.child_elements() {
        let child_path = path.child(index);
        if child.local_name().ends_with(suffix) {
            found.push((child_path.clone(), child));
        } else {
            collect_suffix(child, &child_path, suffix, found);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::SAMPLE_TEMPLATE;

    fn classified() -> Classification {
        let template = TemplateDocument::parse(SAMPLE_TEMPLATE).unwrap();
        Classification::classify(&template).unwrap()
    }

    #[test]
    fn test_repeat_structure() {
        let c = classified();
        assert_eq!(c.group_count("PRD"), 2);
        assert_eq!(c.group_count("DG1"), 2);
        assert_eq!(c.group_count("AL1"), 1);
        assert_eq!(c.group_count("PROCEDURE"), 2);
        assert_eq!(c.group_count("OBSERVATION"), 3);
        assert_eq!(c.group_count("OBX"), 5);
    }

    #[test]
    fn test_missing_required_segment() {
        let without_pv1 = SAMPLE_TEMPLATE
            .replace("<PV1>", "<PV1X>")
            .replace("</PV1>", "</PV1X>");
        let template = TemplateDocument::parse(&without_pv1).unwrap();
        let err = Classification::classify(&template).unwrap_err();
        assert!(matches!(err, TemplateShapeError::MissingSegment("PV1")));
    }

    #[test]
    fn test_dual_encoding_detection() {
        let c = classified();
        // Fixture uses a coded severity and a plain-text reaction.
        assert_eq!(c.severity_encoding, Some(FieldEncoding::Coded));
        assert_eq!(c.reaction_encoding, Some(FieldEncoding::Plain));

        // The severity assignment points at the CE.2 component, the
        // reaction assignment at the AL1.5 element itself.
        let template = TemplateDocument::parse(SAMPLE_TEMPLATE).unwrap();
        for a in &c.assignments {
            match &a.role {
                FieldRole::AllergySeverity { .. } => {
                    assert_eq!(a.path.resolve(template.root()).unwrap().local_name(), "CE.2");
                }
                FieldRole::AllergyReaction { .. } => {
                    assert_eq!(a.path.resolve(template.root()).unwrap().local_name(), "AL1.5");
                }
                _ => {}
            }
        }
    }

    #[test]
    fn test_mixed_encoding_rejected() {
        // Second AL1 uses the plain form for severity while the first is coded.
        let second_al1 = r#"<AL1>
    <AL1.1>2</AL1.1>
    <AL1.2>
      <CE.1>FA</CE.1>
      <CE.2>FOOD</CE.2>
    </AL1.2>
    <AL1.3>
      <CE.2>Peanuts</CE.2>
    </AL1.3>
    <AL1.4>SEVERE</AL1.4>
    <AL1.5>Anaphylaxis</AL1.5>
  </AL1>
  <REF_I12.PROCEDURE>"#;
        let mixed = SAMPLE_TEMPLATE.replacen("<REF_I12.PROCEDURE>", second_al1, 1);
        let template = TemplateDocument::parse(&mixed).unwrap();
        let err = Classification::classify(&template).unwrap_err();
        assert!(matches!(err, TemplateShapeError::MixedEncoding("AL1.4")));
    }

    #[test]
    fn test_headings_are_not_assigned() {
        let c = classified();
        let template = TemplateDocument::parse(SAMPLE_TEMPLATE).unwrap();
        // No assignment may point at an OBR-4 or OBX-3 heading component, or
        // at an OBX-2 data type tag.
        for a in &c.assignments {
            let node = a.path.resolve(template.root()).unwrap();
            let text = node.text();
            assert_ne!(text, "Discharge Summary");
            assert_ne!(text, "Hospital Course");
            assert_ne!(text, "Evaluation / Investigations");
            assert_ne!(node.local_name(), "OBX.2");
        }
    }

    #[test]
    fn test_numeric_obx_not_regenerated() {
        let c = classified();
        // The NM-typed OBX in the evaluation group keeps its value: only two
        // of the three OBX rows in that group are narrative.
        let narrative = c
            .assignments
            .iter()
            .filter(|a| matches!(a.role, FieldRole::NarrativeText { .. }))
            .count();
        assert_eq!(narrative, 4); // 1 summary + 1 course + 2 eval rows
    }

    #[test]
    fn test_ihi_repetition_recognised() {
        let c = classified();
        let national = c
            .assignments
            .iter()
            .filter(|a| a.role == FieldRole::PatientNationalId)
            .count();
        let mrn = c
            .assignments
            .iter()
            .filter(|a| a.role == FieldRole::PatientMedicalRecordNumber)
            .count();
        assert_eq!(national, 1);
        assert_eq!(mrn, 1);
    }

    #[test]
    fn test_every_assignment_resolves_to_leaf() {
        let c = classified();
        let template = TemplateDocument::parse(SAMPLE_TEMPLATE).unwrap();
        for a in &c.assignments {
            let node = a.path.resolve(template.root()).unwrap_or_else(|| {
                panic!("assignment {:?} does not resolve", a.role);
            });
            assert!(node.is_leaf(), "assignment {:?} points at a non-leaf", a.role);
        }
    }
}
