//! Optional IPS (International Patient Summary) bundle ingestion.
//!
//! A FHIR JSON bundle can seed the patient identity, problem list,
//! allergies and discharge medications of every generated document.
//! Anything the bundle does not carry falls back to synthetic generation.

use serde_json::Value;
use std::path::Path;
use thiserror::Error;

/// Errors loading an IPS bundle.
#[derive(Debug, Error)]
pub enum IpsError {
    /// Error reading the bundle file
    #[error("Failed to read IPS bundle: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing the bundle JSON
    #[error("Failed to parse IPS bundle: {0}")]
    Json(#[from] serde_json::Error),
}

/// First coding of a CodeableConcept, with the system mapped onto the
/// short code tables used in HL7 v2 CE fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpsCoding {
    pub code: String,
    pub display: String,
    pub system: String,
}

/// Patient identity extracted from the bundle's Patient resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpsPatient {
    pub given: String,
    pub family: String,
    /// HL7 date, `YYYYMMDD`.
    pub birth_date: String,
    /// `M`, `F` or `U`.
    pub sex: String,
}

/// The subset of an IPS bundle the generator consumes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IpsBundle {
    pub patient: Option<IpsPatient>,
    pub conditions: Vec<IpsCoding>,
    pub allergies: Vec<IpsCoding>,
    pub medications: Vec<String>,
}

impl IpsBundle {
    /// Load a bundle from a FHIR JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, IpsError> {
        let json = std::fs::read_to_string(path)?;
        let value: Value = serde_json::from_str(&json)?;
        Ok(Self::from_value(&value))
    }

    /// Extract the consumed subset from a parsed bundle.
    pub fn from_value(bundle: &Value) -> Self {
        let mut out = Self::default();
        let entries = bundle
            .get("entry")
            .and_then(Value::as_array)
            .map(|v| v.as_slice())
            .unwrap_or(&[]);

        for entry in entries {
            let Some(resource) = entry.get("resource") else {
                continue;
            };
            match resource.get("resourceType").and_then(Value::as_str) {
                Some("Patient") if out.patient.is_none() => {
                    out.patient = Some(patient_from(resource));
                }
                Some("Condition") => {
                    out.conditions.push(first_coding(resource.get("code")));
                }
                Some("AllergyIntolerance") => {
                    out.allergies.push(first_coding(resource.get("code")));
                }
                Some("MedicationStatement") => {
                    let coding = first_coding(resource.get("medicationCodeableConcept"));
                    if !coding.display.is_empty() {
                        out.medications.push(coding.display);
                    }
                }
                _ => {}
            }
        }
        out
    }
}

fn patient_from(resource: &Value) -> IpsPatient {
    let name = resource
        .get("name")
        .and_then(Value::as_array)
        .and_then(|names| names.first());
    let given = name
        .and_then(|n| n.get("given"))
        .and_then(Value::as_array)
        .and_then(|g| g.first())
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();
    let family = name
        .and_then(|n| n.get("family"))
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();
    let birth_date = resource
        .get("birthDate")
        .and_then(Value::as_str)
        .unwrap_or("1970-01-01")
        .replace('-', "");
    let sex = match resource
        .get("gender")
        .and_then(Value::as_str)
        .unwrap_or("")
        .chars()
        .next()
    {
        Some('m') | Some('M') => "M",
        Some('f') | Some('F') => "F",
        _ => "U",
    }
    .to_string();

    IpsPatient {
        given,
        family,
        birth_date,
        sex,
    }
}

/// First coding of a CodeableConcept value, tolerating absent pieces.
pub fn first_coding(codeable: Option<&Value>) -> IpsCoding {
    let Some(codeable) = codeable else {
        return IpsCoding {
            code: String::new(),
            display: String::new(),
            system: String::new(),
        };
    };
    let text = codeable
        .get("text")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();
    let coding = codeable
        .get("coding")
        .and_then(Value::as_array)
        .and_then(|c| c.first());
    let Some(coding) = coding else {
        return IpsCoding {
            code: String::new(),
            display: text,
            system: String::new(),
        };
    };

    let code = coding
        .get("code")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();
    let display = coding
        .get("display")
        .and_then(Value::as_str)
        .map(str::to_string)
        .filter(|d| !d.is_empty())
        .unwrap_or(text);
    let system_url = coding
        .get("system")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_lowercase();
    let system = if system_url.contains("snomed") {
        "SCT"
    } else if system_url.contains("loinc") {
        "LN"
    } else if system_url.contains("icd") {
        "I10"
    } else if system_url.contains("rxnorm") {
        "RXNORM"
    } else if system_url.is_empty() {
        ""
    } else {
        "L"
    }
    .to_string();

    IpsCoding {
        code,
        display,
        system,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bundle_extraction() {
        let bundle = json!({
            "resourceType": "Bundle",
            "entry": [
                {"resource": {
                    "resourceType": "Patient",
                    "name": [{"family": "Nolan", "given": ["Ciara"]}],
                    "birthDate": "1983-06-21",
                    "gender": "female"
                }},
                {"resource": {
                    "resourceType": "Condition",
                    "code": {"coding": [{
                        "system": "http://hl7.org/fhir/sid/icd-10",
                        "code": "J18.9",
                        "display": "Pneumonia, unspecified organism"
                    }]}
                }},
                {"resource": {
                    "resourceType": "AllergyIntolerance",
                    "code": {"text": "Penicillin"}
                }},
                {"resource": {
                    "resourceType": "MedicationStatement",
                    "medicationCodeableConcept": {"coding": [{
                        "system": "http://www.nlm.nih.gov/research/umls/rxnorm",
                        "code": "1234",
                        "display": "Doxycycline 100mg capsule"
                    }]}
                }}
            ]
        });

        let ips = IpsBundle::from_value(&bundle);
        let patient = ips.patient.unwrap();
        assert_eq!(patient.family, "Nolan");
        assert_eq!(patient.given, "Ciara");
        assert_eq!(patient.birth_date, "19830621");
        assert_eq!(patient.sex, "F");

        assert_eq!(ips.conditions.len(), 1);
        assert_eq!(ips.conditions[0].code, "J18.9");
        assert_eq!(ips.conditions[0].system, "I10");

        assert_eq!(ips.allergies[0].display, "Penicillin");
        assert_eq!(ips.medications, vec!["Doxycycline 100mg capsule"]);
    }

    #[test]
    fn test_empty_bundle() {
        let ips = IpsBundle::from_value(&json!({"resourceType": "Bundle"}));
        assert_eq!(ips, IpsBundle::default());
    }
}
