//! Clinical scenarios driving diagnosis-aware content.
//!
//! A scenario ties a primary diagnosis code to the presentation phrases,
//! investigations, procedures and medications that plausibly accompany it,
//! so every section of a generated document tells the same story.

/// One discharge procedure entry (PR1 content).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcedureEntry {
    pub code: &'static str,
    pub label: &'static str,
    pub system: &'static str,
    pub description: &'static str,
}

/// A diagnosis scenario.
#[derive(Debug, PartialEq, Eq)]
pub struct Scenario {
    pub code: &'static str,
    pub display: &'static str,
    pub system: &'static str,
    pub presentations: &'static [&'static str],
    pub tests_core: &'static [&'static str],
    pub tests_optional: &'static [&'static str],
    pub procedures: &'static [ProcedureEntry],
    pub medications: &'static [&'static str],
}

pub const SCENARIOS: &[Scenario] = &[
    Scenario {
        code: "J18.9",
        display: "Pneumonia, unspecified organism",
        system: "I10",
        presentations: &[
            "cough, fever and shortness of breath",
            "productive cough with pleuritic chest pain and fever",
            "dyspnoea with raised inflammatory markers",
            "worsening cough and fever over several days",
            "chest tightness with low oxygen saturation on exertion",
        ],
        tests_core: &[
            "Bloods: FBC, CRP, U&E, LFTs",
            "Chest X-ray (CXR)",
            "Observations incl. oxygen saturation",
        ],
        tests_optional: &[
            "Blood cultures (if febrile/septic)",
            "Sputum culture (if productive cough)",
            "Viral PCR swab (seasonal)",
            "ABG/VBG (if hypoxic)",
            "Lactate (if sepsis suspected)",
        ],
        procedures: &[
            ProcedureEntry {
                code: "CXR",
                label: "Chest X-ray (CXR)",
                system: "SCT",
                description: "Chest X-ray performed; findings documented and consistent with lower respiratory tract infection.",
            },
            ProcedureEntry {
                code: "BLOODS",
                label: "Blood tests",
                system: "SCT",
                description: "Blood tests performed (FBC, CRP and renal profile) to support diagnosis and monitor response to treatment.",
            },
        ],
        medications: &[
            "Doxycycline 100mg OD (as per local guidance)",
            "Paracetamol 1g QDS PRN",
        ],
    },
    Scenario {
        code: "N39.0",
        display: "Urinary tract infection, site not specified",
        system: "I10",
        presentations: &[
            "dysuria with urinary frequency and suprapubic discomfort",
            "lower urinary tract symptoms with fever",
            "urinary symptoms with raised inflammatory markers",
            "flank discomfort with urinary symptoms and fever",
            "new urinary frequency with dysuria and malaise",
        ],
        tests_core: &[
            "Urinalysis / dipstick",
            "Urine culture & sensitivity (MC&S)",
            "Bloods: FBC, CRP, U&E (if unwell/complicated)",
        ],
        tests_optional: &[
            "Blood cultures (if febrile/septic)",
            "Renal ultrasound (if flank pain / obstruction suspected)",
            "Pregnancy test (if relevant)",
        ],
        procedures: &[
            ProcedureEntry {
                code: "URINE",
                label: "Urinalysis & urine culture",
                system: "SCT",
                description: "Urinalysis performed and urine sent for culture & sensitivity (MC&S) as part of UTI work-up.",
            },
            ProcedureEntry {
                code: "BLOODS",
                label: "Blood tests",
                system: "SCT",
                description: "Blood tests performed (FBC, CRP and renal profile) where clinically indicated.",
            },
        ],
        medications: &[
            "Nitrofurantoin 100mg BD (as per local guidance)",
            "Paracetamol 1g QDS PRN",
        ],
    },
    Scenario {
        code: "I10",
        display: "Essential (primary) hypertension",
        system: "I10",
        presentations: &[
            "persistently elevated blood pressure readings",
            "hypertension identified during admission assessment",
            "raised blood pressure requiring monitoring and review",
            "elevated blood pressure noted on repeated observations",
            "newly identified hypertension on routine checks",
        ],
        tests_core: &[
            "Repeat BP measurements (including correct cuff size/position)",
            "Bloods: U&E/creatinine, electrolytes",
            "Urinalysis (protein/haematuria)",
            "ECG",
        ],
        tests_optional: &[
            "HbA1c / fasting glucose",
            "Lipid profile",
            "Urine ACR (albumin:creatinine ratio)",
            "Chest X-ray (if indicated)",
        ],
        procedures: &[
            ProcedureEntry {
                code: "CXR-ECG",
                label: "Chest X-ray & ECG",
                system: "SCT",
                description: "Chest X-ray and ECG performed as part of assessment; no acute cardiopulmonary abnormality documented.",
            },
            ProcedureEntry {
                code: "BP-MONITOR",
                label: "Blood pressure monitoring",
                system: "SCT",
                description: "Repeated blood pressure measurements performed; elevated readings recorded and management plan documented.",
            },
        ],
        medications: &[
            "Losartan 50mg OD",
            "Amlodipine 5mg OD (if required)",
            "Atorvastatin 20mg ON (if indicated)",
        ],
    },
    Scenario {
        code: "E11.9",
        display: "Type 2 diabetes mellitus without complications",
        system: "I10",
        presentations: &[
            "hyperglycaemia on admission assessment",
            "raised HbA1c suggesting suboptimal glycaemic control",
            "elevated capillary blood glucose readings",
            "hyperglycaemia requiring monitoring and medication review",
        ],
        tests_core: &[
            "Capillary blood glucose monitoring",
            "HbA1c",
            "Bloods: U&E/creatinine",
            "Lipid profile",
        ],
        tests_optional: &[
            "Urine ACR (albumin:creatinine ratio)",
            "Ketones (if unwell / very high glucose)",
            "ECG (baseline cardiovascular assessment)",
        ],
        procedures: &[
            ProcedureEntry {
                code: "HBA1C-LIPIDS",
                label: "Blood tests (HbA1c/Lipids)",
                system: "SCT",
                description: "HbA1c and lipid profile checked / arranged as part of diabetes review; renal profile monitored.",
            },
            ProcedureEntry {
                code: "ECG",
                label: "ECG",
                system: "SCT",
                description: "Baseline ECG performed / reviewed as part of cardiovascular risk assessment.",
            },
        ],
        medications: &[
            "Metformin 500mg BD with food",
            "Atorvastatin 20mg ON (if indicated)",
        ],
    },
    Scenario {
        code: "S72.001A",
        display: "Fracture of unspecified part of neck of right femur",
        system: "I10",
        presentations: &[
            "fall with hip pain and reduced mobility",
            "hip pain following trauma with inability to weight bear",
            "suspected hip fracture after a fall",
            "mechanical fall with immediate hip pain and shortened, externally rotated leg",
        ],
        tests_core: &[
            "X-ray: hip/pelvis",
            "Bloods: FBC, U&E/creatinine",
            "Coagulation profile (if indicated)",
            "Group & save / crossmatch (peri-operative planning)",
            "ECG (pre-op assessment)",
        ],
        tests_optional: &[
            "CT/MRI hip (if occult fracture suspected)",
            "Chest X-ray (pre-op / if indicated)",
        ],
        procedures: &[
            ProcedureEntry {
                code: "XR-HIP-PELVIS",
                label: "X-ray (Chest/Pelvis/Hip)",
                system: "SCT",
                description: "X-ray chest, pelvis and right hip performed; findings consistent with hip fracture; chest imaging without acute abnormality.",
            },
            ProcedureEntry {
                code: "ECG-12LEAD",
                label: "ECG",
                system: "SCT",
                description: "12-lead ECG performed as part of pre-operative assessment; no acute abnormalities documented.",
            },
        ],
        medications: &[
            "Morphine (as required for pain)",
            "Heparin for VTE prophylaxis (as per protocol)",
        ],
    },
];

/// Secondary-diagnosis pool: (code, display, coding system).
pub const DIAGNOSIS_POOL: &[(&str, &str, &str)] = &[
    ("I10", "Essential (primary) hypertension", "I10"),
    ("E11.9", "Type 2 diabetes mellitus without complications", "I10"),
    ("J18.9", "Pneumonia, unspecified organism", "I10"),
    ("N39.0", "Urinary tract infection, site not specified", "I10"),
    ("S72.001A", "Fracture of unspecified part of neck of right femur", "I10"),
];

/// Look up a scenario by exact diagnosis code.
pub fn by_code(code: &str) -> Option<&'static Scenario> {
    let code = code.trim().to_uppercase();
    SCENARIOS.iter().find(|s| s.code == code)
}

/// Map a diagnosis code or display text onto a scenario.
pub fn from_coding(code: &str, display: &str) -> Option<&'static Scenario> {
    if let Some(s) = by_code(code) {
        return Some(s);
    }
    let text = display.to_lowercase();
    let code = if text.contains("pneumon") {
        "J18.9"
    } else if text.contains("urinar")
        || text.contains("uti")
        || text.contains("cystitis")
        || text.contains("pyelo")
    {
        "N39.0"
    } else if text.contains("hypertens") || text.contains("high blood pressure") {
        "I10"
    } else if text.contains("diabet") || text.contains("hyperglyc") {
        "E11.9"
    } else if text.contains("hip")
        || text.contains("femur")
        || text.contains("fracture")
    {
        "S72.001A"
    } else {
        return None;
    };
    by_code(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_by_code_normalises() {
        assert_eq!(by_code(" j18.9 ").unwrap().code, "J18.9");
        assert!(by_code("Z99").is_none());
    }

    #[test]
    fn test_from_coding_matches_display_keywords() {
        assert_eq!(from_coding("", "Community acquired pneumonia").unwrap().code, "J18.9");
        assert_eq!(from_coding("", "Fractured neck of femur").unwrap().code, "S72.001A");
        assert!(from_coding("", "Migraine").is_none());
    }

    #[test]
    fn test_every_scenario_is_complete() {
        for s in SCENARIOS {
            assert!(!s.presentations.is_empty());
            assert!(!s.tests_core.is_empty());
            assert!(!s.procedures.is_empty());
            assert!(!s.medications.is_empty());
        }
    }
}
