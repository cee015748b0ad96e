//! Narrative section text generation.
//!
//! Section headings in the template are never rewritten; the generated body
//! text is chosen to fit the heading it sits under. Phrase pools are drawn
//! through [`BatchState::pick_unique`] so repeated sections across a batch
//! do not read as copies of each other.

use crate::context::{BatchState, DocumentProfile};
use crate::ips::IpsBundle;
use crate::scenarios::Scenario;
use rand::seq::IndexedRandom;
use rand::Rng;

/// Canonical investigations for one document: the bullet list and the
/// rendered narrative block. Recorded in the training sidecar and reused
/// verbatim wherever the document carries an investigations section.
#[derive(Debug, Clone)]
pub struct Investigations {
    pub tests: Vec<String>,
    pub narrative: String,
}

/// Render the investigations block for a scenario: all core tests plus up
/// to two optional ones, with an intro and closing line.
pub fn render_investigations<R: Rng + ?Sized>(rng: &mut R, scenario: &Scenario) -> Investigations {
    let mut tests: Vec<String> = scenario.tests_core.iter().map(|t| t.to_string()).collect();
    let optional_count = rng.random_range(0..=scenario.tests_optional.len().min(2));
    let mut optional: Vec<&str> = scenario.tests_optional.to_vec();
    for _ in 0..optional_count {
        let index = rng.random_range(0..optional.len());
        tests.push(optional.remove(index).to_string());
    }

    let intro = *[
        "Evaluation / investigations:",
        "Investigations performed:",
        "Assessment and investigations:",
    ]
    .choose(rng)
    .unwrap_or(&"Evaluation / investigations:");
    let closing = *[
        "Results reviewed and documented; plan discussed as appropriate.",
        "Findings were reviewed and documented; follow-up arranged if needed.",
        "No urgent inpatient abnormalities requiring further work-up were documented.",
        "Investigations supported the working diagnosis; management plan documented.",
    ]
    .choose(rng)
    .unwrap_or(&"Results reviewed and documented; plan discussed as appropriate.");

    let mut lines = vec![intro.to_string()];
    for test in &tests {
        lines.push(format!("- {test}."));
    }
    lines.push(format!("- {closing}"));

    Investigations {
        tests,
        narrative: lines.join("\n"),
    }
}

/// Result line for one investigation OBX, matched to its preserved heading.
pub fn investigation_result(scenario: &Scenario, heading: &str) -> String {
    let h = heading.to_lowercase();
    let line = match scenario.code {
        "J18.9" => {
            if h.contains("x-ray") || h.contains("cxr") || h.contains("imaging") {
                "CXR: patchy airspace opacification consistent with infection; no pleural effusion."
            } else if h.contains("wcc") || h.contains("crp") || h.contains("inflammatory") || h.contains("blood") {
                "Bloods: raised inflammatory markers; trend improving on treatment."
            } else if h.contains("oxygen") || h.contains("satur") || h.contains("obs") {
                "Obs: oxygen saturation monitored; stable on room air / low-flow oxygen as required."
            } else {
                "Findings consistent with lower respiratory tract infection; reviewed and documented."
            }
        }
        "N39.0" => {
            if h.contains("urinalysis") || h.contains("dipstick") {
                "Urinalysis: leukocytes/nitrites positive; findings consistent with UTI."
            } else if h.contains("culture") || h.contains("mc&s") {
                "Urine MC&S: sent; results pending / to be reviewed by GP if outstanding."
            } else if h.contains("renal") || h.contains("u&e") || h.contains("creatinine") || h.contains("blood") {
                "Bloods: renal function checked; no acute kidney injury documented."
            } else {
                "Urinary work-up completed; findings reviewed and documented."
            }
        }
        "I10" => {
            if h.contains("blood pressure") || h.contains("bp") {
                "BP: repeated readings taken; elevated values noted; advice/plan documented."
            } else if h.contains("ecg") {
                "ECG: no acute ischaemic changes; baseline rhythm documented."
            } else if h.contains("renal") || h.contains("electrolyte") || h.contains("u&e") || h.contains("blood") {
                "Bloods: U&E/electrolytes checked; no critical abnormalities documented."
            } else {
                "Hypertension work-up completed; findings reviewed and documented."
            }
        }
        "E11.9" => {
            if h.contains("glucose") || h.contains("cbg") {
                "CBG: monitored during admission; values improved with management plan."
            } else if h.contains("hba1c") {
                "HbA1c: checked / arranged; suggests glycaemic control requires review."
            } else if h.contains("renal") || h.contains("u&e") || h.contains("creatinine") || h.contains("blood") {
                "Bloods: renal function monitored; no acute deterioration documented."
            } else {
                "Diabetes review completed; findings reviewed and documented."
            }
        }
        "S72.001A" => {
            if h.contains("x-ray") || h.contains("hip") || h.contains("pelvis") || h.contains("imaging") {
                "Imaging: X-ray confirms hip fracture; ortho plan documented."
            } else if h.contains("ecg") {
                "ECG: baseline assessment completed; no acute abnormalities documented."
            } else if h.contains("fbc") || h.contains("u&e") || h.contains("blood") {
                "Bloods: FBC and U&E performed for operative planning; stable results."
            } else {
                "Pre-operative assessment completed; findings reviewed and documented."
            }
        }
        _ => "Clinical assessment completed; observations monitored.",
    };
    line.to_string()
}

fn ips_list(heading: &str, items: &[String]) -> Option<String> {
    if items.is_empty() {
        return None;
    }
    let mut lines = vec![heading.to_string()];
    for item in items.iter().take(12).filter(|i| !i.is_empty()) {
        lines.push(format!("- {item}"));
    }
    (lines.len() > 1).then(|| lines.join("\n"))
}

/// Body text for one narrative OBX, chosen by its preserved section label.
pub fn section_text<R: Rng + ?Sized>(
    rng: &mut R,
    state: &mut BatchState,
    profile: &DocumentProfile,
    ips: Option<&IpsBundle>,
    label: &str,
) -> String {
    let lab = label.trim().to_lowercase();
    let scenario = profile.scenario;

    if let Some(bundle) = ips {
        if lab.contains("medication") && !lab.contains("withheld") {
            let meds: Vec<String> = bundle.medications.clone();
            if let Some(text) = ips_list("Medications on discharge:", &meds) {
                return text;
            }
        }
        if lab.contains("allerg") {
            let names: Vec<String> = bundle.allergies.iter().map(|a| a.display.clone()).collect();
            if let Some(text) = ips_list("Allergies:", &names) {
                return text;
            }
        }
        if lab.contains("diagnos") || lab.contains("problem") {
            let names: Vec<String> = bundle.conditions.iter().map(|c| c.display.clone()).collect();
            if let Some(text) = ips_list("Problem list:", &names) {
                return text;
            }
        }
    }

    if lab.contains("summary") {
        let presentation = state.pick_unique(
            rng,
            &format!("{}:presentation", scenario.code),
            scenario.presentations,
        );
        return [
            state.pick_unique(
                rng,
                "summary:hdr",
                &[
                    "Discharge summary:",
                    "Discharge summary (brief):",
                    "Discharge summary (overview):",
                ],
            ),
            format!("Admitted with {presentation}; treated and improved during admission."),
            state.pick_unique(
                rng,
                "summary:closing",
                &[
                    "Discharged home with follow-up plan and safety-net advice.",
                    "Medication list reconciled and discharge instructions provided.",
                    "Discharged in stable condition with GP follow-up arranged.",
                    "Follow-up plan provided with return precautions discussed.",
                ],
            ),
        ]
        .join("\n");
    }

    if lab.contains("hospital course") {
        return [
            state.pick_unique(
                rng,
                "course:line1",
                &[
                    "Hospital course: assessed by the admitting team and managed per local protocol.",
                    "Hospital course: monitored and treated during admission with clinical improvement.",
                    "Hospital course: work-up completed and condition stabilised prior to discharge.",
                    "Hospital course: clinical assessment and investigations completed; treatment plan implemented.",
                ],
            ),
            format!("Primary issue addressed: {}.", scenario.display),
            state.pick_unique(
                rng,
                "course:line3",
                &[
                    "Observations remained stable; afebrile at discharge where applicable.",
                    "Tolerating oral intake; mobilising as tolerated prior to discharge.",
                    "Pain controlled with appropriate analgesia as required.",
                    "Symptoms improved prior to discharge with stable vital signs.",
                ],
            ),
            state.pick_unique(
                rng,
                "course:line4",
                &[
                    "No complications reported during stay.",
                    "No adverse events documented.",
                    "Discharged in stable condition.",
                    "Clinical status stable; discharge criteria met.",
                ],
            ),
        ]
        .join("\n");
    }

    if lab.contains("risk") {
        return [
            "Risk factors:".to_string(),
            state.pick_unique(
                rng,
                "risk:smoke",
                &[
                    "- Smoking: non-smoker.",
                    "- Smoking: current smoker; cessation advice given.",
                    "- Smoking: ex-smoker.",
                ],
            ),
            state.pick_unique(
                rng,
                "risk:alcohol",
                &[
                    "- Alcohol: minimal.",
                    "- Alcohol: moderate intake.",
                    "- Alcohol: none reported.",
                ],
            ),
            state.pick_unique(
                rng,
                "risk:lifestyle",
                &[
                    "- Activity: encouraged to mobilise as tolerated.",
                    "- Diet: advice provided as appropriate.",
                    "- Weight: lifestyle advice provided as appropriate.",
                ],
            ),
        ]
        .join("\n");
    }

    if lab.contains("adverse") {
        return state.pick_unique(
            rng,
            "adverse",
            &[
                "Adverse events: none reported.",
                "Adverse events: no documented complications during admission.",
                "Adverse events: mild nausea post-medication; resolved without intervention.",
                "Adverse events: none documented.",
            ],
        );
    }

    if lab.contains("withheld") {
        return state.pick_unique(
            rng,
            &format!("withheld:{}", scenario.code),
            &[
                "Medications withheld: none.",
                "Medications withheld: NSAIDs avoided due to renal function; GP to review.",
                "Medications withheld: anticoagulant held temporarily; GP to review.",
            ],
        );
    }

    if lab.contains("medication") {
        let mut lines = vec!["Medications on discharge:".to_string()];
        for med in &profile.medications {
            lines.push(format!("- {med}"));
        }
        return lines.join("\n");
    }

    if lab.contains("hospital action") {
        return [
            "Hospital actions:".to_string(),
            state.pick_unique(
                rng,
                "hospact:1",
                &[
                    "- Medication reconciliation completed.",
                    "- Discharge letter prepared and sent to GP.",
                    "- Follow-up clinic arranged if required.",
                ],
            ),
            state.pick_unique(
                rng,
                "hospact:2",
                &[
                    "- Results reviewed and documented.",
                    "- Patient provided with written advice and plan.",
                    "- Safety-net advice discussed and documented.",
                ],
            ),
        ]
        .join("\n");
    }

    if lab.contains("gp action") || lab.contains("follow") {
        return [
            "GP actions / follow-up:".to_string(),
            format!(
                "GP review within {} days.",
                state.pick_unique(rng, "gp:window", &["3-5", "5-7", "7-10", "10-14"])
            ),
            state.pick_unique(
                rng,
                "gp:review",
                &[
                    "Review symptoms and response to treatment.",
                    "Review medication tolerance and adherence.",
                    "Review outstanding results if applicable.",
                ],
            ),
            state.pick_unique(
                rng,
                "gp:safetynet",
                &[
                    "Return to ED if worsening symptoms, chest pain, persistent fever, or new concerns.",
                    "Safety-net advice provided (seek urgent care if deterioration).",
                ],
            ),
        ]
        .join("\n");
    }

    if lab.contains("clinic info") || lab.contains("information given") {
        return [
            "Clinic / discharge information:".to_string(),
            state.pick_unique(
                rng,
                "info:1",
                &[
                    "Discharge letter provided to patient.",
                    "Discharge summary provided and explained.",
                ],
            ),
            state.pick_unique(
                rng,
                "info:2",
                &[
                    "Medication plan and follow-up arrangements explained.",
                    "Medication plan reviewed; follow-up arranged.",
                ],
            ),
            state.pick_unique(
                rng,
                "info:3",
                &[
                    "Advice provided on symptoms to monitor and when to seek urgent care.",
                    "Patient understands return precautions.",
                ],
            ),
        ]
        .join("\n");
    }

    [
        "Clinical narrative:".to_string(),
        state.pick_unique(
            rng,
            "narr:1",
            &[
                "Patient stable at discharge.",
                "Symptoms improved prior to discharge.",
                "No acute concerns at discharge.",
            ],
        ),
        state.pick_unique(
            rng,
            "narr:2",
            &[
                "Follow-up arranged with GP.",
                "Safety-net advice provided.",
                "Medication plan reviewed.",
            ],
        ),
    ]
    .join("\n")
}

/// Whether a section label denotes the investigations block.
pub fn is_investigations_section(label: &str) -> bool {
    let l = label.to_lowercase();
    l.contains("investig") || (l.contains("evaluat") && l.contains("procedure"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{BatchState, DocumentProfile, SEEDED_ANCHOR_SECS};
    use crate::scenarios;
    use chrono::DateTime;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use synth_core::{Classification, TemplateDocument};

    fn profile() -> (DocumentProfile, BatchState, StdRng) {
        let mut rng = StdRng::seed_from_u64(11);
        let anchor = DateTime::from_timestamp(SEEDED_ANCHOR_SECS, 0).unwrap();
        let mut state = BatchState::new(anchor);
        let template = TemplateDocument::parse(synth_core::testing::SAMPLE_TEMPLATE).unwrap();
        let classification = Classification::classify(&template).unwrap();
        let profile =
            DocumentProfile::resolve(&mut rng, &mut state, &classification, None, None).unwrap();
        (profile, state, rng)
    }

    #[test]
    fn test_investigations_include_all_core_tests() {
        let scenario = scenarios::by_code("J18.9").unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let inv = render_investigations(&mut rng, scenario);
        for core in scenario.tests_core {
            assert!(inv.tests.iter().any(|t| t == core));
            assert!(inv.narrative.contains(core));
        }
        assert!(inv.tests.len() <= scenario.tests_core.len() + 2);
    }

    #[test]
    fn test_investigation_result_matches_heading() {
        let scenario = scenarios::by_code("J18.9").unwrap();
        assert!(investigation_result(scenario, "Chest X-ray (CXR)").starts_with("CXR:"));
        assert!(investigation_result(scenario, "Oxygen saturation").starts_with("Obs:"));
        let uti = scenarios::by_code("N39.0").unwrap();
        assert!(investigation_result(uti, "Urinalysis").starts_with("Urinalysis:"));
    }

    #[test]
    fn test_section_text_tracks_scenario() {
        let (profile, mut state, mut rng) = profile();
        let text = section_text(&mut rng, &mut state, &profile, None, "Hospital Course");
        assert!(text.contains(profile.scenario.display));
    }

    #[test]
    fn test_summary_varies_across_documents() {
        let (profile, mut state, mut rng) = profile();
        let a = section_text(&mut rng, &mut state, &profile, None, "Discharge Summary");
        let b = section_text(&mut rng, &mut state, &profile, None, "Discharge Summary");
        assert_ne!(a, b);
    }

    #[test]
    fn test_medication_section_lists_profile_medications() {
        let (profile, mut state, mut rng) = profile();
        let text = section_text(&mut rng, &mut state, &profile, None, "Discharge Medications");
        assert!(text.starts_with("Medications on discharge:"));
        for med in &profile.medications {
            assert!(text.contains(med.as_str()));
        }
    }

    #[test]
    fn test_investigations_section_detection() {
        assert!(is_investigations_section("Evaluation / Investigations"));
        assert!(is_investigations_section("Evaluation and Procedures"));
        assert!(!is_investigations_section("Hospital Course"));
    }
}
