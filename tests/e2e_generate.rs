//! End-to-end generation tests: template file in, XML files out.

use ds_synth::{generate, GenerateOpts};
use std::fs;
use std::path::Path;
use synth_core::tree::same_structure;
use synth_core::TemplateDocument;
use tempfile::TempDir;

fn write_template(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("template.xml");
    fs::write(&path, synth_core::testing::SAMPLE_TEMPLATE).unwrap();
    path
}

fn opts(template: &Path, output_dir: &Path) -> GenerateOpts {
    GenerateOpts {
        template: template.to_path_buf(),
        output_dir: output_dir.to_path_buf(),
        count: 10,
        seed: Some(42),
        scenario: None,
        ips: None,
        train_out: None,
    }
}

fn read_outputs(dir: &Path) -> Vec<(String, String)> {
    let mut files: Vec<(String, String)> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| p.extension().is_some_and(|x| x == "xml"))
        .map(|p| {
            (
                p.file_name().unwrap().to_string_lossy().to_string(),
                fs::read_to_string(&p).unwrap(),
            )
        })
        .collect();
    files.sort();
    files
}

#[test]
fn test_generates_named_files() {
    let tmp = TempDir::new().unwrap();
    let template = write_template(tmp.path());
    let out = tmp.path().join("out");
    generate(&opts(&template, &out)).unwrap();

    let files = read_outputs(&out);
    assert_eq!(files.len(), 10);
    assert_eq!(files[0].0, "ds_001.xml");
    assert_eq!(files[9].0, "ds_010.xml");
}

#[test]
fn test_outputs_are_isomorphic_and_leak_free() {
    let tmp = TempDir::new().unwrap();
    let template_path = write_template(tmp.path());
    let out = tmp.path().join("out");
    generate(&opts(&template_path, &out)).unwrap();

    let template = TemplateDocument::parse(synth_core::testing::SAMPLE_TEMPLATE).unwrap();
    for (name, xml) in read_outputs(&out) {
        let document = TemplateDocument::parse(&xml).unwrap();
        assert!(
            same_structure(template.root(), document.root()),
            "{name} diverged from the template structure"
        );
        // Golden identifiers must not survive mutation.
        assert!(!xml.contains("9a1f63c2-7a30-4a44-9c1e-000000000000"), "{name}");
        assert!(!xml.contains("884512345"), "{name}");
        // Section headings are preserved verbatim.
        assert!(xml.contains("Discharge Summary"), "{name}");
        assert!(xml.contains("Evaluation / Investigations"), "{name}");
    }
}

#[test]
fn test_seeded_runs_are_byte_identical() {
    let tmp = TempDir::new().unwrap();
    let template = write_template(tmp.path());
    let out_a = tmp.path().join("a");
    let out_b = tmp.path().join("b");
    generate(&opts(&template, &out_a)).unwrap();
    generate(&opts(&template, &out_b)).unwrap();
    assert_eq!(read_outputs(&out_a), read_outputs(&out_b));
}

#[test]
fn test_unseeded_runs_differ() {
    let tmp = TempDir::new().unwrap();
    let template = write_template(tmp.path());
    let out_a = tmp.path().join("a");
    let out_b = tmp.path().join("b");
    let mut o = opts(&template, &out_a);
    o.seed = None;
    o.count = 2;
    generate(&o).unwrap();
    o.output_dir = out_b.clone();
    generate(&o).unwrap();
    assert_ne!(read_outputs(&out_a), read_outputs(&out_b));
}

#[test]
fn test_discharge_after_admit() {
    let tmp = TempDir::new().unwrap();
    let template = write_template(tmp.path());
    let out = tmp.path().join("out");
    generate(&opts(&template, &out)).unwrap();

    for (name, xml) in read_outputs(&out) {
        let admit = extract(&xml, "PV1.44");
        let discharge = extract(&xml, "PV1.45");
        assert!(discharge > admit, "{name}: {discharge} <= {admit}");
    }
}

#[test]
fn test_training_sidecar_rows() {
    let tmp = TempDir::new().unwrap();
    let template = write_template(tmp.path());
    let out = tmp.path().join("out");
    let mut o = opts(&template, &out);
    o.count = 4;
    o.scenario = Some("N39.0".to_string());
    o.train_out = Some(out.join("train.jsonl"));
    generate(&o).unwrap();

    let sidecar = fs::read_to_string(out.join("train.jsonl")).unwrap();
    let rows: Vec<serde_json::Value> = sidecar
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(rows.len(), 4);
    for row in rows {
        assert_eq!(row["scenario_code"], "N39.0");
        assert!(row["message_control_id"].as_str().unwrap().len() == 36);
        assert!(!row["canonical_tests"].as_array().unwrap().is_empty());
    }
}

#[test]
fn test_single_document_batch() {
    let tmp = TempDir::new().unwrap();
    let template = write_template(tmp.path());
    let out = tmp.path().join("out");
    let mut o = opts(&template, &out);
    o.count = 1;
    generate(&o).unwrap();
    assert_eq!(read_outputs(&out).len(), 1);
}

/// Text of the first `<TS.1>` under the named element.
fn extract(xml: &str, field: &str) -> String {
    let open = format!("<{field}>");
    let start = xml.find(&open).unwrap();
    let rest = &xml[start..];
    let ts_start = rest.find("<TS.1>").unwrap() + "<TS.1>".len();
    let ts_end = rest[ts_start..].find("</TS.1>").unwrap() + ts_start;
    rest[ts_start..ts_end].to_string()
}
