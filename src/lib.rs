//! Batch generation of synthetic discharge summaries from a golden template.
//!
//! The CLI parses a template once, classifies it once, then streams the
//! requested number of mutated documents to disk as `ds_001.xml`,
//! `ds_002.xml`, ... with an optional JSONL training sidecar.
//!
//! # CLI Usage
//!
//! ```bash
//! # Ten documents, fresh randomness
//! ds-synth --template DS_SampleC1.xml --output-dir out/
//!
//! # Reproducible batch, forced scenario, training sidecar
//! ds-synth --template DS_SampleC1.xml --output-dir out/ \
//!   --count 100 --seed 42 --scenario J18.9 --train-out out/train.jsonl
//! ```

use anyhow::Context;
use clap::Args;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use synth_core::{Classification, TemplateDocument};
use synth_generator::{Batch, BatchOptions, IpsBundle};
use tracing::info;

/// Generation options.
#[derive(Args, Clone, Debug)]
pub struct GenerateOpts {
    /// Path to the golden discharge summary template (HL7 v2 XML)
    #[arg(long, short = 't')]
    pub template: PathBuf,

    /// Output directory (created if missing)
    #[arg(long, short = 'o')]
    pub output_dir: PathBuf,

    /// Number of documents to generate
    #[arg(long, default_value = "10")]
    pub count: u64,

    /// Random seed for deterministic generation (same seed = same documents)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Force the primary diagnosis scenario (e.g. J18.9, N39.0, I10, E11.9, S72.001A)
    #[arg(long)]
    pub scenario: Option<String>,

    /// Optional IPS FHIR bundle (JSON) seeding patient identity and clinical lists
    #[arg(long)]
    pub ips: Option<PathBuf>,

    /// Optional JSONL training sidecar path
    #[arg(long)]
    pub train_out: Option<PathBuf>,
}

/// Run one generation batch to completion.
pub fn generate(opts: &GenerateOpts) -> anyhow::Result<()> {
    let template_xml = fs::read_to_string(&opts.template)
        .with_context(|| format!("Failed to read template {}", opts.template.display()))?;
    let template = TemplateDocument::parse(&template_xml)
        .with_context(|| format!("Failed to parse template {}", opts.template.display()))?;
    let classification =
        Classification::classify(&template).context("Template failed its shape check")?;

    let ips = match &opts.ips {
        Some(path) => Some(
            IpsBundle::from_file(path)
                .with_context(|| format!("Failed to load IPS bundle {}", path.display()))?,
        ),
        None => None,
    };

    fs::create_dir_all(&opts.output_dir).with_context(|| {
        format!(
            "Failed to create output directory {}",
            opts.output_dir.display()
        )
    })?;

    let mut train_writer = match &opts.train_out {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create sidecar directory {}", parent.display())
                })?;
            }
            let file = File::create(path)
                .with_context(|| format!("Failed to create sidecar {}", path.display()))?;
            Some(BufWriter::new(file))
        }
        None => None,
    };

    let batch = Batch::new(
        &template,
        &classification,
        BatchOptions {
            count: opts.count,
            seed: opts.seed,
            forced_scenario: opts.scenario.clone(),
            ips,
        },
    )?;

    for result in batch {
        let record = result?;
        let path = opts
            .output_dir
            .join(format!("ds_{:03}.xml", record.index + 1));
        fs::write(&path, &record.xml)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        if let Some(writer) = train_writer.as_mut() {
            serde_json::to_writer(&mut *writer, &record.metadata)?;
            writer.write_all(b"\n")?;
        }
    }

    if let Some(mut writer) = train_writer {
        writer.flush().context("Failed to flush training sidecar")?;
    }

    info!(
        count = opts.count,
        output_dir = %opts.output_dir.display(),
        "generation complete"
    );
    Ok(())
}
