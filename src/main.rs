//! Command-line interface for ds-synth
//!
//! # Usage Examples
//!
//! ```bash
//! # Generate ten documents from a golden template
//! ds-synth --template DS_SampleC1.xml --output-dir out/
//!
//! # Reproducible batch of 100 pneumonia summaries with a training sidecar
//! ds-synth --template DS_SampleC1.xml --output-dir out/ \
//!   --count 100 --seed 42 --scenario J18.9 --train-out out/train.jsonl
//!
//! # Seed patient identity and clinical lists from an IPS FHIR bundle
//! ds-synth --template DS_SampleC1.xml --output-dir out/ --ips patient-ips.json
//! ```

use clap::Parser;
use ds_synth::{generate, GenerateOpts};

#[derive(Parser)]
#[command(name = "ds-synth")]
#[command(about = "Generate synthetic HL7 v2 XML discharge summaries from a golden template")]
#[command(long_about = None)]
struct Cli {
    #[command(flatten)]
    opts: GenerateOpts,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    generate(&cli.opts)
}
