//! Batch generation driver.
//!
//! A [`Batch`] is a lazy iterator over generated documents: nothing is
//! produced until the caller pulls, and each pull resolves one profile,
//! mutates one tree and serializes it. The first error fuses the iterator;
//! a partial batch is never silently padded.

use crate::context::{BatchState, DocumentProfile, SEEDED_ANCHOR_SECS};
use crate::error::GenerateError;
use crate::ips::IpsBundle;
use crate::mutator::DocumentMutator;
use crate::narrative::{render_investigations, Investigations};
use crate::synthesize::FieldSynthesizer;
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use synth_core::{render, Classification, TemplateDocument};
use tracing::debug;

/// Batch configuration.
#[derive(Debug, Default, Clone)]
pub struct BatchOptions {
    /// Number of documents to generate.
    pub count: u64,
    /// RNG seed. Seeded batches are byte-reproducible; unseeded batches
    /// draw from the OS and anchor timing to the wall clock.
    pub seed: Option<u64>,
    /// Force every document onto one diagnosis scenario.
    pub forced_scenario: Option<String>,
    /// Optional IPS bundle seeding patient identity and clinical lists.
    pub ips: Option<IpsBundle>,
}

/// Training sidecar row for one generated document.
#[derive(Debug, Clone, Serialize)]
pub struct RecordMetadata {
    pub message_control_id: String,
    pub visit_id: String,
    pub scenario_code: String,
    pub scenario_display: String,
    pub canonical_tests: Vec<String>,
    pub investigations_narrative: String,
}

/// One generated document.
#[derive(Debug, Clone)]
pub struct SyntheticRecord {
    /// Zero-based position in the batch.
    pub index: u64,
    /// Serialized XML, declaration included.
    pub xml: Vec<u8>,
    pub metadata: RecordMetadata,
}

/// Lazy iterator over one batch of synthetic documents.
pub struct Batch<'a> {
    template: &'a TemplateDocument,
    classification: &'a Classification,
    options: BatchOptions,
    state: BatchState,
    rng: StdRng,
    next_index: u64,
    failed: bool,
}

impl<'a> Batch<'a> {
    /// Set up a batch run.
    ///
    /// Fails upfront when a bounded identifier class cannot cover `count`
    /// documents, so a doomed run never writes partial output.
    pub fn new(
        template: &'a TemplateDocument,
        classification: &'a Classification,
        options: BatchOptions,
    ) -> Result<Self, GenerateError> {
        crate::identifiers::IdentifierRegistry::check_capacity(options.count)?;

        let (rng, anchor) = match options.seed {
            Some(seed) => {
                let anchor = DateTime::from_timestamp(SEEDED_ANCHOR_SECS, 0)
                    .unwrap_or_else(Utc::now);
                (StdRng::seed_from_u64(seed), anchor)
            }
            None => (StdRng::from_os_rng(), Utc::now()),
        };
        debug!(count = options.count, seed = ?options.seed, "batch configured");

        Ok(Self {
            template,
            classification,
            options,
            state: BatchState::new(anchor),
            rng,
            next_index: 0,
            failed: false,
        })
    }

    fn generate_one(&mut self, index: u64) -> Result<SyntheticRecord, GenerateError> {
        let profile = DocumentProfile::resolve(
            &mut self.rng,
            &mut self.state,
            self.classification,
            self.options.ips.as_ref(),
            self.options.forced_scenario.as_deref(),
        )?;
        let investigations: Investigations =
            render_investigations(&mut self.rng, profile.scenario);

        let synthesizer = FieldSynthesizer {
            profile: &profile,
            investigations: &investigations,
            ips: self.options.ips.as_ref(),
        };
        let mutator = DocumentMutator::new(self.template, self.classification);
        let root = mutator.mutate(index, &mut self.rng, &mut self.state, &synthesizer)?;

        let xml = render(&root).map_err(|source| GenerateError::Serialize {
            document_index: index,
            source,
        })?;

        Ok(SyntheticRecord {
            index,
            xml,
            metadata: RecordMetadata {
                message_control_id: profile.message_id.clone(),
                visit_id: profile.visit_number.clone(),
                scenario_code: profile.scenario.code.to_string(),
                scenario_display: profile.scenario.display.to_string(),
                canonical_tests: investigations.tests.clone(),
                investigations_narrative: investigations.narrative.clone(),
            },
        })
    }
}

impl Iterator for Batch<'_> {
    type Item = Result<SyntheticRecord, GenerateError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.next_index >= self.options.count {
            return None;
        }
        let index = self.next_index;
        self.next_index += 1;

        let result = self.generate_one(index);
        if result.is_err() {
            self.failed = true;
        }
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.failed {
            return (0, Some(0));
        }
        let remaining = (self.options.count - self.next_index) as usize;
        (remaining, Some(remaining))
    }
}
