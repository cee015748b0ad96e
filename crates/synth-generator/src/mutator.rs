//! Template-preserving document mutation.
//!
//! The mutator only ever sets text on leaf nodes the classifier named; it
//! never creates, removes or reorders nodes. Structural isomorphism with
//! the template therefore holds by construction for every output.

use crate::context::BatchState;
use crate::error::GenerateError;
use crate::synthesize::FieldSynthesizer;
use rand::Rng;
use synth_core::{Classification, TemplateDocument, XmlElement};
use tracing::trace;

pub struct DocumentMutator<'a> {
    template: &'a TemplateDocument,
    classification: &'a Classification,
}

impl<'a> DocumentMutator<'a> {
    pub fn new(template: &'a TemplateDocument, classification: &'a Classification) -> Self {
        Self {
            template,
            classification,
        }
    }

    /// Produce one mutated document tree.
    ///
    /// Fails with [`GenerateError::Mutation`] if the classification no
    /// longer matches the template tree; that indicates a bug, not bad
    /// input, and aborts the batch.
    pub fn mutate<R: Rng + ?Sized>(
        &self,
        document_index: u64,
        rng: &mut R,
        state: &mut BatchState,
        synthesizer: &FieldSynthesizer<'_>,
    ) -> Result<XmlElement, GenerateError> {
        let mut root = self.template.clone_root();

        for assignment in &self.classification.assignments {
            let value = synthesizer.value(rng, state, &assignment.role);
            let node = assignment.path.resolve_mut(&mut root).ok_or_else(|| {
                GenerateError::Mutation {
                    document_index,
                    path: assignment.path.to_string(),
                    detail: "path does not resolve".to_string(),
                }
            })?;
            if !node.is_leaf() {
                return Err(GenerateError::Mutation {
                    document_index,
                    path: assignment.path.to_string(),
                    detail: format!("{} is not a leaf", node.local_name()),
                });
            }
            trace!(path = %assignment.path, role = ?assignment.role, "field set");
            node.set_text(&value);
        }

        Ok(root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{BatchState, DocumentProfile, SEEDED_ANCHOR_SECS};
    use crate::narrative::render_investigations;
    use chrono::DateTime;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use synth_core::testing::SAMPLE_TEMPLATE;
    use synth_core::tree::same_structure;

    fn mutate_once(seed: u64) -> (TemplateDocument, XmlElement) {
        let template = TemplateDocument::parse(SAMPLE_TEMPLATE).unwrap();
        let classification = Classification::classify(&template).unwrap();
        let mut rng = StdRng::seed_from_u64(seed);
        let anchor = DateTime::from_timestamp(SEEDED_ANCHOR_SECS, 0).unwrap();
        let mut state = BatchState::new(anchor);
        let profile =
            DocumentProfile::resolve(&mut rng, &mut state, &classification, None, None).unwrap();
        let investigations = render_investigations(&mut rng, profile.scenario);
        let synthesizer = FieldSynthesizer {
            profile: &profile,
            investigations: &investigations,
            ips: None,
        };
        let mutator = DocumentMutator::new(&template, &classification);
        let root = mutator
            .mutate(0, &mut rng, &mut state, &synthesizer)
            .unwrap();
        (template, root)
    }

    #[test]
    fn test_output_is_structurally_isomorphic() {
        let (template, root) = mutate_once(1);
        assert!(same_structure(template.root(), &root));
    }

    #[test]
    fn test_headings_survive_mutation() {
        let (_, root) = mutate_once(2);
        let text = String::from_utf8(synth_core::render(&root).unwrap()).unwrap();
        assert!(text.contains("Discharge Summary"));
        assert!(text.contains("Hospital Course"));
        assert!(text.contains("Evaluation / Investigations"));
        // The NM-typed result row keeps its template value.
        assert!(text.contains("<OBX.2>NM</OBX.2>"));
        assert!(text.contains("<OBX.5>96</OBX.5>"));
    }

    #[test]
    fn test_template_identifiers_do_not_leak() {
        let (template, root) = mutate_once(3);
        let original = String::from_utf8(synth_core::render(template.root()).unwrap()).unwrap();
        let text = String::from_utf8(synth_core::render(&root).unwrap()).unwrap();
        for golden in [
            "9a1f63c2-7a30-4a44-9c1e-000000000000",
            "884512345",
            "420044556677889900",
            "556677889901",
        ] {
            assert!(original.contains(golden));
            assert!(!text.contains(golden), "template value {golden} leaked");
        }
    }

    #[test]
    fn test_mutation_is_deterministic() {
        let (_, a) = mutate_once(42);
        let (_, b) = mutate_once(42);
        assert_eq!(
            synth_core::render(&a).unwrap(),
            synth_core::render(&b).unwrap()
        );
    }
}
