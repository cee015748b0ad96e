//! Error types for generation operations.

use crate::identifiers::IdClass;
use synth_core::TemplateShapeError;
use thiserror::Error;

/// Error type for batch generation.
///
/// All variants are fatal to the batch: the driver never retries or
/// substitutes placeholder values. Correctness of the synthetic data wins
/// over completing a batch.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// Template failed its shape check
    #[error(transparent)]
    Shape(#[from] TemplateShapeError),

    /// Classification and tree diverged while mutating a document
    #[error("Document {document_index}: classification does not match template at {path} ({detail})")]
    Mutation {
        document_index: u64,
        path: String,
        detail: String,
    },

    /// An identifier class cannot cover the requested batch size
    #[error("Identifier space exhausted for {class}: capacity {capacity} cannot cover {requested} documents")]
    IdentifierSpaceExhausted {
        class: IdClass,
        capacity: u64,
        requested: u64,
    },

    /// Serialization of a finished document failed
    #[error("Failed to serialize document {document_index}: {source}")]
    Serialize {
        document_index: u64,
        source: synth_core::TemplateError,
    },

    /// IPS bundle could not be loaded
    #[error(transparent)]
    Ips(#[from] crate::ips::IpsError),
}
