//! Synthetic discharge summary generation.
//!
//! Takes a classified golden template (from `synth-core`) and produces
//! batches of mutated documents: same structure, fresh demographics,
//! identifiers, timing and narrative.
//!
//! Pipeline per document:
//!
//! ```text
//! DocumentProfile::resolve   correlated choices, fixed draw order
//!         │
//! FieldSynthesizer           role -> replacement text
//!         │
//! DocumentMutator            leaf text substitution on a template clone
//!         │
//! render                     serialized XML bytes
//! ```
//!
//! [`Batch`] drives the pipeline lazily and owns the batch-wide state:
//! identifier registry, phrase usage history and scenario rotation.

pub mod batch;
pub mod catalogs;
pub mod context;
pub mod error;
pub mod identifiers;
pub mod ips;
pub mod mutator;
pub mod narrative;
pub mod scenarios;
pub mod synthesize;

pub use batch::{Batch, BatchOptions, RecordMetadata, SyntheticRecord};
pub use context::{BatchState, DocumentProfile};
pub use error::GenerateError;
pub use identifiers::{IdClass, IdentifierRegistry};
pub use ips::{IpsBundle, IpsError};
pub use mutator::DocumentMutator;
pub use scenarios::Scenario;
pub use synthesize::FieldSynthesizer;
