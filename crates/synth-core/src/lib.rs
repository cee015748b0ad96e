//! Core types for the ds-synth discharge summary generator.
//!
//! This crate provides the template-side foundation used across the
//! workspace:
//!
//! - [`XmlElement`] / [`XmlNode`] - owned ordered XML tree
//! - [`TemplateDocument`] - golden template loading and serialization
//! - [`Classification`] - one-pass role assignment over a template
//! - [`FieldRole`] - closed set of regenerated field semantics
//!
//! # Architecture
//!
//! ```text
//! synth-core (this crate)
//!    │
//!    └─── synth-generator  (value catalogs, identifier registry,
//!                           field synthesizer, mutator, batch driver)
//! ```
//!
//! The classifier runs once per template; its result is reused for every
//! document in a batch. The mutation side lives in `synth-generator`.

pub mod classify;
pub mod error;
pub mod roles;
pub mod template;
pub mod testing;
pub mod tree;

// Re-exports for convenience
pub use classify::{Assignment, Classification, RepeatGroup};
pub use error::{TemplateError, TemplateShapeError};
pub use roles::{FieldEncoding, FieldRole};
pub use template::{render, TemplateDocument};
pub use tree::{find_descendants, find_first, local_name, same_structure, NodePath, XmlElement, XmlNode};
