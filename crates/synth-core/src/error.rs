//! Error types for template loading and classification.

use thiserror::Error;

/// Error type for template operations.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Error reading the template file
    #[error("Failed to read template file: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing the template XML
    #[error("Failed to parse template XML: {0}")]
    Xml(#[from] quick_xml::Error),

    /// The document is not well-formed
    #[error("Template is not well-formed: {0}")]
    Malformed(String),

    /// The template does not have the expected discharge summary shape
    #[error(transparent)]
    Shape(#[from] TemplateShapeError),
}

/// The template is missing structure the classifier requires.
///
/// These are fatal before any generation work starts: a batch cannot run
/// against a template that lacks its required segments.
#[derive(Debug, Error)]
pub enum TemplateShapeError {
    /// A required segment is absent from the template
    #[error("Required segment missing from template: {0}")]
    MissingSegment(&'static str),

    /// Repeating instances of a dual-encoding field disagree on encoding
    #[error("Template mixes plain and coded encodings across instances of {0}")]
    MixedEncoding(&'static str),
}
