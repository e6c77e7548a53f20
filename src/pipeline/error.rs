//! Pipeline-specific error types.

use crate::pipeline::id::ElementId;
use crate::pipeline::types::ValueMismatch;
use crate::pipeline::validate::ValidationReport;
use thiserror::Error;

/// Errors raised by the engine while declaring, wiring, validating or
/// sweeping a flow.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Malformed type descriptor (duplicate or empty slot names).
    #[error("Schema error: {0}")]
    Schema(String),

    /// Ambiguous or malformed edge mapping expression.
    #[error("Mapping syntax error: {0}")]
    MappingSyntax(String),

    /// Runtime values did not match the declared input types of an element.
    #[error("Type mismatch in {element}: {}", format_mismatches(.mismatches))]
    TypeMismatch {
        element: String,
        mismatches: Vec<ValueMismatch>,
    },

    /// Declared inputs that no incoming edge feeds.
    #[error("Unsaturated inputs of {element}: {}", .missing.join(", "))]
    Unsaturated { element: String, missing: Vec<String> },

    /// The edge set is not a DAG.
    #[error("Cyclic dependency between elements {}", format_ids(.elements))]
    CyclicDependency { elements: Vec<ElementId> },

    /// Static validation failed; the report lists every violation.
    #[error(
        "Flow validation failed with {} violation(s) and {} warning(s)",
        .0.violations.len(),
        .0.warnings.len()
    )]
    Validation(ValidationReport),

    /// An edge refers to an element that was never registered.
    #[error("Unknown element {0}")]
    UnknownElement(ElementId),

    /// An element finished its run without publishing a declared output.
    #[error("{element} did not publish declared output '{output}'")]
    MissingOutput { element: String, output: String },

    /// A system-scoped element was scheduled without an environment.
    #[error("{0} needs an execution environment")]
    MissingEnvironment(String),

    /// Failure raised inside an element's `run`.
    #[error("{element} failed: {source}")]
    Element {
        element: String,
        #[source]
        source: ElementError,
    },
}

/// Errors raised by element implementations and hooks.
#[derive(Error, Debug)]
pub enum ElementError {
    #[error("Wrong input: {0}")]
    WrongInput(String),

    #[error("Missing input '{0}'")]
    MissingInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Channel error: {0}")]
    Channel(String),

    #[error("{0}")]
    Other(String),
}

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

fn format_mismatches(mismatches: &[ValueMismatch]) -> String {
    mismatches
        .iter()
        .map(|m| m.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

fn format_ids(ids: &[ElementId]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
