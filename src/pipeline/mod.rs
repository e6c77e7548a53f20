//! Typed DAG pipeline engine.
//!
//! Elements declare named, typed inputs and outputs. Edges connect an
//! element's outputs to another element's inputs through a mapping. A flow
//! is validated before anything runs, sorted into levels, and swept once:
//! every element runs exactly once, after all of its producers.
//!
//! # Architecture
//!
//! ```text
//! [Producer] ──► [Evaluation] ──► [RuntimeStatistics] ──► [Send]
//!                                                 └──► [Print]
//! ```
//!
//! # Design
//!
//! - **Arena registry**: elements live in a `Vec`, addressed by `ElementId`.
//! - **Validate before sweep**: missing outputs, unsaturated inputs, type
//!   mismatches and cycles are all reported together, never piecemeal.
//! - **Level sort**: `edgesort` groups elements into levels; elements of
//!   one level do not depend on each other.
//! - **Output store**: values published during a sweep live outside the
//!   elements, keyed by element and output name.

pub mod chain;
pub mod compiled_plan;
pub mod compiler;
pub mod edge;
pub mod edgesort;
pub mod element;
pub mod environment;
pub mod error;
pub mod executor;
pub mod hooks;
pub mod id;
pub mod job;
pub mod kind;
pub mod nodes;
pub mod registry;
pub mod store;
pub mod types;
pub mod validate;
pub mod value;

pub use chain::{Pipeline, Via};
pub use compiled_plan::{CompiledPlan, PlanStats};
pub use compiler::FlowCompiler;
pub use edge::{Edge, MapEntry, Mapping};
pub use edgesort::{edgesort, level_map};
pub use element::{Bindings, Element, RunContext};
pub use environment::{Environment, Report};
pub use error::{ElementError, PipelineError, PipelineResult};
pub use executor::{resolve_bindings, Sweep, SweepStats};
pub use hooks::{FnHook, Hook};
pub use id::{EdgeId, ElementId};
pub use job::{Flow, Job, JobCheck};
pub use kind::{Capabilities, ElementKind, Transport};
pub use registry::Registry;
pub use store::{ElementOutputs, OutputStore};
pub use types::{Incompatibility, TypeSpec, Types, ValueMismatch};
pub use validate::{
    check_client, check_pipe, check_server, check_sink, validate, ValidationReport, Violation,
    Warning,
};
pub use value::Value;
