//! Static validation of a flow before any element runs.
//!
//! `check_pipe` checks each edge's mapping against the declared descriptors
//! of its two ends; `check_sink` checks that every declared input of every
//! element is fed by at least one incoming edge. Both are pure and collect
//! every problem instead of stopping at the first, so one report shows the
//! job author all their mistakes at once.

use crate::pipeline::chain::Pipeline;
use crate::pipeline::edge::Mapping;
use crate::pipeline::edgesort::edgesort;
use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::id::{EdgeId, ElementId};
use crate::pipeline::kind::Transport;
use crate::pipeline::registry::Registry;
use crate::pipeline::types::{Incompatibility, TypeSpec};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// A problem that makes a flow unrunnable.
#[derive(Debug, Clone, PartialEq)]
pub enum Violation {
    /// The mapping reads an output the source does not declare.
    MissingSourceOutput {
        edge: EdgeId,
        source: String,
        name: String,
    },
    /// The mapping feeds an input the (closed) sink does not declare.
    UnknownSinkInput {
        edge: EdgeId,
        sink: String,
        name: String,
    },
    TypeMismatch {
        edge: EdgeId,
        source: String,
        sink: String,
        source_name: String,
        sink_name: String,
        expected: TypeSpec,
        found: TypeSpec,
    },
    /// Declared inputs that no incoming edge feeds.
    Unsaturated {
        element: ElementId,
        label: String,
        missing: Vec<String>,
    },
    /// A producer declaring inputs; producers are fed by the workload only.
    ProducerWithInputs { element: ElementId, label: String },
    /// An edge refers to an element that is not registered.
    UnknownElement { edge: EdgeId, element: ElementId },
    Cycle { elements: Vec<ElementId> },
    /// The client flow never ships its results.
    MissingSend,
    /// The server flow does not start from a receiving element.
    MissingReceive,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::MissingSourceOutput { edge, source, name } => {
                write!(f, "{}: {} has no output '{}'", edge, source, name)
            }
            Violation::UnknownSinkInput { edge, sink, name } => {
                write!(f, "{}: {} has no input '{}'", edge, sink, name)
            }
            Violation::TypeMismatch {
                edge,
                source,
                sink,
                source_name,
                sink_name,
                expected,
                found,
            } => write!(
                f,
                "{}: {}.{} is {}, but {}.{} expects {}",
                edge, source, source_name, found, sink, sink_name, expected
            ),
            Violation::Unsaturated { label, missing, .. } => {
                write!(f, "{} is missing inputs: {}", label, missing.join(", "))
            }
            Violation::ProducerWithInputs { label, .. } => {
                write!(f, "{} is a producer but declares inputs", label)
            }
            Violation::UnknownElement { edge, element } => {
                write!(f, "{}: unknown element {}", edge, element)
            }
            Violation::Cycle { elements } => {
                let ids: Vec<String> = elements.iter().map(|e| e.to_string()).collect();
                write!(f, "cycle between {}", ids.join(", "))
            }
            Violation::MissingSend => write!(f, "client flow has no Send element"),
            Violation::MissingReceive => {
                write!(f, "server flow does not start with a Receive element")
            }
        }
    }
}

/// A suspicious but runnable construct.
#[derive(Debug, Clone, PartialEq)]
pub enum Warning {
    /// An identity-mapped output the sink does not consume.
    UnusedOutput {
        edge: EdgeId,
        source: String,
        sink: String,
        name: String,
    },
    /// One input fed by several edges; the last edge in flow order wins.
    MultiplyFedInput {
        element: ElementId,
        label: String,
        name: String,
        edges: Vec<EdgeId>,
    },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::UnusedOutput {
                edge,
                source,
                sink,
                name,
            } => write!(f, "{}: output '{}' of {} is not used by {}", edge, name, source, sink),
            Warning::MultiplyFedInput {
                label, name, edges, ..
            } => write!(
                f,
                "input '{}' of {} is fed by {} edges",
                name,
                label,
                edges.len()
            ),
        }
    }
}

/// Everything static validation found in one flow.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    pub violations: Vec<Violation>,
    pub warnings: Vec<Warning>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn is_clean(&self) -> bool {
        self.violations.is_empty() && self.warnings.is_empty()
    }

    pub fn merge(&mut self, other: ValidationReport) {
        self.violations.extend(other.violations);
        self.warnings.extend(other.warnings);
    }

    /// Turn the report into a result. With `strict`, warnings are fatal too.
    pub fn into_result(self, strict: bool) -> PipelineResult<Vec<Warning>> {
        if !self.is_valid() || (strict && !self.warnings.is_empty()) {
            return Err(PipelineError::Validation(self));
        }
        Ok(self.warnings)
    }
}

/// Check every edge's mapping against the declared descriptors.
pub fn check_pipe(registry: &Registry, pipeline: &Pipeline) -> ValidationReport {
    let mut report = ValidationReport::new();

    for (edge_id, edge) in pipeline.iter_edges() {
        let (source, sink) = match (registry.get(edge.source()), registry.get(edge.sink())) {
            (Ok(source), Ok(sink)) => (source, sink),
            (source, _) => {
                let element = if source.is_err() {
                    edge.source()
                } else {
                    edge.sink()
                };
                report.violations.push(Violation::UnknownElement {
                    edge: edge_id,
                    element,
                });
                continue;
            }
        };
        let source_label = registry.label(edge.source());
        let sink_label = registry.label(edge.sink());

        let pairs = match edge.mapping() {
            Mapping::Identity => {
                let mut used = Vec::new();
                for name in source.outputs().names() {
                    if sink.inputs().accepts_name(name) {
                        used.push((name.to_string(), name.to_string()));
                    } else {
                        report.warnings.push(Warning::UnusedOutput {
                            edge: edge_id,
                            source: source_label.clone(),
                            sink: sink_label.clone(),
                            name: name.to_string(),
                        });
                    }
                }
                used
            }
            Mapping::Explicit(pairs) => pairs.clone(),
        };

        for problem in sink.inputs().is_satisfied_by(source.outputs(), &pairs) {
            report.violations.push(match problem {
                Incompatibility::MissingSource(name) => Violation::MissingSourceOutput {
                    edge: edge_id,
                    source: source_label.clone(),
                    name,
                },
                Incompatibility::MissingSink(name) => Violation::UnknownSinkInput {
                    edge: edge_id,
                    sink: sink_label.clone(),
                    name,
                },
                Incompatibility::Type {
                    source_name,
                    sink_name,
                    expected,
                    found,
                } => Violation::TypeMismatch {
                    edge: edge_id,
                    source: source_label.clone(),
                    sink: sink_label.clone(),
                    source_name,
                    sink_name,
                    expected,
                    found,
                },
            });
        }
    }

    report
}

/// Sink input names an edge feeds, as seen by the sink.
fn fed_names(registry: &Registry, pipeline: &Pipeline, edge_id: EdgeId) -> Vec<String> {
    let Some(edge) = pipeline.edge_by_id(edge_id) else {
        return Vec::new();
    };
    match edge.mapping() {
        Mapping::Explicit(pairs) => pairs.iter().map(|(_, to)| to.clone()).collect(),
        Mapping::Identity => match (registry.get(edge.source()), registry.get(edge.sink())) {
            (Ok(source), Ok(sink)) => source
                .outputs()
                .names()
                .filter(|n| sink.inputs().accepts_name(n))
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        },
    }
}

/// Check that every declared input of every element in the flow is fed.
///
/// Elements with declared inputs and no incoming edge at all are reported
/// too; there are no optional inputs. Producers must not declare any.
pub fn check_sink(registry: &Registry, pipeline: &Pipeline) -> ValidationReport {
    let mut report = ValidationReport::new();

    // sink -> input name -> feeding edges
    let mut fed: HashMap<ElementId, BTreeMap<String, Vec<EdgeId>>> = HashMap::new();
    for (edge_id, edge) in pipeline.iter_edges() {
        let names = fed.entry(edge.sink()).or_default();
        for name in fed_names(registry, pipeline, edge_id) {
            names.entry(name).or_default().push(edge_id);
        }
    }

    for &element in pipeline.nodes() {
        let Ok(sink) = registry.get(element) else {
            // reported by check_pipe
            continue;
        };
        if !sink.kind().accepts_inputs() && (sink.inputs().is_open() || !sink.inputs().is_empty()) {
            report.violations.push(Violation::ProducerWithInputs {
                element,
                label: registry.label(element),
            });
            continue;
        }

        let incoming = fed.get(&element);
        let missing: Vec<String> = sink
            .inputs()
            .names()
            .filter(|name| !incoming.is_some_and(|m| m.contains_key(*name)))
            .map(str::to_string)
            .collect();
        if !missing.is_empty() {
            report.violations.push(Violation::Unsaturated {
                element,
                label: registry.label(element),
                missing,
            });
        }

        if let Some(incoming) = incoming {
            for (name, edges) in incoming {
                if edges.len() > 1 {
                    report.warnings.push(Warning::MultiplyFedInput {
                        element,
                        label: registry.label(element),
                        name: name.clone(),
                        edges: edges.clone(),
                    });
                }
            }
        }
    }

    report
}

/// Full plausibility check of one flow: pipes, saturation and acyclicity.
///
/// An empty violation list means the flow can be scheduled and run.
pub fn validate(registry: &Registry, pipeline: &Pipeline) -> ValidationReport {
    let mut report = check_pipe(registry, pipeline);
    report.merge(check_sink(registry, pipeline));
    if let Err(PipelineError::CyclicDependency { elements }) =
        edgesort(pipeline.nodes(), pipeline.edges())
    {
        report.violations.push(Violation::Cycle { elements });
    }
    for warning in &report.warnings {
        tracing::warn!("{}", warning);
    }
    report
}

/// Shape check of a client flow: something must send its results.
pub fn check_client(registry: &Registry, pipeline: &Pipeline) -> ValidationReport {
    let mut report = ValidationReport::new();
    let sends = pipeline.nodes().iter().any(|&id| {
        registry
            .get(id)
            .is_ok_and(|e| e.transport() == Some(Transport::Send))
    });
    if !sends {
        report.violations.push(Violation::MissingSend);
    }
    report
}

/// Shape check of a server flow: a non-empty flow starts from a receiver.
pub fn check_server(registry: &Registry, pipeline: &Pipeline) -> ValidationReport {
    let mut report = ValidationReport::new();
    if pipeline.nodes().is_empty() {
        return report;
    }
    let receives = pipeline
        .nodes()
        .iter()
        .filter(|&&id| !pipeline.edges().iter().any(|e| e.sink() == id))
        .any(|&id| {
            registry
                .get(id)
                .is_ok_and(|e| e.transport() == Some(Transport::Receive))
        });
    if !receives {
        report.violations.push(Violation::MissingReceive);
    }
    report
}
