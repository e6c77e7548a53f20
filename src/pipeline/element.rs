//! Element abstraction for the pipeline.
//!
//! An element is one processing step: a producer, a transform or a
//! system-scoped transform. All of them implement the single `Element`
//! trait; the variant is reported through `kind()` instead of a type
//! hierarchy.

use crate::pipeline::environment::Environment;
use crate::pipeline::error::ElementError;
use crate::pipeline::kind::{Capabilities, ElementKind, Transport};
use crate::pipeline::store::ElementOutputs;
use crate::pipeline::types::Types;
use crate::pipeline::value::Value;
use std::collections::BTreeMap;

/// Resolved input values of one element run, keyed by input name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bindings {
    values: BTreeMap<String, Value>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a value; a later binding of the same name replaces the earlier one.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Like `get`, but a missing input is an element error.
    pub fn require(&self, name: &str) -> Result<&Value, ElementError> {
        self.values
            .get(name)
            .ok_or_else(|| ElementError::MissingInput(name.to_string()))
    }

    /// Numeric list input.
    pub fn require_numbers(&self, name: &str) -> Result<Vec<f64>, ElementError> {
        self.require(name)?.as_f64_list().ok_or_else(|| {
            ElementError::WrongInput(format!("'{}' is not a list of numbers", name))
        })
    }

    pub fn require_list(&self, name: &str) -> Result<&[Value], ElementError> {
        self.require(name)?
            .as_list()
            .ok_or_else(|| ElementError::WrongInput(format!("'{}' is not a list", name)))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(|k| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn into_map(self) -> BTreeMap<String, Value> {
        self.values
    }
}

impl FromIterator<(String, Value)> for Bindings {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Context passed to `Element::run`.
pub struct RunContext<'a> {
    /// Input values resolved by the scheduler from incoming edges.
    pub inputs: &'a Bindings,
    /// This element's own output slot; the element writes its results here.
    pub outputs: &'a mut ElementOutputs,
    /// Injected only for `ElementKind::SystemTransform`.
    pub environment: Option<&'a Environment>,
}

impl RunContext<'_> {
    /// Environment handle, or an error for elements run outside a host.
    pub fn environment(&self) -> Result<&Environment, ElementError> {
        self.environment
            .ok_or_else(|| ElementError::Other("no execution environment injected".to_string()))
    }
}

/// The runnable contract shared by every pipeline element.
pub trait Element: Send {
    /// Human-readable name of this element.
    fn name(&self) -> &str;

    /// Which execution obligations the scheduler has towards this element.
    fn kind(&self) -> ElementKind;

    /// Declared inputs (empty for producers).
    fn inputs(&self) -> &Types;

    /// Declared outputs.
    fn outputs(&self) -> &Types;

    /// Consume resolved inputs and publish every declared output.
    ///
    /// Calling `run` twice accumulates into the output slot; the scheduler
    /// invokes it at most once per sweep.
    fn run(&mut self, ctx: &mut RunContext<'_>) -> Result<(), ElementError>;

    /// Clear run-scoped state before an independent sweep.
    fn reset(&mut self) {}

    /// Whether the element sends or receives results between flows.
    fn transport(&self) -> Option<Transport> {
        None
    }

    /// Capability flags derived from kind and descriptors.
    fn capabilities(&self) -> Capabilities {
        Capabilities {
            has_inputs: self.inputs().is_open() || !self.inputs().is_empty(),
            has_outputs: !self.outputs().is_empty(),
            needs_environment: self.kind().needs_environment(),
        }
    }
}
