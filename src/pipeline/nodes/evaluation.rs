//! Evaluation: turns a closure into a transform element.
//!
//! The closure receives the resolved bindings and the element's output slot.
//! Declared descriptors are what validation sees, so they should be as exact
//! as the closure allows.

use crate::pipeline::element::{Bindings, Element, RunContext};
use crate::pipeline::error::ElementError;
use crate::pipeline::kind::ElementKind;
use crate::pipeline::store::ElementOutputs;
use crate::pipeline::types::Types;

type Evaluator = Box<dyn FnMut(&Bindings, &mut ElementOutputs) -> Result<(), ElementError> + Send>;

pub struct Evaluation {
    name: String,
    inputs: Types,
    outputs: Types,
    evaluator: Evaluator,
}

impl Evaluation {
    pub fn new<F>(name: impl Into<String>, inputs: Types, outputs: Types, evaluator: F) -> Self
    where
        F: FnMut(&Bindings, &mut ElementOutputs) -> Result<(), ElementError> + Send + 'static,
    {
        Self {
            name: name.into(),
            inputs,
            outputs,
            evaluator: Box::new(evaluator),
        }
    }
}

impl Element for Evaluation {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ElementKind {
        ElementKind::Transform
    }

    fn inputs(&self) -> &Types {
        &self.inputs
    }

    fn outputs(&self) -> &Types {
        &self.outputs
    }

    fn run(&mut self, ctx: &mut RunContext<'_>) -> Result<(), ElementError> {
        (self.evaluator)(ctx.inputs, &mut *ctx.outputs)
    }
}
