//! Producer: entry element fed by an external execution event.
//!
//! A producer declares outputs but never computes them: the workload layer
//! seeds them into the sweep's output store before the sweep starts. When
//! the scheduler reaches the producer, its run is a no-op and the usual
//! output check catches anything that was not seeded.

use crate::pipeline::element::{Element, RunContext};
use crate::pipeline::error::{ElementError, PipelineResult};
use crate::pipeline::kind::ElementKind;
use crate::pipeline::types::{TypeSpec, Types};

pub struct Producer {
    name: String,
    inputs: Types,
    outputs: Types,
}

impl Producer {
    /// Producer with the given `(name, type)` outputs.
    pub fn new<N: Into<String>>(
        name: impl Into<String>,
        outputs: impl IntoIterator<Item = (N, TypeSpec)>,
    ) -> PipelineResult<Self> {
        Ok(Self::with_types(name, Types::declare(outputs)?))
    }

    pub fn with_types(name: impl Into<String>, outputs: Types) -> Self {
        Self {
            name: name.into(),
            inputs: Types::new(),
            outputs,
        }
    }
}

impl Element for Producer {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ElementKind {
        ElementKind::Producer
    }

    fn inputs(&self) -> &Types {
        &self.inputs
    }

    fn outputs(&self) -> &Types {
        &self.outputs
    }

    fn run(&mut self, _ctx: &mut RunContext<'_>) -> Result<(), ElementError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_producer_has_no_inputs() {
        let p = Producer::new("Run", [("times", TypeSpec::list(TypeSpec::Int))]).unwrap();
        let caps = p.capabilities();
        assert!(!caps.has_inputs);
        assert!(caps.has_outputs);
        assert_eq!(p.kind(), ElementKind::Producer);
    }

    #[test]
    fn test_duplicate_outputs_rejected() {
        assert!(Producer::new("Run", [("a", TypeSpec::Int), ("a", TypeSpec::Int)]).is_err());
    }
}
