//! Test data builders for creating test elements and flows

use flowbench::pipeline::{
    nodes::{Evaluation, Producer},
    Bindings, ElementError, ElementOutputs, TypeSpec, Types,
};

/// Builder for closure-backed test elements
pub struct EvaluationBuilder {
    name: String,
    inputs: Vec<(String, TypeSpec)>,
    outputs: Vec<(String, TypeSpec)>,
}

impl EvaluationBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    pub fn input(mut self, name: &str, spec: TypeSpec) -> Self {
        self.inputs.push((name.to_string(), spec));
        self
    }

    pub fn output(mut self, name: &str, spec: TypeSpec) -> Self {
        self.outputs.push((name.to_string(), spec));
        self
    }

    pub fn build<F>(self, evaluator: F) -> Evaluation
    where
        F: FnMut(&Bindings, &mut ElementOutputs) -> Result<(), ElementError> + Send + 'static,
    {
        let inputs = Types::declare(self.inputs).expect("valid input names");
        let outputs = Types::declare(self.outputs).expect("valid output names");
        Evaluation::new(self.name, inputs, outputs, evaluator)
    }

    /// Element that publishes a fixed value on every declared output
    pub fn constant(self, value: i64) -> Evaluation {
        let names: Vec<String> = self.outputs.iter().map(|(n, _)| n.clone()).collect();
        self.build(move |_, outputs| {
            for name in &names {
                outputs.publish(name.clone(), value);
            }
            Ok(())
        })
    }
}

/// Producer with integer outputs of the given names
pub fn int_producer(name: &str, outputs: &[&str]) -> Producer {
    Producer::new(name, outputs.iter().map(|n| (*n, TypeSpec::Int))).expect("valid output names")
}

/// `value: int` -> `doubled: int`
pub fn doubler() -> Evaluation {
    EvaluationBuilder::new("Double")
        .input("value", TypeSpec::Int)
        .output("doubled", TypeSpec::Int)
        .build(|inputs, outputs| {
            let value = inputs
                .require("value")?
                .as_i64()
                .ok_or_else(|| ElementError::WrongInput("value must be an int".to_string()))?;
            outputs.publish("doubled", value * 2);
            Ok(())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowbench::pipeline::Element;

    #[test]
    fn test_evaluation_builder() {
        let element = EvaluationBuilder::new("Split")
            .input("value", TypeSpec::Int)
            .output("a", TypeSpec::Int)
            .output("b", TypeSpec::Int)
            .constant(1);

        assert_eq!(element.name(), "Split");
        assert!(element.inputs().contains("value"));
        assert_eq!(element.outputs().len(), 2);
    }
}
