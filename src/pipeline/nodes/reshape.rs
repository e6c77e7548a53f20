//! Elements that reshape lists without computing statistics.

use crate::pipeline::element::{Bindings, Element, RunContext};
use crate::pipeline::error::{ElementError, PipelineError, PipelineResult};
use crate::pipeline::kind::ElementKind;
use crate::pipeline::store::ElementOutputs;
use crate::pipeline::types::{TypeSpec, Types};
use crate::pipeline::value::Value;

/// Passes `values` through and numbers them in `numbers`.
pub struct Enumerate {
    start: i64,
    step: i64,
    inputs: Types,
    outputs: Types,
}

impl Enumerate {
    pub fn new() -> Self {
        Self::with_range(0, 1)
    }

    pub fn with_range(start: i64, step: i64) -> Self {
        Self {
            start,
            step,
            inputs: Types::fixed(&[("values", TypeSpec::list(TypeSpec::Any))]),
            outputs: Types::fixed(&[
                ("values", TypeSpec::list(TypeSpec::Any)),
                ("numbers", TypeSpec::list(TypeSpec::Int)),
            ]),
        }
    }
}

impl Default for Enumerate {
    fn default() -> Self {
        Self::new()
    }
}

impl Element for Enumerate {
    fn name(&self) -> &str {
        "Enumerate"
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
        let values = ctx.inputs.require_list("values")?;
        let numbers = (0..values.len() as i64)
            .map(|i| {
                i.checked_mul(self.step)
                    .and_then(|offset| self.start.checked_add(offset))
                    .ok_or_else(|| {
                        ElementError::WrongInput(format!("enumeration overflows at item {}", i))
                    })
            })
            .collect::<Result<Vec<i64>, _>>()?;
        ctx.outputs.publish("values", values.to_vec());
        ctx.outputs.publish("numbers", numbers);
        Ok(())
    }
}

/// Reduces a singleton list to its only element.
pub struct Unpack {
    input: String,
    output: String,
    inputs: Types,
    outputs: Types,
}

impl Unpack {
    /// Reads `singleton`, publishes `result`.
    pub fn new() -> Self {
        Self::with_names("singleton", "result")
    }

    pub fn with_names(input: impl Into<String>, output: impl Into<String>) -> Self {
        let (input, output) = (input.into(), output.into());
        Self {
            inputs: Types::single(input.clone(), TypeSpec::list(TypeSpec::Any)),
            outputs: Types::single(output.clone(), TypeSpec::Any),
            input,
            output,
        }
    }
}

impl Default for Unpack {
    fn default() -> Self {
        Self::new()
    }
}

impl Element for Unpack {
    fn name(&self) -> &str {
        "Unpack"
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
        match ctx.inputs.require_list(&self.input)? {
            [only] => {
                ctx.outputs.publish(self.output.clone(), only.clone());
                Ok(())
            }
            items => Err(ElementError::WrongInput(format!(
                "expected exactly one element in '{}', got {}",
                self.input,
                items.len()
            ))),
        }
    }
}

/// Formats every number in `values` with a template.
///
/// Each `{}` in the template is replaced by the value.
pub struct Decorate {
    template: String,
    inputs: Types,
    outputs: Types,
}

impl Decorate {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            inputs: Types::fixed(&[("values", TypeSpec::list(TypeSpec::number()))]),
            outputs: Types::fixed(&[("values", TypeSpec::list(TypeSpec::Str))]),
        }
    }

    pub fn template(&self) -> &str {
        &self.template
    }
}

impl Element for Decorate {
    fn name(&self) -> &str {
        "Decorate"
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
        let decorated: Vec<String> = ctx
            .inputs
            .require_list("values")?
            .iter()
            .map(|v| self.template.replace("{}", &v.to_string()))
            .collect();
        ctx.outputs.publish("values", decorated);
        Ok(())
    }
}

/// Applies a one-input, one-output element to every item of a list.
///
/// The inner element is reset after every item, so it never sees state
/// from the previous one.
pub struct MapEach {
    name: String,
    inner: Box<dyn Element>,
    input: String,
    output: String,
    inner_input: String,
    inner_output: String,
    inputs: Types,
    outputs: Types,
}

impl MapEach {
    /// Reads `values`, publishes `result`.
    pub fn new(inner: impl Element + 'static) -> PipelineResult<Self> {
        Self::with_names(inner, "values", "result")
    }

    pub fn with_names(
        inner: impl Element + 'static,
        input: impl Into<String>,
        output: impl Into<String>,
    ) -> PipelineResult<Self> {
        let (inner_input, input_spec) = sole_slot(inner.inputs(), "input")?;
        let (inner_output, output_spec) = sole_slot(inner.outputs(), "output")?;
        if inner.kind().needs_environment() {
            return Err(PipelineError::Schema(
                "cannot map a system-scoped element".to_string(),
            ));
        }
        let (input, output) = (input.into(), output.into());
        Ok(Self {
            name: format!("Map({})", inner.name()),
            inputs: Types::single(input.clone(), TypeSpec::list(input_spec)),
            outputs: Types::single(output.clone(), TypeSpec::list(output_spec)),
            inner: Box::new(inner),
            input,
            output,
            inner_input,
            inner_output,
        })
    }

    fn apply(&mut self, item: &Value) -> Result<Value, ElementError> {
        let mut bindings = Bindings::new();
        bindings.insert(self.inner_input.clone(), item.clone());
        let mut outputs = ElementOutputs::new();
        let mut ctx = RunContext {
            inputs: &bindings,
            outputs: &mut outputs,
            environment: None,
        };
        let result = self.inner.run(&mut ctx);
        self.inner.reset();
        result?;
        outputs.latest(&self.inner_output).cloned().ok_or_else(|| {
            ElementError::Other(format!(
                "{} did not publish '{}'",
                self.inner.name(),
                self.inner_output
            ))
        })
    }
}

fn sole_slot(types: &Types, what: &str) -> PipelineResult<(String, TypeSpec)> {
    let mut slots = types.iter();
    match (slots.next(), slots.next()) {
        (Some((name, spec)), None) => Ok((name.to_string(), spec.clone())),
        _ => Err(PipelineError::Schema(format!(
            "mapped element must have exactly one {}",
            what
        ))),
    }
}

impl Element for MapEach {
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
        let items = ctx.inputs.require_list(&self.input)?.to_vec();
        let mut results = Vec::with_capacity(items.len());
        for item in &items {
            results.push(self.apply(item)?);
        }
        ctx.outputs.publish(self.output.clone(), results);
        Ok(())
    }

    fn reset(&mut self) {
        self.inner.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::nodes::{Mean, SendResults};

    fn run(element: &mut dyn Element, inputs: Bindings) -> Result<ElementOutputs, ElementError> {
        let mut outputs = ElementOutputs::new();
        let mut ctx = RunContext {
            inputs: &inputs,
            outputs: &mut outputs,
            environment: None,
        };
        element.run(&mut ctx)?;
        Ok(outputs)
    }

    fn bind(name: &str, v: Value) -> Bindings {
        let mut b = Bindings::new();
        b.insert(name, v);
        b
    }

    #[test]
    fn test_enumerate() {
        let out = run(
            &mut Enumerate::with_range(1, 2),
            bind("values", Value::from(vec!["a", "b", "c"])),
        )
        .unwrap();
        assert_eq!(out.latest("numbers"), Some(&Value::from(vec![1i64, 3, 5])));
        assert_eq!(out.latest("values"), Some(&Value::from(vec!["a", "b", "c"])));
    }

    #[test]
    fn test_enumerate_overflow_is_an_error() {
        let err = run(
            &mut Enumerate::with_range(i64::MAX, 1),
            bind("values", Value::from(vec!["a", "b"])),
        )
        .unwrap_err();
        assert!(matches!(err, ElementError::WrongInput(_)));
    }

    #[test]
    fn test_unpack() {
        let out = run(&mut Unpack::new(), bind("singleton", Value::from(vec![7i64]))).unwrap();
        assert_eq!(out.latest("result"), Some(&Value::Int(7)));

        let err = run(&mut Unpack::new(), bind("singleton", Value::from(vec![1i64, 2])));
        assert!(matches!(err, Err(ElementError::WrongInput(_))));
    }

    #[test]
    fn test_decorate() {
        let out = run(
            &mut Decorate::new("{} ms"),
            bind("values", Value::from(vec![Value::Int(3), Value::Float(1.5)])),
        )
        .unwrap();
        assert_eq!(out.latest("values"), Some(&Value::from(vec!["3 ms", "1.5 ms"])));
    }

    #[test]
    fn test_map_each_applies_inner_element() {
        let mut map = MapEach::new(Mean::new()).unwrap();
        assert_eq!(
            map.inputs().get("values"),
            Some(&TypeSpec::list(TypeSpec::list(TypeSpec::number())))
        );

        let out = run(
            &mut map,
            bind("values", Value::from(vec![vec![1i64, 3], vec![2, 4]])),
        )
        .unwrap();
        assert_eq!(out.latest("result"), Some(&Value::from(vec![2.0, 3.0])));
    }

    #[test]
    fn test_map_each_needs_single_slots() {
        assert!(MapEach::new(Enumerate::new()).is_err());
        assert!(MapEach::new(SendResults::new()).is_err());
    }
}
