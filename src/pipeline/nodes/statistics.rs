//! Numeric summary elements.
//!
//! All of them read a list of numbers named `values` (except
//! `RuntimeStatistics`, which reads the `times` matrix of a benchmark run).

use crate::pipeline::element::{Element, RunContext};
use crate::pipeline::error::ElementError;
use crate::pipeline::kind::ElementKind;
use crate::pipeline::types::{TypeSpec, Types};
use crate::pipeline::value::Value;

fn numeric_list() -> TypeSpec {
    TypeSpec::list(TypeSpec::number())
}

fn average(values: &[f64]) -> Result<f64, ElementError> {
    if values.is_empty() {
        return Err(ElementError::WrongInput("empty list of values".to_string()));
    }
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

macro_rules! transform_element {
    ($ty:ty, $name:literal) => {
        impl Element for $ty {
            fn name(&self) -> &str {
                $name
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
                self.compute(ctx)
            }
        }
    };
}

/// Arithmetic mean of `values`, published as `mean`.
pub struct Mean {
    inputs: Types,
    outputs: Types,
}

impl Mean {
    pub fn new() -> Self {
        Self {
            inputs: Types::fixed(&[("values", numeric_list())]),
            outputs: Types::fixed(&[("mean", TypeSpec::Float)]),
        }
    }

    fn compute(&mut self, ctx: &mut RunContext<'_>) -> Result<(), ElementError> {
        let values = ctx.inputs.require_numbers("values")?;
        ctx.outputs.publish("mean", average(&values)?);
        Ok(())
    }
}

impl Default for Mean {
    fn default() -> Self {
        Self::new()
    }
}

transform_element!(Mean, "Mean");

/// Standard deviation of `values` with `ddof` delta degrees of freedom.
pub struct StandardDeviation {
    ddof: usize,
    inputs: Types,
    outputs: Types,
}

impl StandardDeviation {
    /// Sample standard deviation (`ddof = 1`).
    pub fn new() -> Self {
        Self::with_ddof(1)
    }

    pub fn with_ddof(ddof: usize) -> Self {
        Self {
            ddof,
            inputs: Types::fixed(&[("values", numeric_list())]),
            outputs: Types::fixed(&[("standard_deviation", TypeSpec::Float)]),
        }
    }

    pub fn ddof(&self) -> usize {
        self.ddof
    }

    fn compute(&mut self, ctx: &mut RunContext<'_>) -> Result<(), ElementError> {
        let values = ctx.inputs.require_numbers("values")?;
        if values.len() <= self.ddof {
            return Err(ElementError::WrongInput(format!(
                "need more than {} value(s), got {}",
                self.ddof,
                values.len()
            )));
        }
        let avg = average(&values)?;
        let squares: f64 = values.iter().map(|v| (v - avg).powi(2)).sum();
        let std = (squares / (values.len() - self.ddof) as f64).sqrt();
        ctx.outputs.publish("standard_deviation", std);
        Ok(())
    }
}

impl Default for StandardDeviation {
    fn default() -> Self {
        Self::new()
    }
}

transform_element!(StandardDeviation, "StandardDeviation");

/// Sum of `values`; stays an integer when every value is one.
pub struct Sum {
    inputs: Types,
    outputs: Types,
}

impl Sum {
    pub fn new() -> Self {
        Self {
            inputs: Types::fixed(&[("values", numeric_list())]),
            outputs: Types::fixed(&[("sum", TypeSpec::number())]),
        }
    }

    fn compute(&mut self, ctx: &mut RunContext<'_>) -> Result<(), ElementError> {
        let values = ctx.inputs.require_list("values")?;
        let ints: Option<Vec<i64>> = values.iter().map(Value::as_i64).collect();
        let sum = match ints {
            Some(ints) => Value::Int(ints.iter().sum()),
            None => Value::Float(ctx.inputs.require_numbers("values")?.iter().sum()),
        };
        ctx.outputs.publish("sum", sum);
        Ok(())
    }
}

impl Default for Sum {
    fn default() -> Self {
        Self::new()
    }
}

transform_element!(Sum, "Sum");

/// Per-iteration statistics over an `invocations x iterations` matrix of
/// wall clock times.
///
/// Outputs one list per statistic, one entry per iteration: `averages`,
/// `maximals`, `minimals`, and the relative `positive_deviations` /
/// `negative_deviations` of the extremes from the average.
pub struct RuntimeStatistics {
    inputs: Types,
    outputs: Types,
}

impl RuntimeStatistics {
    pub fn new() -> Self {
        let floats = || TypeSpec::list(TypeSpec::Float);
        Self {
            inputs: Types::fixed(&[("times", TypeSpec::list(numeric_list()))]),
            outputs: Types::fixed(&[
                ("averages", floats()),
                ("maximals", floats()),
                ("minimals", floats()),
                ("positive_deviations", floats()),
                ("negative_deviations", floats()),
            ]),
        }
    }

    fn compute(&mut self, ctx: &mut RunContext<'_>) -> Result<(), ElementError> {
        let invocations = ctx
            .inputs
            .require_list("times")?
            .iter()
            .map(|row| {
                row.as_f64_list().ok_or_else(|| {
                    ElementError::WrongInput("times must be a list of number lists".to_string())
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let iterations = invocations.first().map(Vec::len).unwrap_or(0);
        if iterations == 0 {
            return Err(ElementError::WrongInput("no iterations recorded".to_string()));
        }
        if invocations.iter().any(|row| row.len() != iterations) {
            return Err(ElementError::WrongInput(
                "invocations recorded differing numbers of iterations".to_string(),
            ));
        }

        let mut stats = RuntimeSummary::default();
        for i in 0..iterations {
            let column: Vec<f64> = invocations.iter().map(|row| row[i]).collect();
            let avg = average(&column)?;
            let max = column.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let min = column.iter().copied().fold(f64::INFINITY, f64::min);
            if avg == 0.0 {
                return Err(ElementError::WrongInput(format!(
                    "iteration {} averages to zero, deviations are undefined",
                    i
                )));
            }
            stats.averages.push(avg);
            stats.maximals.push(max);
            stats.minimals.push(min);
            stats.positive_deviations.push((max - avg).abs() / avg);
            stats.negative_deviations.push((min - avg).abs() / avg);
        }

        ctx.outputs.publish("averages", stats.averages);
        ctx.outputs.publish("maximals", stats.maximals);
        ctx.outputs.publish("minimals", stats.minimals);
        ctx.outputs.publish("positive_deviations", stats.positive_deviations);
        ctx.outputs.publish("negative_deviations", stats.negative_deviations);
        Ok(())
    }
}

impl Default for RuntimeStatistics {
    fn default() -> Self {
        Self::new()
    }
}

transform_element!(RuntimeStatistics, "RuntimeStatistics");

#[derive(Default)]
struct RuntimeSummary {
    averages: Vec<f64>,
    maximals: Vec<f64>,
    minimals: Vec<f64>,
    positive_deviations: Vec<f64>,
    negative_deviations: Vec<f64>,
}
