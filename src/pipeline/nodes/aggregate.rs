//! Extracting columns out of the collected result set.
//!
//! A result set maps each composition to the data its client flow sent.
//! `Aggregate` picks single columns out of it; `Condense` builds parallel
//! lists row by row, one row per composition. The receiving variants drain
//! the inbox themselves and so start a server flow without a separate
//! `Receive`.

use crate::pipeline::element::{Element, RunContext};
use crate::pipeline::error::{ElementError, PipelineError, PipelineResult};
use crate::pipeline::kind::{ElementKind, Transport};
use crate::pipeline::nodes::transport::collect_results;
use crate::pipeline::store::ElementOutputs;
use crate::pipeline::types::{TypeSpec, Types};
use crate::pipeline::value::Value;
use std::collections::BTreeMap;

/// A column of the result set.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    /// Looked up in whichever composition has it.
    Any(String),
    /// Looked up in one composition.
    From { composition: String, name: String },
}

impl Column {
    pub fn name(&self) -> &str {
        match self {
            Column::Any(name) | Column::From { name, .. } => name,
        }
    }
}

impl From<&str> for Column {
    fn from(name: &str) -> Self {
        Column::Any(name.to_string())
    }
}

impl From<(&str, &str)> for Column {
    fn from((composition, name): (&str, &str)) -> Self {
        Column::From {
            composition: composition.to_string(),
            name: name.to_string(),
        }
    }
}

fn results_input() -> Types {
    Types::fixed(&[("results", TypeSpec::map(TypeSpec::map(TypeSpec::Any)))])
}

fn lookup<'a>(results: &'a BTreeMap<String, Value>, composition: &str, name: &str) -> Option<&'a Value> {
    results.get(composition)?.as_map()?.get(name)
}

fn missing_column(name: &str) -> ElementError {
    ElementError::WrongInput(format!("column '{}' is not contained in the result set", name))
}

fn aggregate_into(
    columns: &[Column],
    results: &BTreeMap<String, Value>,
    outputs: &mut ElementOutputs,
) -> Result<(), ElementError> {
    for column in columns {
        let value = match column {
            Column::Any(name) => {
                let mut found = results
                    .keys()
                    .filter_map(|composition| lookup(results, composition, name));
                let value = found.next().ok_or_else(|| missing_column(name))?;
                if found.next().is_some() {
                    tracing::warn!("Column '{}' is contained in more than one composition", name);
                }
                value
            }
            Column::From { composition, name } => {
                lookup(results, composition, name).ok_or_else(|| missing_column(name))?
            }
        };
        outputs.publish(column.name(), value.clone());
    }
    Ok(())
}

fn aggregate_outputs(columns: &[Column]) -> PipelineResult<Types> {
    if columns.is_empty() {
        return Err(PipelineError::Schema(
            "Aggregate needs at least one column".to_string(),
        ));
    }
    Types::declare(columns.iter().map(|c| (c.name().to_string(), TypeSpec::Any)))
}

/// Publishes the named columns of `results` as outputs of the same name.
pub struct Aggregate {
    columns: Vec<Column>,
    inputs: Types,
    outputs: Types,
}

impl Aggregate {
    pub fn new<C: Into<Column>>(columns: impl IntoIterator<Item = C>) -> PipelineResult<Self> {
        let columns: Vec<Column> = columns.into_iter().map(Into::into).collect();
        Ok(Self {
            outputs: aggregate_outputs(&columns)?,
            inputs: results_input(),
            columns,
        })
    }
}

impl Element for Aggregate {
    fn name(&self) -> &str {
        "Aggregate"
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
        let results = ctx
            .inputs
            .require("results")?
            .as_map()
            .ok_or_else(|| ElementError::WrongInput("'results' is not a map".to_string()))?;
        aggregate_into(&self.columns, results, ctx.outputs)
    }
}

/// One field of a condensed row.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    /// A column of the row's composition.
    Column(String),
    /// A literal copied into the output as is.
    Value(Value),
}

impl From<&str> for Field {
    fn from(column: &str) -> Self {
        Field::Column(column.to_string())
    }
}

/// One row of a `Condense`: its fields line up with the output names.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    composition: Option<String>,
    fields: Vec<Field>,
}

impl Row {
    /// Row whose composition is the first one holding its first column.
    pub fn new(fields: impl IntoIterator<Item = Field>) -> Self {
        Self {
            composition: None,
            fields: fields.into_iter().collect(),
        }
    }

    /// Row reading every column from `composition`.
    pub fn of(composition: impl Into<String>, fields: impl IntoIterator<Item = Field>) -> Self {
        Self {
            composition: Some(composition.into()),
            fields: fields.into_iter().collect(),
        }
    }
}

fn condense_into(
    names: &[String],
    rows: &[Row],
    results: &BTreeMap<String, Value>,
    outputs: &mut ElementOutputs,
) -> Result<(), ElementError> {
    let mut columns: Vec<Vec<Value>> = vec![Vec::new(); names.len()];
    for row in rows {
        // every column of a row comes from the same composition
        let mut composition = row.composition.as_deref();
        for (column, field) in columns.iter_mut().zip(&row.fields) {
            let value = match field {
                Field::Value(value) => value.clone(),
                Field::Column(name) => {
                    if composition.is_none() {
                        composition = results
                            .keys()
                            .find(|c| lookup(results, c, name).is_some())
                            .map(String::as_str);
                    }
                    composition
                        .and_then(|c| lookup(results, c, name))
                        .ok_or_else(|| missing_column(name))?
                        .clone()
                }
            };
            column.push(value);
        }
    }
    for (name, column) in names.iter().zip(columns) {
        outputs.publish(name.as_str(), column);
    }
    Ok(())
}

fn condense_outputs(names: &[String], rows: &[Row]) -> PipelineResult<Types> {
    if let Some(row) = rows.iter().find(|r| r.fields.len() != names.len()) {
        return Err(PipelineError::Schema(format!(
            "Condense row has {} field(s) for {} name(s)",
            row.fields.len(),
            names.len()
        )));
    }
    Types::declare(names.iter().map(|n| (n.clone(), TypeSpec::list(TypeSpec::Any))))
}

/// Merges columns of several compositions into parallel lists.
pub struct Condense {
    names: Vec<String>,
    rows: Vec<Row>,
    inputs: Types,
    outputs: Types,
}

impl Condense {
    pub fn new<N: Into<String>>(
        names: impl IntoIterator<Item = N>,
        rows: impl IntoIterator<Item = Row>,
    ) -> PipelineResult<Self> {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let rows: Vec<Row> = rows.into_iter().collect();
        Ok(Self {
            outputs: condense_outputs(&names, &rows)?,
            inputs: results_input(),
            names,
            rows,
        })
    }
}

impl Element for Condense {
    fn name(&self) -> &str {
        "Condense"
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
        let results = ctx
            .inputs
            .require("results")?
            .as_map()
            .ok_or_else(|| ElementError::WrongInput("'results' is not a map".to_string()))?;
        condense_into(&self.names, &self.rows, results, ctx.outputs)
    }
}

/// `Receive` followed by `Aggregate`, in one element.
pub struct AggregatingReceive {
    columns: Vec<Column>,
    inputs: Types,
    outputs: Types,
}

impl AggregatingReceive {
    pub fn new<C: Into<Column>>(columns: impl IntoIterator<Item = C>) -> PipelineResult<Self> {
        let columns: Vec<Column> = columns.into_iter().map(Into::into).collect();
        Ok(Self {
            outputs: aggregate_outputs(&columns)?,
            inputs: Types::new(),
            columns,
        })
    }
}

impl Element for AggregatingReceive {
    fn name(&self) -> &str {
        "AggregatingReceive"
    }

    fn kind(&self) -> ElementKind {
        ElementKind::SystemTransform
    }

    fn inputs(&self) -> &Types {
        &self.inputs
    }

    fn outputs(&self) -> &Types {
        &self.outputs
    }

    fn run(&mut self, ctx: &mut RunContext<'_>) -> Result<(), ElementError> {
        let results = collect_results(ctx.environment()?);
        aggregate_into(&self.columns, &results, ctx.outputs)
    }

    fn transport(&self) -> Option<Transport> {
        Some(Transport::Receive)
    }
}

/// `Receive` followed by `Condense`, in one element.
pub struct CondensingReceive {
    names: Vec<String>,
    rows: Vec<Row>,
    inputs: Types,
    outputs: Types,
}

impl CondensingReceive {
    pub fn new<N: Into<String>>(
        names: impl IntoIterator<Item = N>,
        rows: impl IntoIterator<Item = Row>,
    ) -> PipelineResult<Self> {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let rows: Vec<Row> = rows.into_iter().collect();
        Ok(Self {
            outputs: condense_outputs(&names, &rows)?,
            inputs: Types::new(),
            names,
            rows,
        })
    }
}

impl Element for CondensingReceive {
    fn name(&self) -> &str {
        "CondensingReceive"
    }

    fn kind(&self) -> ElementKind {
        ElementKind::SystemTransform
    }

    fn inputs(&self) -> &Types {
        &self.inputs
    }

    fn outputs(&self) -> &Types {
        &self.outputs
    }

    fn run(&mut self, ctx: &mut RunContext<'_>) -> Result<(), ElementError> {
        let results = collect_results(ctx.environment()?);
        condense_into(&self.names, &self.rows, &results, ctx.outputs)
    }

    fn transport(&self) -> Option<Transport> {
        Some(Transport::Receive)
    }
}
