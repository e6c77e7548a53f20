//! Result transport between the client and the server flow.
//!
//! `SendResults` ends a client flow: everything fed to it is sent through
//! the environment's outbox, tagged with the current composition.
//! `ReceiveResults` starts a server flow: it drains the inbox and publishes
//! the collected data as `results`, a map from composition to its data.
//! The aggregating receivers in `aggregate` drain the inbox the same way.

use crate::pipeline::element::{Element, RunContext};
use crate::pipeline::environment::Environment;
use crate::pipeline::error::ElementError;
use crate::pipeline::kind::{ElementKind, Transport};
use crate::pipeline::types::{TypeSpec, Types};
use crate::pipeline::value::Value;
use std::collections::BTreeMap;

pub struct SendResults {
    inputs: Types,
    outputs: Types,
}

impl SendResults {
    pub fn new() -> Self {
        Self {
            inputs: Types::open(),
            outputs: Types::new(),
        }
    }
}

impl Default for SendResults {
    fn default() -> Self {
        Self::new()
    }
}

impl Element for SendResults {
    fn name(&self) -> &str {
        "Send"
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
        ctx.environment()?.send(ctx.inputs.clone().into_map())
    }

    fn transport(&self) -> Option<Transport> {
        Some(Transport::Send)
    }
}

/// Drain the inbox into a map from composition to its merged data.
pub(crate) fn collect_results(env: &Environment) -> BTreeMap<String, Value> {
    let mut results: BTreeMap<String, BTreeMap<String, Value>> = BTreeMap::new();
    for report in env.receive() {
        // reports of one composition are merged, later values win
        results
            .entry(report.composition)
            .or_default()
            .extend(report.data);
    }
    tracing::debug!("Received results of {} composition(s)", results.len());
    results
        .into_iter()
        .map(|(composition, data)| (composition, Value::Map(data)))
        .collect()
}

pub struct ReceiveResults {
    inputs: Types,
    outputs: Types,
}

impl ReceiveResults {
    pub fn new() -> Self {
        Self {
            inputs: Types::new(),
            outputs: Types::fixed(&[("results", TypeSpec::map(TypeSpec::map(TypeSpec::Any)))]),
        }
    }
}

impl Default for ReceiveResults {
    fn default() -> Self {
        Self::new()
    }
}

impl Element for ReceiveResults {
    fn name(&self) -> &str {
        "Receive"
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
        ctx.outputs.publish("results", results);
        Ok(())
    }

    fn transport(&self) -> Option<Transport> {
        Some(Transport::Receive)
    }
}
