//! Dump: serializes everything fed to it as one JSON document.
//!
//! The document has two keys: `system`, describing where the sweep ran, and
//! `data`, holding every input under its name. The text is published as the
//! `dump` output so a later element (or the host) can store it.

use crate::pipeline::element::{Element, RunContext};
use crate::pipeline::error::ElementError;
use crate::pipeline::kind::ElementKind;
use crate::pipeline::types::{TypeSpec, Types};
use crate::pipeline::value::Value;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Serialize)]
struct SystemInfo<'a> {
    job: &'a str,
    composition: Option<&'a str>,
    timestamp: String,
    version: &'static str,
}

#[derive(Debug, Serialize)]
struct Document<'a> {
    system: SystemInfo<'a>,
    data: &'a BTreeMap<String, Value>,
}

pub struct Dump {
    pretty: bool,
    inputs: Types,
    outputs: Types,
}

impl Dump {
    pub fn new() -> Self {
        Self {
            pretty: false,
            inputs: Types::open(),
            outputs: Types::fixed(&[("dump", TypeSpec::Str)]),
        }
    }

    /// Indent the JSON output.
    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }
}

impl Default for Dump {
    fn default() -> Self {
        Self::new()
    }
}

impl Element for Dump {
    fn name(&self) -> &str {
        "Dump"
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
        let env = ctx.environment()?;
        let data: BTreeMap<String, Value> = ctx
            .inputs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        let document = Document {
            system: SystemInfo {
                job: env.job(),
                composition: env.composition(),
                timestamp: chrono::Utc::now().to_rfc3339(),
                version: env!("CARGO_PKG_VERSION"),
            },
            data: &data,
        };
        let text = if self.pretty {
            serde_json::to_string_pretty(&document)?
        } else {
            serde_json::to_string(&document)?
        };
        ctx.outputs.publish("dump", text);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::element::Bindings;
    use crate::pipeline::environment::Environment;
    use crate::pipeline::store::ElementOutputs;

    #[test]
    fn test_dump_document() {
        let env = Environment::new("bench.job").with_composition("jvm @ localhost");
        let mut inputs = Bindings::new();
        inputs.insert("times", Value::from(vec![1i64, 2]));
        let mut outputs = ElementOutputs::new();
        let mut ctx = RunContext {
            inputs: &inputs,
            outputs: &mut outputs,
            environment: Some(&env),
        };
        Dump::new().run(&mut ctx).unwrap();

        let text = outputs.latest("dump").and_then(Value::as_str).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(text).unwrap();
        assert_eq!(parsed["system"]["job"], "bench.job");
        assert_eq!(parsed["system"]["composition"], "jvm @ localhost");
        assert_eq!(parsed["data"]["times"], serde_json::json!([1, 2]));
    }

    #[test]
    fn test_dump_without_environment_fails() {
        let inputs = Bindings::new();
        let mut outputs = ElementOutputs::new();
        let mut ctx = RunContext {
            inputs: &inputs,
            outputs: &mut outputs,
            environment: None,
        };
        assert!(Dump::new().run(&mut ctx).is_err());
    }
}
