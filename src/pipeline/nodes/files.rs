//! File elements: `Save` writes text fed to it, `Read` loads files back.

use crate::pipeline::element::{Element, RunContext};
use crate::pipeline::error::ElementError;
use crate::pipeline::kind::ElementKind;
use crate::pipeline::types::{TypeSpec, Types};
use crate::pipeline::value::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Writes its `data` input to a file.
///
/// A relative target is resolved against the environment's directory, so
/// the same job saves into each node's own working directory.
pub struct Save {
    target: PathBuf,
    inputs: Types,
    outputs: Types,
}

impl Save {
    pub fn new(target: impl Into<PathBuf>) -> Self {
        Self {
            target: target.into(),
            inputs: Types::fixed(&[("data", TypeSpec::Str)]),
            outputs: Types::new(),
        }
    }

    pub fn target(&self) -> &Path {
        &self.target
    }
}

impl Element for Save {
    fn name(&self) -> &str {
        "Save"
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
        let data = ctx
            .inputs
            .require("data")?
            .as_str()
            .ok_or_else(|| ElementError::WrongInput("'data' is not text".to_string()))?;
        let path = ctx.environment()?.resolve(&self.target);
        tracing::debug!("Saving {} byte(s) to {}", data.len(), path.display());
        fs::write(&path, data)?;
        Ok(())
    }
}

/// Reads every file of `paths` and publishes their contents as `data`.
pub struct Read {
    inputs: Types,
    outputs: Types,
}

impl Read {
    pub fn new() -> Self {
        Self {
            inputs: Types::fixed(&[(
                "paths",
                TypeSpec::list(TypeSpec::one_of([TypeSpec::Path, TypeSpec::Str])),
            )]),
            outputs: Types::fixed(&[("data", TypeSpec::list(TypeSpec::Str))]),
        }
    }
}

impl Default for Read {
    fn default() -> Self {
        Self::new()
    }
}

impl Element for Read {
    fn name(&self) -> &str {
        "Read"
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
        let mut data = Vec::new();
        for item in ctx.inputs.require_list("paths")? {
            let path = match item {
                Value::Path(path) => path.as_path(),
                Value::Str(path) => Path::new(path),
                other => {
                    return Err(ElementError::WrongInput(format!(
                        "expected a path, found {}",
                        other.type_name()
                    )))
                }
            };
            tracing::debug!("Reading {}", path.display());
            data.push(fs::read_to_string(path)?);
        }
        ctx.outputs.publish("data", data);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::element::Bindings;
    use crate::pipeline::environment::Environment;
    use crate::pipeline::store::ElementOutputs;

    fn run(element: &mut dyn Element, inputs: &Bindings, env: &Environment) -> Result<ElementOutputs, ElementError> {
        let mut outputs = ElementOutputs::new();
        let mut ctx = RunContext {
            inputs,
            outputs: &mut outputs,
            environment: Some(env),
        };
        element.run(&mut ctx)?;
        Ok(outputs)
    }

    #[test]
    fn test_save_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let env = Environment::new("job").with_directory(dir.path());

        let mut inputs = Bindings::new();
        inputs.insert("data", "{\"mean\": 1.5}");
        run(&mut Save::new("dump.json"), &inputs, &env).unwrap();

        let saved = dir.path().join("dump.json");
        let mut inputs = Bindings::new();
        inputs.insert("paths", vec![Value::Path(saved.clone()), Value::from(saved.to_string_lossy().into_owned())]);
        let out = run(&mut Read::new(), &inputs, &env).unwrap();
        assert_eq!(
            out.latest("data"),
            Some(&Value::from(vec!["{\"mean\": 1.5}", "{\"mean\": 1.5}"]))
        );
    }

    #[test]
    fn test_save_absolute_target_ignores_directory() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("abs.txt");
        let env = Environment::new("job").with_directory("/nonexistent");

        let mut inputs = Bindings::new();
        inputs.insert("data", "text");
        run(&mut Save::new(target.clone()), &inputs, &env).unwrap();
        assert_eq!(fs::read_to_string(target).unwrap(), "text");
    }

    #[test]
    fn test_read_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut inputs = Bindings::new();
        inputs.insert("paths", vec![Value::Path(dir.path().join("missing"))]);
        let err = run(&mut Read::new(), &inputs, &Environment::new("job")).unwrap_err();
        assert!(matches!(err, ElementError::Io(_)));
    }
}
