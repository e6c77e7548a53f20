//! Print: writes every binding it receives to a stream.

use crate::pipeline::element::{Element, RunContext};
use crate::pipeline::error::ElementError;
use crate::pipeline::kind::ElementKind;
use crate::pipeline::types::Types;
use std::io::Write;

pub struct Print {
    stream: Box<dyn Write + Send>,
    inputs: Types,
    outputs: Types,
}

impl Print {
    /// Print to stdout.
    pub fn new() -> Self {
        Self::to_writer(std::io::stdout())
    }

    pub fn to_writer(stream: impl Write + Send + 'static) -> Self {
        Self {
            stream: Box::new(stream),
            inputs: Types::open(),
            outputs: Types::new(),
        }
    }
}

impl Default for Print {
    fn default() -> Self {
        Self::new()
    }
}

impl Element for Print {
    fn name(&self) -> &str {
        "Print"
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
        for (name, value) in ctx.inputs.iter() {
            writeln!(self.stream, "{}: {}", name, value)?;
        }
        self.stream.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::element::Bindings;
    use crate::pipeline::store::ElementOutputs;
    use crate::pipeline::value::Value;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_prints_sorted_bindings() {
        let buf = SharedBuf::default();
        let mut print = Print::to_writer(buf.clone());
        let mut inputs = Bindings::new();
        inputs.insert("b", Value::from(vec![1i64, 2]));
        inputs.insert("a", "x");
        let mut outputs = ElementOutputs::new();
        let mut ctx = RunContext {
            inputs: &inputs,
            outputs: &mut outputs,
            environment: None,
        };
        print.run(&mut ctx).unwrap();

        let text = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
        assert_eq!(text, "a: x\nb: [1, 2]\n");
        assert!(print.inputs().is_open());
    }
}
