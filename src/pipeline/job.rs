//! Job: the unit a benchmark author defines.
//!
//! A job owns its elements and two flows: the client flow, swept on every
//! node after the workload ran, and the server flow, swept once on the
//! collector after all client results arrived. Both flows refer to elements
//! of the same registry, so an element may take part in either.

use crate::config::{EngineConfig, ExecutionConfig, ValidationConfig};
use crate::pipeline::chain::Pipeline;
use crate::pipeline::compiled_plan::CompiledPlan;
use crate::pipeline::compiler::FlowCompiler;
use crate::pipeline::element::Element;
use crate::pipeline::environment::Environment;
use crate::pipeline::error::{ElementError, PipelineError, PipelineResult};
use crate::pipeline::executor::Sweep;
use crate::pipeline::hooks::Hook;
use crate::pipeline::id::ElementId;
use crate::pipeline::registry::Registry;
use crate::pipeline::store::OutputStore;
use crate::pipeline::validate::{check_client, check_server, validate, ValidationReport};
use std::fmt;
use std::fmt::Write as _;

/// Which of a job's two flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flow {
    Client,
    Server,
}

impl fmt::Display for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Flow::Client => write!(f, "client"),
            Flow::Server => write!(f, "server"),
        }
    }
}

/// Plausibility check result of both flows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobCheck {
    pub client: ValidationReport,
    pub server: ValidationReport,
}

impl JobCheck {
    pub fn is_valid(&self) -> bool {
        self.client.is_valid() && self.server.is_valid()
    }

    pub fn violation_count(&self) -> usize {
        self.client.violations.len() + self.server.violations.len()
    }
}

pub struct Job {
    name: String,
    registry: Registry,
    client: Pipeline,
    server: Pipeline,
    validation: ValidationConfig,
    execution: ExecutionConfig,
}

impl Job {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            registry: Registry::new(),
            client: Pipeline::new(),
            server: Pipeline::new(),
            validation: ValidationConfig::default(),
            execution: ExecutionConfig::default(),
        }
    }

    /// Take validation and execution settings from `config`.
    pub fn with_config(mut self, config: &EngineConfig) -> Self {
        self.validation = config.validation.clone();
        self.execution = config.execution.clone();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register an element for use in either flow.
    pub fn add(&mut self, element: impl Element + 'static) -> ElementId {
        self.registry.add(element)
    }

    pub fn add_hook(&mut self, element: ElementId, hook: impl Hook + 'static) -> PipelineResult<()> {
        self.registry.add_hook(element, hook)
    }

    pub fn set_client_flow(&mut self, flow: Pipeline) {
        self.client = flow;
    }

    pub fn set_server_flow(&mut self, flow: Pipeline) {
        self.server = flow;
    }

    pub fn flow(&self, flow: Flow) -> &Pipeline {
        match flow {
            Flow::Client => &self.client,
            Flow::Server => &self.server,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// Validate both flows without running anything.
    ///
    /// Besides the per-flow checks, the client flow must send its results
    /// and a non-empty server flow must start by receiving them. Every
    /// violation is logged; the returned report holds all of them.
    pub fn check(&self) -> JobCheck {
        let mut client = validate(&self.registry, &self.client);
        client.merge(check_client(&self.registry, &self.client));
        let mut server = validate(&self.registry, &self.server);
        server.merge(check_server(&self.registry, &self.server));
        let result = JobCheck { client, server };
        for (flow, report) in [(Flow::Client, &result.client), (Flow::Server, &result.server)] {
            for violation in &report.violations {
                tracing::error!("{} flow of {}: {}", flow, self.name, violation);
            }
        }
        if result.is_valid() {
            tracing::info!("Job {} passed the plausibility check", self.name);
        }
        result
    }

    /// Compile one flow into an execution plan.
    pub fn compile(&self, flow: Flow) -> PipelineResult<CompiledPlan> {
        FlowCompiler::compile(&self.registry, self.flow(flow), self.validation.strict)
    }

    /// Run the workload and sweep the client flow.
    ///
    /// `workload` is invoked once per configured invocation, before the
    /// sweep, and seeds producer outputs into the store it is handed.
    pub fn run_client<W>(&mut self, env: &Environment, mut workload: W) -> PipelineResult<OutputStore>
    where
        W: FnMut(u32, &mut OutputStore) -> Result<(), ElementError>,
    {
        let plan = self.prepare(Flow::Client)?;
        let mut store = OutputStore::new();
        for invocation in 0..self.execution.invocations {
            tracing::debug!("Workload invocation {} of {}", invocation + 1, self.execution.invocations);
            workload(invocation, &mut store).map_err(|source| PipelineError::Element {
                element: "workload".to_string(),
                source,
            })?;
        }
        self.sweep(Flow::Client, &plan, env, &mut store)?;
        Ok(store)
    }

    /// Sweep the server flow.
    pub fn run_server(&mut self, env: &Environment) -> PipelineResult<OutputStore> {
        let plan = self.prepare(Flow::Server)?;
        let mut store = OutputStore::new();
        self.sweep(Flow::Server, &plan, env, &mut store)?;
        Ok(store)
    }

    /// Reset every element of the job.
    pub fn reset(&mut self) {
        self.registry.reset_all();
    }

    fn prepare(&mut self, flow: Flow) -> PipelineResult<CompiledPlan> {
        let plan = self.compile(flow)?;
        // a fresh sweep never sees state of an earlier one
        self.reset_flow(flow);
        Ok(plan)
    }

    fn reset_flow(&mut self, flow: Flow) {
        let nodes = match flow {
            Flow::Client => self.client.nodes(),
            Flow::Server => self.server.nodes(),
        };
        self.registry.reset(nodes);
    }

    fn sweep(
        &mut self,
        flow: Flow,
        plan: &CompiledPlan,
        env: &Environment,
        store: &mut OutputStore,
    ) -> PipelineResult<()> {
        tracing::info!("Sweeping {} flow of {}", flow, self.name);
        let result = Sweep::new(&mut self.registry)
            .with_environment(env)
            .check_values(self.validation.check_values)
            .run(plan, store);

        if self.execution.reset_after_sweep {
            self.reset_flow(flow);
        }

        let stats = result?;
        tracing::info!(
            "{} flow of {} finished: {} element(s) in {}us",
            flow,
            self.name,
            stats.executed.len(),
            stats.elapsed_us
        );
        Ok(())
    }

    /// Render both flows as a Graphviz DOT graph.
    ///
    /// Each flow is a cluster; edge labels show explicit mappings.
    pub fn to_dot(&self) -> String {
        let mut dot = String::new();
        let _ = writeln!(dot, "digraph \"{}\" {{", escape(&self.name));
        let _ = writeln!(dot, "    node [shape=box];");

        for flow in [Flow::Client, Flow::Server] {
            let pipeline = self.flow(flow);
            let _ = writeln!(dot, "    subgraph cluster_{} {{", flow);
            let _ = writeln!(dot, "        label=\"{}\";", flow);
            for &id in pipeline.nodes() {
                let _ = writeln!(
                    dot,
                    "        \"{}_{}\" [label=\"{}\"];",
                    flow,
                    id.0,
                    escape(&self.registry.label(id))
                );
            }
            for edge in pipeline.edges() {
                let _ = write!(dot, "        \"{}_{}\" -> \"{}_{}\"", flow, edge.source().0, flow, edge.sink().0);
                if edge.mapping().is_identity() {
                    let _ = writeln!(dot, ";");
                } else {
                    let _ = writeln!(dot, " [label=\"{}\"];", escape(&edge.mapping().to_string()));
                }
            }
            let _ = writeln!(dot, "    }}");
        }

        dot.push_str("}\n");
        dot
    }
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}
