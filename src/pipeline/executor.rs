//! Sweep executor: runs a compiled plan once.
//!
//! A sweep is single-threaded and synchronous. For every element, level by
//! level:
//! 1. Resolve input bindings from the latest values its sources published.
//! 2. Check the bound values against the declared input types.
//! 3. Run setup hooks, the element itself, then teardown hooks.
//! 4. Verify that every declared output was published.
//!
//! The first failure aborts the remainder of the sweep. Outputs already in
//! the store stay there; whether they are usable is the caller's decision.

use crate::pipeline::compiled_plan::CompiledPlan;
use crate::pipeline::edge::Mapping;
use crate::pipeline::element::{Bindings, RunContext};
use crate::pipeline::environment::Environment;
use crate::pipeline::error::{ElementError, PipelineError, PipelineResult};
use crate::pipeline::id::ElementId;
use crate::pipeline::registry::Registry;
use crate::pipeline::store::OutputStore;
use std::time::Instant;

/// Summary of a finished sweep.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SweepStats {
    /// Elements in the order they ran
    pub executed: Vec<ElementId>,
    /// Wall time of the sweep in microseconds
    pub elapsed_us: u64,
}

/// One sweep over a registry.
pub struct Sweep<'a> {
    registry: &'a mut Registry,
    environment: Option<&'a Environment>,
    check_values: bool,
}

impl<'a> Sweep<'a> {
    pub fn new(registry: &'a mut Registry) -> Self {
        Self {
            registry,
            environment: None,
            check_values: true,
        }
    }

    /// Environment injected into system-scoped elements.
    pub fn with_environment(mut self, environment: &'a Environment) -> Self {
        self.environment = Some(environment);
        self
    }

    /// Toggle the runtime type check of bound inputs.
    pub fn check_values(mut self, enabled: bool) -> Self {
        self.check_values = enabled;
        self
    }

    /// Execute every element of `plan` once, reading and writing `store`.
    ///
    /// Producer outputs must already be seeded into `store`.
    pub fn run(mut self, plan: &CompiledPlan, store: &mut OutputStore) -> PipelineResult<SweepStats> {
        let start = Instant::now();
        let mut stats = SweepStats::default();

        for (level_index, level) in plan.levels.iter().enumerate() {
            tracing::trace!("Level {}: {} element(s)", level_index, level.len());
            for &id in level {
                self.run_element(plan, store, id)?;
                stats.executed.push(id);
            }
        }

        stats.elapsed_us = start.elapsed().as_micros() as u64;
        tracing::debug!(
            "Sweep finished: {} element(s) in {}us",
            stats.executed.len(),
            stats.elapsed_us
        );
        Ok(stats)
    }

    fn run_element(
        &mut self,
        plan: &CompiledPlan,
        store: &mut OutputStore,
        id: ElementId,
    ) -> PipelineResult<()> {
        let label = self.registry.label(id);
        let bindings = resolve_bindings(&*self.registry, plan, store, id)?;

        let element = self.registry.get(id)?;
        if self.check_values {
            if let Err(mismatches) = element.inputs().check_values(&bindings) {
                return Err(PipelineError::TypeMismatch {
                    element: label,
                    mismatches,
                });
            }
        }

        let environment = if element.kind().needs_environment() {
            Some(
                self.environment
                    .ok_or_else(|| PipelineError::MissingEnvironment(label.clone()))?,
            )
        } else {
            None
        };

        tracing::debug!("Running {} with {} input(s)", label, bindings.len());

        let slot = self.registry.slot_mut(id)?;
        let wrap = |source: ElementError| PipelineError::Element {
            element: label.clone(),
            source,
        };

        for hook in &mut slot.hooks {
            hook.setup().map_err(wrap)?;
        }

        let mut ctx = RunContext {
            inputs: &bindings,
            outputs: store.outputs_mut(id),
            environment,
        };
        let result = slot.element.run(&mut ctx);

        // teardown runs even when the element failed; the run error wins
        let mut teardown_error = None;
        for hook in &mut slot.hooks {
            if let Err(e) = hook.teardown() {
                tracing::warn!("Teardown hook of {} failed: {}", label, e);
                teardown_error.get_or_insert(e);
            }
        }
        result.map_err(wrap)?;
        if let Some(e) = teardown_error {
            return Err(wrap(e));
        }

        let published = store.outputs(id);
        for name in slot.element.outputs().names() {
            if !published.is_some_and(|o| o.contains(name)) {
                return Err(PipelineError::MissingOutput {
                    element: label,
                    output: name.to_string(),
                });
            }
        }

        Ok(())
    }
}

/// Gather the inputs of `id` from the latest values of its sources.
///
/// Incoming edges are applied in flow order, so when two edges feed the
/// same input the later edge wins. A declared input left unbound is an
/// error; plans that skipped validation end up here.
pub fn resolve_bindings(
    registry: &Registry,
    plan: &CompiledPlan,
    store: &OutputStore,
    id: ElementId,
) -> PipelineResult<Bindings> {
    let sink = registry.get(id)?;
    let mut bindings = Bindings::new();

    for edge in plan.incoming_edges(id) {
        let source = registry.get(edge.source())?;
        let pairs: Vec<(String, String)> = match edge.mapping() {
            Mapping::Identity => source
                .outputs()
                .names()
                .filter(|n| sink.inputs().accepts_name(n))
                .map(|n| (n.to_string(), n.to_string()))
                .collect(),
            Mapping::Explicit(pairs) => pairs.clone(),
        };

        for (from, to) in pairs {
            let value = store.latest(edge.source(), &from).ok_or_else(|| {
                PipelineError::MissingOutput {
                    element: registry.label(edge.source()),
                    output: from.clone(),
                }
            })?;
            bindings.insert(to, value.clone());
        }
    }

    let missing: Vec<String> = sink
        .inputs()
        .names()
        .filter(|name| bindings.get(name).is_none())
        .map(str::to_string)
        .collect();
    if !missing.is_empty() {
        return Err(PipelineError::Unsaturated {
            element: registry.label(id),
            missing,
        });
    }

    Ok(bindings)
}
