use super::chain::Pipeline;
use super::compiled_plan::{CompiledPlan, PlanStats};
use super::edgesort::edgesort;
use super::error::PipelineResult;
use super::id::{EdgeId, ElementId};
use super::registry::Registry;
use super::validate::validate;
use std::collections::{HashMap, HashSet};

/// Compiles a flow into an execution plan
pub struct FlowCompiler;

impl FlowCompiler {
    /// Compile a flow into an execution plan.
    ///
    /// Runs the full static validation first; any violation (and, with
    /// `strict`, any warning) aborts compilation with the complete report.
    /// The surviving flow is then sorted into dependency levels.
    ///
    /// # Arguments
    /// * `registry` - Element arena the flow refers to
    /// * `pipeline` - The flow's edges and elements
    /// * `strict` - Treat validation warnings as errors
    pub fn compile(
        registry: &Registry,
        pipeline: &Pipeline,
        strict: bool,
    ) -> PipelineResult<CompiledPlan> {
        let start_time = std::time::Instant::now();

        let warnings = validate(registry, pipeline).into_result(strict)?;
        let levels = edgesort(pipeline.nodes(), pipeline.edges())?;

        let incoming = Self::build_incoming(pipeline);
        let stats = Self::compute_stats(pipeline, &levels, start_time);

        tracing::info!(
            "Compiled flow: {} element(s) in {} level(s), {} edge(s), {} warning(s)",
            stats.total_elements,
            stats.levels,
            stats.edges,
            warnings.len()
        );

        Ok(CompiledPlan {
            levels,
            edges: pipeline.edges().to_vec(),
            incoming,
            warnings,
            stats,
        })
    }

    /// Incoming edge ids per sink, in flow order
    fn build_incoming(pipeline: &Pipeline) -> HashMap<ElementId, Vec<EdgeId>> {
        let mut incoming: HashMap<ElementId, Vec<EdgeId>> = HashMap::new();
        for (id, edge) in pipeline.iter_edges() {
            incoming.entry(edge.sink()).or_default().push(id);
        }
        incoming
    }

    fn compute_stats(
        pipeline: &Pipeline,
        levels: &[Vec<ElementId>],
        start_time: std::time::Instant,
    ) -> PlanStats {
        let sources: HashSet<ElementId> = pipeline.edges().iter().map(|e| e.source()).collect();
        let sinks: HashSet<ElementId> = pipeline.edges().iter().map(|e| e.sink()).collect();
        let scheduled: Vec<ElementId> = levels.iter().flatten().copied().collect();

        PlanStats {
            total_elements: scheduled.len(),
            levels: levels.len(),
            edges: pipeline.len(),
            entry_elements: scheduled.iter().filter(|id| !sinks.contains(id)).count(),
            terminal_elements: scheduled.iter().filter(|id| !sources.contains(id)).count(),
            isolated_elements: scheduled
                .iter()
                .filter(|id| !sinks.contains(id) && !sources.contains(id))
                .count(),
            compile_time_us: start_time.elapsed().as_micros() as u64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::edge::Mapping;
    use crate::pipeline::error::PipelineError;
    use crate::pipeline::nodes::{Mean, Producer, Sum};
    use crate::pipeline::types::TypeSpec;

    fn times_producer(registry: &mut Registry) -> ElementId {
        registry.add(Producer::new("Run", [("times", TypeSpec::list(TypeSpec::Int))]).unwrap())
    }

    #[test]
    fn test_compile_fan_out() {
        // Graph: [Run] → [Sum], [Run] → [Mean], plus an isolated [Run]
        let mut registry = Registry::new();
        let run = times_producer(&mut registry);
        let idle = times_producer(&mut registry);
        let sum = registry.add(Sum::new());
        let mean = registry.add(Mean::new());

        let mut pipe = Pipeline::start(run)
            .branch(|p| p.via(Mapping::rename("times", "values").unwrap()).then(sum))
            .branch(|p| p.via(Mapping::rename("times", "values").unwrap()).then(mean));
        pipe.add_element(idle);

        let plan = FlowCompiler::compile(&registry, &pipe, true).unwrap();

        assert_eq!(plan.levels, vec![vec![run, idle], vec![sum, mean]]);
        assert_eq!(plan.stats.total_elements, 4);
        assert_eq!(plan.stats.levels, 2);
        assert_eq!(plan.stats.edges, 2);
        assert_eq!(plan.stats.entry_elements, 2);
        assert_eq!(plan.stats.terminal_elements, 3);
        assert_eq!(plan.stats.isolated_elements, 1);
        assert_eq!(plan.incoming_edges(sum).count(), 1);
        assert_eq!(plan.level_of(mean), Some(1));
    }

    #[test]
    fn test_compile_rejects_invalid_flow() {
        // Identity mapping: Sum wants `values`, Run only has `times`
        let mut registry = Registry::new();
        let run = times_producer(&mut registry);
        let sum = registry.add(Sum::new());
        let pipe = Pipeline::start(run).then(sum);

        match FlowCompiler::compile(&registry, &pipe, false) {
            Err(PipelineError::Validation(report)) => {
                assert_eq!(report.violations.len(), 1);
                assert_eq!(report.warnings.len(), 1);
            }
            other => panic!("expected validation failure, got {:?}", other.map(|p| p.stats)),
        }
    }

    #[test]
    fn test_strict_mode_rejects_warnings() {
        let mut registry = Registry::new();
        let a = times_producer(&mut registry);
        let b = times_producer(&mut registry);
        let sum = registry.add(Sum::new());
        let mapping = Mapping::rename("times", "values").unwrap();
        let pipe = Pipeline::join([Pipeline::start(a), Pipeline::start(b)])
            .via(mapping)
            .then(sum);

        let lenient = FlowCompiler::compile(&registry, &pipe, false).unwrap();
        assert_eq!(lenient.warnings.len(), 1);
        assert!(FlowCompiler::compile(&registry, &pipe, true).is_err());
    }

    #[test]
    fn test_empty_flow_compiles_to_empty_plan() {
        let plan = FlowCompiler::compile(&Registry::new(), &Pipeline::new(), false).unwrap();
        assert!(plan.is_empty());
        assert_eq!(plan.stats.total_elements, 0);
        assert!(plan.warnings.is_empty());
    }
}
