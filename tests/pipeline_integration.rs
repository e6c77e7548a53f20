//! Integration tests for flow construction, validation, scheduling and sweeps

mod common;

use common::builders::{doubler, int_producer, EvaluationBuilder};
use common::unused_outputs;
use flowbench::pipeline::{
    check_pipe, check_sink, edgesort, level_map, validate, Edge, ElementId, Environment,
    FlowCompiler, Mapping, OutputStore, Pipeline, PipelineError, Registry, Sweep, TypeSpec, Value,
    Violation,
};

fn sweep(registry: &mut Registry, pipeline: &Pipeline, store: &mut OutputStore) {
    let plan = FlowCompiler::compile(registry, pipeline, false).unwrap();
    Sweep::new(registry)
        .with_environment(&Environment::new("test"))
        .run(&plan, store)
        .unwrap();
}

#[test]
fn test_two_level_sweep_doubles_seed() {
    let mut registry = Registry::new();
    let p = registry.add(int_producer("P", &["v"]));
    let f = registry.add(doubler());
    let pipeline = Pipeline::start(p).via(Mapping::rename("v", "value").unwrap()).then(f);

    let mut store = OutputStore::new();
    store.seed(p, "v", 42i64);
    sweep(&mut registry, &pipeline, &mut store);

    assert_eq!(store.latest(f, "doubled"), Some(&Value::Int(84)));
}

#[test]
fn test_reset_then_rerun_keeps_no_stale_outputs() {
    let mut registry = Registry::new();
    let p = registry.add(int_producer("P", &["value"]));
    let f = registry.add(doubler());
    let pipeline = Pipeline::start(p).then(f);

    let mut first = OutputStore::new();
    first.seed(p, "value", 1i64);
    sweep(&mut registry, &pipeline, &mut first);

    registry.reset(pipeline.nodes());

    let mut second = OutputStore::new();
    second.seed(p, "value", 5i64);
    sweep(&mut registry, &pipeline, &mut second);

    assert_eq!(second.values(f, "doubled"), &[Value::Int(10)]);
}

#[test]
fn test_identity_into_narrower_sink_warns_once() {
    let mut registry = Registry::new();
    let source = registry.add(int_producer("Source", &["a", "b", "c"]));
    let sink = registry.add(
        EvaluationBuilder::new("Sink")
            .input("a", TypeSpec::Int)
            .input("b", TypeSpec::Int)
            .build(|_, _| Ok(())),
    );
    let pipeline = Pipeline::start(source).then(sink);

    let report = validate(&registry, &pipeline);
    assert!(report.is_valid());
    assert_eq!(unused_outputs(&report.warnings), vec!["c".to_string()]);
}

#[test]
fn test_check_sink_reports_missing_input() {
    let mut registry = Registry::new();
    let source = registry.add(int_producer("Source", &["x"]));
    let sink = registry.add(
        EvaluationBuilder::new("Sink")
            .input("a", TypeSpec::Int)
            .input("b", TypeSpec::Int)
            .build(|_, _| Ok(())),
    );
    let pipeline = Pipeline::start(source).via(Mapping::rename("x", "a").unwrap()).then(sink);

    let report = check_sink(&registry, &pipeline);
    assert_eq!(report.violations.len(), 1);
    match &report.violations[0] {
        Violation::Unsaturated { element, missing, .. } => {
            assert_eq!(*element, sink);
            assert_eq!(missing, &vec!["b".to_string()]);
        }
        other => panic!("unexpected violation: {}", other),
    }
}

#[test]
fn test_check_sink_passes_when_saturated() {
    let mut registry = Registry::new();
    let source = registry.add(int_producer("Source", &["a", "b"]));
    let sink = registry.add(
        EvaluationBuilder::new("Sink")
            .input("a", TypeSpec::Int)
            .input("b", TypeSpec::Int)
            .build(|_, _| Ok(())),
    );
    let pipeline = Pipeline::start(source).then(sink);

    assert!(check_sink(&registry, &pipeline).is_valid());
}

#[test]
fn test_check_pipe_reports_every_mismatch() {
    let mut registry = Registry::new();
    let source = registry.add(
        flowbench::pipeline::nodes::Producer::new("Source", [("s", TypeSpec::Str), ("t", TypeSpec::Str)])
            .unwrap(),
    );
    let left = registry.add(
        EvaluationBuilder::new("Left")
            .input("n", TypeSpec::Int)
            .build(|_, _| Ok(())),
    );
    let right = registry.add(
        EvaluationBuilder::new("Right")
            .input("m", TypeSpec::Float)
            .build(|_, _| Ok(())),
    );
    let pipeline = Pipeline::start(source)
        .branch(|pipe| pipe.via(Mapping::rename("s", "n").unwrap()).then(left))
        .branch(|pipe| pipe.via(Mapping::rename("t", "m").unwrap()).then(right));

    let report = check_pipe(&registry, &pipeline);
    let mismatches: Vec<&Violation> = report
        .violations
        .iter()
        .filter(|v| matches!(v, Violation::TypeMismatch { .. }))
        .collect();
    assert_eq!(mismatches.len(), 2);

    let err = FlowCompiler::compile(&registry, &pipeline, false).unwrap_err();
    match err {
        PipelineError::Validation(report) => assert_eq!(report.violations.len(), 2),
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_chained_and_manual_edges_sort_identically() {
    let mut registry = Registry::new();
    let e1 = registry.add(int_producer("E1", &["value"]));
    let e2 = registry.add(doubler());
    let e3 = registry.add(
        EvaluationBuilder::new("E3")
            .input("doubled", TypeSpec::Int)
            .build(|_, _| Ok(())),
    );

    let chained = Pipeline::start(e1).then(e2).then(e3);
    let manual: Pipeline = vec![Edge::identity(e1, e2), Edge::identity(e2, e3)]
        .into_iter()
        .collect();

    assert_eq!(chained.edges(), manual.edges());
    assert_eq!(
        edgesort(chained.nodes(), chained.edges()).unwrap(),
        edgesort(manual.nodes(), manual.edges()).unwrap()
    );
}

#[test]
fn test_edgesort_levels_respect_edges() {
    let ids: Vec<ElementId> = (0..6).map(ElementId).collect();
    let edges = vec![
        Edge::identity(ids[0], ids[2]),
        Edge::identity(ids[1], ids[2]),
        Edge::identity(ids[2], ids[3]),
        Edge::identity(ids[0], ids[4]),
        Edge::identity(ids[4], ids[5]),
        Edge::identity(ids[3], ids[5]),
    ];

    let levels = edgesort(&[], &edges).unwrap();
    let level = level_map(&levels);
    for edge in &edges {
        assert!(level[&edge.source()] < level[&edge.sink()], "edge {}", edge);
    }
    assert_eq!(levels[0], vec![ids[0], ids[1]]);
}

#[test]
fn test_edgesort_rejects_cycle() {
    let a = ElementId(0);
    let b = ElementId(1);
    let c = ElementId(2);
    let edges = vec![
        Edge::identity(a, b),
        Edge::identity(b, c),
        Edge::identity(c, a),
    ];

    match edgesort(&[], &edges) {
        Err(PipelineError::CyclicDependency { elements }) => {
            assert_eq!(elements, vec![a, b, c]);
        }
        other => panic!("expected a cycle, got {:?}", other),
    }
}

#[test]
fn test_runtime_failure_aborts_sweep() {
    let mut registry = Registry::new();
    let p = registry.add(int_producer("P", &["value"]));
    let failing = registry.add(
        EvaluationBuilder::new("Tool")
            .input("value", TypeSpec::Int)
            .output("out", TypeSpec::Int)
            .build(|_, _| Err(flowbench::pipeline::ElementError::Other("tool crashed".to_string()))),
    );
    let after = registry.add(
        EvaluationBuilder::new("After")
            .input("out", TypeSpec::Int)
            .build(|_, _| Ok(())),
    );
    let pipeline = Pipeline::start(p).then(failing).then(after);
    let plan = FlowCompiler::compile(&registry, &pipeline, false).unwrap();

    let mut store = OutputStore::new();
    store.seed(p, "value", 1i64);
    let err = Sweep::new(&mut registry).run(&plan, &mut store).unwrap_err();

    assert!(matches!(err, PipelineError::Element { ref element, .. } if element == "Tool#1"));
    assert!(store.outputs(after).is_none());
}
