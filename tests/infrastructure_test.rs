//! Test to verify test infrastructure works correctly

mod common;

use common::builders::{int_producer, EvaluationBuilder};
use flowbench::pipeline::{Element, ElementKind, TypeSpec};

#[test]
fn test_infrastructure_setup() {
    // Test that builders work
    let element = EvaluationBuilder::new("Scale")
        .input("value", TypeSpec::Int)
        .output("scaled", TypeSpec::Float)
        .build(|_, _| Ok(()));

    assert_eq!(element.name(), "Scale");
    assert_eq!(element.kind(), ElementKind::Transform);
    assert_eq!(element.outputs().get("scaled"), Some(&TypeSpec::Float));

    let producer = int_producer("Run", &["a", "b"]);
    assert_eq!(producer.kind(), ElementKind::Producer);
    assert!(producer.inputs().is_empty());
}

#[test]
fn test_float_comparison() {
    common::assert_float_eq(1.0, 1.0000001, 0.001);
}

#[test]
#[should_panic]
fn test_float_comparison_fails() {
    common::assert_float_eq(1.0, 2.0, 0.001);
}
