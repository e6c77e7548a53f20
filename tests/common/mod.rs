//! Common test utilities and helpers

#![allow(dead_code)] // Test utilities may not all be used in every test file

pub mod builders;

use flowbench::pipeline::{Value, Warning};

/// Assert two floats are approximately equal
pub fn assert_float_eq(a: f64, b: f64, epsilon: f64) {
    assert!(
        (a - b).abs() < epsilon,
        "Expected {} to be approximately equal to {} (epsilon: {})",
        a,
        b,
        epsilon
    );
}

/// Unwrap a value as a float list, panicking with context otherwise
pub fn float_list(value: Option<&Value>) -> Vec<f64> {
    value
        .and_then(Value::as_f64_list)
        .unwrap_or_else(|| panic!("Expected a number list, got {:?}", value))
}

/// Names of the outputs reported as unused
pub fn unused_outputs(warnings: &[Warning]) -> Vec<String> {
    warnings
        .iter()
        .filter_map(|w| match w {
            Warning::UnusedOutput { name, .. } => Some(name.clone()),
            _ => None,
        })
        .collect()
}
