//! Per-sweep output store.
//!
//! Each element owns one `ElementOutputs` slot inside the sweep's
//! `OutputStore`. Publishing appends to the named sequence, so an output
//! fanned out across several edges can be read any number of times without
//! being consumed. Readers take the most recent value.
//!
//! The store is created per sweep and handed to the scheduler explicitly,
//! so two sweeps over the same elements never share output state.

use crate::pipeline::id::ElementId;
use crate::pipeline::value::Value;
use std::collections::{BTreeMap, HashMap};

/// Outputs published by a single element during one sweep.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementOutputs {
    values: BTreeMap<String, Vec<Value>>,
}

impl ElementOutputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value to the named output.
    pub fn publish(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.entry(name.into()).or_default().push(value.into());
    }

    /// Append `item` to the list held in the most recent value of `name`,
    /// starting a new list if there is none yet.
    pub fn append_to_list(&mut self, name: impl Into<String>, item: impl Into<Value>) {
        let sequence = self.values.entry(name.into()).or_default();
        match sequence.last_mut() {
            Some(Value::List(items)) => items.push(item.into()),
            _ => sequence.push(Value::List(vec![item.into()])),
        }
    }

    /// Most recent value of the named output.
    pub fn latest(&self, name: &str) -> Option<&Value> {
        self.values.get(name).and_then(|seq| seq.last())
    }

    /// Every value published under `name`, oldest first.
    pub fn values(&self, name: &str) -> &[Value] {
        self.values.get(name).map(|seq| seq.as_slice()).unwrap_or(&[])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.get(name).is_some_and(|seq| !seq.is_empty())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(|k| k.as_str())
    }

    /// Latest value of every output, keyed by name.
    pub fn snapshot(&self) -> BTreeMap<String, Value> {
        self.values
            .iter()
            .filter_map(|(k, seq)| seq.last().map(|v| (k.clone(), v.clone())))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}

/// Mapping from element identity to its output bindings for one sweep.
#[derive(Debug, Clone, Default)]
pub struct OutputStore {
    outputs: HashMap<ElementId, ElementOutputs>,
}

impl OutputStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed a producer output before the sweep starts.
    pub fn seed(&mut self, element: ElementId, name: impl Into<String>, value: impl Into<Value>) {
        self.outputs_mut(element).publish(name, value);
    }

    /// Accumulate one invocation's datum into a list-valued producer output.
    pub fn append_to_list(
        &mut self,
        element: ElementId,
        name: impl Into<String>,
        item: impl Into<Value>,
    ) {
        self.outputs_mut(element).append_to_list(name, item);
    }

    pub fn outputs(&self, element: ElementId) -> Option<&ElementOutputs> {
        self.outputs.get(&element)
    }

    pub fn outputs_mut(&mut self, element: ElementId) -> &mut ElementOutputs {
        self.outputs.entry(element).or_default()
    }

    pub fn latest(&self, element: ElementId, name: &str) -> Option<&Value> {
        self.outputs.get(&element).and_then(|o| o.latest(name))
    }

    pub fn values(&self, element: ElementId, name: &str) -> &[Value] {
        self.outputs
            .get(&element)
            .map(|o| o.values(name))
            .unwrap_or(&[])
    }

    pub fn clear_element(&mut self, element: ElementId) {
        self.outputs.remove(&element);
    }

    pub fn clear(&mut self) {
        self.outputs.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.values().all(|o| o.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_accumulates() {
        let mut out = ElementOutputs::new();
        out.publish("v", 1i64);
        out.publish("v", 2i64);
        assert_eq!(out.values("v"), &[Value::Int(1), Value::Int(2)]);
        assert_eq!(out.latest("v"), Some(&Value::Int(2)));
        // reading does not consume
        assert_eq!(out.latest("v"), Some(&Value::Int(2)));
    }

    #[test]
    fn test_append_to_list() {
        let mut out = ElementOutputs::new();
        out.append_to_list("times", 10i64);
        out.append_to_list("times", 12i64);
        assert_eq!(out.latest("times"), Some(&Value::from(vec![10i64, 12])));
        assert_eq!(out.values("times").len(), 1);
    }

    #[test]
    fn test_store_isolated_per_element() {
        let mut store = OutputStore::new();
        store.seed(ElementId(0), "v", 42i64);
        assert_eq!(store.latest(ElementId(0), "v"), Some(&Value::Int(42)));
        assert_eq!(store.latest(ElementId(1), "v"), None);
        assert!(store.values(ElementId(1), "v").is_empty());

        store.clear_element(ElementId(0));
        assert!(store.is_empty());
    }

    #[test]
    fn test_snapshot_takes_latest() {
        let mut out = ElementOutputs::new();
        out.publish("a", 1i64);
        out.publish("a", 3i64);
        out.publish("b", "x");
        let snap = out.snapshot();
        assert_eq!(snap.get("a"), Some(&Value::Int(3)));
        assert_eq!(snap.get("b"), Some(&Value::from("x")));
    }
}
