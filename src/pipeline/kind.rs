//! Element kinds and their capability flags.
//!
//! Every element is one of three tagged variants. The kind decides what the
//! scheduler owes the element at run time; the descriptors decide what can
//! be wired to it.

use serde::{Deserialize, Serialize};

/// The execution obligations of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    /// Outputs are populated by an external execution event before the sweep.
    Producer,
    /// Consumes resolved inputs and publishes outputs.
    Transform,
    /// Like `Transform`, but also receives the execution environment.
    SystemTransform,
}

/// Role of an element in moving results from clients to the collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transport {
    /// Ships resolved inputs to the collector.
    Send,
    /// Publishes what the collector received.
    Receive,
}

/// Capability flags derived from an element's kind and descriptors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub has_inputs: bool,
    pub has_outputs: bool,
    pub needs_environment: bool,
}

impl ElementKind {
    /// Get the display name for this kind.
    pub fn display_name(&self) -> &'static str {
        match self {
            ElementKind::Producer => "Producer",
            ElementKind::Transform => "Transform",
            ElementKind::SystemTransform => "System Transform",
        }
    }

    /// Whether the environment handle is injected into `run`.
    pub fn needs_environment(&self) -> bool {
        matches!(self, ElementKind::SystemTransform)
    }

    /// Whether the kind may declare pipeline-level inputs at all.
    pub fn accepts_inputs(&self) -> bool {
        !matches!(self, ElementKind::Producer)
    }
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_system_transforms_need_environment() {
        let kinds = [ElementKind::Producer, ElementKind::Transform, ElementKind::SystemTransform];
        let needing: Vec<_> = kinds
            .iter()
            .filter(|k| k.needs_environment())
            .collect();
        assert_eq!(needing, vec![&ElementKind::SystemTransform]);
    }

    #[test]
    fn test_producers_take_no_inputs() {
        assert!(!ElementKind::Producer.accepts_inputs());
        assert!(ElementKind::Transform.accepts_inputs());
    }
}
