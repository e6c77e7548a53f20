//! Type descriptors for element inputs and outputs.
//!
//! A `Types` value is an ordered set of named slots. Each slot carries a
//! `TypeSpec`: a base type, a nested container of types, or a disjunction.
//! Descriptors are checked twice:
//!
//! - statically, declared-vs-declared, when an edge pipes a source's outputs
//!   into a sink's inputs (`is_satisfied_by`);
//! - dynamically, declared-vs-actual, right before an element runs
//!   (`check_values`).
//!
//! `TypeSpec::Any` is the opaque placeholder for outputs whose real shape is
//! only known after execution. It passes the static check in both directions
//! and leaves the decision to the dynamic check.

use crate::pipeline::element::Bindings;
use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::value::Value;
use std::fmt;

/// Whether `name` can appear in a mapping expression: no whitespace, no
/// `,` and no `->`. Slot names and mapping names share this rule.
pub(crate) fn is_plain_name(name: &str) -> bool {
    !name.contains(',') && !name.contains("->") && !name.chars().any(char::is_whitespace)
}

/// Semantic type of a single slot.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeSpec {
    Any,
    Bool,
    Int,
    Float,
    Str,
    Path,
    List(Box<TypeSpec>),
    Map(Box<TypeSpec>),
    OneOf(Vec<TypeSpec>),
}

impl TypeSpec {
    pub fn list(inner: TypeSpec) -> Self {
        TypeSpec::List(Box::new(inner))
    }

    pub fn map(inner: TypeSpec) -> Self {
        TypeSpec::Map(Box::new(inner))
    }

    pub fn one_of(alternatives: impl IntoIterator<Item = TypeSpec>) -> Self {
        TypeSpec::OneOf(alternatives.into_iter().collect())
    }

    /// `int | float`, the usual numeric slot.
    pub fn number() -> Self {
        TypeSpec::OneOf(vec![TypeSpec::Int, TypeSpec::Float])
    }

    /// Static compatibility: can a value declared as `source` be fed into a
    /// slot declared as `self`?
    pub fn accepts(&self, source: &TypeSpec) -> bool {
        match (self, source) {
            (TypeSpec::Any, _) | (_, TypeSpec::Any) => true,
            // every alternative the source may produce must be accepted
            (_, TypeSpec::OneOf(sources)) => sources.iter().all(|s| self.accepts(s)),
            (TypeSpec::OneOf(alternatives), s) => alternatives.iter().any(|a| a.accepts(s)),
            (TypeSpec::List(a), TypeSpec::List(b)) => a.accepts(b),
            (TypeSpec::Map(a), TypeSpec::Map(b)) => a.accepts(b),
            (a, b) => a == b,
        }
    }

    /// Dynamic check of an actual value against this type.
    pub fn matches(&self, value: &Value) -> bool {
        match (self, value) {
            (TypeSpec::Any, _) => true,
            (TypeSpec::OneOf(alternatives), v) => alternatives.iter().any(|a| a.matches(v)),
            (TypeSpec::Bool, Value::Bool(_)) => true,
            (TypeSpec::Int, Value::Int(_)) => true,
            (TypeSpec::Float, Value::Float(_)) => true,
            (TypeSpec::Str, Value::Str(_)) => true,
            (TypeSpec::Path, Value::Path(_)) => true,
            (TypeSpec::List(inner), Value::List(items)) => items.iter().all(|i| inner.matches(i)),
            (TypeSpec::Map(inner), Value::Map(map)) => map.values().all(|v| inner.matches(v)),
            _ => false,
        }
    }
}

impl fmt::Display for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeSpec::Any => write!(f, "any"),
            TypeSpec::Bool => write!(f, "bool"),
            TypeSpec::Int => write!(f, "int"),
            TypeSpec::Float => write!(f, "float"),
            TypeSpec::Str => write!(f, "str"),
            TypeSpec::Path => write!(f, "path"),
            TypeSpec::List(inner) => write!(f, "list<{}>", inner),
            TypeSpec::Map(inner) => write!(f, "map<{}>", inner),
            TypeSpec::OneOf(alternatives) => {
                let parts: Vec<String> = alternatives.iter().map(|a| a.to_string()).collect();
                write!(f, "({})", parts.join(" | "))
            }
        }
    }
}

/// One problem found by `Types::is_satisfied_by`.
#[derive(Debug, Clone, PartialEq)]
pub enum Incompatibility {
    /// The source does not declare the mapped output.
    MissingSource(String),
    /// The sink does not declare the mapped input.
    MissingSink(String),
    /// Both exist but the declared types do not fit.
    Type {
        source_name: String,
        sink_name: String,
        expected: TypeSpec,
        found: TypeSpec,
    },
}

/// One offending input found by `Types::check_values`.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueMismatch {
    pub name: String,
    pub expected: TypeSpec,
    /// Runtime type name of the value, `None` when the input is missing.
    pub found: Option<String>,
}

impl fmt::Display for ValueMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.found {
            Some(found) => write!(f, "'{}' expected {}, got {}", self.name, self.expected, found),
            None => write!(f, "'{}' expected {}, got nothing", self.name, self.expected),
        }
    }
}

/// Named, typed shape of an element's inputs or outputs.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Types {
    slots: Vec<(String, TypeSpec)>,
    /// Open descriptors accept arbitrary extra names besides the declared ones.
    open: bool,
}

impl Types {
    /// Empty, closed descriptor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Descriptor that accepts any additional named input.
    pub fn open() -> Self {
        Self {
            slots: Vec::new(),
            open: true,
        }
    }

    /// Build from `(name, type)` pairs.
    ///
    /// Fails with a schema error on empty or duplicate names, and on names
    /// a mapping could not refer to.
    pub fn declare<N: Into<String>>(
        slots: impl IntoIterator<Item = (N, TypeSpec)>,
    ) -> PipelineResult<Self> {
        let mut types = Self::new();
        for (name, spec) in slots {
            types.push_slot(name.into(), spec)?;
        }
        Ok(types)
    }

    /// Descriptor with exactly one slot.
    pub fn single(name: impl Into<String>, spec: TypeSpec) -> Self {
        Self {
            slots: vec![(name.into(), spec)],
            open: false,
        }
    }

    /// Fixed descriptors of built-in elements, whose names are literals.
    pub(crate) fn fixed(slots: &[(&str, TypeSpec)]) -> Self {
        debug_assert!(
            slots
                .iter()
                .enumerate()
                .all(|(i, (n, _))| slots[..i].iter().all(|(m, _)| m != n)),
            "duplicate slot in built-in descriptor"
        );
        Self {
            slots: slots
                .iter()
                .map(|(n, s)| (n.to_string(), s.clone()))
                .collect(),
            open: false,
        }
    }

    /// Add one more slot, keeping declaration order.
    pub fn with_slot(mut self, name: impl Into<String>, spec: TypeSpec) -> PipelineResult<Self> {
        self.push_slot(name.into(), spec)?;
        Ok(self)
    }

    /// Replace the type of an existing slot (per-instance refinement).
    pub fn refine(&mut self, name: &str, spec: TypeSpec) -> PipelineResult<()> {
        match self.slots.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => {
                slot.1 = spec;
                Ok(())
            }
            None => Err(PipelineError::Schema(format!(
                "cannot refine undeclared slot '{}'",
                name
            ))),
        }
    }

    fn push_slot(&mut self, name: String, spec: TypeSpec) -> PipelineResult<()> {
        if name.is_empty() {
            return Err(PipelineError::Schema("slot name must not be empty".to_string()));
        }
        if !is_plain_name(&name) {
            return Err(PipelineError::Schema(format!(
                "slot name '{}' contains whitespace, ',' or '->'",
                name
            )));
        }
        if self.contains(&name) {
            return Err(PipelineError::Schema(format!("duplicate slot name '{}'", name)));
        }
        self.slots.push((name, spec));
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.slots.iter().any(|(n, _)| n == name)
    }

    /// Whether an input with this name may be bound (declared, or open).
    pub fn accepts_name(&self, name: &str) -> bool {
        self.open || self.contains(name)
    }

    pub fn get(&self, name: &str) -> Option<&TypeSpec> {
        self.slots.iter().find(|(n, _)| n == name).map(|(_, s)| s)
    }

    /// Slot names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TypeSpec)> {
        self.slots.iter().map(|(n, s)| (n.as_str(), s))
    }

    /// Static pipe check with `self` as the sink's inputs and `other` as the
    /// source's outputs. `mapping` holds `(source_name, sink_name)` pairs.
    ///
    /// Returns every incompatibility; an empty list means compatible.
    pub fn is_satisfied_by(&self, other: &Types, mapping: &[(String, String)]) -> Vec<Incompatibility> {
        let mut problems = Vec::new();
        for (source_name, sink_name) in mapping {
            let found = other.get(source_name);
            if found.is_none() {
                problems.push(Incompatibility::MissingSource(source_name.clone()));
            }
            let expected = match self.get(sink_name) {
                Some(spec) => Some(spec),
                None if self.open => None,
                None => {
                    problems.push(Incompatibility::MissingSink(sink_name.clone()));
                    None
                }
            };
            if let (Some(expected), Some(found)) = (expected, found) {
                if !expected.accepts(found) {
                    problems.push(Incompatibility::Type {
                        source_name: source_name.clone(),
                        sink_name: sink_name.clone(),
                        expected: expected.clone(),
                        found: found.clone(),
                    });
                }
            }
        }
        problems
    }

    /// Runtime check of resolved bindings against the declared slots.
    ///
    /// Reports every missing or mistyped input, not just the first. Extra
    /// bindings are logged and counted but never rejected.
    pub fn check_values(&self, bindings: &Bindings) -> Result<usize, Vec<ValueMismatch>> {
        let mut mismatches = Vec::new();
        for (name, spec) in &self.slots {
            match bindings.get(name) {
                Some(value) if spec.matches(value) => {}
                Some(value) => mismatches.push(ValueMismatch {
                    name: name.clone(),
                    expected: spec.clone(),
                    found: Some(value.type_name().to_string()),
                }),
                None => mismatches.push(ValueMismatch {
                    name: name.clone(),
                    expected: spec.clone(),
                    found: None,
                }),
            }
        }
        if !mismatches.is_empty() {
            return Err(mismatches);
        }

        let mut unused = 0;
        if !self.open {
            for name in bindings.names() {
                if !self.contains(name) {
                    tracing::warn!("Unknown input '{}'", name);
                    unused += 1;
                }
            }
        }
        Ok(unused)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(p: &[(&str, &str)]) -> Vec<(String, String)> {
        p.iter().map(|(a, b)| (a.to_string(), b.to_string())).collect()
    }

    #[test]
    fn test_declare_rejects_duplicates() {
        let err = Types::declare([("a", TypeSpec::Int), ("a", TypeSpec::Str)]).unwrap_err();
        assert!(matches!(err, PipelineError::Schema(_)));
        assert!(Types::declare([("", TypeSpec::Int)]).is_err());
    }

    #[test]
    fn test_declare_rejects_unmappable_names() {
        for name in ["run time", "a,b", "a->b", "tab\tname"] {
            let err = Types::declare([(name, TypeSpec::Int)]).unwrap_err();
            assert!(matches!(err, PipelineError::Schema(_)), "{}", name);
        }
        assert!(Types::declare([("run_time", TypeSpec::Int)]).is_ok());
        assert!(Types::single("out", TypeSpec::Any).with_slot("x y", TypeSpec::Int).is_err());
    }

    #[test]
    fn test_declare_keeps_order() {
        let t = Types::declare([("b", TypeSpec::Int), ("a", TypeSpec::Str)]).unwrap();
        assert_eq!(t.names().collect::<Vec<_>>(), vec!["b", "a"]);
    }

    #[test]
    fn test_accepts_structural() {
        assert!(TypeSpec::Int.accepts(&TypeSpec::Int));
        assert!(!TypeSpec::Int.accepts(&TypeSpec::Float));
        assert!(TypeSpec::number().accepts(&TypeSpec::Float));
        assert!(TypeSpec::list(TypeSpec::number()).accepts(&TypeSpec::list(TypeSpec::Int)));
        assert!(!TypeSpec::list(TypeSpec::Int).accepts(&TypeSpec::list(TypeSpec::number())));
        assert!(!TypeSpec::list(TypeSpec::Int).accepts(&TypeSpec::map(TypeSpec::Int)));
        assert!(TypeSpec::list(TypeSpec::list(TypeSpec::Int))
            .accepts(&TypeSpec::list(TypeSpec::list(TypeSpec::Int))));
    }

    #[test]
    fn test_any_is_permissive_statically() {
        assert!(TypeSpec::Int.accepts(&TypeSpec::Any));
        assert!(TypeSpec::Any.accepts(&TypeSpec::list(TypeSpec::Str)));
        assert!(TypeSpec::list(TypeSpec::Int).accepts(&TypeSpec::list(TypeSpec::Any)));
    }

    #[test]
    fn test_matches_values() {
        let spec = TypeSpec::list(TypeSpec::list(TypeSpec::Int));
        assert!(spec.matches(&Value::from(vec![vec![1i64, 2], vec![3]])));
        assert!(!spec.matches(&Value::from(vec![1i64, 2])));
        assert!(TypeSpec::number().matches(&Value::Float(1.5)));
        assert!(!TypeSpec::number().matches(&Value::from("1.5")));
    }

    #[test]
    fn test_is_satisfied_by_reports_all() {
        let sink = Types::declare([("a", TypeSpec::Int), ("b", TypeSpec::Str)]).unwrap();
        let source = Types::declare([("x", TypeSpec::Float), ("y", TypeSpec::Str)]).unwrap();
        let problems = sink.is_satisfied_by(&source, &pairs(&[("x", "a"), ("y", "b"), ("z", "c")]));
        assert_eq!(problems.len(), 3);
        assert!(matches!(problems[0], Incompatibility::Type { .. }));
        assert_eq!(problems[1], Incompatibility::MissingSource("z".to_string()));
        assert_eq!(problems[2], Incompatibility::MissingSink("c".to_string()));
    }

    #[test]
    fn test_open_sink_accepts_unknown_names() {
        let source = Types::single("x", TypeSpec::Int);
        let problems = Types::open().is_satisfied_by(&source, &pairs(&[("x", "anything")]));
        assert!(problems.is_empty());
    }

    #[test]
    fn test_check_values_reports_every_name() {
        let inputs = Types::declare([
            ("foo", TypeSpec::Str),
            ("bar", TypeSpec::list(TypeSpec::Int)),
            ("baz", TypeSpec::Bool),
        ])
        .unwrap();
        let mut bindings = Bindings::new();
        bindings.insert("foo", Value::Int(23));
        bindings.insert("bar", Value::from(vec![Value::from("23")]));

        let mismatches = inputs.check_values(&bindings).unwrap_err();
        let names: Vec<_> = mismatches.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["foo", "bar", "baz"]);
        assert_eq!(mismatches[2].found, None);
    }

    #[test]
    fn test_check_values_counts_unused() {
        let inputs = Types::single("foo", TypeSpec::Int);
        let mut bindings = Bindings::new();
        bindings.insert("foo", Value::Int(1));
        bindings.insert("bar", Value::Int(2));
        assert_eq!(inputs.check_values(&bindings).unwrap(), 1);
        assert_eq!(Types::open().check_values(&bindings).unwrap(), 0);
    }

    #[test]
    fn test_refine() {
        let mut t = Types::single("out", TypeSpec::Any);
        t.refine("out", TypeSpec::Int).unwrap();
        assert_eq!(t.get("out"), Some(&TypeSpec::Int));
        assert!(t.refine("missing", TypeSpec::Int).is_err());
    }
}
