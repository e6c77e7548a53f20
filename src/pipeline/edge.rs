//! Edges and their name mappings.
//!
//! An edge pipes named outputs of a source element into named inputs of a
//! sink element. The mapping is either the identity sentinel (every source
//! output to the identically named sink input) or an explicit ordered list of
//! `(source_name, sink_name)` pairs.
//!
//! Explicit mappings come from one of two lexically distinct forms:
//!
//! - typed entries: a bare name (`"v"`) is a same-name passthrough, a pair
//!   (`("a", "b")`) is a rename;
//! - a textual expression: `"a, b -> c"`, where `->` marks a rename and
//!   commas separate entries.
//!
//! Malformed expressions fail when the mapping is built, before any edge
//! exists.

use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::id::ElementId;
use crate::pipeline::types::{is_plain_name, Types};
use std::fmt;

/// One entry of an explicit mapping.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MapEntry {
    /// `name -> name`
    Same(String),
    /// `from -> to`
    Rename(String, String),
}

impl MapEntry {
    fn into_pair(self) -> (String, String) {
        match self {
            MapEntry::Same(name) => (name.clone(), name),
            MapEntry::Rename(from, to) => (from, to),
        }
    }
}

impl From<&str> for MapEntry {
    fn from(name: &str) -> Self {
        MapEntry::Same(name.to_string())
    }
}

impl From<String> for MapEntry {
    fn from(name: String) -> Self {
        MapEntry::Same(name)
    }
}

impl From<(&str, &str)> for MapEntry {
    fn from((from, to): (&str, &str)) -> Self {
        MapEntry::Rename(from.to_string(), to.to_string())
    }
}

impl From<(String, String)> for MapEntry {
    fn from((from, to): (String, String)) -> Self {
        MapEntry::Rename(from, to)
    }
}

/// Name mapping carried by an edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Mapping {
    /// Every source output feeds the identically named sink input.
    Identity,
    /// Ordered `(source_name, sink_name)` pairs.
    Explicit(Vec<(String, String)>),
}

impl Mapping {
    pub fn identity() -> Self {
        Mapping::Identity
    }

    /// Single same-name passthrough.
    pub fn name(name: impl Into<String>) -> PipelineResult<Self> {
        Self::from_entries([MapEntry::Same(name.into())])
    }

    /// Single rename.
    pub fn rename(from: impl Into<String>, to: impl Into<String>) -> PipelineResult<Self> {
        Self::from_entries([MapEntry::Rename(from.into(), to.into())])
    }

    /// Batch of entries in one edge.
    ///
    /// Fails on an empty batch, an empty name, a name containing mapping
    /// punctuation, or two entries feeding the same sink input.
    pub fn from_entries<E: Into<MapEntry>>(
        entries: impl IntoIterator<Item = E>,
    ) -> PipelineResult<Self> {
        let mut pairs: Vec<(String, String)> = Vec::new();
        for entry in entries {
            let (from, to) = entry.into().into_pair();
            check_name(&from)?;
            check_name(&to)?;
            if pairs.iter().any(|(_, existing)| *existing == to) {
                return Err(PipelineError::MappingSyntax(format!(
                    "input '{}' is mapped more than once",
                    to
                )));
            }
            pairs.push((from, to));
        }
        if pairs.is_empty() {
            return Err(PipelineError::MappingSyntax("empty mapping".to_string()));
        }
        Ok(Mapping::Explicit(pairs))
    }

    /// Parse a textual mapping such as `"times, name -> label"`.
    pub fn parse(expr: &str) -> PipelineResult<Self> {
        let mut entries = Vec::new();
        for raw in expr.split(',') {
            let entry = raw.trim();
            if entry.is_empty() {
                return Err(PipelineError::MappingSyntax(format!(
                    "empty entry in '{}'",
                    expr
                )));
            }
            let sides: Vec<&str> = entry.split("->").map(str::trim).collect();
            match sides.as_slice() {
                [name] => entries.push(MapEntry::Same(name.to_string())),
                [from, to] => {
                    if from.is_empty() || to.is_empty() {
                        return Err(PipelineError::MappingSyntax(format!(
                            "incomplete rename '{}'",
                            entry
                        )));
                    }
                    entries.push(MapEntry::Rename(from.to_string(), to.to_string()));
                }
                _ => {
                    return Err(PipelineError::MappingSyntax(format!(
                        "chained renames are not allowed: '{}'",
                        entry
                    )))
                }
            }
        }
        Self::from_entries(entries)
    }

    pub fn is_identity(&self) -> bool {
        matches!(self, Mapping::Identity)
    }

    /// Explicit pairs, `None` for the identity sentinel.
    pub fn pairs(&self) -> Option<&[(String, String)]> {
        match self {
            Mapping::Identity => None,
            Mapping::Explicit(pairs) => Some(pairs),
        }
    }

    /// Concrete pairs against the source's declared outputs.
    ///
    /// The identity sentinel expands to one pair per source output; names the
    /// sink cannot take are left in, callers decide whether they matter.
    pub fn resolve(&self, source_outputs: &Types) -> Vec<(String, String)> {
        match self {
            Mapping::Identity => source_outputs
                .names()
                .map(|n| (n.to_string(), n.to_string()))
                .collect(),
            Mapping::Explicit(pairs) => pairs.clone(),
        }
    }
}

fn check_name(name: &str) -> PipelineResult<()> {
    if name.is_empty() {
        return Err(PipelineError::MappingSyntax("empty name in mapping".to_string()));
    }
    if !is_plain_name(name) {
        return Err(PipelineError::MappingSyntax(format!(
            "invalid name '{}' in mapping",
            name
        )));
    }
    Ok(())
}

impl fmt::Display for Mapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mapping::Identity => write!(f, "*"),
            Mapping::Explicit(pairs) => {
                let parts: Vec<String> = pairs
                    .iter()
                    .map(|(from, to)| {
                        if from == to {
                            from.clone()
                        } else {
                            format!("{} -> {}", from, to)
                        }
                    })
                    .collect();
                write!(f, "{}", parts.join(", "))
            }
        }
    }
}

/// Directed dependency between two registered elements.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Edge {
    source: ElementId,
    sink: ElementId,
    mapping: Mapping,
}

impl Edge {
    pub fn new(source: ElementId, sink: ElementId, mapping: Mapping) -> Self {
        Self {
            source,
            sink,
            mapping,
        }
    }

    /// Edge with the identity mapping.
    pub fn identity(source: ElementId, sink: ElementId) -> Self {
        Self::new(source, sink, Mapping::Identity)
    }

    pub fn source(&self) -> ElementId {
        self.source
    }

    pub fn sink(&self) -> ElementId {
        self.sink
    }

    pub fn mapping(&self) -> &Mapping {
        &self.mapping
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {} [{}]", self.source, self.sink, self.mapping)
    }
}
