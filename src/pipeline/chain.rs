//! Fluent pipeline builder.
//!
//! A `Pipeline` is an immutable, accumulating value: every combinator
//! consumes it and returns a new one with more edges. It tracks the current
//! tail element(s), so chaining threads data forward:
//!
//! ```text
//! Pipeline::start(p).then(f)                      p -> f              (identity)
//! Pipeline::start(p).via(Mapping::name("v")?).then(f)                 (explicit)
//! Pipeline::start(p).fan_out([a, b]).then(m)      p -> a, p -> b, a -> m, b -> m
//! ```
//!
//! Edges are stored in insertion order without duplicates, so equivalent
//! chains produce the same edge set.

use crate::pipeline::edge::{Edge, Mapping};
use crate::pipeline::id::{EdgeId, ElementId};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pipeline {
    edges: Vec<Edge>,
    /// Every element seen so far, first-seen order.
    nodes: Vec<ElementId>,
    tails: Vec<ElementId>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pipeline holding a single element and no edges yet.
    pub fn start(element: ElementId) -> Self {
        Self {
            edges: Vec::new(),
            nodes: vec![element],
            tails: vec![element],
        }
    }

    /// Pipe every tail into `sink` with the identity mapping.
    pub fn then(self, sink: ElementId) -> Self {
        self.connect(sink, Mapping::Identity)
    }

    /// Attach an explicit mapping for the next `then`.
    pub fn via(self, mapping: Mapping) -> Via {
        Via {
            pipeline: self,
            mapping,
        }
    }

    /// Pipe every tail into each of `sinks`; the sinks become the new tails.
    pub fn fan_out(mut self, sinks: impl IntoIterator<Item = ElementId>) -> Self {
        let sources = std::mem::take(&mut self.tails);
        let mut tails = Vec::new();
        for sink in sinks {
            for &source in &sources {
                self.push(Edge::identity(source, sink));
            }
            self.note(sink);
            tails.push(sink);
        }
        self.tails = tails;
        self
    }

    /// Build an independent branch off the current tails.
    ///
    /// The branch's edges are merged in; the tails stay where they were, so
    /// further branches or `then` calls continue from the same point.
    pub fn branch(self, build: impl FnOnce(Pipeline) -> Pipeline) -> Self {
        let base = Pipeline {
            edges: Vec::new(),
            nodes: self.tails.clone(),
            tails: self.tails.clone(),
        };
        let branch = build(base);
        let tails = self.tails.clone();
        let mut merged = self.concat(branch);
        merged.tails = tails;
        merged
    }

    /// Merge several pipelines; their tails together become the new tails
    /// (fan-in on the next `then`).
    pub fn join(pipes: impl IntoIterator<Item = Pipeline>) -> Self {
        let mut joined = Pipeline::new();
        let mut tails = Vec::new();
        for pipe in pipes {
            for &tail in &pipe.tails {
                if !tails.contains(&tail) {
                    tails.push(tail);
                }
            }
            joined = joined.concat(pipe);
        }
        joined.tails = tails;
        joined
    }

    /// Append another pipeline's edges; its tails become the tails.
    pub fn concat(mut self, other: Pipeline) -> Self {
        for node in other.nodes {
            self.note(node);
        }
        for edge in other.edges {
            self.push(edge);
        }
        self.tails = other.tails;
        self
    }

    /// Append a hand-built edge; its sink becomes the tail.
    pub fn edge(mut self, edge: Edge) -> Self {
        let sink = edge.sink();
        self.push(edge);
        self.tails = vec![sink];
        self
    }

    /// Insert an edge unless an identical one is already present.
    ///
    /// Returns whether the edge was new.
    pub fn push(&mut self, edge: Edge) -> bool {
        self.note(edge.source());
        self.note(edge.sink());
        if self.edges.contains(&edge) {
            return false;
        }
        self.edges.push(edge);
        true
    }

    /// Register an element without wiring it (scheduled as isolated).
    pub fn add_element(&mut self, element: ElementId) {
        self.note(element);
    }

    fn connect(mut self, sink: ElementId, mapping: Mapping) -> Self {
        let sources = std::mem::take(&mut self.tails);
        for source in sources {
            self.push(Edge::new(source, sink, mapping.clone()));
        }
        self.note(sink);
        self.tails = vec![sink];
        self
    }

    fn note(&mut self, element: ElementId) {
        if !self.nodes.contains(&element) {
            self.nodes.push(element);
        }
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn edge_by_id(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.index())
    }

    /// Edges paired with their position ids.
    pub fn iter_edges(&self) -> impl Iterator<Item = (EdgeId, &Edge)> {
        self.edges
            .iter()
            .enumerate()
            .map(|(i, e)| (EdgeId(i as u32), e))
    }

    /// Every element of the flow in first-seen order.
    pub fn nodes(&self) -> &[ElementId] {
        &self.nodes
    }

    pub fn tails(&self) -> &[ElementId] {
        &self.tails
    }

    pub fn contains(&self, element: ElementId) -> bool {
        self.nodes.contains(&element)
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty() && self.nodes.is_empty()
    }
}

/// A pipeline waiting for the sink of an explicitly mapped edge.
#[derive(Debug, Clone)]
#[must_use = "a mapping does nothing until `then` names its sink"]
pub struct Via {
    pipeline: Pipeline,
    mapping: Mapping,
}

impl Via {
    pub fn then(self, sink: ElementId) -> Pipeline {
        self.pipeline.connect(sink, self.mapping)
    }
}

impl From<Edge> for Pipeline {
    fn from(edge: Edge) -> Self {
        Pipeline::new().edge(edge)
    }
}

impl FromIterator<Edge> for Pipeline {
    fn from_iter<I: IntoIterator<Item = Edge>>(iter: I) -> Self {
        let mut pipeline = Pipeline::new();
        pipeline.extend(iter);
        pipeline
    }
}

impl Extend<Edge> for Pipeline {
    fn extend<I: IntoIterator<Item = Edge>>(&mut self, iter: I) {
        for edge in iter {
            let sink = edge.sink();
            self.push(edge);
            self.tails = vec![sink];
        }
    }
}
