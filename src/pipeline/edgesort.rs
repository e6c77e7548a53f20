//! Level-based topological sort of a flow.
//!
//! Kahn's algorithm over the graph induced by the edges (nodes are the
//! elements referenced by any edge plus any explicitly listed element).
//! Each round removes every zero-in-degree node at once, which yields
//! levels: sets of elements with no dependency among themselves.
//!
//! Ordering inside a level follows first-seen order (explicit nodes first,
//! then edge endpoints in edge order), so identical input always gives
//! identical output. Jobs must still not rely on same-level order.

use crate::pipeline::edge::Edge;
use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::id::ElementId;
use std::collections::HashMap;

/// Sort elements into dependency levels.
///
/// Isolated elements land in the first level. Fails with
/// `CyclicDependency` naming every element that could not be scheduled;
/// no partial ordering is returned.
pub fn edgesort(nodes: &[ElementId], edges: &[Edge]) -> PipelineResult<Vec<Vec<ElementId>>> {
    // first-seen index for every element
    let mut order: Vec<ElementId> = Vec::new();
    let mut index: HashMap<ElementId, usize> = HashMap::new();
    let mut see = |id: ElementId| -> usize {
        *index.entry(id).or_insert_with(|| {
            order.push(id);
            order.len() - 1
        })
    };

    let mut links = Vec::with_capacity(edges.len());
    for &node in nodes {
        see(node);
    }
    for edge in edges {
        let from = see(edge.source());
        let to = see(edge.sink());
        links.push((from, to));
    }

    let n = order.len();
    let mut successors = vec![Vec::new(); n];
    let mut in_degree = vec![0usize; n];
    for (from, to) in links {
        successors[from].push(to);
        in_degree[to] += 1;
    }

    let mut levels = Vec::new();
    let mut current: Vec<usize> = (0..n).filter(|&i| in_degree[i] == 0).collect();
    let mut scheduled = 0;

    while !current.is_empty() {
        scheduled += current.len();
        let mut next = Vec::new();
        for &node in &current {
            for &succ in &successors[node] {
                in_degree[succ] -= 1;
                if in_degree[succ] == 0 {
                    next.push(succ);
                }
            }
        }
        next.sort_unstable();
        levels.push(current.iter().map(|&i| order[i]).collect());
        current = next;
    }

    if scheduled < n {
        let elements = (0..n)
            .filter(|&i| in_degree[i] > 0)
            .map(|i| order[i])
            .collect();
        return Err(PipelineError::CyclicDependency { elements });
    }

    Ok(levels)
}

/// Level index of every element in a sort result.
pub fn level_map(levels: &[Vec<ElementId>]) -> HashMap<ElementId, usize> {
    levels
        .iter()
        .enumerate()
        .flat_map(|(level, ids)| ids.iter().map(move |&id| (id, level)))
        .collect()
}
