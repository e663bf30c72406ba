//! Minimum spanning tree over room connectivity candidates.

use std::collections::HashSet;
use std::hash::Hash;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// An undirected edge with a precomputed weight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightedEdge<V> {
    pub u: V,
    pub v: V,
    pub weight: f32,
}

impl<V: Copy + Eq> WeightedEdge<V> {
    pub fn new(u: V, v: V, weight: f32) -> Self {
        Self { u, v, weight }
    }

    /// Same endpoints, in either order.
    pub fn same_endpoints(&self, other: &WeightedEdge<V>) -> bool {
        (self.u == other.u && self.v == other.v) || (self.u == other.v && self.v == other.u)
    }
}

/// Prim's algorithm by repeated edge scan.
///
/// Grows the tree from `start`, each round taking the lightest edge with
/// exactly one endpoint already in the tree; the first such edge in `edges`
/// order wins ties. Stops when no edge crosses the cut, so a disconnected
/// graph yields the tree of `start`'s component only.
pub fn minimum_spanning_tree<V>(edges: &[WeightedEdge<V>], start: V) -> Vec<WeightedEdge<V>>
where
    V: Copy + Eq + Hash,
{
    puffin::profile_function!();

    let mut open: HashSet<V> = edges.iter().flat_map(|e| [e.u, e.v]).collect();
    let mut closed = HashSet::new();
    open.remove(&start);
    closed.insert(start);

    let mut tree = Vec::new();
    while !open.is_empty() {
        let mut chosen: Option<&WeightedEdge<V>> = None;
        for edge in edges {
            if closed.contains(&edge.u) == closed.contains(&edge.v) {
                continue;
            }
            if chosen.map_or(true, |best| edge.weight < best.weight) {
                chosen = Some(edge);
            }
        }

        let Some(edge) = chosen else {
            break;
        };
        for vertex in [edge.u, edge.v] {
            open.remove(&vertex);
            closed.insert(vertex);
        }
        tree.push(*edge);
    }

    tree
}

/// Edges of `all` outside `tree`, each kept with probability `chance`.
pub fn add_extra_edges<V, R>(
    all: &[WeightedEdge<V>],
    tree: &[WeightedEdge<V>],
    chance: f64,
    rng: &mut R,
) -> Vec<WeightedEdge<V>>
where
    V: Copy + Eq,
    R: Rng + ?Sized,
{
    all.iter()
        .filter(|edge| !tree.iter().any(|t| t.same_endpoints(edge)))
        .filter(|_| rng.gen::<f64>() < chance)
        .copied()
        .collect()
}
