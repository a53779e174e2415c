//! Graph model
//!
//! Nodes carry dense integer ids (their index). Deleting a node shifts every
//! larger id down by one and remaps the surviving edges the same way.
//! Adjacency is never edited directly: it is rebuilt from `edges` after
//! every structural change, so the two cannot drift apart.

mod edge;

pub use edge::{Edge, Node, Point};

use crate::StepError;
use rand::Rng;
use std::collections::HashSet;

/// Directed or undirected graph with id-reindexing deletion
#[derive(Debug, Clone, Default)]
pub struct Graph {
    /// Nodes in id order
    nodes: Vec<Node>,

    /// Edges in insertion order, no duplicates
    edges: Vec<Edge>,

    /// Neighbor ids per node, derived from `edges`
    adjacency: Vec<Vec<usize>>,

    /// Whether new edges are directed
    directed: bool,

    /// Bumped on every structural mutation
    revision: u64,
}

impl Graph {
    /// Empty undirected graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty graph in the given orientation mode
    pub fn with_orientation(directed: bool) -> Self {
        Self {
            directed,
            ..Self::default()
        }
    }

    /// Number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Whether the graph has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether edges are directed
    pub fn is_directed(&self) -> bool {
        self.directed
    }

    /// Structural revision; steppers compare it to detect edits
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// All nodes in id order
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// All edges in insertion order
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Whether `id` names a node
    pub fn contains(&self, id: usize) -> bool {
        id < self.nodes.len()
    }

    /// Neighbors of a node in adjacency order (empty for unknown ids)
    pub fn neighbors(&self, id: usize) -> &[usize] {
        self.adjacency.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Neighbors sorted ascending, the order traversals use
    pub fn sorted_neighbors(&self, id: usize) -> Vec<usize> {
        let mut neighbors = self.neighbors(id).to_vec();
        neighbors.sort_unstable();
        neighbors
    }

    /// Out-degree (degree for undirected graphs)
    pub fn degree(&self, id: usize) -> usize {
        self.neighbors(id).len()
    }

    /// Whether the edge `u -> v` (or `{u, v}` when undirected) exists
    pub fn has_edge(&self, u: usize, v: usize) -> bool {
        self.edges.contains(&self.edge_for(u, v))
    }

    /// Add a node and return its id
    pub fn add_node(&mut self, position: Point) -> usize {
        let id = self.nodes.len();
        self.nodes.push(Node { id, position });
        self.adjacency.push(Vec::new());
        self.bump();
        id
    }

    /// Move a node; layout only, does not invalidate steppers
    pub fn set_position(&mut self, id: usize, position: Point) -> Result<(), StepError> {
        let node = self.nodes.get_mut(id).ok_or(StepError::UnknownNode(id))?;
        node.position = position;
        Ok(())
    }

    /// Add an edge in the current orientation mode
    ///
    /// Returns `Ok(false)` for self loops and duplicates (no-ops).
    pub fn add_edge(&mut self, u: usize, v: usize) -> Result<bool, StepError> {
        self.check_node(u)?;
        self.check_node(v)?;
        if u == v {
            return Ok(false);
        }

        let edge = self.edge_for(u, v);
        if self.edges.contains(&edge) {
            return Ok(false);
        }

        self.edges.push(edge);
        self.rebuild_adjacency();
        self.bump();
        tracing::debug!(?edge, "edge added");
        Ok(true)
    }

    /// Remove an edge; returns whether it existed
    pub fn remove_edge(&mut self, u: usize, v: usize) -> bool {
        let edge = self.edge_for(u, v);
        let before = self.edges.len();
        self.edges.retain(|existing| *existing != edge);
        if self.edges.len() == before {
            return false;
        }
        self.rebuild_adjacency();
        self.bump();
        true
    }

    /// Delete node `id` and reindex
    ///
    /// Incident edges are dropped, every id above `id` shifts down by one and
    /// surviving edges are remapped with the same rule before adjacency is
    /// rebuilt.
    pub fn remove_node(&mut self, id: usize) -> Result<(), StepError> {
        self.check_node(id)?;

        self.edges.retain(|edge| !edge.touches(id));
        self.nodes.remove(id);
        for (index, node) in self.nodes.iter_mut().enumerate().skip(id) {
            node.id = index;
        }
        self.edges = self
            .edges
            .iter()
            .map(|edge| edge.shifted_after_removal(id))
            .collect();

        self.rebuild_adjacency();
        self.bump();
        tracing::debug!(removed = id, nodes = self.nodes.len(), "node removed and graph reindexed");
        Ok(())
    }

    /// Switch orientation mode using an unseeded random source
    pub fn set_directed(&mut self, directed: bool) {
        self.set_directed_with(directed, &mut rand::rng());
    }

    /// Switch orientation mode with a caller-supplied random source
    ///
    /// Undirected -> directed flips a coin per edge to pick its direction.
    /// Directed -> undirected merges edges sharing an endpoint pair; the first
    /// occurrence wins.
    pub fn set_directed_with<R: Rng>(&mut self, directed: bool, rng: &mut R) {
        if directed == self.directed {
            return;
        }
        self.directed = directed;

        if directed {
            self.edges = self
                .edges
                .iter()
                .map(|edge| {
                    let forward = Edge::directed(edge.u, edge.v);
                    if rng.random_bool(0.5) {
                        forward
                    } else {
                        forward.reversed()
                    }
                })
                .collect();
        } else {
            let mut seen = HashSet::new();
            self.edges = self
                .edges
                .iter()
                .filter(|edge| seen.insert(edge.endpoints()))
                .map(|edge| Edge::undirected(edge.u, edge.v))
                .collect();
        }

        self.rebuild_adjacency();
        self.bump();
        tracing::debug!(directed, edges = self.edges.len(), "orientation toggled");
    }

    /// Remove every node and edge
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
        self.adjacency.clear();
        self.bump();
    }

    fn edge_for(&self, u: usize, v: usize) -> Edge {
        if self.directed {
            Edge::directed(u, v)
        } else {
            Edge::undirected(u, v)
        }
    }

    fn check_node(&self, id: usize) -> Result<(), StepError> {
        if self.contains(id) {
            Ok(())
        } else {
            Err(StepError::UnknownNode(id))
        }
    }

    fn rebuild_adjacency(&mut self) {
        let mut adjacency = vec![Vec::new(); self.nodes.len()];
        for edge in &self.edges {
            adjacency[edge.u].push(edge.v);
            if !edge.directed {
                adjacency[edge.v].push(edge.u);
            }
        }
        self.adjacency = adjacency;
    }

    fn bump(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn path_graph(n: usize) -> Graph {
        let mut graph = Graph::new();
        for i in 0..n {
            graph.add_node(Point::new(i as f32, 0.0));
        }
        for i in 1..n {
            graph.add_edge(i - 1, i).unwrap();
        }
        graph
    }

    #[test]
    fn test_undirected_edges_are_unique() {
        let mut graph = path_graph(2);
        assert!(!graph.add_edge(1, 0).unwrap());
        assert!(!graph.add_edge(0, 0).unwrap());
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.neighbors(0), &[1]);
        assert_eq!(graph.neighbors(1), &[0]);
    }

    #[test]
    fn test_unknown_node_rejected() {
        let mut graph = path_graph(2);
        let revision = graph.revision();
        assert_eq!(graph.add_edge(0, 5), Err(StepError::UnknownNode(5)));
        assert_eq!(graph.revision(), revision);
    }

    #[test]
    fn test_remove_node_reindexes() {
        let mut graph = path_graph(4);
        graph.remove_node(1).unwrap();

        assert_eq!(graph.node_count(), 3);
        assert_eq!(
            graph.nodes().iter().map(|n| n.id).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
        assert_eq!(graph.edges(), &[Edge::undirected(1, 2)]);
        assert!(graph.neighbors(0).is_empty());
        assert_eq!(graph.neighbors(1), &[2]);
    }

    #[test]
    fn test_directed_adjacency_is_one_way() {
        let mut graph = Graph::with_orientation(true);
        graph.add_node(Point::default());
        graph.add_node(Point::default());
        graph.add_edge(1, 0).unwrap();
        assert!(graph.add_edge(0, 1).unwrap());
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.neighbors(1), &[0]);
        assert_eq!(graph.neighbors(0), &[1]);
    }

    #[test]
    fn test_orientation_round_trip_keeps_cardinality() {
        let mut graph = path_graph(3);
        let mut rng = StdRng::seed_from_u64(7);
        graph.set_directed_with(true, &mut rng);
        assert!(graph.edges().iter().all(|e| e.directed));
        assert_eq!(graph.edge_count(), 2);

        graph.set_directed_with(false, &mut rng);
        assert_eq!(graph.edge_count(), 2);
        assert!(graph.edges().iter().all(|e| !e.directed && e.u < e.v));
    }

    #[test]
    fn test_merge_drops_opposite_duplicates() {
        let mut graph = Graph::with_orientation(true);
        for _ in 0..2 {
            graph.add_node(Point::default());
        }
        graph.add_edge(1, 0).unwrap();
        graph.add_edge(0, 1).unwrap();
        graph.set_directed(false);
        assert_eq!(graph.edges(), &[Edge::undirected(0, 1)]);
        assert_eq!(graph.neighbors(0), &[1]);
    }

    #[test]
    fn test_set_position_keeps_revision() {
        let mut graph = path_graph(2);
        let revision = graph.revision();
        graph.set_position(1, Point::new(5.0, 5.0)).unwrap();
        assert_eq!(graph.revision(), revision);
        assert_eq!(graph.nodes()[1].position, Point::new(5.0, 5.0));
    }
}
