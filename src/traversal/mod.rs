//! Graph traversal stepper (BFS/DFS)
//!
//! Drains a frontier one micro-step at a time:
//!
//! | phase          | work                                         | next                           |
//! |----------------|----------------------------------------------|--------------------------------|
//! | LoopCheck      | frontier empty?                              | Done / Expand                  |
//! | Expand         | take a node, append to order, sort neighbors | NeighborLoop                   |
//! | NeighborLoop   | cursor exhausted?                            | LoopCheck / NeighborTest       |
//! | NeighborTest   | admit unvisited neighbor                     | NeighborAdmit / NeighborLoop   |
//! | NeighborAdmit  | advance cursor                               | NeighborLoop                   |
//!
//! Nodes are marked visited when admitted, never when expanded, so no node
//! enters the frontier twice.

mod frontier;

pub use frontier::Frontier;

use crate::graph::Graph;
use crate::machine::{PhaseMachine, Tick};
use crate::playback::Stepper;
use crate::pseudocode::Listing;
use crate::{Outcome, StepError};
use bitvec::prelude::*;
use std::collections::VecDeque;

/// Breadth-first traversal (FIFO frontier)
pub type Bfs = Traversal<VecDeque<usize>>;

/// Depth-first traversal (LIFO frontier, mark on push)
pub type Dfs = Traversal<Vec<usize>>;

/// Position of the traversal within its loop nest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub enum TraversalPhase {
    /// Not initialized; ticks are no-ops
    Init,
    /// Outer `while frontier not empty`
    LoopCheck,
    /// Take one node out of the frontier
    Expand,
    /// Inner `for each neighbor`
    NeighborLoop,
    /// Visited check on the neighbor under the cursor
    NeighborTest,
    /// Neighbor admitted; cursor advances next
    NeighborAdmit,
    /// Frontier drained
    Done,
}

/// Mutable traversal data the phase effects operate on
#[derive(Debug, Default)]
pub struct TraversalState<F> {
    /// Admitted, unexpanded nodes
    frontier: F,

    /// One bit per node, set at admission
    visited: BitVec,

    /// Predecessor in the traversal tree
    parent: Vec<Option<usize>>,

    /// Nodes in expansion order
    order: Vec<usize>,

    /// Node being expanded
    current: Option<usize>,

    /// Snapshot of `current`'s neighbors, ascending
    neighbors: Vec<usize>,

    /// Next neighbor to inspect
    cursor: usize,

    /// Edge along which the latest node was admitted
    last_edge: Option<(usize, usize)>,
}

impl<F: Frontier> TraversalState<F> {
    fn reset(&mut self, node_count: usize) {
        self.frontier.clear();
        self.visited = bitvec![0; node_count];
        self.parent = vec![None; node_count];
        self.order.clear();
        self.current = None;
        self.neighbors.clear();
        self.cursor = 0;
        self.last_edge = None;
    }

    fn admit(&mut self, node: usize, parent: Option<usize>) {
        self.visited.set(node, true);
        self.parent[node] = parent;
        self.frontier.admit(node);
    }
}

fn loop_check<F: Frontier>(state: &mut TraversalState<F>, _: &Graph) -> TraversalPhase {
    if state.frontier.is_empty() {
        TraversalPhase::Done
    } else {
        TraversalPhase::Expand
    }
}

fn expand<F: Frontier>(state: &mut TraversalState<F>, graph: &Graph) -> TraversalPhase {
    let Some(node) = state.frontier.take() else {
        return TraversalPhase::Done;
    };
    state.current = Some(node);
    state.order.push(node);
    state.neighbors = graph.sorted_neighbors(node);
    state.cursor = 0;
    TraversalPhase::NeighborLoop
}

fn neighbor_loop<F: Frontier>(state: &mut TraversalState<F>, _: &Graph) -> TraversalPhase {
    if state.cursor >= state.neighbors.len() {
        TraversalPhase::LoopCheck
    } else {
        TraversalPhase::NeighborTest
    }
}

fn neighbor_test<F: Frontier>(state: &mut TraversalState<F>, _: &Graph) -> TraversalPhase {
    let neighbor = state.neighbors[state.cursor];
    if state.visited[neighbor] {
        state.cursor += 1;
        return TraversalPhase::NeighborLoop;
    }

    state.admit(neighbor, state.current);
    state.last_edge = state.current.map(|from| (from, neighbor));
    TraversalPhase::NeighborAdmit
}

fn neighbor_admit<F: Frontier>(state: &mut TraversalState<F>, _: &Graph) -> TraversalPhase {
    state.cursor += 1;
    TraversalPhase::NeighborLoop
}

/// Read-only highlight state for renderers
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub struct TraversalView {
    /// Node being expanded
    pub current: Option<usize>,
    /// Frontier in storage order
    pub frontier: Vec<usize>,
    /// Visited node ids, ascending
    pub visited: Vec<usize>,
    /// Expansion order so far
    pub order: Vec<usize>,
    /// Last traversed edge, for arrow highlighting
    pub last_edge: Option<(usize, usize)>,
    /// Line highlighted by the latest tick
    pub line: usize,
}

/// Resumable BFS/DFS over a [`Graph`]
#[derive(Debug)]
pub struct Traversal<F: Frontier> {
    machine: PhaseMachine<TraversalPhase, TraversalState<F>, Graph>,
    state: TraversalState<F>,
    listing: Listing,

    /// Graph revision captured by `init`
    revision: Option<u64>,

    /// Set once the graph changed under the traversal
    stale: bool,

    last_line: usize,
}

impl<F: Frontier> Traversal<F> {
    /// Uninitialized traversal; ticks do nothing until [`Traversal::init`]
    pub fn new() -> Self {
        let machine = PhaseMachine::builder(TraversalPhase::Init)
            .halt(TraversalPhase::Init, 0)
            .rule(TraversalPhase::LoopCheck, 2, loop_check::<F>)
            .rule(TraversalPhase::Expand, 3, expand::<F>)
            .rule(TraversalPhase::NeighborLoop, 4, neighbor_loop::<F>)
            .rule(TraversalPhase::NeighborTest, 5, neighbor_test::<F>)
            .rule(TraversalPhase::NeighborAdmit, 5, neighbor_admit::<F>)
            .halt(TraversalPhase::Done, 6)
            .build();

        Self {
            machine,
            state: TraversalState::default(),
            listing: Listing::for_operation(F::KIND),
            revision: None,
            stale: false,
            last_line: 0,
        }
    }

    /// Reset all state and admit `start`
    ///
    /// An unknown start node leaves the traversal uninitialized.
    pub fn init(&mut self, graph: &Graph, start: usize) -> Result<(), StepError> {
        self.reset();
        if !graph.contains(start) {
            return Err(StepError::UnknownNode(start));
        }

        self.state.reset(graph.node_count());
        self.state.admit(start, None);
        self.state.current = Some(start);
        self.machine.jump(TraversalPhase::LoopCheck);
        self.revision = Some(graph.revision());
        self.last_line = 1;
        tracing::debug!(kind = ?F::KIND, start, nodes = graph.node_count(), "traversal initialized");
        Ok(())
    }

    /// Forget everything and return to the uninitialized phase
    pub fn reset(&mut self) {
        self.state.reset(0);
        self.machine.reset();
        self.revision = None;
        self.stale = false;
        self.last_line = 0;
    }

    /// Advance exactly one phase transition
    pub fn tick(&mut self, graph: &Graph) -> Tick {
        if self.stale {
            return Tick::halted(self.last_line);
        }
        if let Some(revision) = self.revision {
            if revision != graph.revision() {
                tracing::warn!(kind = ?F::KIND, "graph edited during traversal, stopping");
                self.stale = true;
                return Tick::halted(self.last_line);
            }
        }

        let was_done = self.machine.phase() == TraversalPhase::Done;
        let tick = self.machine.tick(&mut self.state, graph);
        self.last_line = tick.line;
        if !was_done && self.machine.phase() == TraversalPhase::Done {
            tracing::info!(kind = ?F::KIND, order = ?self.state.order, "traversal finished");
        }
        tick
    }

    /// Current phase
    pub fn phase(&self) -> TraversalPhase {
        self.machine.phase()
    }

    /// Expansion order so far
    pub fn order(&self) -> &[usize] {
        &self.state.order
    }

    /// Whether `node` has been admitted
    pub fn is_visited(&self, node: usize) -> bool {
        self.state.visited.get(node).map_or(false, |bit| *bit)
    }

    /// Predecessor of `node`, `None` for the start node and unreached nodes
    pub fn parent(&self, node: usize) -> Option<usize> {
        self.state.parent.get(node).copied().flatten()
    }

    /// Parent pointers as `(parent, child)` tree edges, by child id
    pub fn tree_edges(&self) -> Vec<(usize, usize)> {
        self.state
            .parent
            .iter()
            .enumerate()
            .filter_map(|(child, parent)| parent.map(|p| (p, child)))
            .collect()
    }

    /// Node being expanded
    pub fn current(&self) -> Option<usize> {
        self.state.current
    }

    /// Edge along which the latest node was admitted
    pub fn last_edge(&self) -> Option<(usize, usize)> {
        self.state.last_edge
    }

    /// Frontier contents in storage order
    pub fn frontier(&self) -> Vec<usize> {
        self.state.frontier.contents()
    }

    /// Snapshot for renderers
    pub fn view(&self) -> TraversalView {
        TraversalView {
            current: self.state.current,
            frontier: self.state.frontier.contents(),
            visited: self.state.visited.iter_ones().collect(),
            order: self.state.order.clone(),
            last_edge: self.state.last_edge,
            line: self.last_line,
        }
    }

    /// Pseudocode listing for this traversal
    pub fn listing(&self) -> &Listing {
        &self.listing
    }

    /// Terminal status
    pub fn outcome(&self) -> Outcome {
        if self.stale {
            return Outcome::Stale;
        }
        match self.machine.phase() {
            TraversalPhase::Done => Outcome::Finished,
            _ => Outcome::Pending,
        }
    }
}

impl<F: Frontier> Stepper for Traversal<F> {
    type Model = Graph;

    fn tick(&mut self, model: &mut Graph) -> Tick {
        Traversal::tick(self, model)
    }

    fn listing(&self) -> &Listing {
        &self.listing
    }

    fn outcome(&self) -> Outcome {
        Traversal::outcome(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Point;

    fn graph_with(n: usize, edges: &[(usize, usize)]) -> Graph {
        let mut graph = Graph::new();
        for i in 0..n {
            graph.add_node(Point::new(i as f32, 0.0));
        }
        for &(u, v) in edges {
            graph.add_edge(u, v).unwrap();
        }
        graph
    }

    fn run<F: Frontier>(traversal: &mut Traversal<F>, graph: &Graph) -> Vec<Tick> {
        let mut ticks = Vec::new();
        loop {
            let tick = traversal.tick(graph);
            ticks.push(tick);
            if !tick.continues {
                return ticks;
            }
        }
    }

    #[test]
    fn test_bfs_phase_sequence_on_single_edge() {
        let graph = graph_with(2, &[(0, 1)]);
        let mut bfs = Bfs::new();
        bfs.init(&graph, 0).unwrap();
        assert_eq!(bfs.phase(), TraversalPhase::LoopCheck);
        assert!(bfs.is_visited(0));

        let lines: Vec<usize> = run(&mut bfs, &graph).iter().map(|t| t.line).collect();
        // expand 0 admits 1; expand 1 finds 0 already visited
        assert_eq!(lines, vec![2, 3, 4, 5, 5, 4, 2, 3, 4, 5, 4, 6]);
        assert_eq!(bfs.order(), &[0, 1]);
        assert_eq!(bfs.parent(1), Some(0));
        assert_eq!(bfs.parent(0), None);
        assert_eq!(bfs.outcome(), Outcome::Finished);
    }

    #[test]
    fn test_bfs_and_dfs_orders_differ() {
        // 0 - 1, 0 - 2, 1 - 3
        let graph = graph_with(4, &[(0, 1), (0, 2), (1, 3)]);

        let mut bfs = Bfs::new();
        bfs.init(&graph, 0).unwrap();
        run(&mut bfs, &graph);
        assert_eq!(bfs.order(), &[0, 1, 2, 3]);

        let mut dfs = Dfs::new();
        dfs.init(&graph, 0).unwrap();
        run(&mut dfs, &graph);
        assert_eq!(dfs.order(), &[0, 2, 1, 3]);
        assert_eq!(dfs.tree_edges(), vec![(0, 1), (0, 2), (1, 3)]);
    }

    #[test]
    fn test_uninitialized_tick_is_noop() {
        let graph = Graph::new();
        let mut bfs = Bfs::new();
        assert_eq!(bfs.tick(&graph), Tick::halted(0));
        assert!(bfs.order().is_empty());
    }

    #[test]
    fn test_unknown_start_rejected() {
        let graph = graph_with(2, &[]);
        let mut dfs = Dfs::new();
        assert_eq!(dfs.init(&graph, 9), Err(StepError::UnknownNode(9)));
        assert!(!dfs.tick(&graph).continues);
        assert_eq!(dfs.phase(), TraversalPhase::Init);
    }

    #[test]
    fn test_done_is_idempotent() {
        let graph = graph_with(3, &[(0, 1), (1, 2)]);
        let mut bfs = Bfs::new();
        bfs.init(&graph, 1).unwrap();
        run(&mut bfs, &graph);
        let view = bfs.view();
        for _ in 0..5 {
            assert_eq!(bfs.tick(&graph), Tick::halted(6));
        }
        assert_eq!(bfs.view(), view);
    }

    #[test]
    fn test_graph_edit_marks_stale() {
        let mut graph = graph_with(3, &[(0, 1), (1, 2)]);
        let mut bfs = Bfs::new();
        bfs.init(&graph, 0).unwrap();
        bfs.tick(&graph);
        graph.remove_node(2).unwrap();
        assert!(!bfs.tick(&graph).continues);
        assert_eq!(bfs.outcome(), Outcome::Stale);
    }

    #[test]
    fn test_last_edge_tracks_admission() {
        let graph = graph_with(2, &[(0, 1)]);
        let mut bfs = Bfs::new();
        bfs.init(&graph, 1).unwrap();
        for _ in 0..4 {
            bfs.tick(&graph);
        }
        assert_eq!(bfs.last_edge(), Some((1, 0)));
        assert_eq!(bfs.frontier(), vec![0]);
        assert_eq!(bfs.view().visited, vec![0, 1]);
    }
}
