//! Frontier containers
//!
//! The frontier holds admitted-but-unexpanded nodes. Which container backs
//! it decides the traversal:
//! - `VecDeque` -> queue semantics -> BFS
//! - `Vec` -> stack semantics -> DFS

use crate::pseudocode::OperationKind;
use std::collections::VecDeque;
use std::fmt::Debug;

/// Container of discovered node ids awaiting expansion
pub trait Frontier: Default + Debug {
    /// Listing shown while this frontier drives a traversal
    const KIND: OperationKind;

    /// Admit a node (enqueue or push)
    fn admit(&mut self, id: usize);

    /// Remove the next node to expand (front for FIFO, top for LIFO)
    fn take(&mut self) -> Option<usize>;

    /// Number of waiting nodes
    fn len(&self) -> usize;

    /// Whether nothing is waiting
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Waiting nodes in storage order (queue front first, stack bottom first)
    fn contents(&self) -> Vec<usize>;

    /// Drop every waiting node
    fn clear(&mut self);
}

impl Frontier for VecDeque<usize> {
    const KIND: OperationKind = OperationKind::Bfs;

    fn admit(&mut self, id: usize) {
        self.push_back(id);
    }

    fn take(&mut self) -> Option<usize> {
        self.pop_front()
    }

    fn len(&self) -> usize {
        VecDeque::len(self)
    }

    fn contents(&self) -> Vec<usize> {
        self.iter().copied().collect()
    }

    fn clear(&mut self) {
        VecDeque::clear(self);
    }
}

impl Frontier for Vec<usize> {
    const KIND: OperationKind = OperationKind::Dfs;

    fn admit(&mut self, id: usize) {
        self.push(id);
    }

    fn take(&mut self) -> Option<usize> {
        self.pop()
    }

    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn contents(&self) -> Vec<usize> {
        self.clone()
    }

    fn clear(&mut self) {
        Vec::clear(self);
    }
}
