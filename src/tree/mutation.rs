//! Path-based BST search/insert/delete stepper
//!
//! The route through the tree is computed up front; each tick reveals one
//! node of it. The only structural change happens on the final tick, so an
//! abandoned stepper never leaves the tree half-modified.
//!
//! Delete runs in two legs. Stage `LocateTarget` walks the search path. A
//! target with two children switches to `LocateSuccessor`, which walks the
//! left spine of the right subtree before the key copy and splice are
//! applied together.

use super::{BinaryTree, NodeRef};
use crate::machine::Tick;
use crate::playback::Stepper;
use crate::pseudocode::{Listing, OperationKind};
use crate::Outcome;

/// Which mutation the stepper animates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub enum BstOperation {
    /// Lookup only
    Search,
    /// Add a key
    Insert,
    /// Remove a key
    Delete,
}

impl BstOperation {
    fn kind(self) -> OperationKind {
        match self {
            BstOperation::Search => OperationKind::BstSearch,
            BstOperation::Insert => OperationKind::BstInsert,
            BstOperation::Delete => OperationKind::BstDelete,
        }
    }
}

/// Progress of a delete
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub enum DeleteStage {
    /// Walking the search path
    LocateTarget,
    /// Walking to the in-order successor
    LocateSuccessor,
    /// Structural change committed
    Applied,
}

/// Highlight state for renderers
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub struct BstView {
    /// Node revealed by the latest tick
    pub current: Option<NodeRef>,
    /// Path nodes revealed so far
    pub revealed: Vec<NodeRef>,
    /// Delete target, once located
    pub target: Option<NodeRef>,
    /// Successor, once reached
    pub successor: Option<NodeRef>,
    /// Delete progress
    pub stage: DeleteStage,
    /// Set after the structural change; layout must be recomputed
    pub needs_relayout: bool,
    /// Line highlighted by the latest tick
    pub line: usize,
}

/// Resumable search, insert or delete of one key
#[derive(Debug)]
pub struct BstStepper {
    operation: BstOperation,
    key: i64,

    /// Root-to-target route, precomputed
    path: Vec<NodeRef>,
    path_index: usize,

    stage: DeleteStage,
    target: Option<NodeRef>,
    successor_path: Vec<NodeRef>,
    successor_index: usize,
    successor: Option<NodeRef>,

    current: Option<NodeRef>,
    outcome: Outcome,
    needs_relayout: bool,
    listing: Listing,
    revision: u64,
    last_line: usize,
}

impl BstStepper {
    fn prepare(tree: &BinaryTree, operation: BstOperation, key: i64) -> Self {
        let path = tree.search_path(key);
        tracing::debug!(?operation, key, path_len = path.len(), "bst stepper prepared");
        Self {
            operation,
            key,
            path,
            path_index: 0,
            stage: DeleteStage::LocateTarget,
            target: None,
            successor_path: Vec::new(),
            successor_index: 0,
            successor: None,
            current: None,
            outcome: Outcome::Pending,
            needs_relayout: false,
            listing: Listing::for_operation(operation.kind()),
            revision: tree.revision(),
            last_line: 0,
        }
    }

    /// Animated lookup of `key`
    pub fn search(tree: &BinaryTree, key: i64) -> Self {
        Self::prepare(tree, BstOperation::Search, key)
    }

    /// Animated insertion of `key`
    pub fn insert(tree: &BinaryTree, key: i64) -> Self {
        Self::prepare(tree, BstOperation::Insert, key)
    }

    /// Animated deletion of `key`
    pub fn delete(tree: &BinaryTree, key: i64) -> Self {
        Self::prepare(tree, BstOperation::Delete, key)
    }

    /// Reveal one node or commit the change
    pub fn tick(&mut self, tree: &mut BinaryTree) -> Tick {
        if self.outcome.is_terminal() {
            return Tick::halted(self.last_line);
        }
        if tree.revision() != self.revision {
            tracing::warn!(operation = ?self.operation, "tree edited during mutation, stopping");
            self.outcome = Outcome::Stale;
            return Tick::halted(self.last_line);
        }

        let line = match self.operation {
            BstOperation::Search => self.tick_search(tree),
            BstOperation::Insert => self.tick_insert(tree),
            BstOperation::Delete => match self.stage {
                DeleteStage::LocateTarget => self.tick_locate_target(tree),
                DeleteStage::LocateSuccessor => self.tick_locate_successor(tree),
                DeleteStage::Applied => self.last_line,
            },
        };
        self.last_line = line;
        self.revision = tree.revision();

        if self.outcome.is_terminal() {
            tracing::info!(operation = ?self.operation, key = self.key, outcome = %self.outcome, "bst stepper finished");
            Tick::halted(line)
        } else {
            Tick::running(line)
        }
    }

    /// Next path node and its key, advancing the cursor
    fn reveal(&mut self, tree: &BinaryTree) -> Option<(NodeRef, i64)> {
        let handle = *self.path.get(self.path_index)?;
        self.path_index += 1;
        self.current = Some(handle);
        tree.key(handle).map(|key| (handle, key))
    }

    fn tick_search(&mut self, tree: &BinaryTree) -> usize {
        match self.reveal(tree) {
            Some((_, key)) if key == self.key => {
                self.outcome = Outcome::KeyFound(key);
                4
            }
            Some((_, key)) if key < self.key => 6,
            Some(_) => 7,
            None => {
                self.outcome = Outcome::NotFound;
                2
            }
        }
    }

    fn tick_insert(&mut self, tree: &mut BinaryTree) -> usize {
        if tree.is_empty() {
            return self.commit_insert(tree, None, 1);
        }
        match self.reveal(tree) {
            Some((_, key)) if key == self.key => {
                self.outcome = Outcome::Duplicate(key);
                6
            }
            Some((_, key)) if self.key < key => 3,
            Some(_) => 4,
            None => {
                let parent = self.path.last().copied();
                self.commit_insert(tree, parent, 5)
            }
        }
    }

    fn commit_insert(&mut self, tree: &mut BinaryTree, parent: Option<NodeRef>, line: usize) -> usize {
        match tree.attach(parent, self.key) {
            Some(handle) => {
                self.current = Some(handle);
                self.outcome = Outcome::Inserted(self.key);
                self.needs_relayout = true;
            }
            None => self.outcome = Outcome::Stale,
        }
        line
    }

    fn tick_locate_target(&mut self, tree: &mut BinaryTree) -> usize {
        let Some((handle, key)) = self.reveal(tree) else {
            self.outcome = Outcome::NotFound;
            return 1;
        };
        if self.key < key {
            return 2;
        }
        if self.key > key {
            return 3;
        }

        self.target = Some(handle);
        let Some(node) = tree.get(handle).copied() else {
            self.outcome = Outcome::Stale;
            return 4;
        };
        if node.child_count() < 2 {
            self.apply(tree.splice_out(handle));
            return 5;
        }

        self.stage = DeleteStage::LocateSuccessor;
        self.successor_path = tree.min_path(node.right);
        tracing::trace!(key, successor_path_len = self.successor_path.len(), "two children, locating successor");
        4
    }

    fn tick_locate_successor(&mut self, tree: &mut BinaryTree) -> usize {
        if let Some(&handle) = self.successor_path.get(self.successor_index) {
            self.successor_index += 1;
            self.current = Some(handle);
            self.successor = Some(handle);
            return 6;
        }

        let committed = match (self.target, self.successor) {
            (Some(target), Some(successor)) => tree
                .replace_with_successor(target, successor)
                .map(|_| self.key),
            _ => None,
        };
        self.current = self.target;
        self.apply(committed);
        7
    }

    fn apply(&mut self, removed: Option<i64>) {
        self.stage = DeleteStage::Applied;
        self.outcome = match removed {
            Some(_) => {
                self.needs_relayout = true;
                Outcome::Deleted(self.key)
            }
            None => Outcome::Stale,
        };
    }

    /// Operation being animated
    pub fn operation(&self) -> BstOperation {
        self.operation
    }

    /// Key being searched, inserted or deleted
    pub fn key(&self) -> i64 {
        self.key
    }

    /// Precomputed search path
    pub fn path(&self) -> &[NodeRef] {
        &self.path
    }

    /// Number of path nodes revealed
    pub fn path_index(&self) -> usize {
        self.path_index
    }

    /// Precomputed successor path (empty until the target is located)
    pub fn successor_path(&self) -> &[NodeRef] {
        &self.successor_path
    }

    /// Delete progress
    pub fn stage(&self) -> DeleteStage {
        self.stage
    }

    /// Whether a structural change requires a new layout
    pub fn needs_relayout(&self) -> bool {
        self.needs_relayout
    }

    /// Snapshot for renderers
    pub fn view(&self) -> BstView {
        let mut revealed = self.path[..self.path_index].to_vec();
        revealed.extend_from_slice(&self.successor_path[..self.successor_index]);
        BstView {
            current: self.current,
            revealed,
            target: self.target,
            successor: self.successor,
            stage: self.stage,
            needs_relayout: self.needs_relayout,
            line: self.last_line,
        }
    }

    /// Terminal status
    pub fn outcome(&self) -> Outcome {
        self.outcome
    }
}

impl Stepper for BstStepper {
    type Model = BinaryTree;

    fn tick(&mut self, model: &mut BinaryTree) -> Tick {
        BstStepper::tick(self, model)
    }

    fn listing(&self) -> &Listing {
        &self.listing
    }

    fn outcome(&self) -> Outcome {
        self.outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(stepper: &mut BstStepper, tree: &mut BinaryTree) -> Vec<usize> {
        let mut lines = Vec::new();
        loop {
            let tick = stepper.tick(tree);
            lines.push(tick.line);
            if !tick.continues {
                return lines;
            }
        }
    }

    fn sample() -> BinaryTree {
        BinaryTree::from_keys([5, 3, 8, 1, 4])
    }

    #[test]
    fn test_search_found() {
        let mut tree = sample();
        let mut search = BstStepper::search(&tree, 4);
        assert_eq!(run(&mut search, &mut tree), vec![7, 6, 4]);
        assert_eq!(search.outcome(), Outcome::KeyFound(4));
        assert_eq!(search.path_index(), 3);
    }

    #[test]
    fn test_search_not_found_exhausts_path() {
        let mut tree = sample();
        let mut search = BstStepper::search(&tree, 7);
        assert_eq!(run(&mut search, &mut tree), vec![6, 7, 2]);
        assert_eq!(search.outcome(), Outcome::NotFound);

        let mut empty = BinaryTree::new();
        let mut search = BstStepper::search(&empty, 1);
        assert_eq!(run(&mut search, &mut empty), vec![2]);
    }

    #[test]
    fn test_insert_into_empty_creates_root() {
        let mut tree = BinaryTree::new();
        let mut insert = BstStepper::insert(&tree, 10);
        assert_eq!(insert.tick(&mut tree), Tick::halted(1));
        assert_eq!(tree.in_order(), vec![10]);
        assert!(insert.needs_relayout());
    }

    #[test]
    fn test_insert_walks_then_attaches() {
        let mut tree = sample();
        let mut insert = BstStepper::insert(&tree, 6);
        let lines = run(&mut insert, &mut tree);
        assert_eq!(lines, vec![4, 3, 5]);
        assert_eq!(insert.outcome(), Outcome::Inserted(6));
        assert_eq!(tree.in_order(), vec![1, 3, 4, 5, 6, 8]);
    }

    #[test]
    fn test_insert_duplicate() {
        let mut tree = sample();
        let mut insert = BstStepper::insert(&tree, 3);
        assert_eq!(run(&mut insert, &mut tree), vec![3, 6]);
        assert_eq!(insert.outcome(), Outcome::Duplicate(3));
        assert_eq!(tree.len(), 5);
    }

    #[test]
    fn test_delete_leaf_applies_on_match() {
        let mut tree = sample();
        let mut delete = BstStepper::delete(&tree, 1);
        assert_eq!(run(&mut delete, &mut tree), vec![2, 2, 5]);
        assert_eq!(delete.outcome(), Outcome::Deleted(1));
        assert_eq!(delete.stage(), DeleteStage::Applied);
        assert_eq!(tree.in_order(), vec![3, 4, 5, 8]);
    }

    #[test]
    fn test_delete_two_children_two_legs() {
        let mut tree = BinaryTree::from_keys([50, 30, 70, 60, 80, 65]);
        let mut delete = BstStepper::delete(&tree, 50);

        assert_eq!(delete.tick(&mut tree), Tick::running(4));
        assert_eq!(delete.stage(), DeleteStage::LocateSuccessor);
        assert_eq!(tree.len(), 6, "nothing committed while locating");

        assert_eq!(delete.tick(&mut tree), Tick::running(6));
        assert_eq!(delete.tick(&mut tree), Tick::running(6));
        let successor = delete.view().successor.and_then(|h| tree.key(h));
        assert_eq!(successor, Some(60));

        assert_eq!(delete.tick(&mut tree), Tick::halted(7));
        assert_eq!(tree.pre_order(), vec![60, 30, 70, 65, 80]);
        assert!(tree.is_search_tree());
        assert!(delete.view().needs_relayout);
    }

    #[test]
    fn test_delete_missing_key() {
        let mut tree = sample();
        let mut delete = BstStepper::delete(&tree, 6);
        assert_eq!(run(&mut delete, &mut tree), vec![3, 2, 1]);
        assert_eq!(delete.outcome(), Outcome::NotFound);
        assert_eq!(tree.len(), 5);
    }

    #[test]
    fn test_terminal_is_idempotent() {
        let mut tree = sample();
        let mut delete = BstStepper::delete(&tree, 8);
        run(&mut delete, &mut tree);
        let snapshot = tree.in_order();
        for _ in 0..3 {
            assert!(!delete.tick(&mut tree).continues);
        }
        assert_eq!(tree.in_order(), snapshot);
    }

    #[test]
    fn test_edit_between_ticks_is_stale() {
        let mut tree = sample();
        let mut insert = BstStepper::insert(&tree, 9);
        insert.tick(&mut tree);
        tree.insert(2);
        assert!(!insert.tick(&mut tree).continues);
        assert_eq!(insert.outcome(), Outcome::Stale);
        assert!(!tree.contains(9));
    }
}
