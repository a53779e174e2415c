//! Explicit-stack tree walk
//!
//! Recursion is replaced by a stack of frames `(node, state)`. A frame moves
//! through states 0..=4:
//!
//! ```text
//! 0 -> 1   null check (line 1)
//! 1 -> 2   plan[0]
//! 2 -> 3   plan[1]
//! 3 -> 4   plan[2]
//! 4        pop
//! ```
//!
//! The plan is the only thing that differs between orders:
//! - Pre:  visit, push left, push right
//! - In:   push left, visit, push right
//! - Post: push left, push right, visit
//!
//! A pushed child frame sits on top of its parent, so the child's whole
//! subtree finishes before the parent's next step. Absent children are not
//! pushed, which keeps the stack no deeper than the tree is high.

use super::{BinaryTree, NodeRef};
use crate::machine::Tick;
use crate::playback::Stepper;
use crate::pseudocode::{Listing, OperationKind};
use crate::Outcome;

/// Traversal order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub enum WalkOrder {
    /// Left, node, right
    In,
    /// Node, left, right
    Pre,
    /// Left, right, node
    Post,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameStep {
    Visit,
    PushLeft,
    PushRight,
}

impl WalkOrder {
    fn plan(self) -> [FrameStep; 3] {
        use FrameStep::*;
        match self {
            WalkOrder::Pre => [Visit, PushLeft, PushRight],
            WalkOrder::In => [PushLeft, Visit, PushRight],
            WalkOrder::Post => [PushLeft, PushRight, Visit],
        }
    }

    /// Listing shown for this order
    pub fn operation(self) -> OperationKind {
        match self {
            WalkOrder::In => OperationKind::InOrder,
            WalkOrder::Pre => OperationKind::PreOrder,
            WalkOrder::Post => OperationKind::PostOrder,
        }
    }
}

/// Stand-in for one level of recursion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub struct Frame {
    /// Subtree root; `None` marks an empty tree
    pub node: Option<NodeRef>,
    /// Progress through the frame (0..=4)
    pub state: u8,
}

const LINE_NULL_CHECK: usize = 1;
const LINE_LAST: usize = 4;

/// Highlight state for renderers
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub struct WalkView {
    /// Node whose frame is on top of the stack
    pub current: Option<NodeRef>,
    /// Nodes already emitted, in emission order
    pub visited: Vec<NodeRef>,
    /// Emitted keys
    pub output: Vec<i64>,
    /// Frame stack, bottom first
    pub stack: Vec<Frame>,
    /// Line highlighted by the latest tick
    pub line: usize,
}

/// Resumable in/pre/post-order walk over a [`BinaryTree`]
#[derive(Debug)]
pub struct TreeWalk {
    order: WalkOrder,
    frames: Vec<Frame>,
    output: Vec<i64>,
    visited: Vec<NodeRef>,
    current: Option<NodeRef>,
    listing: Listing,

    /// Deepest the stack has been since `init`
    peak_depth: usize,

    revision: Option<u64>,
    stale: bool,
    last_line: usize,
}

impl TreeWalk {
    /// Uninitialized walk; ticks do nothing until [`TreeWalk::init`]
    pub fn new(order: WalkOrder) -> Self {
        Self {
            order,
            frames: Vec::new(),
            output: Vec::new(),
            visited: Vec::new(),
            current: None,
            listing: Listing::for_operation(order.operation()),
            peak_depth: 0,
            revision: None,
            stale: false,
            last_line: 0,
        }
    }

    /// Walk already initialized on `tree`
    pub fn start(tree: &BinaryTree, order: WalkOrder) -> Self {
        let mut walk = Self::new(order);
        walk.init(tree);
        walk
    }

    /// Run a walk to completion and return the emitted keys
    pub fn collect(tree: &BinaryTree, order: WalkOrder) -> Vec<i64> {
        let mut walk = Self::start(tree, order);
        while walk.tick(tree).continues {}
        walk.output
    }

    /// Clear the output and push the root frame
    pub fn init(&mut self, tree: &BinaryTree) {
        self.frames.clear();
        self.output.clear();
        self.visited.clear();
        self.frames.push(Frame {
            node: tree.root(),
            state: 0,
        });
        self.current = tree.root();
        self.peak_depth = 1;
        self.revision = Some(tree.revision());
        self.stale = false;
        self.last_line = 0;
        tracing::debug!(order = ?self.order, keys = tree.len(), "tree walk initialized");
    }

    /// Advance one frame state
    ///
    /// Continues while frames remain after the tick.
    pub fn tick(&mut self, tree: &BinaryTree) -> Tick {
        if self.stale {
            return Tick::halted(self.last_line);
        }
        if self.revision.is_some_and(|revision| revision != tree.revision()) {
            tracing::warn!(order = ?self.order, "tree edited during walk, stopping");
            self.stale = true;
            return Tick::halted(self.last_line);
        }

        let Some(frame) = self.frames.last().copied() else {
            return Tick::halted(self.last_line);
        };
        let node = frame.node.and_then(|handle| tree.get(handle).map(|n| (handle, *n)));
        self.current = frame.node;

        let line = match (node, frame.state) {
            (None, _) => {
                self.frames.pop();
                LINE_NULL_CHECK
            }
            (Some(_), 0) => {
                self.advance_top();
                LINE_NULL_CHECK
            }
            (Some((handle, node)), state @ 1..=3) => {
                self.advance_top();
                match self.order.plan()[usize::from(state) - 1] {
                    FrameStep::Visit => {
                        self.output.push(node.key);
                        self.visited.push(handle);
                        tracing::trace!(key = node.key, "visit");
                    }
                    FrameStep::PushLeft => self.push_child(node.left),
                    FrameStep::PushRight => self.push_child(node.right),
                }
                usize::from(state) + 1
            }
            (Some(_), _) => {
                self.frames.pop();
                LINE_LAST
            }
        };

        self.last_line = line;
        if self.frames.is_empty() {
            self.current = None;
            tracing::info!(order = ?self.order, output = ?self.output, "tree walk finished");
            return Tick::halted(line);
        }
        Tick::running(line)
    }

    fn advance_top(&mut self) {
        if let Some(top) = self.frames.last_mut() {
            top.state += 1;
        }
    }

    fn push_child(&mut self, child: Option<NodeRef>) {
        if child.is_some() {
            self.frames.push(Frame {
                node: child,
                state: 0,
            });
            self.peak_depth = self.peak_depth.max(self.frames.len());
        }
    }

    /// Order this walk emits
    pub fn order(&self) -> WalkOrder {
        self.order
    }

    /// Keys emitted so far
    pub fn output(&self) -> &[i64] {
        &self.output
    }

    /// Nodes emitted so far
    pub fn visited(&self) -> &[NodeRef] {
        &self.visited
    }

    /// Node on top of the stack
    pub fn current(&self) -> Option<NodeRef> {
        self.current
    }

    /// Current stack height
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Largest stack height reached since `init`
    pub fn peak_depth(&self) -> usize {
        self.peak_depth
    }

    /// Whether the stack has drained
    pub fn is_done(&self) -> bool {
        self.revision.is_some() && self.frames.is_empty()
    }

    /// Snapshot for renderers
    pub fn view(&self) -> WalkView {
        WalkView {
            current: self.current,
            visited: self.visited.clone(),
            output: self.output.clone(),
            stack: self.frames.clone(),
            line: self.last_line,
        }
    }

    /// Terminal status
    pub fn outcome(&self) -> Outcome {
        if self.stale {
            Outcome::Stale
        } else if self.is_done() {
            Outcome::Finished
        } else {
            Outcome::Pending
        }
    }
}

impl Stepper for TreeWalk {
    type Model = BinaryTree;

    fn tick(&mut self, model: &mut BinaryTree) -> Tick {
        TreeWalk::tick(self, model)
    }

    fn listing(&self) -> &Listing {
        &self.listing
    }

    fn outcome(&self) -> Outcome {
        TreeWalk::outcome(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(walk: &mut TreeWalk, tree: &BinaryTree) -> Vec<usize> {
        let mut lines = Vec::new();
        loop {
            let tick = walk.tick(tree);
            lines.push(tick.line);
            if !tick.continues {
                return lines;
            }
        }
    }

    #[test]
    fn test_single_node_line_sequences() {
        let tree = BinaryTree::from_keys([7]);
        // null check, three plan steps, pop
        for order in [WalkOrder::Pre, WalkOrder::In, WalkOrder::Post] {
            let mut walk = TreeWalk::start(&tree, order);
            assert_eq!(lines(&mut walk, &tree), vec![1, 2, 3, 4, 4]);
            assert_eq!(walk.output(), &[7]);
        }
    }

    #[test]
    fn test_visit_position_per_order() {
        let tree = BinaryTree::from_keys([7]);
        let emitted_after = |order| {
            let mut walk = TreeWalk::start(&tree, order);
            let mut ticks = 0;
            while walk.output().is_empty() {
                walk.tick(&tree);
                ticks += 1;
            }
            ticks
        };
        assert_eq!(emitted_after(WalkOrder::Pre), 2);
        assert_eq!(emitted_after(WalkOrder::In), 3);
        assert_eq!(emitted_after(WalkOrder::Post), 4);
    }

    #[test]
    fn test_empty_tree_pops_marker() {
        let tree = BinaryTree::new();
        let mut walk = TreeWalk::start(&tree, WalkOrder::In);
        assert_eq!(walk.tick(&tree), Tick::halted(1));
        assert!(walk.output().is_empty());
        assert_eq!(walk.outcome(), Outcome::Finished);
    }

    #[test]
    fn test_stack_never_exceeds_height() {
        let tree = BinaryTree::from_keys([1, 2, 3, 4, 5, 6]);
        let mut walk = TreeWalk::start(&tree, WalkOrder::Post);
        while walk.tick(&tree).continues {
            assert!(walk.depth() <= tree.height());
        }
        assert_eq!(walk.peak_depth(), 6);
        assert_eq!(walk.output(), &[6, 5, 4, 3, 2, 1]);
    }

    #[test]
    fn test_done_is_idempotent() {
        let tree = BinaryTree::from_keys([2, 1, 3]);
        let mut walk = TreeWalk::start(&tree, WalkOrder::In);
        while walk.tick(&tree).continues {}
        let view = walk.view();
        assert!(!walk.tick(&tree).continues);
        assert_eq!(walk.view(), view);
        assert_eq!(walk.output(), &[1, 2, 3]);
    }

    #[test]
    fn test_uninitialized_walk_is_noop() {
        let tree = BinaryTree::from_keys([1]);
        let mut walk = TreeWalk::new(WalkOrder::Pre);
        assert_eq!(walk.tick(&tree), Tick::halted(0));
        assert_eq!(walk.outcome(), Outcome::Pending);
    }

    #[test]
    fn test_edit_marks_stale() {
        let mut tree = BinaryTree::from_keys([2, 1, 3]);
        let mut walk = TreeWalk::start(&tree, WalkOrder::Pre);
        walk.tick(&tree);
        tree.insert(9);
        assert!(!walk.tick(&tree).continues);
        assert_eq!(walk.outcome(), Outcome::Stale);
    }
}
