//! # Resumable algorithm steppers
//!
//! This library animates textbook algorithms one micro-step at a time while
//! pointing at the matching pseudocode line.
//!
//! ## Core idea
//!
//! An algorithm that is naturally a loop or a recursion is re-expressed as a
//! sequence of discrete ticks. Each tick:
//!
//! 1. Performs exactly one unit of algorithmic work
//! 2. Moves a line pointer into a pseudocode [`Listing`]
//! 3. Reports whether automation should keep going ([`Tick`])
//!
//! Ticks are identical whether a timer or a manual "step" issues them.
//!
//! ## Steppers
//!
//! - [`traversal`]: BFS/DFS as configurations of the generic [`PhaseMachine`]
//! - [`tree::TreeWalk`]: in/pre/post-order on an explicit frame stack
//! - [`tree::BstStepper`]: search/insert/delete revealed along a precomputed path
//! - [`list::ListSearch`] and [`list::LineProgram`]: linked list search and
//!   line-bound insert/remove
//!
//! ## Usage Example
//!
//! ```
//! use stepviz::{Graph, Point, Bfs};
//!
//! let mut graph = Graph::new();
//! for i in 0..3 {
//!     graph.add_node(Point::new(i as f32, 0.0));
//! }
//! graph.add_edge(0, 1).unwrap();
//! graph.add_edge(1, 2).unwrap();
//!
//! let mut bfs = Bfs::new();
//! bfs.init(&graph, 0).unwrap();
//! while bfs.tick(&graph).continues {}
//! assert_eq!(bfs.order(), &[0, 1, 2]);
//! ```

#![warn(missing_docs, missing_debug_implementations)]
#![allow(clippy::new_without_default)]

pub mod graph; // Graph model with reindexing
pub mod ledger; // Bounded undo ledger and demo stack
pub mod list; // Linked list model and steppers
pub mod machine; // Generic phase machine
pub mod playback; // Stepper trait, scheduler, player
pub mod pseudocode; // Listings per operation
pub mod traversal; // BFS/DFS stepper
pub mod tree; // BST arena, walk interpreter, mutation stepper
pub mod util; // Input parsing

// Re-exports for convenience
pub use graph::{Edge, Graph, Point};
pub use list::{LineProgram, LinkedList, ListSearch};
pub use machine::{PhaseMachine, Tick};
pub use playback::{PlaybackConfig, Player, Stepper};
pub use pseudocode::{Listing, OperationKind};
pub use traversal::{Bfs, Dfs, Traversal};
pub use tree::{BinaryTree, BstStepper, TreeWalk, WalkOrder};

use std::fmt;
use thiserror::Error;

/// Errors raised by model mutations and stepper construction
///
/// All of these are rejected before any state changes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StepError {
    /// Non-numeric or otherwise malformed user input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Positional argument outside the model
    #[error("Index {index} out of bounds for length {len}")]
    IndexOutOfBounds {
        /// Requested index
        index: usize,
        /// Length at the time of the request
        len: usize,
    },

    /// Graph node id that does not exist
    #[error("Node {0} does not exist")]
    UnknownNode(usize),

    /// Playback speed outside the supported range
    #[error("Interval {requested} ms outside {min}..={max} ms")]
    IntervalOutOfRange {
        /// Requested interval in milliseconds
        requested: u64,
        /// Smallest accepted interval
        min: u64,
        /// Largest accepted interval
        max: u64,
    },

    /// Bounded container is full
    #[error("Capacity {0} exceeded")]
    CapacityExceeded(usize),
}

/// Terminal (or pending) result of a stepper
///
/// "Not found" is a normal outcome, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub enum Outcome {
    /// Not started or not yet finished
    Pending,
    /// Walk or traversal ran to completion
    Finished,
    /// Value found at a list index
    Found(usize),
    /// Key found in the tree
    KeyFound(i64),
    /// Target absent
    NotFound,
    /// Key or value inserted
    Inserted(i64),
    /// Key or value removed
    Deleted(i64),
    /// Insert of an already present key
    Duplicate(i64),
    /// The model changed under the stepper; reinitialize it
    Stale,
}

impl Outcome {
    /// Whether the stepper has stopped
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Outcome::Pending)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Pending => write!(f, "Running..."),
            Outcome::Finished => write!(f, "Finished."),
            Outcome::Found(at) => write!(f, "Found at index {at}"),
            Outcome::KeyFound(key) => write!(f, "Found {key}"),
            Outcome::NotFound => write!(f, "Element not found"),
            Outcome::Inserted(key) => write!(f, "Inserted {key}"),
            Outcome::Deleted(key) => write!(f, "Deleted {key}"),
            Outcome::Duplicate(key) => write!(f, "Value {key} already exists"),
            Outcome::Stale => write!(f, "Model changed; reset required"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_status_text() {
        assert_eq!(Outcome::Found(1).to_string(), "Found at index 1");
        assert_eq!(Outcome::NotFound.to_string(), "Element not found");
        assert!(Outcome::NotFound.is_terminal());
        assert!(!Outcome::Pending.is_terminal());
    }

    #[test]
    fn test_error_messages() {
        let err = StepError::IndexOutOfBounds { index: 4, len: 3 };
        assert_eq!(err.to_string(), "Index 4 out of bounds for length 3");
        let err = StepError::IntervalOutOfRange {
            requested: 50,
            min: 100,
            max: 1200,
        };
        assert_eq!(err.to_string(), "Interval 50 ms outside 100..=1200 ms");
    }
}
