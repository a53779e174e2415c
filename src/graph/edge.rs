//! Nodes and edges of the graph model

/// Canvas position of a node (only the renderer reads it)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub struct Point {
    /// Horizontal coordinate
    pub x: f32,
    /// Vertical coordinate
    pub y: f32,
}

impl Point {
    /// Create a point
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Graph node; `id` always equals its index in the node list
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub struct Node {
    /// Dense id, reassigned when a lower id is deleted
    pub id: usize,
    /// Layout position
    pub position: Point,
}

/// Edge between two node ids
///
/// Undirected edges are stored canonically as `(min, max, false)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub struct Edge {
    /// Source (or smaller endpoint when undirected)
    pub u: usize,
    /// Target (or larger endpoint when undirected)
    pub v: usize,
    /// Whether the edge only runs `u -> v`
    pub directed: bool,
}

impl Edge {
    /// Directed edge `u -> v`
    pub fn directed(u: usize, v: usize) -> Self {
        Self {
            u,
            v,
            directed: true,
        }
    }

    /// Canonical undirected edge between `a` and `b`
    pub fn undirected(a: usize, b: usize) -> Self {
        Self {
            u: a.min(b),
            v: a.max(b),
            directed: false,
        }
    }

    /// Unordered endpoint pair `(min, max)`
    pub fn endpoints(&self) -> (usize, usize) {
        (self.u.min(self.v), self.u.max(self.v))
    }

    /// Whether `id` is one of the endpoints
    pub fn touches(&self, id: usize) -> bool {
        self.u == id || self.v == id
    }

    /// Same edge reversed (only meaningful for directed edges)
    pub fn reversed(&self) -> Self {
        Self {
            u: self.v,
            v: self.u,
            directed: self.directed,
        }
    }

    /// Apply the id shift that follows deleting node `removed`
    pub(crate) fn shifted_after_removal(&self, removed: usize) -> Self {
        let shift = |id: usize| if id > removed { id - 1 } else { id };
        Self {
            u: shift(self.u),
            v: shift(self.v),
            directed: self.directed,
        }
    }
}
