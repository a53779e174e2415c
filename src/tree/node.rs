//! Arena node representation
//!
//! Nodes live in slots of a `Vec`; a [`NodeRef`] is `(slot, generation)`.
//! Freeing a slot bumps its generation, so a handle kept across a delete
//! stops resolving instead of aliasing whatever reuses the slot.

/// Generation-checked handle to a tree node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub struct NodeRef {
    /// Arena slot
    pub slot: usize,

    /// Generation the slot had when the node was created
    pub generation: u32,
}

/// Key plus child links
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub struct TreeNode {
    /// Unique ordered key
    pub key: i64,

    /// Subtree of smaller keys
    pub left: Option<NodeRef>,

    /// Subtree of larger keys
    pub right: Option<NodeRef>,
}

impl TreeNode {
    /// Childless node
    pub fn leaf(key: i64) -> Self {
        Self {
            key,
            left: None,
            right: None,
        }
    }

    /// Number of present children (0..=2)
    #[inline]
    pub fn child_count(&self) -> usize {
        usize::from(self.left.is_some()) + usize::from(self.right.is_some())
    }

    /// Sole child, if the node has fewer than two
    ///
    /// `None` for a leaf or for a node with two children.
    #[inline]
    pub fn only_child(&self) -> Option<NodeRef> {
        match (self.left, self.right) {
            (Some(child), None) | (None, Some(child)) => Some(child),
            _ => None,
        }
    }

    /// Child on the side `key` would descend to
    #[inline]
    pub fn child_toward(&self, key: i64) -> Option<NodeRef> {
        if key < self.key {
            self.left
        } else {
            self.right
        }
    }
}

/// One arena cell
#[derive(Debug, Clone, Default)]
pub(crate) struct Slot {
    pub(crate) generation: u32,
    pub(crate) node: Option<TreeNode>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_child_helpers() {
        let a = NodeRef { slot: 1, generation: 0 };
        let b = NodeRef { slot: 2, generation: 0 };

        let mut node = TreeNode::leaf(5);
        assert_eq!(node.child_count(), 0);
        assert_eq!(node.only_child(), None);

        node.right = Some(b);
        assert_eq!(node.only_child(), Some(b));
        assert_eq!(node.child_toward(9), Some(b));
        assert_eq!(node.child_toward(1), None);

        node.left = Some(a);
        assert_eq!(node.child_count(), 2);
        assert_eq!(node.only_child(), None);
    }
}
