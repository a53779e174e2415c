//! Binary search tree model and its steppers
//!
//! The tree is an arena of generation-checked slots; no operation here
//! recurses. Walks go through the explicit frame stack of [`TreeWalk`] and
//! animated mutations through [`BstStepper`], which commit their structural
//! change through the same primitives the instant operations use.

mod mutation;
mod node;
mod walk;

pub use mutation::{BstOperation, BstStepper, BstView, DeleteStage};
pub use node::{NodeRef, TreeNode};
pub use walk::{TreeWalk, WalkOrder, WalkView};

use node::Slot;

/// Unbalanced binary search tree with unique keys
#[derive(Debug, Clone, Default)]
pub struct BinaryTree {
    slots: Vec<Slot>,

    /// Slots freed by deletes, reused LIFO
    free: Vec<usize>,

    root: Option<NodeRef>,
    len: usize,

    /// Bumped by every structural change
    revision: u64,
}

impl BinaryTree {
    /// Empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Tree built by inserting `keys` in order; duplicates are skipped
    pub fn from_keys<I: IntoIterator<Item = i64>>(keys: I) -> Self {
        let mut tree = Self::new();
        for key in keys {
            tree.insert(key);
        }
        tree
    }

    /// Number of keys
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the tree holds no keys
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Structural revision, compared by steppers to detect edits
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Root handle
    pub fn root(&self) -> Option<NodeRef> {
        self.root
    }

    /// Resolve a handle; `None` once the node was deleted
    pub fn get(&self, node: NodeRef) -> Option<&TreeNode> {
        self.slots
            .get(node.slot)
            .filter(|slot| slot.generation == node.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    fn get_mut(&mut self, node: NodeRef) -> Option<&mut TreeNode> {
        self.slots
            .get_mut(node.slot)
            .filter(|slot| slot.generation == node.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    /// Key stored at a handle
    pub fn key(&self, node: NodeRef) -> Option<i64> {
        self.get(node).map(|n| n.key)
    }

    /// Nodes visited while searching for `key`
    ///
    /// Stops at the match, otherwise ends at the last node before falling
    /// off the tree. Empty for an empty tree.
    pub fn search_path(&self, key: i64) -> Vec<NodeRef> {
        let mut path = Vec::new();
        let mut cursor = self.root;
        while let Some(handle) = cursor {
            let Some(node) = self.get(handle) else {
                break;
            };
            path.push(handle);
            if node.key == key {
                break;
            }
            cursor = node.child_toward(key);
        }
        path
    }

    /// Handle of the node holding `key`
    pub fn find(&self, key: i64) -> Option<NodeRef> {
        self.search_path(key)
            .last()
            .copied()
            .filter(|&handle| self.key(handle) == Some(key))
    }

    /// Whether `key` is present
    pub fn contains(&self, key: i64) -> bool {
        self.find(key).is_some()
    }

    /// Left spine starting at `from`; its last element is the subtree minimum
    pub fn min_path(&self, from: Option<NodeRef>) -> Vec<NodeRef> {
        let mut path = Vec::new();
        let mut cursor = from;
        while let Some(handle) = cursor {
            let Some(node) = self.get(handle) else {
                break;
            };
            path.push(handle);
            cursor = node.left;
        }
        path
    }

    /// Smallest key
    pub fn min(&self) -> Option<i64> {
        self.min_path(self.root)
            .last()
            .and_then(|&handle| self.key(handle))
    }

    /// Largest key
    pub fn max(&self) -> Option<i64> {
        let mut cursor = self.root?;
        while let Some(right) = self.get(cursor)?.right {
            cursor = right;
        }
        self.key(cursor)
    }

    /// Number of nodes on the longest root-to-leaf path (0 when empty)
    pub fn height(&self) -> usize {
        let mut best = 0;
        let mut stack: Vec<(NodeRef, usize)> = self.root.map(|r| (r, 1)).into_iter().collect();
        while let Some((handle, depth)) = stack.pop() {
            let Some(node) = self.get(handle) else {
                continue;
            };
            best = best.max(depth);
            stack.extend(node.left.map(|child| (child, depth + 1)));
            stack.extend(node.right.map(|child| (child, depth + 1)));
        }
        best
    }

    /// Parent of a live node, found by key-guided descent
    pub fn parent_of(&self, node: NodeRef) -> Option<NodeRef> {
        let key = self.key(node)?;
        let mut parent = None;
        let mut cursor = self.root;
        while let Some(handle) = cursor {
            if handle == node {
                return parent;
            }
            parent = Some(handle);
            cursor = self.get(handle)?.child_toward(key);
        }
        None
    }

    /// Insert a key; `false` if it was already present
    pub fn insert(&mut self, key: i64) -> bool {
        let parent = self.search_path(key).last().copied();
        if let Some(handle) = parent {
            if self.key(handle) == Some(key) {
                return false;
            }
        }
        self.attach(parent, key).is_some()
    }

    /// Delete a key; `false` if it was absent
    ///
    /// Two-child nodes take their in-order successor's key and the
    /// successor's node is spliced out instead.
    pub fn delete(&mut self, key: i64) -> bool {
        let Some(target) = self.find(key) else {
            return false;
        };
        self.delete_node(target).is_some()
    }

    /// Delete the node at a handle, returning its key
    pub(crate) fn delete_node(&mut self, target: NodeRef) -> Option<i64> {
        let node = *self.get(target)?;
        if node.child_count() < 2 {
            return self.splice_out(target);
        }
        let successor = *self.min_path(node.right).last()?;
        self.replace_with_successor(target, successor)?;
        Some(node.key)
    }

    /// Move the successor's key into `target` and splice the successor out
    pub(crate) fn replace_with_successor(
        &mut self,
        target: NodeRef,
        successor: NodeRef,
    ) -> Option<i64> {
        // splice first: parent lookup needs keys to stay unique
        let moved = self.splice_out(successor)?;
        self.get_mut(target)?.key = moved;
        Some(moved)
    }

    /// Create a leaf under `parent` (or as root when `parent` is `None`)
    ///
    /// Fails if the target slot is occupied, the parent is stale, or the
    /// key equals the parent's.
    pub(crate) fn attach(&mut self, parent: Option<NodeRef>, key: i64) -> Option<NodeRef> {
        match parent {
            None => {
                if self.root.is_some() {
                    return None;
                }
                let handle = self.alloc(key);
                self.root = Some(handle);
                self.finish_mutation();
                tracing::debug!(key, "root created");
                Some(handle)
            }
            Some(parent) => {
                let node = *self.get(parent)?;
                if node.key == key || node.child_toward(key).is_some() {
                    return None;
                }
                let handle = self.alloc(key);
                let parent_node = self.get_mut(parent)?;
                if key < parent_node.key {
                    parent_node.left = Some(handle);
                } else {
                    parent_node.right = Some(handle);
                }
                self.finish_mutation();
                tracing::debug!(key, parent = node.key, "leaf attached");
                Some(handle)
            }
        }
    }

    /// Remove a node with at most one child, lifting that child into its place
    pub fn splice_out(&mut self, node: NodeRef) -> Option<i64> {
        let removed = *self.get(node)?;
        if removed.child_count() == 2 {
            return None;
        }
        let replacement = removed.only_child();

        match self.parent_of(node) {
            Some(parent) => {
                let parent_node = self.get_mut(parent)?;
                if parent_node.left == Some(node) {
                    parent_node.left = replacement;
                } else {
                    parent_node.right = replacement;
                }
            }
            None if self.root == Some(node) => self.root = replacement,
            None => return None,
        }

        self.release(node);
        self.len -= 1;
        self.finish_mutation();
        tracing::debug!(key = removed.key, "node spliced out");
        Some(removed.key)
    }

    /// Drop every node; outstanding handles stop resolving
    pub fn clear(&mut self) {
        for index in 0..self.slots.len() {
            if self.slots[index].node.is_some() {
                self.release_slot(index);
            }
        }
        self.root = None;
        self.len = 0;
        self.finish_mutation();
    }

    /// Keys in ascending order
    pub fn in_order(&self) -> Vec<i64> {
        TreeWalk::collect(self, WalkOrder::In)
    }

    /// Keys in node-left-right order
    pub fn pre_order(&self) -> Vec<i64> {
        TreeWalk::collect(self, WalkOrder::Pre)
    }

    /// Keys in left-right-node order
    pub fn post_order(&self) -> Vec<i64> {
        TreeWalk::collect(self, WalkOrder::Post)
    }

    /// Check the ordering invariant over the whole tree
    pub fn is_search_tree(&self) -> bool {
        let keys = self.in_order();
        keys.len() == self.len && keys.windows(2).all(|pair| pair[0] < pair[1])
    }

    fn alloc(&mut self, key: i64) -> NodeRef {
        let node = Some(TreeNode::leaf(key));
        self.len += 1;
        if let Some(slot) = self.free.pop() {
            let cell = &mut self.slots[slot];
            cell.node = node;
            return NodeRef {
                slot,
                generation: cell.generation,
            };
        }
        self.slots.push(Slot {
            generation: 0,
            node,
        });
        NodeRef {
            slot: self.slots.len() - 1,
            generation: 0,
        }
    }

    fn release(&mut self, node: NodeRef) {
        self.release_slot(node.slot);
    }

    fn release_slot(&mut self, slot: usize) {
        let cell = &mut self.slots[slot];
        cell.node = None;
        cell.generation = cell.generation.wrapping_add(1);
        self.free.push(slot);
    }

    fn finish_mutation(&mut self) {
        self.revision += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> BinaryTree {
        BinaryTree::from_keys([5, 3, 8, 1, 4])
    }

    #[test]
    fn test_insert_and_orders() {
        let tree = sample();
        assert_eq!(tree.len(), 5);
        assert_eq!(tree.in_order(), vec![1, 3, 4, 5, 8]);
        assert_eq!(tree.pre_order(), vec![5, 3, 1, 4, 8]);
        assert_eq!(tree.post_order(), vec![1, 4, 3, 8, 5]);
        assert_eq!(tree.height(), 3);
        assert_eq!(tree.min(), Some(1));
        assert_eq!(tree.max(), Some(8));
    }

    #[test]
    fn test_duplicate_insert_is_noop() {
        let mut tree = sample();
        let revision = tree.revision();
        assert!(!tree.insert(4));
        assert_eq!(tree.len(), 5);
        assert_eq!(tree.revision(), revision);
    }

    #[test]
    fn test_search_path_stops_at_match_or_last_node() {
        let tree = sample();
        let keys = |path: Vec<NodeRef>| -> Vec<i64> {
            path.into_iter().filter_map(|h| tree.key(h)).collect()
        };
        assert_eq!(keys(tree.search_path(4)), vec![5, 3, 4]);
        assert_eq!(keys(tree.search_path(7)), vec![5, 8]);
        assert!(BinaryTree::new().search_path(1).is_empty());
    }

    #[test]
    fn test_delete_leaf_and_single_child() {
        let mut tree = sample();
        assert!(tree.delete(1));
        assert!(tree.delete(3));
        assert_eq!(tree.in_order(), vec![4, 5, 8]);
        assert_eq!(tree.pre_order(), vec![5, 4, 8]);
        assert!(!tree.delete(42));
    }

    #[test]
    fn test_delete_two_children_uses_successor() {
        let mut tree = BinaryTree::from_keys([50, 30, 70, 60, 80, 65]);
        assert!(tree.delete(50));
        assert_eq!(tree.pre_order(), vec![60, 30, 70, 65, 80]);
        assert!(tree.is_search_tree());
    }

    #[test]
    fn test_delete_root_until_empty() {
        let mut tree = sample();
        while let Some(root) = tree.root() {
            let key = tree.key(root).unwrap();
            assert!(tree.delete(key));
            assert!(tree.is_search_tree());
        }
        assert!(tree.is_empty());
        assert_eq!(tree.height(), 0);
    }

    #[test]
    fn test_stale_handle_does_not_resolve() {
        let mut tree = sample();
        let handle = tree.find(4).unwrap();
        tree.delete(4);
        assert!(tree.get(handle).is_none());

        tree.insert(6);
        let reused = tree.find(6).unwrap();
        assert_eq!(reused.slot, handle.slot);
        assert!(tree.get(handle).is_none());

        let root = tree.root().unwrap();
        tree.clear();
        assert!(tree.get(root).is_none());
        assert!(tree.is_empty());
    }

    #[test]
    fn test_parent_of() {
        let tree = sample();
        let four = tree.find(4).unwrap();
        let three = tree.find(3).unwrap();
        assert_eq!(tree.parent_of(four), Some(three));
        assert_eq!(tree.parent_of(tree.root().unwrap()), None);
    }
}
