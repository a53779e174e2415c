//! Linked list model and its steppers
//!
//! Nodes live in an index arena and link through `next`. In doubly mode each
//! node also carries `prev`, rebuilt by a full relink pass after every
//! structural change and on every mode toggle. In singly mode no `prev` link
//! exists at all.

mod program;
mod search;

pub use program::{LineProgram, ListAction};
pub use search::{ListSearch, SearchPhase, SearchView};

use crate::StepError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ListNode {
    value: i64,
    next: Option<usize>,
    prev: Option<usize>,
}

/// Singly or doubly linked sequence of integers
#[derive(Debug, Clone, Default)]
pub struct LinkedList {
    slots: Vec<Option<ListNode>>,
    free: Vec<usize>,
    head: Option<usize>,
    len: usize,
    doubly: bool,
    revision: u64,
    #[cfg(test)]
    reads: std::cell::Cell<usize>,
}

impl LinkedList {
    /// Empty singly linked list
    pub fn new() -> Self {
        Self::default()
    }

    /// List holding `values` front to back
    pub fn from_values<I: IntoIterator<Item = i64>>(values: I) -> Self {
        let mut list = Self::new();
        let mut tail: Option<usize> = None;
        for value in values {
            let slot = list.alloc(value, None);
            match tail.and_then(|prev| list.node_mut(prev)) {
                Some(prev) => prev.next = Some(slot),
                None => list.head = Some(slot),
            }
            tail = Some(slot);
        }
        list
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the list has no nodes
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether `prev` links are maintained
    pub fn is_doubly(&self) -> bool {
        self.doubly
    }

    /// Structural revision
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn node(&self, slot: usize) -> Option<&ListNode> {
        #[cfg(test)]
        self.reads.set(self.reads.get() + 1);
        self.slots.get(slot)?.as_ref()
    }

    fn node_mut(&mut self, slot: usize) -> Option<&mut ListNode> {
        self.slots.get_mut(slot)?.as_mut()
    }

    pub(crate) fn value_at_slot(&self, slot: usize) -> Option<i64> {
        self.node(slot).map(|node| node.value)
    }

    pub(crate) fn head_slot(&self) -> Option<usize> {
        self.head
    }

    pub(crate) fn next_slot(&self, slot: usize) -> Option<usize> {
        self.node(slot)?.next
    }

    /// Node lookups performed so far
    #[cfg(test)]
    pub(crate) fn node_reads(&self) -> usize {
        self.reads.get()
    }

    /// Slots front to back
    fn slots_in_order(&self) -> impl Iterator<Item = usize> + '_ {
        std::iter::successors(self.head, move |&slot| self.node(slot)?.next)
    }

    fn slot_at(&self, index: usize) -> Option<usize> {
        self.slots_in_order().nth(index)
    }

    /// Value at a position
    pub fn get(&self, index: usize) -> Option<i64> {
        self.slot_at(index).and_then(|slot| self.value_at_slot(slot))
    }

    /// Position of the first node holding `value`
    pub fn index_of(&self, value: i64) -> Option<usize> {
        self.slots_in_order()
            .position(|slot| self.value_at_slot(slot) == Some(value))
    }

    /// Values front to back
    pub fn values(&self) -> Vec<i64> {
        self.slots_in_order()
            .filter_map(|slot| self.value_at_slot(slot))
            .collect()
    }

    /// Values back to front through `prev` links; empty in singly mode
    pub fn back_values(&self) -> Vec<i64> {
        if !self.doubly {
            return Vec::new();
        }
        let tail = self.slots_in_order().last();
        std::iter::successors(tail, |&slot| self.node(slot)?.prev)
            .filter_map(|slot| self.value_at_slot(slot))
            .collect()
    }

    /// Insert `value` so it ends up at `index` (0..=len)
    pub fn insert(&mut self, index: usize, value: i64) -> Result<(), StepError> {
        if index > self.len {
            return Err(StepError::IndexOutOfBounds {
                index,
                len: self.len,
            });
        }

        match index.checked_sub(1).and_then(|i| self.slot_at(i)) {
            None => {
                let slot = self.alloc(value, self.head);
                self.head = Some(slot);
            }
            Some(prev) => {
                let next = self.node(prev).and_then(|node| node.next);
                let slot = self.alloc(value, next);
                if let Some(node) = self.node_mut(prev) {
                    node.next = Some(slot);
                }
            }
        }
        self.finish_mutation();
        tracing::debug!(index, value, len = self.len, "list insert");
        Ok(())
    }

    /// Remove the node at `index`, returning its value
    pub fn remove_at(&mut self, index: usize) -> Result<i64, StepError> {
        if index >= self.len {
            return Err(StepError::IndexOutOfBounds {
                index,
                len: self.len,
            });
        }

        let prev = index.checked_sub(1).and_then(|i| self.slot_at(i));
        let out_of_bounds = StepError::IndexOutOfBounds {
            index,
            len: self.len,
        };
        let target = match prev {
            Some(prev) => self.node(prev).and_then(|node| node.next),
            None => self.head,
        }
        .ok_or_else(|| out_of_bounds.clone())?;

        let removed = *self.node(target).ok_or(out_of_bounds)?;
        match prev.and_then(|prev| self.node_mut(prev)) {
            Some(prev) => prev.next = removed.next,
            None => self.head = removed.next,
        }
        self.slots[target] = None;
        self.free.push(target);
        self.len -= 1;
        self.finish_mutation();
        tracing::debug!(index, value = removed.value, len = self.len, "list remove");
        Ok(removed.value)
    }

    /// Remove the first node holding `value`, returning its former index
    pub fn remove_value(&mut self, value: i64) -> Option<usize> {
        let index = self.index_of(value)?;
        self.remove_at(index).ok().map(|_| index)
    }

    /// Switch between singly and doubly linked; relinks `prev` fully
    pub fn set_doubly(&mut self, doubly: bool) {
        if self.doubly == doubly {
            return;
        }
        self.doubly = doubly;
        self.finish_mutation();
        tracing::debug!(doubly, "list mode toggled");
    }

    /// Drop every node
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.head = None;
        self.len = 0;
        self.finish_mutation();
    }

    /// `prev` mirrors `next` in doubly mode and is absent in singly mode
    pub fn links_consistent(&self) -> bool {
        let order: Vec<usize> = self.slots_in_order().collect();
        order.iter().enumerate().all(|(i, &slot)| {
            let expected = if self.doubly && i > 0 {
                Some(order[i - 1])
            } else {
                None
            };
            self.node(slot).map_or(false, |node| node.prev == expected)
        })
    }

    fn alloc(&mut self, value: i64, next: Option<usize>) -> usize {
        let node = Some(ListNode {
            value,
            next,
            prev: None,
        });
        self.len += 1;
        match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = node;
                slot
            }
            None => {
                self.slots.push(node);
                self.slots.len() - 1
            }
        }
    }

    /// Relink pass: `prev` rebuilt from `next`, or erased in singly mode
    fn relink(&mut self) {
        let order: Vec<usize> = self.slots_in_order().collect();
        let doubly = self.doubly;
        let mut prev = None;
        for slot in order {
            if let Some(node) = self.node_mut(slot) {
                node.prev = if doubly { prev } else { None };
            }
            prev = Some(slot);
        }
    }

    fn finish_mutation(&mut self) {
        self.relink();
        self.revision += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_positions() {
        let mut list = LinkedList::from_values([1, 2, 3]);
        list.insert(0, 0).unwrap();
        list.insert(4, 4).unwrap();
        list.insert(2, 9).unwrap();
        assert_eq!(list.values(), vec![0, 1, 9, 2, 3, 4]);
        assert_eq!(
            list.insert(7, 5),
            Err(StepError::IndexOutOfBounds { index: 7, len: 6 })
        );
    }

    #[test]
    fn test_remove() {
        let mut list = LinkedList::from_values([4, 9, 2, 9]);
        assert_eq!(list.remove_value(9), Some(1));
        assert_eq!(list.values(), vec![4, 2, 9]);
        assert_eq!(list.remove_at(0), Ok(4));
        assert_eq!(list.remove_value(7), None);
        assert!(list.remove_at(2).is_err());
        assert_eq!(list.values(), vec![2, 9]);
    }

    #[test]
    fn test_doubly_links_follow_mutations() {
        let mut list = LinkedList::from_values([1, 2, 3]);
        assert!(list.back_values().is_empty());
        assert!(list.links_consistent());

        list.set_doubly(true);
        assert_eq!(list.back_values(), vec![3, 2, 1]);
        list.insert(1, 7).unwrap();
        list.remove_at(3).unwrap();
        assert_eq!(list.back_values(), vec![2, 7, 1]);
        assert!(list.links_consistent());

        list.set_doubly(false);
        assert!(list.links_consistent());
        assert!(list.back_values().is_empty());
    }

    #[test]
    fn test_lookup() {
        let list = LinkedList::from_values([4, 9, 2]);
        assert_eq!(list.get(1), Some(9));
        assert_eq!(list.get(3), None);
        assert_eq!(list.index_of(2), Some(2));
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn test_slot_reuse_after_remove() {
        let mut list = LinkedList::from_values([1, 2]);
        list.remove_at(0).unwrap();
        list.insert(1, 3).unwrap();
        assert_eq!(list.values(), vec![2, 3]);
        list.clear();
        assert!(list.is_empty());
        assert!(list.values().is_empty());
    }
}
