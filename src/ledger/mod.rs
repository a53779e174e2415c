//! Bounded undo ledger and the demo-panel stack built on it
//!
//! The ledger keeps the last `capacity` operations, newest on top. Recording
//! into a full ledger forgets the oldest entry rather than refusing.

use crate::StepError;
use std::collections::VecDeque;

/// Undo depth of the demo panels
pub const DEFAULT_UNDO_DEPTH: usize = 3;

/// Fixed-capacity LIFO record with overwrite-oldest eviction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoLedger<T> {
    /// Oldest at the front, newest at the back
    entries: VecDeque<T>,
    capacity: usize,
}

impl<T> UndoLedger<T> {
    /// Empty ledger holding at most `capacity` entries
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record an operation, returning the entry evicted to make room
    pub fn record(&mut self, entry: T) -> Option<T> {
        if self.capacity == 0 {
            return Some(entry);
        }
        let evicted = if self.entries.len() == self.capacity {
            self.entries.pop_front()
        } else {
            None
        };
        self.entries.push_back(entry);
        evicted
    }

    /// Take back the newest entry
    pub fn undo(&mut self) -> Option<T> {
        self.entries.pop_back()
    }

    /// Newest entry
    pub fn peek(&self) -> Option<&T> {
        self.entries.back()
    }

    /// Entries newest first
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().rev()
    }

    /// Number of recorded entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing can be undone
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of entries
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Forget everything
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<T> Default for UndoLedger<T> {
    fn default() -> Self {
        Self::new(DEFAULT_UNDO_DEPTH)
    }
}

/// Operation recorded for undo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackOp<T> {
    /// A value was pushed
    Push(T),
    /// A value was popped
    Pop(T),
}

/// Bounded stack for the push/pop demo panels
#[derive(Debug, Clone)]
pub struct BoundedStack<T> {
    items: Vec<T>,
    capacity: usize,
    history: UndoLedger<StackOp<T>>,
}

impl<T: Clone> BoundedStack<T> {
    /// Empty stack holding at most `capacity` items
    pub fn new(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            capacity,
            history: UndoLedger::default(),
        }
    }

    /// Push a value; a full stack rejects it unchanged
    pub fn push(&mut self, value: T) -> Result<(), StepError> {
        if self.items.len() >= self.capacity {
            return Err(StepError::CapacityExceeded(self.capacity));
        }
        self.items.push(value.clone());
        self.history.record(StackOp::Push(value));
        Ok(())
    }

    /// Pop the top value
    pub fn pop(&mut self) -> Option<T> {
        let value = self.items.pop()?;
        self.history.record(StackOp::Pop(value.clone()));
        Some(value)
    }

    /// Revert the newest recorded push or pop
    pub fn undo(&mut self) -> Option<StackOp<T>> {
        let op = self.history.undo()?;
        match &op {
            StackOp::Push(_) => {
                self.items.pop();
            }
            StackOp::Pop(value) => self.items.push(value.clone()),
        }
        Some(op)
    }

    /// Top value
    pub fn peek(&self) -> Option<&T> {
        self.items.last()
    }

    /// Values bottom first
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Number of stored values
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the stack is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether another push would be rejected
    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    /// Operations that can still be undone
    pub fn history(&self) -> &UndoLedger<StackOp<T>> {
        &self.history
    }
}
