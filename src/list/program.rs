//! Line-bound list mutations
//!
//! Insert and remove do not get a phase enum of their own. A program counter
//! walks the pseudocode one line per tick, and an action bound to a line runs
//! exactly once when the counter lands on it. Only the decision to run the
//! atomic mutation is stepped.

use super::LinkedList;
use crate::machine::Tick;
use crate::playback::Stepper;
use crate::pseudocode::{Listing, OperationKind};
use crate::{Outcome, StepError};
use std::collections::BTreeMap;

/// Atomic mutation bound to a pseudocode line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub enum ListAction {
    /// Splice `value` in at `index`
    Insert {
        /// Target position, validated at construction
        index: usize,
        /// Value to insert
        value: i64,
    },
    /// Splice out the first node holding `value`
    Remove {
        /// Value to remove
        value: i64,
    },
}

const INSERT_ACTION_LINE: usize = 4;
const REMOVE_ACTION_LINE: usize = 2;

/// Program counter over a listing with line-bound actions
#[derive(Debug)]
pub struct LineProgram {
    listing: Listing,
    actions: BTreeMap<usize, ListAction>,
    pc: usize,

    /// Result of the action, reported once the listing ends
    pending: Option<Outcome>,

    outcome: Outcome,
    revision: u64,
}

impl LineProgram {
    fn with_action(list: &LinkedList, kind: OperationKind, line: usize, action: ListAction) -> Self {
        let mut actions = BTreeMap::new();
        actions.insert(line, action);
        tracing::debug!(?action, line, "list program prepared");
        Self {
            listing: Listing::for_operation(kind),
            actions,
            pc: 0,
            pending: None,
            outcome: Outcome::Pending,
            revision: list.revision(),
        }
    }

    /// Animated insert; the index is checked against `0..=len` up front
    pub fn insert(list: &LinkedList, index: usize, value: i64) -> Result<Self, StepError> {
        if index > list.len() {
            return Err(StepError::IndexOutOfBounds {
                index,
                len: list.len(),
            });
        }
        Ok(Self::with_action(
            list,
            OperationKind::ListInsert,
            INSERT_ACTION_LINE,
            ListAction::Insert { index, value },
        ))
    }

    /// Animated removal of the first `value`
    pub fn remove(list: &LinkedList, value: i64) -> Self {
        Self::with_action(
            list,
            OperationKind::ListRemove,
            REMOVE_ACTION_LINE,
            ListAction::Remove { value },
        )
    }

    /// Move to the next line and run its action, if any
    pub fn tick(&mut self, list: &mut LinkedList) -> Tick {
        if self.outcome.is_terminal() {
            return Tick::halted(self.pc);
        }
        if list.revision() != self.revision {
            tracing::warn!("list edited during program, stopping");
            self.outcome = Outcome::Stale;
            return Tick::halted(self.pc);
        }
        if self.pc + 1 >= self.listing.len() {
            self.finish();
            return Tick::halted(self.pc);
        }

        self.pc += 1;
        if let Some(action) = self.actions.get(&self.pc).copied() {
            self.run(action, list);
            self.revision = list.revision();
        }
        if self.outcome.is_terminal() {
            return Tick::halted(self.pc);
        }
        if self.pc + 1 >= self.listing.len() {
            self.finish();
            return Tick::halted(self.pc);
        }
        Tick::running(self.pc)
    }

    fn run(&mut self, action: ListAction, list: &mut LinkedList) {
        tracing::trace!(?action, line = self.pc, "line action");
        match action {
            ListAction::Insert { index, value } => {
                if list.insert(index, value).is_ok() {
                    self.pending = Some(Outcome::Inserted(value));
                } else {
                    self.outcome = Outcome::Stale;
                }
            }
            ListAction::Remove { value } => {
                if list.remove_value(value).is_some() {
                    self.pending = Some(Outcome::Deleted(value));
                } else {
                    self.pc = self.listing.annotate("Element not found");
                    self.outcome = Outcome::NotFound;
                    tracing::info!(value, "list remove: value absent");
                }
            }
        }
    }

    fn finish(&mut self) {
        self.outcome = self.pending.take().unwrap_or(Outcome::Finished);
        tracing::info!(outcome = %self.outcome, "list program finished");
    }

    /// Line the counter points at
    pub fn pc(&self) -> usize {
        self.pc
    }

    /// Bound actions by line
    pub fn actions(&self) -> &BTreeMap<usize, ListAction> {
        &self.actions
    }

    /// Terminal status
    pub fn outcome(&self) -> Outcome {
        self.outcome
    }
}

impl Stepper for LineProgram {
    type Model = LinkedList;

    fn tick(&mut self, model: &mut LinkedList) -> Tick {
        LineProgram::tick(self, model)
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

    fn run(program: &mut LineProgram, list: &mut LinkedList) -> Vec<Tick> {
        let mut ticks = Vec::new();
        loop {
            let tick = program.tick(list);
            ticks.push(tick);
            if !tick.continues {
                return ticks;
            }
        }
    }

    fn lines(ticks: &[Tick]) -> Vec<usize> {
        ticks.iter().map(|t| t.line).collect()
    }

    #[test]
    fn test_insert_runs_on_line_four() {
        let mut list = LinkedList::from_values([1, 2, 3]);
        let mut program = LineProgram::insert(&list, 1, 9).unwrap();

        for line in 1..=3 {
            assert_eq!(program.tick(&mut list), Tick::running(line));
            assert_eq!(list.values(), vec![1, 2, 3], "nothing happens before line 4");
        }
        assert_eq!(program.tick(&mut list), Tick::halted(4));
        assert_eq!(list.values(), vec![1, 9, 2, 3]);
        assert_eq!(program.outcome(), Outcome::Inserted(9));
    }

    #[test]
    fn test_insert_index_checked_up_front() {
        let list = LinkedList::from_values([1, 2, 3]);
        assert!(LineProgram::insert(&list, 3, 0).is_ok());
        assert_eq!(
            LineProgram::insert(&list, 4, 0).unwrap_err(),
            StepError::IndexOutOfBounds { index: 4, len: 3 }
        );
    }

    #[test]
    fn test_remove_runs_on_line_two() {
        let mut list = LinkedList::from_values([4, 9, 2]);
        list.set_doubly(true);
        let mut program = LineProgram::remove(&list, 9);

        program.tick(&mut list);
        assert_eq!(list.len(), 3);
        program.tick(&mut list);
        assert_eq!(list.values(), vec![4, 2]);
        assert_eq!(list.back_values(), vec![2, 4]);
        assert_eq!(program.outcome(), Outcome::Pending);

        let rest = run(&mut program, &mut list);
        assert_eq!(lines(&rest), vec![3, 4]);
        assert_eq!(program.outcome(), Outcome::Deleted(9));
    }

    #[test]
    fn test_remove_missing_value_annotates() {
        let mut list = LinkedList::from_values([4, 9, 2]);
        let mut program = LineProgram::remove(&list, 7);
        let ticks = run(&mut program, &mut list);
        assert_eq!(lines(&ticks), vec![1, 5]);
        assert_eq!(program.outcome(), Outcome::NotFound);
        assert_eq!(
            Stepper::listing(&program).select_line(5),
            Some("// Element not found")
        );
        assert_eq!(list.values(), vec![4, 9, 2]);
    }

    #[test]
    fn test_terminal_is_idempotent() {
        let mut list = LinkedList::from_values([1]);
        let mut program = LineProgram::insert(&list, 0, 5).unwrap();
        run(&mut program, &mut list);
        assert_eq!(program.tick(&mut list), Tick::halted(4));
        assert_eq!(list.values(), vec![5, 1]);
    }
}
