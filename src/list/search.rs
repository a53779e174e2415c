//! Linked list search stepper
//!
//! A configuration of the generic phase machine:
//!
//! ```text
//! WhileCheck --cur != null--> Compare --match--> Found
//!     |                           |
//!     +--exhausted--> NotFound    +--else--> Advance --> WhileCheck
//! ```

use super::LinkedList;
use crate::machine::{PhaseMachine, Tick};
use crate::playback::Stepper;
use crate::pseudocode::{Listing, OperationKind};
use crate::Outcome;

/// Search loop position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub enum SearchPhase {
    /// Not initialized
    Init,
    /// `while cur != null`
    WhileCheck,
    /// `if cur.val == x`
    Compare,
    /// `i++, cur = cur.next`
    Advance,
    /// Match reported
    Found,
    /// Fell off the end
    NotFound,
}

#[derive(Debug, Default)]
struct SearchState {
    target: i64,
    cursor: usize,
    cursor_slot: Option<usize>,
    compared: Vec<usize>,
    found: Option<usize>,
}

fn while_check(state: &mut SearchState, _: &LinkedList) -> SearchPhase {
    if state.cursor_slot.is_some() {
        SearchPhase::Compare
    } else {
        SearchPhase::NotFound
    }
}

fn compare(state: &mut SearchState, list: &LinkedList) -> SearchPhase {
    state.compared.push(state.cursor);
    let value = state.cursor_slot.and_then(|slot| list.value_at_slot(slot));
    if value == Some(state.target) {
        state.found = Some(state.cursor);
        SearchPhase::Found
    } else {
        SearchPhase::Advance
    }
}

fn advance(state: &mut SearchState, list: &LinkedList) -> SearchPhase {
    state.cursor_slot = state.cursor_slot.and_then(|slot| list.next_slot(slot));
    state.cursor += 1;
    SearchPhase::WhileCheck
}

/// Highlight state for renderers
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub struct SearchView {
    /// Index under the cursor
    pub cursor: usize,
    /// Indices compared so far
    pub compared: Vec<usize>,
    /// Matching index, once found
    pub found: Option<usize>,
    /// Line highlighted by the latest tick
    pub line: usize,
}

/// Resumable value search over a [`LinkedList`]
#[derive(Debug)]
pub struct ListSearch {
    machine: PhaseMachine<SearchPhase, SearchState, LinkedList>,
    state: SearchState,
    listing: Listing,
    revision: Option<u64>,
    stale: bool,
    note: Option<usize>,
    last_line: usize,
}

impl ListSearch {
    /// Uninitialized search
    pub fn new() -> Self {
        let machine = PhaseMachine::builder(SearchPhase::Init)
            .halt(SearchPhase::Init, 0)
            .rule(SearchPhase::WhileCheck, 2, while_check)
            .rule(SearchPhase::Compare, 3, compare)
            .rule(SearchPhase::Advance, 4, advance)
            .halt(SearchPhase::Found, 3)
            .halt(SearchPhase::NotFound, 5)
            .build();
        Self {
            machine,
            state: SearchState::default(),
            listing: Listing::for_operation(OperationKind::ListSearch),
            revision: None,
            stale: false,
            note: None,
            last_line: 0,
        }
    }

    /// Search already initialized for `target`
    pub fn start(list: &LinkedList, target: i64) -> Self {
        let mut search = Self::new();
        search.init(list, target);
        search
    }

    /// Reset the cursor to the head and look for `target`
    pub fn init(&mut self, list: &LinkedList, target: i64) {
        self.state = SearchState {
            target,
            cursor_slot: list.head_slot(),
            ..SearchState::default()
        };
        self.listing = Listing::for_operation(OperationKind::ListSearch);
        self.note = None;
        self.machine.reset();
        self.machine.jump(SearchPhase::WhileCheck);
        self.revision = Some(list.revision());
        self.stale = false;
        self.last_line = 1;
        tracing::debug!(target, len = list.len(), "list search initialized");
    }

    /// Advance one phase
    ///
    /// The halting tick appends the outcome to the listing as a comment and
    /// highlights that line.
    pub fn tick(&mut self, list: &LinkedList) -> Tick {
        if let Some(line) = self.note {
            return Tick::halted(line);
        }
        if self.stale {
            return Tick::halted(self.last_line);
        }
        if self.revision.is_some_and(|revision| revision != list.revision()) {
            tracing::warn!("list edited during search, stopping");
            self.stale = true;
            return Tick::halted(self.last_line);
        }

        let was_halted = self.machine.is_halted();
        let tick = self.machine.tick(&mut self.state, list);
        self.last_line = tick.line;
        if was_halted || tick.continues {
            return tick;
        }

        let outcome = self.outcome();
        tracing::info!(target = self.state.target, %outcome, "list search finished");
        let line = self.listing.annotate(&outcome.to_string());
        self.note = Some(line);
        self.last_line = line;
        Tick::halted(line)
    }

    /// Current phase
    pub fn phase(&self) -> SearchPhase {
        self.machine.phase()
    }

    /// Index under the cursor
    pub fn cursor(&self) -> usize {
        self.state.cursor
    }

    /// Indices compared so far
    pub fn compared(&self) -> &[usize] {
        &self.state.compared
    }

    /// Snapshot for renderers
    pub fn view(&self) -> SearchView {
        SearchView {
            cursor: self.state.cursor,
            compared: self.state.compared.clone(),
            found: self.state.found,
            line: self.last_line,
        }
    }

    /// Terminal status
    pub fn outcome(&self) -> Outcome {
        if self.stale {
            return Outcome::Stale;
        }
        match (self.machine.phase(), self.state.found) {
            (SearchPhase::Found, Some(index)) => Outcome::Found(index),
            (SearchPhase::NotFound, _) => Outcome::NotFound,
            _ => Outcome::Pending,
        }
    }
}

impl Stepper for ListSearch {
    type Model = LinkedList;

    fn tick(&mut self, model: &mut LinkedList) -> Tick {
        ListSearch::tick(self, model)
    }

    fn listing(&self) -> &Listing {
        &self.listing
    }

    fn outcome(&self) -> Outcome {
        ListSearch::outcome(self)
    }
}
