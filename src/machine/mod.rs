//! Generic phase machine
//!
//! A loop or recursion is paused between units of work by externalizing
//! "where was I" into a phase value. Each algorithm supplies:
//! - A phase enum
//! - One rule per phase: the pseudocode line it highlights and the effect
//!   that performs the unit of work and picks the next phase
//! - Halting phases, which only report their line
//!
//! BFS, DFS and linked-list search are all configurations of this one type.

mod transition;

pub use transition::{Effect, Rule, Tick};

use std::fmt::Debug;

/// Table-driven state machine over phases `P`, stepper state `C` and model `M`
#[derive(Debug)]
pub struct PhaseMachine<P, C, M> {
    /// Transition table, at most one rule per phase
    rules: Vec<Rule<P, C, M>>,

    /// Phase the machine returns to on `reset`
    start: P,

    /// Phase the next tick fires in
    phase: P,

    /// Number of effects executed since the last reset
    steps: usize,
}

impl<P, C, M> PhaseMachine<P, C, M>
where
    P: Copy + Eq + Debug,
{
    /// Create fluent builder
    pub fn builder(start: P) -> PhaseMachineBuilder<P, C, M> {
        PhaseMachineBuilder::new(start)
    }

    /// Current phase
    pub fn phase(&self) -> P {
        self.phase
    }

    /// Effects executed since the last reset
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Move to an explicit phase (used by `init` style entry points)
    pub fn jump(&mut self, phase: P) {
        self.phase = phase;
    }

    /// Return to the start phase
    pub fn reset(&mut self) {
        self.phase = self.start;
        self.steps = 0;
    }

    /// Whether the current phase halts
    pub fn is_halted(&self) -> bool {
        self.rule(self.phase).map_or(true, |rule| rule.is_halt())
    }

    /// Look up the rule for a phase
    pub fn rule(&self, phase: P) -> Option<&Rule<P, C, M>> {
        self.rules.iter().find(|rule| rule.phase == phase)
    }

    /// Execute one transition
    ///
    /// Halting phases are idempotent: they run nothing and report their
    /// line with `continues == false`.
    pub fn tick(&mut self, ctx: &mut C, model: &M) -> Tick {
        let Some(rule) = self.rule(self.phase).copied() else {
            tracing::warn!(phase = ?self.phase, "no rule for phase, treating as halted");
            return Tick::halted(0);
        };

        let Some(effect) = rule.effect else {
            return Tick::halted(rule.line);
        };

        let next = effect(ctx, model);
        self.steps += 1;
        tracing::trace!(from = ?self.phase, to = ?next, line = rule.line, "phase transition");
        self.phase = next;

        match self.rule(next) {
            Some(next_rule) if next_rule.is_halt() => Tick::halted(next_rule.line),
            None => Tick::halted(rule.line),
            Some(_) => Tick::running(rule.line),
        }
    }
}

/// Builder for phase machines (fluent API)
#[derive(Debug)]
pub struct PhaseMachineBuilder<P, C, M> {
    start: P,
    rules: Vec<Rule<P, C, M>>,
}

impl<P, C, M> PhaseMachineBuilder<P, C, M>
where
    P: Copy + Eq + Debug,
{
    /// Create new builder starting in `start`
    pub fn new(start: P) -> Self {
        Self {
            start,
            rules: Vec::new(),
        }
    }

    /// Add a working phase
    ///
    /// A later rule for the same phase replaces the earlier one.
    pub fn rule(mut self, phase: P, line: usize, effect: Effect<P, C, M>) -> Self {
        self.push(Rule {
            phase,
            line,
            effect: Some(effect),
        });
        self
    }

    /// Add a halting phase
    pub fn halt(mut self, phase: P, line: usize) -> Self {
        self.push(Rule {
            phase,
            line,
            effect: None,
        });
        self
    }

    fn push(&mut self, rule: Rule<P, C, M>) {
        self.rules.retain(|existing| existing.phase != rule.phase);
        self.rules.push(rule);
    }

    /// Build the machine
    pub fn build(self) -> PhaseMachine<P, C, M> {
        PhaseMachine {
            rules: self.rules,
            start: self.start,
            phase: self.start,
            steps: 0,
        }
    }
}
