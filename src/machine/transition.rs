//! Transition rules and the per-tick result reported to schedulers

/// Side effect run when a phase is ticked.
///
/// Receives the stepper's own state and the (read-only) model it walks, and
/// returns the phase to move to.
pub type Effect<P, C, M> = fn(&mut C, &M) -> P;

/// Result of one tick: whether automation should keep going and which
/// pseudocode line to highlight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub struct Tick {
    /// `false` once the stepper reached a terminal state
    pub continues: bool,

    /// Index into the stepper's pseudocode listing
    pub line: usize,
}

impl Tick {
    /// Tick that keeps the scheduler running
    pub fn running(line: usize) -> Self {
        Self {
            continues: true,
            line,
        }
    }

    /// Tick that tells the scheduler to stop
    pub fn halted(line: usize) -> Self {
        Self {
            continues: false,
            line,
        }
    }
}

/// Single entry of a phase table
#[derive(Debug)]
pub struct Rule<P, C, M> {
    /// Phase this rule fires in
    pub phase: P,

    /// Line highlighted when the rule fires (or when halted in `phase`)
    pub line: usize,

    /// `None` marks a halting phase
    pub effect: Option<Effect<P, C, M>>,
}

// Derived Clone/Copy would demand `C: Copy` and `M: Copy`.
impl<P: Copy, C, M> Clone for Rule<P, C, M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P: Copy, C, M> Copy for Rule<P, C, M> {}

impl<P: Copy, C, M> Rule<P, C, M> {
    /// Whether ticking this phase does nothing
    pub fn is_halt(&self) -> bool {
        self.effect.is_none()
    }
}
