//! Driving steppers by timer or by hand
//!
//! Auto-play and manual stepping are mutually exclusive: a manual step stops
//! a running timer first, and starting auto-play leaves manual mode. Every
//! tick fully commits its work, so stopping is simply "issue no more ticks".

mod config;
mod scheduler;

pub use config::{
    validate_interval_ms, PlaybackConfig, DEFAULT_INTERVAL_MS, MAX_INTERVAL_MS, MIN_INTERVAL_MS,
};
pub use scheduler::{Scheduler, VirtualTimer};

use crate::machine::Tick;
use crate::pseudocode::Listing;
use crate::{Outcome, StepError};
use std::fmt::Debug;
use std::time::Duration;

/// Anything that advances one micro-step per call
pub trait Stepper {
    /// Model the stepper walks or mutates
    type Model: Debug;

    /// Perform one unit of work
    fn tick(&mut self, model: &mut Self::Model) -> Tick;

    /// Pseudocode the ticks point into
    fn listing(&self) -> &Listing;

    /// Terminal status so far
    fn outcome(&self) -> Outcome;
}

/// Who issues ticks right now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Nobody
    Idle,
    /// The recurring timer
    Auto,
    /// Explicit `step` calls
    Manual,
}

/// Owns a model and its active stepper, and decides when to tick
#[derive(Debug)]
pub struct Player<S: Stepper, T: Scheduler = VirtualTimer> {
    model: S::Model,
    stepper: S,
    timer: T,
    config: PlaybackConfig,
    mode: Mode,
    last: Option<Tick>,
    ticks: usize,
}

impl<S: Stepper> Player<S, VirtualTimer> {
    /// Player on a virtual clock
    pub fn new(model: S::Model, stepper: S, config: PlaybackConfig) -> Self {
        let timer = VirtualTimer::new(config.interval);
        Self::with_scheduler(model, stepper, timer, config)
    }
}

impl<S: Stepper, T: Scheduler> Player<S, T> {
    /// Player on a caller-supplied scheduler
    pub fn with_scheduler(model: S::Model, stepper: S, timer: T, config: PlaybackConfig) -> Self {
        Self {
            model,
            stepper,
            timer,
            config,
            mode: Mode::Idle,
            last: None,
            ticks: 0,
        }
    }

    /// Start auto-play; returns `false` if the stepper already stopped
    pub fn play(&mut self) -> bool {
        if self.is_finished() {
            return false;
        }
        self.mode = Mode::Auto;
        self.timer.start(self.config.interval);
        tracing::debug!(interval_ms = self.config.interval.as_millis() as u64, "auto-play started");
        true
    }

    /// Stop auto-play
    pub fn pause(&mut self) {
        self.timer.stop();
        self.mode = Mode::Idle;
    }

    /// One manual tick; stops a running timer first
    pub fn step(&mut self) -> Tick {
        if self.timer.is_running() {
            self.timer.stop();
        }
        self.mode = Mode::Manual;
        self.fire()
    }

    /// Let time pass and run every tick that fell due
    ///
    /// Stops the timer as soon as a tick reports `continues == false`.
    pub fn advance(&mut self, elapsed: Duration) -> Vec<Tick> {
        self.timer.advance(elapsed);
        let mut fired = Vec::new();
        while self.mode == Mode::Auto && self.timer.take_due() {
            let tick = self.fire();
            fired.push(tick);
            if !tick.continues {
                self.pause();
            }
        }
        fired
    }

    /// Change speed; applies from the next scheduled tick on
    pub fn set_interval_ms(&mut self, interval_ms: u64) -> Result<(), StepError> {
        let interval = validate_interval_ms(interval_ms)?;
        self.config.interval = interval;
        self.timer.set_interval(interval);
        Ok(())
    }

    /// Tick without a timer until the stepper stops or the cap is hit
    pub fn run_to_end(&mut self) -> Vec<Tick> {
        self.timer.stop();
        self.mode = Mode::Manual;
        let mut fired = Vec::new();
        while fired.len() < self.config.max_ticks {
            let tick = self.fire();
            fired.push(tick);
            if !tick.continues {
                break;
            }
        }
        fired
    }

    /// Swap in a freshly initialized stepper (reset / re-run)
    pub fn restart(&mut self, stepper: S) {
        self.pause();
        self.stepper = stepper;
        self.last = None;
        self.ticks = 0;
    }

    /// Edit the model; playback stops because the stepper is now stale
    pub fn model_mut(&mut self) -> &mut S::Model {
        self.pause();
        &mut self.model
    }

    /// Read-only model for renderers
    pub fn model(&self) -> &S::Model {
        &self.model
    }

    /// Read-only stepper for renderers
    pub fn stepper(&self) -> &S {
        &self.stepper
    }

    /// Active playback configuration
    pub fn config(&self) -> PlaybackConfig {
        self.config
    }

    /// Scheduler state
    pub fn scheduler(&self) -> &T {
        &self.timer
    }

    /// Who issues ticks
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Result of the latest tick
    pub fn last_tick(&self) -> Option<Tick> {
        self.last
    }

    /// Ticks issued since the last restart
    pub fn tick_count(&self) -> usize {
        self.ticks
    }

    /// Text of the highlighted pseudocode line
    pub fn highlighted_line(&self) -> Option<&str> {
        self.last
            .and_then(|tick| self.stepper.listing().select_line(tick.line))
    }

    /// Whether the latest tick stopped the stepper
    pub fn is_finished(&self) -> bool {
        self.last.map_or(false, |tick| !tick.continues)
    }

    /// Take the model and stepper back
    pub fn into_parts(self) -> (S::Model, S) {
        (self.model, self.stepper)
    }

    fn fire(&mut self) -> Tick {
        let tick = self.stepper.tick(&mut self.model);
        self.last = Some(tick);
        self.ticks += 1;
        if !tick.continues {
            tracing::info!(ticks = self.ticks, outcome = %self.stepper.outcome(), "stepper stopped");
        }
        tick
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pseudocode::OperationKind;

    /// Counts down to zero, one line per tick
    #[derive(Debug)]
    struct Countdown {
        listing: Listing,
    }

    impl Countdown {
        fn new() -> Self {
            Self {
                listing: Listing::new(OperationKind::ListSearch, "countdown", &["dec", "done"]),
            }
        }
    }

    impl Stepper for Countdown {
        type Model = u32;

        fn tick(&mut self, model: &mut u32) -> Tick {
            if *model == 0 {
                return Tick::halted(2);
            }
            *model -= 1;
            if *model == 0 {
                Tick::halted(2)
            } else {
                Tick::running(1)
            }
        }

        fn listing(&self) -> &Listing {
            &self.listing
        }

        fn outcome(&self) -> Outcome {
            Outcome::Pending
        }
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_auto_play_stops_itself() {
        let mut player = Player::new(3, Countdown::new(), PlaybackConfig::default());
        assert!(player.play());
        let ticks = player.advance(ms(5000));
        assert_eq!(ticks.len(), 3);
        assert_eq!(*player.model(), 0);
        assert!(!player.scheduler().is_running());
        assert_eq!(player.mode(), Mode::Idle);
        assert!(!player.play(), "finished stepper cannot restart auto-play");
    }

    #[test]
    fn test_manual_step_stops_timer() {
        let mut player = Player::new(5, Countdown::new(), PlaybackConfig::default());
        player.play();
        player.advance(ms(500));
        assert_eq!(*player.model(), 4);

        let tick = player.step();
        assert!(tick.continues);
        assert_eq!(player.mode(), Mode::Manual);
        assert!(!player.scheduler().is_running());
        assert!(player.advance(ms(5000)).is_empty());
        assert_eq!(*player.model(), 3);
        assert_eq!(player.highlighted_line(), Some("dec"));
    }

    #[test]
    fn test_manual_and_auto_agree() {
        let mut manual = Player::new(4, Countdown::new(), PlaybackConfig::default());
        let mut auto = Player::new(4, Countdown::new(), PlaybackConfig::default());

        let by_hand = manual.run_to_end();
        auto.play();
        let by_timer = auto.advance(ms(60_000));
        assert_eq!(by_hand, by_timer);
    }

    #[test]
    fn test_speed_change_applies_to_next_tick() {
        let mut player = Player::new(10, Countdown::new(), PlaybackConfig::default());
        player.play();
        player.set_interval_ms(100).unwrap();
        assert!(player.advance(ms(499)).is_empty());
        assert_eq!(player.advance(ms(1)).len(), 1);
        assert_eq!(player.advance(ms(100)).len(), 1);
        assert!(player.set_interval_ms(5).is_err());
    }

    #[test]
    fn test_run_to_end_respects_cap() {
        let config = PlaybackConfig::default().max_ticks(2);
        let mut player = Player::new(10, Countdown::new(), config);
        assert_eq!(player.run_to_end().len(), 2);
        assert_eq!(player.tick_count(), 2);
    }
}
