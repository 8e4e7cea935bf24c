//! Auto spin scheduler
//!
//! Drives the spin controller a requested number of times. Pacing belongs to
//! the caller: each [`AutoSpinScheduler::advance`] settles exactly one spin,
//! so the next spin can never start before the previous one has settled.

use serde::{Deserialize, Serialize};

use crate::engine::SlotEngine;
use crate::error::{SlotError, SlotResult};
use crate::spin::SpinOutcome;

/// Run lengths offered by the quick-pick buttons
pub const QUICK_PICK_COUNTS: [u32; 2] = [10, 25];

/// Progress of the current run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoSpinState {
    pub requested: u32,
    pub remaining: u32,
    pub active: bool,
}

impl AutoSpinState {
    /// Spins settled in this run; `remaining` is kept when a run ends early
    pub fn completed(&self) -> u32 {
        self.requested - self.remaining
    }
}

/// Why a run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutoSpinStop {
    /// Every requested spin settled
    Completed,
    /// `stop()` was called
    Stopped,
    /// A replacement run was started
    Replaced,
    /// The controller refused a spin
    Rejected(SlotError),
}

/// Repeatedly invokes the spin controller; stoppable between spins
#[derive(Debug, Default)]
pub struct AutoSpinScheduler {
    state: AutoSpinState,
    last_stop: Option<AutoSpinStop>,
}

impl AutoSpinScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &AutoSpinState {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        self.state.active
    }

    /// Reason the previous run ended
    pub fn last_stop(&self) -> Option<&AutoSpinStop> {
        self.last_stop.as_ref()
    }

    /// Start a run of `count` spins and settle the first one immediately.
    ///
    /// A run already in progress is replaced, never merged. Returns `None`
    /// when `count` is zero.
    pub fn start(
        &mut self,
        count: u32,
        engine: &mut SlotEngine,
    ) -> Option<SlotResult<SpinOutcome>> {
        if self.state.active {
            log::info!(
                "Auto spin replaced with {} spins remaining",
                self.state.remaining
            );
            self.finish(AutoSpinStop::Replaced);
        }
        if count == 0 {
            return None;
        }

        self.state = AutoSpinState {
            requested: count,
            remaining: count,
            active: true,
        };
        self.last_stop = None;
        log::info!("Auto spin started: {} spins", count);

        self.advance(engine)
    }

    /// Settle the next spin of the run at the wallet's current bet.
    ///
    /// Returns `None` when no run is active. A rejected spin ends the run.
    pub fn advance(&mut self, engine: &mut SlotEngine) -> Option<SlotResult<SpinOutcome>> {
        if !self.state.active {
            return None;
        }

        let bet = engine.wallet().bet;
        match engine.spin(bet) {
            Ok(outcome) => {
                self.state.remaining -= 1;
                if self.state.remaining == 0 {
                    self.finish(AutoSpinStop::Completed);
                }
                Some(Ok(outcome))
            }
            Err(err) => {
                log::warn!(
                    "Auto spin halted after {} of {} spins: {}",
                    self.state.completed(),
                    self.state.requested,
                    err
                );
                self.finish(AutoSpinStop::Rejected(err.clone()));
                Some(Err(err))
            }
        }
    }

    /// Prevent any further spin of the current run
    pub fn stop(&mut self) {
        if self.state.active {
            log::info!("Auto spin stopped with {} remaining", self.state.remaining);
            self.finish(AutoSpinStop::Stopped);
        }
    }

    /// Drive the active run to its end, calling `on_settled` after every spin.
    ///
    /// `on_settled` returning `false` stops the run before the next spin.
    pub fn run_to_completion<F>(
        &mut self,
        engine: &mut SlotEngine,
        mut on_settled: F,
    ) -> Option<AutoSpinStop>
    where
        F: FnMut(&SpinOutcome) -> bool,
    {
        while let Some(result) = self.advance(engine) {
            if let Ok(outcome) = result {
                if !on_settled(&outcome) {
                    self.stop();
                }
            }
        }
        self.last_stop.clone()
    }

    fn finish(&mut self, reason: AutoSpinStop) {
        self.state.active = false;
        log::debug!("Auto spin finished: {:?}", reason);
        self.last_stop = Some(reason);
    }
}
