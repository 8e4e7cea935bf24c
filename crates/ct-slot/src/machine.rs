//! Presentation-facing facade
//!
//! ```text
//! UI / CLI ──► SlotMachine ──► SlotEngine ──► MachineSnapshot ──► subscribers
//!                   │
//!                   └── AutoSpinScheduler
//! ```
//!
//! [`SlotMachine`] is single-owner; [`SharedMachine`] wraps it for callers on
//! several threads and rejects a spin that overlaps one still settling.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};
use parking_lot::{Mutex, MutexGuard};
use serde::Serialize;

use crate::autospin::{AutoSpinScheduler, AutoSpinState, AutoSpinStop};
use crate::config::SlotConfig;
use crate::engine::{SessionStats, SlotEngine};
use crate::error::{SlotError, SlotResult};
use crate::features::{BonusState, JackpotState};
use crate::paytable::{PAYTABLE_RULES, PaytableRow, paytable_rows};
use crate::spin::SpinOutcome;
use crate::wallet::{Bet, WalletState};

/// Pending snapshots per subscriber before new ones are dropped
const SNAPSHOT_QUEUE: usize = 256;

/// Everything the presentation layer renders, taken after a state change
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MachineSnapshot {
    pub wallet: WalletState,
    pub bonus: BonusState,
    pub jackpot: JackpotState,
    pub auto_spin: AutoSpinState,
    pub last_outcome: Option<SpinOutcome>,
}

/// Slot machine facade: spin, auto spin, reset and observers
pub struct SlotMachine {
    engine: SlotEngine,
    auto_spin: AutoSpinScheduler,
    subscribers: Vec<Sender<MachineSnapshot>>,
}

impl SlotMachine {
    pub fn new() -> Self {
        Self::with_config(SlotConfig::default())
    }

    pub fn with_config(config: SlotConfig) -> Self {
        log::debug!(
            "Slot machine created: balance {}, bet {}, {:?}/{:?}",
            config.starting_credits(),
            config.default_bet,
            config.weight_policy,
            config.wild_policy
        );
        Self {
            engine: SlotEngine::with_config(config),
            auto_spin: AutoSpinScheduler::new(),
            subscribers: Vec::new(),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // REQUESTS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Settle one manual spin at `bet_amount`
    pub fn request_spin(&mut self, bet_amount: u32) -> SlotResult<SpinOutcome> {
        let bet = Bet::new(bet_amount)?;
        if self.auto_spin.is_active() {
            return Err(SlotError::AutoSpinActive);
        }
        let outcome = self.engine.spin(bet)?;
        self.publish();
        Ok(outcome)
    }

    /// Start (or replace) an auto spin run; the first spin settles immediately
    pub fn request_auto_spin(&mut self, count: u32) -> Option<SlotResult<SpinOutcome>> {
        let result = self.auto_spin.start(count, &mut self.engine);
        self.publish();
        result
    }

    /// Settle the next spin of the running auto spin, if any
    pub fn advance_auto_spin(&mut self) -> Option<SlotResult<SpinOutcome>> {
        let result = self.auto_spin.advance(&mut self.engine)?;
        self.publish();
        Some(result)
    }

    /// Drive the running auto spin to its end without pacing
    pub fn run_auto_spin<F>(&mut self, mut on_settled: F) -> Option<AutoSpinStop>
    where
        F: FnMut(&SpinOutcome) -> bool,
    {
        while let Some(result) = self.advance_auto_spin() {
            if let Ok(outcome) = result {
                if !on_settled(&outcome) {
                    self.request_stop_auto_spin();
                }
            }
        }
        self.auto_spin.last_stop().cloned()
    }

    /// No further auto spin starts after this call
    pub fn request_stop_auto_spin(&mut self) {
        if self.auto_spin.is_active() {
            self.auto_spin.stop();
            self.publish();
        }
    }

    /// Restore the wallet, clear the bonus and stop auto spin.
    ///
    /// The jackpot pool and session statistics are kept.
    pub fn request_reset(&mut self) {
        self.auto_spin.stop();
        self.engine.reset();
        self.publish();
    }

    /// Change the stake used by auto spins
    pub fn set_bet(&mut self, bet_amount: u32) -> SlotResult<()> {
        let bet = Bet::new(bet_amount)?;
        if self.auto_spin.is_active() {
            return Err(SlotError::AutoSpinActive);
        }
        self.engine.set_bet(bet);
        self.publish();
        Ok(())
    }

    pub fn reset_stats(&mut self) {
        self.engine.reset_stats();
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // OBSERVERS
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn wallet(&self) -> &WalletState {
        self.engine.wallet()
    }

    pub fn bonus(&self) -> &BonusState {
        self.engine.bonus()
    }

    pub fn jackpot(&self) -> &JackpotState {
        self.engine.jackpot()
    }

    pub fn last_outcome(&self) -> Option<&SpinOutcome> {
        self.engine.last_outcome()
    }

    pub fn auto_spin(&self) -> &AutoSpinState {
        self.auto_spin.state()
    }

    pub fn auto_spin_stop(&self) -> Option<&AutoSpinStop> {
        self.auto_spin.last_stop()
    }

    pub fn stats(&self) -> &SessionStats {
        self.engine.stats()
    }

    pub fn config(&self) -> &SlotConfig {
        self.engine.config()
    }

    /// Paytable rows and rule lines
    pub fn paytable(&self) -> (Vec<PaytableRow>, &'static [&'static str]) {
        (paytable_rows(), &PAYTABLE_RULES)
    }

    pub fn snapshot(&self) -> MachineSnapshot {
        MachineSnapshot {
            wallet: self.engine.wallet().clone(),
            bonus: self.engine.bonus().clone(),
            jackpot: self.engine.jackpot().clone(),
            auto_spin: self.auto_spin.state().clone(),
            last_outcome: self.engine.last_outcome().cloned(),
        }
    }

    /// Receive a snapshot after every settlement, reset and auto spin change
    pub fn subscribe(&mut self) -> Receiver<MachineSnapshot> {
        let (tx, rx) = bounded(SNAPSHOT_QUEUE);
        self.subscribers.push(tx);
        rx
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    fn publish(&mut self) {
        if self.subscribers.is_empty() {
            return;
        }
        let snapshot = self.snapshot();
        self.subscribers
            .retain(|tx| match tx.try_send(snapshot.clone()) {
                Ok(()) => true,
                Err(TrySendError::Full(_)) => {
                    log::trace!("Snapshot dropped for a slow subscriber");
                    true
                }
                Err(TrySendError::Disconnected(_)) => false,
            });
    }
}

impl Default for SlotMachine {
    fn default() -> Self {
        Self::new()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SHARED HANDLE
// ═══════════════════════════════════════════════════════════════════════════════

struct SharedInner {
    machine: Mutex<SlotMachine>,
    spin_in_flight: AtomicBool,
}

/// Cloneable cross-thread handle.
///
/// Spins are claimed through an in-flight flag; a second spin while one is
/// settling fails fast with [`SlotError::ConcurrentSpinRejected`].
#[derive(Clone)]
pub struct SharedMachine {
    inner: Arc<SharedInner>,
}

impl SharedMachine {
    pub fn new(machine: SlotMachine) -> Self {
        Self {
            inner: Arc::new(SharedInner {
                machine: Mutex::new(machine),
                spin_in_flight: AtomicBool::new(false),
            }),
        }
    }

    /// Claim the spin slot, or fail if a spin is already settling
    pub fn try_begin_spin(&self) -> SlotResult<SpinGuard<'_>> {
        if self
            .inner
            .spin_in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            log::warn!("Concurrent spin rejected");
            return Err(SlotError::ConcurrentSpinRejected);
        }
        Ok(SpinGuard {
            machine: self.inner.machine.lock(),
            flag: &self.inner.spin_in_flight,
        })
    }

    pub fn is_spinning(&self) -> bool {
        self.inner.spin_in_flight.load(Ordering::SeqCst)
    }

    pub fn request_spin(&self, bet_amount: u32) -> SlotResult<SpinOutcome> {
        self.try_begin_spin()?.request_spin(bet_amount)
    }

    pub fn request_auto_spin(&self, count: u32) -> Option<SlotResult<SpinOutcome>> {
        match self.try_begin_spin() {
            Ok(mut guard) => guard.request_auto_spin(count),
            Err(err) => Some(Err(err)),
        }
    }

    pub fn advance_auto_spin(&self) -> Option<SlotResult<SpinOutcome>> {
        match self.try_begin_spin() {
            Ok(mut guard) => guard.advance_auto_spin(),
            Err(err) => Some(Err(err)),
        }
    }

    /// Waits for a settling spin to finish, then prevents the next one
    pub fn request_stop_auto_spin(&self) {
        self.inner.machine.lock().request_stop_auto_spin();
    }

    pub fn request_reset(&self) {
        self.inner.machine.lock().request_reset();
    }

    pub fn set_bet(&self, bet_amount: u32) -> SlotResult<()> {
        self.inner.machine.lock().set_bet(bet_amount)
    }

    pub fn subscribe(&self) -> Receiver<MachineSnapshot> {
        self.inner.machine.lock().subscribe()
    }

    pub fn snapshot(&self) -> MachineSnapshot {
        self.inner.machine.lock().snapshot()
    }

    /// Read access to the machine
    pub fn with<R>(&self, f: impl FnOnce(&SlotMachine) -> R) -> R {
        f(&self.inner.machine.lock())
    }
}

/// Exclusive access for one spin; releases the in-flight flag on drop
pub struct SpinGuard<'a> {
    machine: MutexGuard<'a, SlotMachine>,
    flag: &'a AtomicBool,
}

impl Deref for SpinGuard<'_> {
    type Target = SlotMachine;

    fn deref(&self) -> &SlotMachine {
        &self.machine
    }
}

impl DerefMut for SpinGuard<'_> {
    fn deref_mut(&mut self) -> &mut SlotMachine {
        &mut self.machine
    }
}

impl Drop for SpinGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn machine() -> SlotMachine {
        let mut config = SlotConfig::seeded(11);
        config.jackpot.trigger_probability = 0.0;
        SlotMachine::with_config(config)
    }

    #[test]
    fn test_invalid_bet_rejected() {
        let mut machine = machine();
        assert_eq!(machine.request_spin(7), Err(SlotError::InvalidBetAmount(7)));
        assert_eq!(machine.stats().total_spins, 0);
    }

    #[test]
    fn test_manual_spin_rejected_during_auto_spin() {
        let mut machine = machine();
        machine.request_auto_spin(10);
        assert_eq!(machine.request_spin(10), Err(SlotError::AutoSpinActive));
        assert_eq!(machine.set_bet(5), Err(SlotError::AutoSpinActive));

        machine.request_stop_auto_spin();
        assert!(machine.request_spin(10).is_ok());
    }

    #[test]
    fn test_subscriber_receives_snapshots() {
        let mut machine = machine();
        let rx = machine.subscribe();

        let outcome = machine.request_spin(10).unwrap();
        let snapshot = rx.try_recv().unwrap();
        assert_eq!(snapshot.last_outcome, Some(outcome));
        assert_eq!(&snapshot.wallet, machine.wallet());

        machine.request_reset();
        let snapshot = rx.try_recv().unwrap();
        assert_eq!(snapshot.wallet.last_win, crate::wallet::Credits::ZERO);
    }

    #[test]
    fn test_dropped_subscriber_pruned() {
        let mut machine = machine();
        let rx = machine.subscribe();
        let _keep = machine.subscribe();
        drop(rx);

        machine.request_spin(1).unwrap();
        assert_eq!(machine.subscriber_count(), 1);
    }

    #[test]
    fn test_paytable_rows() {
        let machine = machine();
        let (rows, rules) = machine.paytable();
        assert_eq!(rows.len(), 9);
        assert_eq!(rows[0].pays, "200x");
        assert_eq!(rules.len(), 4);
    }

    #[test]
    fn test_shared_rejects_overlapping_spin() {
        let shared = SharedMachine::new(machine());
        let guard = shared.try_begin_spin().unwrap();
        assert!(shared.is_spinning());

        let other = shared.clone();
        let rejected = std::thread::spawn(move || other.request_spin(10))
            .join()
            .unwrap();
        assert_eq!(rejected, Err(SlotError::ConcurrentSpinRejected));
        assert_eq!(guard.stats().total_spins, 0);

        drop(guard);
        assert!(!shared.is_spinning());
        assert!(shared.request_spin(10).is_ok());
    }

    #[test]
    fn test_shared_stop_waits_for_settling_spin() {
        let shared = SharedMachine::new(machine());
        let mut guard = shared.try_begin_spin().unwrap();
        assert!(guard.request_auto_spin(25).unwrap().is_ok());

        let other = shared.clone();
        let stopper = std::thread::spawn(move || other.request_stop_auto_spin());
        std::thread::sleep(std::time::Duration::from_millis(50));
        assert!(!stopper.is_finished());

        // The in-flight spin settles before the stop lands
        let outcome = guard.advance_auto_spin().unwrap().unwrap();
        assert_eq!(outcome.spin_id, 2);
        assert!(guard.auto_spin().active);
        drop(guard);

        stopper.join().unwrap();
        shared.with(|m| {
            assert!(!m.auto_spin().active);
            assert_eq!(m.auto_spin().completed(), 2);
            assert_eq!(m.auto_spin_stop(), Some(&AutoSpinStop::Stopped));
            assert_eq!(m.stats().total_spins, 2);
            assert_eq!(m.last_outcome().map(|o| o.spin_id), Some(2));
        });
        assert!(shared.advance_auto_spin().is_none());
    }
}
