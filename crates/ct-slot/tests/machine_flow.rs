//! End-to-end flows through the public API

use approx::assert_abs_diff_eq;
use ct_slot::SymbolId::*;
use ct_slot::*;

fn bet(amount: u32) -> Bet {
    Bet::new(amount).unwrap()
}

fn quiet_config(seed: u64) -> SlotConfig {
    let mut config = SlotConfig::seeded(seed);
    config.jackpot.trigger_probability = 0.0;
    config
}

fn blank_grid() -> Grid {
    Grid::from_rows([
        [Cocktail, Coconut, Pineapple, Hibiscus, Beach],
        [Beach, Sunglasses, Surfer, Cocktail, Coconut],
        [Pineapple, Hibiscus, Sunglasses, Surfer, Cocktail],
    ])
}

fn with_scatters(count: usize) -> Grid {
    let mut grid = blank_grid();
    for &(reel, row) in [(0, 2), (1, 0), (2, 1), (3, 0), (4, 2)].iter().take(count) {
        grid.set(reel, row, Scatter);
    }
    grid
}

#[test]
fn test_fresh_machine_defaults() {
    let machine = SlotMachine::new();
    assert_eq!(machine.wallet().balance, Credits::from_whole(1000));
    assert_eq!(machine.wallet().bet.amount(), 10);
    assert_eq!(machine.bonus().phase(), BonusPhase::Idle);
    assert_eq!(machine.jackpot().pool, Credits::from_whole(50_000));
    assert!(machine.last_outcome().is_none());
    assert!(!machine.auto_spin().active);
}

#[test]
fn test_balance_accounting_over_session() {
    let mut machine = SlotMachine::with_config(quiet_config(3));
    let mut expected = machine.wallet().balance;

    for _ in 0..200 {
        let outcome = machine.request_spin(5).unwrap();
        if !outcome.is_free_spin {
            expected = expected.checked_sub(Credits::from_whole(5)).unwrap();
        }
        expected += outcome.total_credited();
        assert_eq!(outcome.balance_after, expected);
        assert_eq!(machine.wallet().last_win, outcome.win);
    }
    assert_eq!(machine.wallet().balance, expected);
    assert_eq!(machine.stats().total_win, machine.wallet().total_wins);
}

#[test]
fn test_legacy_session_never_shows_wild_or_scatter() {
    let mut machine = SlotMachine::with_config(quiet_config(8));
    for _ in 0..300 {
        let outcome = machine.request_spin(1).unwrap();
        assert!(outcome.grid.cells().all(|id| id.category() == SymbolCategory::Standard));
        assert_eq!(outcome.scatter_count, 0);
        assert!(!outcome.is_free_spin);
    }
    assert_eq!(machine.stats().bonus_triggers, 0);
}

#[test]
fn test_rebalanced_session_reaches_bonus() {
    let mut config = SlotConfig::rebalanced().with_seed(21);
    config.jackpot.trigger_probability = 0.0;
    config.starting_balance = 1_000_000;
    let mut engine = SlotEngine::with_config(config);

    for _ in 0..20_000 {
        engine.spin(bet(1)).unwrap();
    }
    assert!(engine.stats().bonus_triggers > 0);
    assert!(engine.stats().free_spins_played > 0);
}

#[test]
fn test_spin_with_exact_balance() {
    let mut config = quiet_config(1);
    config.starting_balance = 100;
    let mut engine = SlotEngine::with_config(config);

    let outcome = engine.spin_forced(bet(100), blank_grid()).unwrap();
    assert_eq!(outcome.balance_after, Credits::ZERO);

    let err = engine.spin(bet(1)).unwrap_err();
    assert_eq!(
        err,
        SlotError::InsufficientFunds {
            balance: Credits::ZERO,
            bet: Credits::from_whole(1)
        }
    );
}

#[test]
fn test_rejected_spin_leaves_state_untouched() {
    let mut config = SlotConfig::seeded(4);
    config.starting_balance = 20;
    let mut machine = SlotMachine::with_config(config);
    let before = machine.snapshot();

    assert!(matches!(
        machine.request_spin(25),
        Err(SlotError::InsufficientFunds { .. })
    ));
    assert_eq!(machine.request_spin(3), Err(SlotError::InvalidBetAmount(3)));
    assert_eq!(machine.snapshot(), before);
}

#[test]
fn test_scatter_pays_scale_with_count() {
    for (count, multiple) in [(3, 15), (4, 20), (5, 25)] {
        let mut engine = SlotEngine::with_config(quiet_config(2));
        let outcome = engine.spin_forced(bet(10), with_scatters(count)).unwrap();

        assert!(outcome.bonus_triggered);
        assert_eq!(outcome.scatter_win, Credits::from_whole(10 * multiple));
        assert_eq!(engine.bonus().free_spins_remaining, 10);
        assert_eq!(engine.bonus().phase(), BonusPhase::BonusActive);
    }
}

#[test]
fn test_full_bonus_round() {
    let mut engine = SlotEngine::with_config(quiet_config(6));
    engine.spin_forced(bet(10), with_scatters(3)).unwrap();
    let balance = engine.wallet().balance;

    let mut exits = 0;
    for i in 0..10 {
        let outcome = engine.spin_forced(bet(10), blank_grid()).unwrap();
        assert!(outcome.is_free_spin);
        assert_eq!(outcome.balance_after, balance);
        if outcome.bonus_transition == Some(BonusTransition::Exited) {
            exits += 1;
            assert_eq!(i, 9);
        }
    }
    assert_eq!(exits, 1);
    assert_eq!(engine.bonus(), &BonusState::default());

    let paid = engine.spin_forced(bet(10), blank_grid()).unwrap();
    assert!(!paid.is_free_spin);
    assert_eq!(paid.balance_after, balance.checked_sub(Credits::from_whole(10)).unwrap());
}

#[test]
fn test_jackpot_on_every_spin_when_certain() {
    let mut config = SlotConfig::seeded(9);
    config.jackpot.trigger_probability = 1.0;
    config.jackpot.seed = 500;
    let mut engine = SlotEngine::with_config(config);

    for _ in 0..3 {
        let outcome = engine.spin_forced(bet(10), blank_grid()).unwrap();
        assert_eq!(outcome.jackpot_win(), Credits::from_whole(500));
        assert_eq!(engine.jackpot().pool, Credits::from_whole(500));
    }
    assert_eq!(engine.wallet().balance, Credits::from_whole(1000 - 30 + 1500));
    assert_eq!(engine.wallet().total_wins, Credits::ZERO);
}

#[test]
fn test_reset_restores_wallet_and_bonus_only() {
    let mut config = quiet_config(12);
    config.jackpot.seed = 64_000;
    let mut machine = SlotMachine::with_config(config);
    machine.set_bet(50).unwrap();
    machine.request_spin(50).unwrap();
    machine.request_auto_spin(25);

    machine.request_reset();
    assert_eq!(machine.wallet().balance, Credits::from_whole(1000));
    assert_eq!(machine.wallet().last_win, Credits::ZERO);
    assert_eq!(machine.wallet().total_wins, Credits::ZERO);
    assert_eq!(machine.wallet().bet.amount(), 50);
    assert_eq!(machine.bonus(), &BonusState::default());
    assert_eq!(machine.jackpot().pool, Credits::from_whole(64_000));
    assert!(!machine.auto_spin().active);
    assert_eq!(machine.auto_spin_stop(), Some(&AutoSpinStop::Stopped));
}

#[test]
fn test_auto_spin_replace_not_merge() {
    let mut machine = SlotMachine::with_config(quiet_config(13));
    machine.request_auto_spin(25);
    machine.advance_auto_spin();
    machine.request_auto_spin(10);

    assert_eq!(
        machine.auto_spin(),
        &AutoSpinState {
            requested: 10,
            remaining: 9,
            active: true
        }
    );

    let stop = machine.run_auto_spin(|_| true);
    assert_eq!(stop, Some(AutoSpinStop::Completed));
    assert_eq!(machine.stats().total_spins, 12);
}

#[test]
fn test_auto_spin_stop_is_observed() {
    let mut machine = SlotMachine::with_config(quiet_config(14));
    let updates = machine.subscribe();
    machine.request_auto_spin(25);
    machine.advance_auto_spin();
    machine.request_stop_auto_spin();

    assert!(machine.advance_auto_spin().is_none());
    let last = updates.try_iter().last().unwrap();
    assert!(!last.auto_spin.active);
    assert_eq!(last.last_outcome.unwrap().spin_id, 2);
}

#[test]
fn test_shared_machine_serialises_threads() {
    let shared = SharedMachine::new(SlotMachine::with_config(quiet_config(15)));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let machine = shared.clone();
            std::thread::spawn(move || {
                let mut settled = 0u64;
                for _ in 0..50 {
                    match machine.request_spin(1) {
                        Ok(_) => settled += 1,
                        Err(SlotError::ConcurrentSpinRejected) => {}
                        Err(err) => panic!("unexpected rejection: {err}"),
                    }
                }
                settled
            })
        })
        .collect();

    let settled: u64 = handles.into_iter().map(|h| h.join().unwrap()).sum();
    assert!(settled > 0);
    shared.with(|m| assert_eq!(m.stats().total_spins, settled));
    assert!(!shared.is_spinning());
}

#[test]
fn test_seeded_simulation_rtp_is_stable() {
    let mut config = SlotConfig::seeded(99);
    config.starting_balance = 1_000_000;
    let mut a = SlotEngine::with_config(config.clone());
    let mut b = SlotEngine::with_config(config);

    for _ in 0..5_000 {
        a.spin(bet(1)).unwrap();
        b.spin(bet(1)).unwrap();
    }
    assert_abs_diff_eq!(a.stats().rtp(), b.stats().rtp(), epsilon = 1e-12);
    assert_eq!(a.stats(), b.stats());
}
