//! Club Tropicana terminal front end
//!
//! Usage:
//!   tropicana spin --bet 10 --count 3     - Manual spins
//!   tropicana auto --count 25             - Auto spin run
//!   tropicana simulate --spins 1000000    - Batch RTP simulation
//!   tropicana paytable                    - Show the paytable

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use serde::Serialize;

use ct_slot::{
    Bet, Credits, MachineSnapshot, SessionStats, SlotConfig, SlotEngine, SlotMachine, SpinOutcome,
};

#[derive(Parser)]
#[command(name = "tropicana", about = "Club Tropicana 5x3 slot machine")]
struct Cli {
    /// Config file (.json, .yaml or .yml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Fixed RNG seed for a reproducible session
    #[arg(short, long, global = true)]
    seed: Option<u64>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manual spins
    Spin {
        #[arg(short, long, default_value_t = 10)]
        bet: u32,
        #[arg(short = 'n', long, default_value_t = 1)]
        count: u32,
    },
    /// Auto spin run
    Auto {
        #[arg(short, long, default_value_t = 10)]
        bet: u32,
        #[arg(short = 'n', long, default_value_t = 10)]
        count: u32,
        /// Pause between spins
        #[arg(long, default_value_t = 0)]
        delay_ms: u64,
    },
    /// Batch simulation reporting RTP and hit rate
    Simulate {
        #[arg(short, long, default_value_t = 1)]
        bet: u32,
        #[arg(long, default_value_t = 100_000)]
        spins: u64,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the paytable
    Paytable,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let mut config = match &cli.config {
        Some(path) => SlotConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => SlotConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config = config.with_seed(seed);
    }
    log::info!(
        "Session config: balance {}, bet {}, seed {:?}",
        config.starting_credits(),
        config.default_bet,
        config.rng_seed
    );

    match cli.command {
        Commands::Spin { bet, count } => run_spins(config, bet, count),
        Commands::Auto {
            bet,
            count,
            delay_ms,
        } => run_auto(config, bet, count, delay_ms),
        Commands::Simulate { bet, spins, json } => simulate(config, bet, spins, json),
        Commands::Paytable => print_paytable(&SlotMachine::with_config(config)),
    }
}

fn run_spins(config: SlotConfig, bet: u32, count: u32) -> Result<()> {
    let mut machine = SlotMachine::with_config(config);

    for _ in 0..count {
        let outcome = machine
            .request_spin(bet)
            .context("Spin rejected")?;
        print_outcome(&outcome);
        print_status(&machine.snapshot());
    }
    Ok(())
}

fn run_auto(config: SlotConfig, bet: u32, count: u32, delay_ms: u64) -> Result<()> {
    let mut machine = SlotMachine::with_config(config);
    machine.set_bet(bet).context("Invalid bet")?;
    let updates = machine.subscribe();
    let delay = Duration::from_millis(delay_ms);

    let mut step = machine.request_auto_spin(count);
    while let Some(result) = step {
        if let Err(err) = result {
            println!("Auto spin halted: {err}");
        }
        for snapshot in updates.try_iter() {
            if let Some(outcome) = &snapshot.last_outcome {
                print_outcome(outcome);
            }
            print_status(&snapshot);
        }
        if !delay.is_zero() {
            thread::sleep(delay);
        }
        step = machine.advance_auto_spin();
    }

    if let Some(stop) = machine.auto_spin_stop() {
        log::info!(
            "Auto spin ended after {} of {} spins",
            machine.auto_spin().completed(),
            machine.auto_spin().requested
        );
        println!("Auto spin ended: {stop:?}");
    }
    Ok(())
}

#[derive(Serialize)]
struct SimulationReport<'a> {
    bet: u32,
    spins: u64,
    rtp_percent: f64,
    hit_rate_percent: f64,
    stats: &'a SessionStats,
}

fn simulate(mut config: SlotConfig, bet: u32, spins: u64, json: bool) -> Result<()> {
    let bet = Bet::new(bet).context("Invalid bet")?;
    if spins == 0 {
        bail!("--spins must be at least 1");
    }

    // Enough credit to stake every spin, so the run never stops early
    config.starting_balance = spins.saturating_mul(bet.amount() as u64);
    let mut engine = SlotEngine::with_config(config);

    for _ in 0..spins {
        engine.spin(bet).context("Simulation spin rejected")?;
    }

    let stats = engine.stats();
    log::info!("Simulation finished: {} spins at bet {}", stats.total_spins, bet);
    let report = SimulationReport {
        bet: bet.amount(),
        spins,
        rtp_percent: stats.rtp(),
        hit_rate_percent: stats.hit_rate(),
        stats,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Spins:          {}", stats.total_spins);
        println!("Free spins:     {}", stats.free_spins_played);
        println!("Total bet:      {}", stats.total_bet);
        println!("Total win:      {}", stats.total_win);
        println!("Jackpots:       {} ({})", stats.jackpots_won, stats.jackpot_total);
        println!("Bonus triggers: {}", stats.bonus_triggers);
        println!("Biggest win:    {}", stats.biggest_win);
        println!("RTP:            {:.2}%", report.rtp_percent);
        println!("Hit rate:       {:.2}%", report.hit_rate_percent);
    }
    Ok(())
}

fn print_paytable(machine: &SlotMachine) -> Result<()> {
    let (rows, rules) = machine.paytable();
    for row in rows {
        println!("{} {:<12} {}", row.glyph, row.name, row.pays);
    }
    println!();
    for rule in rules {
        println!("- {rule}");
    }
    Ok(())
}

fn print_outcome(outcome: &SpinOutcome) {
    let kind = if outcome.is_free_spin { "free spin" } else { "spin" };
    println!("#{} {} (bet {})", outcome.spin_id, kind, outcome.bet);
    print!("{}", outcome.grid);

    for line in &outcome.line_wins {
        println!(
            "  line {}: {} x{} pays {}",
            line.line_index + 1,
            line.symbol.symbol().name,
            line.match_count,
            line.win_amount
        );
    }
    if outcome.bonus_triggered {
        println!("  {} scatters pay {}", outcome.scatter_count, outcome.scatter_win);
    }
    if outcome.multiplier > 1 {
        println!("  multiplier x{}", outcome.multiplier);
    }
    if outcome.win > Credits::ZERO {
        println!("  WIN {}", outcome.win);
    }
    if let Some(jackpot) = outcome.jackpot {
        println!("  JACKPOT {}", jackpot.amount);
    }
}

fn print_status(snapshot: &MachineSnapshot) {
    let bonus = if snapshot.bonus.active {
        format!(
            " | free spins {} (x{})",
            snapshot.bonus.free_spins_remaining, snapshot.bonus.multiplier
        )
    } else {
        String::new()
    };
    println!(
        "  balance {} | last win {} | jackpot {}{}",
        snapshot.wallet.balance, snapshot.wallet.last_win, snapshot.jackpot.pool, bonus
    );
}
