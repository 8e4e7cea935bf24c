//! # ct-slot — Tropical 5×3 slot machine engine
//!
//! Spin resolution and payout engine for a five-reel, three-row slot with
//! five paylines, scatter-triggered free spins and a static jackpot pool.
//! Rendering, animation and sound live outside this crate; they talk to
//! [`SlotMachine`] and render the [`MachineSnapshot`]s it publishes.
//!
//! ## Features
//!
//! - **Weighted reels**: 15 independent draws from a fixed symbol table
//! - **Paylines**: three rows and two V lines, 3+ matching symbols anywhere on the line
//! - **Free spins**: 3+ scatters award 10 spins, retriggers stack
//! - **Jackpot**: independent roll on every settled spin
//! - **Auto spin**: caller-paced runs, stoppable between spins
//!
//! ## Architecture
//!
//! ```text
//! SlotMachine ── AutoSpinScheduler
//!     │
//!     v
//! SlotEngine (spin controller)
//!     │
//!     ├── GridBuilder ── SymbolGenerator ── SYMBOL_TABLE
//!     ├── PaylineEvaluator (PAYLINES)
//!     ├── BonusStateMachine
//!     ├── JackpotTracker
//!     └── WalletState
//!           │
//!           v
//!     SpinOutcome → MachineSnapshot
//! ```

pub mod autospin;
pub mod config;
pub mod engine;
pub mod error;
pub mod features;
pub mod machine;
pub mod paytable;
pub mod reels;
pub mod spin;
pub mod symbols;
pub mod wallet;

pub use autospin::*;
pub use config::*;
pub use engine::*;
pub use error::*;
pub use features::*;
pub use machine::*;
pub use paytable::*;
pub use reels::*;
pub use spin::*;
pub use symbols::*;
pub use wallet::*;
