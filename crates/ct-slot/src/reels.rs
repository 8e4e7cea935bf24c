//! Weighted symbol generation and grid construction

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::symbols::{SYMBOL_TABLE, SymbolCategory, SymbolId};

/// Number of reels (columns)
pub const REELS: usize = 5;

/// Visible rows per reel
pub const ROWS: usize = 3;

/// Which symbols take part in the cumulative-weight scan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightPolicy {
    /// Scan Standard symbols only. Their weights sum to 1.0, so the Wild and
    /// Scatter fallback after the scan is never reached.
    #[default]
    Legacy,
    /// Scan every symbol with weights normalised by the table total, making
    /// Wild and Scatter reachable.
    Rebalanced,
}

/// Draws one symbol per cell by cumulative-weight sampling
#[derive(Debug, Clone)]
pub struct SymbolGenerator {
    policy: WeightPolicy,
    /// (symbol, cumulative weight) in table order
    cumulative: Vec<(SymbolId, f64)>,
}

impl SymbolGenerator {
    pub fn new(policy: WeightPolicy) -> Self {
        let cumulative = match policy {
            WeightPolicy::Legacy => {
                let mut acc = 0.0;
                SYMBOL_TABLE
                    .standard()
                    .map(|s| {
                        acc += s.weight;
                        (s.id, acc)
                    })
                    .collect()
            }
            WeightPolicy::Rebalanced => {
                let total: f64 = SYMBOL_TABLE.iter().map(|s| s.weight).sum();
                let mut acc = 0.0;
                let mut table: Vec<(SymbolId, f64)> = SYMBOL_TABLE
                    .iter()
                    .map(|s| {
                        acc += s.weight / total;
                        (s.id, acc)
                    })
                    .collect();
                // Normalisation can land a hair under 1.0
                if let Some(last) = table.last_mut() {
                    last.1 = 1.0;
                }
                table
            }
        };

        Self { policy, cumulative }
    }

    pub fn policy(&self) -> WeightPolicy {
        self.policy
    }

    /// Draw one symbol
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> SymbolId {
        let r: f64 = rng.random();
        match self.scan(r) {
            Some(id) => id,
            None => self.fallback(rng),
        }
    }

    /// First symbol whose cumulative weight reaches `r`
    fn scan(&self, r: f64) -> Option<SymbolId> {
        let idx = self.cumulative.partition_point(|&(_, cum)| cum < r);
        self.cumulative.get(idx).map(|&(id, _)| id)
    }

    fn fallback<R: Rng + ?Sized>(&self, rng: &mut R) -> SymbolId {
        if rng.random_bool(SYMBOL_TABLE.wild().weight) {
            SymbolId::Wild
        } else if rng.random_bool(SYMBOL_TABLE.scatter().weight) {
            SymbolId::Scatter
        } else {
            SymbolId::Surfer
        }
    }

    /// Probability of drawing `id` under this policy
    pub fn probability(&self, id: SymbolId) -> f64 {
        let mut prev = 0.0;
        for &(sym, cum) in &self.cumulative {
            if sym == id {
                return cum - prev;
            }
            prev = cum;
        }
        0.0
    }
}

impl Default for SymbolGenerator {
    fn default() -> Self {
        Self::new(WeightPolicy::default())
    }
}

/// 5 reels × 3 rows of symbols, indexed `[reel][row]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    reels: [[SymbolId; ROWS]; REELS],
}

impl Grid {
    pub fn new(reels: [[SymbolId; ROWS]; REELS]) -> Self {
        Self { reels }
    }

    /// Grid with every cell holding the same symbol
    pub fn filled(id: SymbolId) -> Self {
        Self {
            reels: [[id; ROWS]; REELS],
        }
    }

    /// Build from rows (`rows[row][reel]`), which reads like the screen
    pub fn from_rows(rows: [[SymbolId; REELS]; ROWS]) -> Self {
        let mut reels = [[SymbolId::Surfer; ROWS]; REELS];
        for (row, line) in rows.iter().enumerate() {
            for (reel, &id) in line.iter().enumerate() {
                reels[reel][row] = id;
            }
        }
        Self { reels }
    }

    pub fn get(&self, reel: usize, row: usize) -> SymbolId {
        self.reels[reel][row]
    }

    pub fn set(&mut self, reel: usize, row: usize, id: SymbolId) {
        self.reels[reel][row] = id;
    }

    pub fn reels(&self) -> &[[SymbolId; ROWS]; REELS] {
        &self.reels
    }

    /// All cells, reel by reel
    pub fn cells(&self) -> impl Iterator<Item = SymbolId> + '_ {
        self.reels.iter().flat_map(|reel| reel.iter().copied())
    }

    /// Number of cells holding a symbol of `category`
    pub fn count_category(&self, category: SymbolCategory) -> usize {
        self.cells().filter(|id| id.category() == category).count()
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..ROWS {
            let line: Vec<&str> = (0..REELS)
                .map(|reel| self.reels[reel][row].symbol().glyph)
                .collect();
            writeln!(f, "{}", line.join(" "))?;
        }
        Ok(())
    }
}

/// Produces a full grid from independent per-cell draws
#[derive(Debug, Clone, Default)]
pub struct GridBuilder {
    generator: SymbolGenerator,
}

impl GridBuilder {
    pub fn new(generator: SymbolGenerator) -> Self {
        Self { generator }
    }

    pub fn generator(&self) -> &SymbolGenerator {
        &self.generator
    }

    pub fn build<R: Rng + ?Sized>(&self, rng: &mut R) -> Grid {
        let mut reels = [[SymbolId::Surfer; ROWS]; REELS];
        for reel in reels.iter_mut() {
            for cell in reel.iter_mut() {
                *cell = self.generator.draw(rng);
            }
        }
        Grid { reels }
    }
}
