//! Paylines and win evaluation

use serde::{Deserialize, Serialize};

use crate::reels::{Grid, REELS};
use crate::symbols::{SYMBOL_TABLE, SymbolCategory, SymbolId};
use crate::wallet::{Bet, Credits};

/// Matching cells needed on a line
pub const MIN_LINE_MATCH: u8 = 3;

/// A payline definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payline {
    /// Payline index (0-based)
    pub index: u8,
    /// Row position on each reel
    pub rows: [u8; REELS],
}

impl Payline {
    /// Create a straight line (same row across all reels)
    pub const fn straight(index: u8, row: u8) -> Self {
        Self {
            index,
            rows: [row; REELS],
        }
    }

    /// (reel, row) coordinates in reel order
    pub fn coordinates(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.rows
            .iter()
            .enumerate()
            .map(|(reel, &row)| (reel, row as usize))
    }

    /// Symbols under this line
    pub fn symbols(&self, grid: &Grid) -> [SymbolId; REELS] {
        let mut line = [SymbolId::Surfer; REELS];
        for (reel, row) in self.coordinates() {
            line[reel] = grid.get(reel, row);
        }
        line
    }
}

/// The five lines of the tropical grid
pub const PAYLINES: [Payline; 5] = [
    // Straight lines
    Payline::straight(0, 0), // Top
    Payline::straight(1, 1), // Middle
    Payline::straight(2, 2), // Bottom
    // V shapes
    Payline {
        index: 3,
        rows: [0, 1, 2, 1, 0],
    },
    Payline {
        index: 4,
        rows: [2, 1, 0, 1, 2],
    },
];

/// How Wild cells count on a payline
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WildPolicy {
    /// Wild cells are skipped; the first identity to reach three decides the line
    #[default]
    Excluded,
    /// Wild cells count toward every Standard identity on the line; the best
    /// paying qualifying identity decides the line
    Substitute,
}

/// A win result on a single payline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineWin {
    /// Payline index
    pub line_index: u8,
    /// Winning symbol
    pub symbol: SymbolId,
    /// Number of counted cells (wilds included under substitution)
    pub match_count: u8,
    /// Win amount (value × bet × count / 100)
    pub win_amount: Credits,
}

/// Line pay for `count` cells of `symbol` at `bet`
pub fn line_pay(symbol: SymbolId, bet: Bet, count: u8) -> Credits {
    // value * bet * count / 100 whole credits == value * bet * count hundredths
    Credits::from_cents(symbol.symbol().value as u64 * bet.amount() as u64 * count as u64)
}

/// Result of evaluating a grid
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// Paying lines, in payline order
    pub line_wins: Vec<LineWin>,
    /// Scatter symbols anywhere on the grid
    pub scatter_count: u8,
}

impl EvaluationResult {
    /// Sum of line pays
    pub fn line_total(&self) -> Credits {
        self.line_wins.iter().map(|w| w.win_amount).sum()
    }

    /// Indices of paying lines
    pub fn winning_lines(&self) -> Vec<u8> {
        self.line_wins.iter().map(|w| w.line_index).collect()
    }
}

/// Scans a grid along the fixed paylines
#[derive(Debug, Clone, Copy, Default)]
pub struct PaylineEvaluator {
    wild_policy: WildPolicy,
}

impl PaylineEvaluator {
    pub fn new(wild_policy: WildPolicy) -> Self {
        Self { wild_policy }
    }

    pub fn wild_policy(&self) -> WildPolicy {
        self.wild_policy
    }

    /// Evaluate every payline plus the grid-wide scatter count
    pub fn evaluate(&self, grid: &Grid, bet: Bet) -> EvaluationResult {
        let line_wins = PAYLINES
            .iter()
            .filter_map(|payline| {
                self.evaluate_line(&payline.symbols(grid), bet)
                    .map(|(symbol, match_count, win_amount)| LineWin {
                        line_index: payline.index,
                        symbol,
                        match_count,
                        win_amount,
                    })
            })
            .filter(|w| !w.win_amount.is_zero())
            .collect();

        EvaluationResult {
            line_wins,
            scatter_count: grid.count_category(SymbolCategory::Scatter) as u8,
        }
    }

    /// Evaluate the five symbols of one line.
    ///
    /// Returns the deciding symbol, its count and the pay; a deciding symbol
    /// without line value (Scatter) yields a zero pay.
    pub fn evaluate_line(
        &self,
        line: &[SymbolId; REELS],
        bet: Bet,
    ) -> Option<(SymbolId, u8, Credits)> {
        match self.wild_policy {
            WildPolicy::Excluded => {
                let counts = tally(line);
                let (symbol, count) = counts
                    .into_iter()
                    .find(|&(_, count)| count >= MIN_LINE_MATCH)?;
                Some((symbol, count, line_pay(symbol, bet, count)))
            }
            WildPolicy::Substitute => {
                let wilds = line.iter().filter(|id| id.is_wild()).count() as u8;
                tally(line)
                    .into_iter()
                    .filter(|(symbol, _)| symbol.category() == SymbolCategory::Standard)
                    .map(|(symbol, count)| (symbol, count + wilds))
                    .filter(|&(_, count)| count >= MIN_LINE_MATCH)
                    .map(|(symbol, count)| (symbol, count, line_pay(symbol, bet, count)))
                    .max_by_key(|&(_, _, pay)| pay)
            }
        }
    }
}

/// Per-identity counts in order of first appearance, wilds skipped
fn tally(line: &[SymbolId; REELS]) -> Vec<(SymbolId, u8)> {
    let mut counts: Vec<(SymbolId, u8)> = Vec::with_capacity(REELS);
    for &id in line.iter().filter(|id| !id.is_wild()) {
        match counts.iter_mut().find(|(seen, _)| *seen == id) {
            Some((_, n)) => *n += 1,
            None => counts.push((id, 1)),
        }
    }
    counts
}

/// Row of the player-facing paytable
#[derive(Debug, Clone, Serialize)]
pub struct PaytableRow {
    pub glyph: &'static str,
    pub name: &'static str,
    pub category: SymbolCategory,
    /// Pay value, or the rule text for special symbols
    pub pays: String,
}

/// Rules shown under the paytable
pub const PAYTABLE_RULES: [&str; 4] = [
    "Get 3+ matching symbols on a payline to win",
    "3+ Scatter symbols trigger 10 free spins",
    "Wild symbols substitute for any symbol",
    "Jackpot has a 0.1% chance on any spin",
];

/// Paytable rows in table order
pub fn paytable_rows() -> Vec<PaytableRow> {
    SYMBOL_TABLE
        .iter()
        .map(|s| PaytableRow {
            glyph: s.glyph,
            name: s.name,
            category: s.category,
            pays: match s.category {
                SymbolCategory::Standard => format!("{}x", s.value),
                SymbolCategory::Wild => "Substitutes".to_string(),
                SymbolCategory::Scatter => "Free Spins".to_string(),
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use SymbolId::*;

    fn bet(amount: u32) -> Bet {
        Bet::new(amount).unwrap()
    }

    #[test]
    fn test_payline_shapes() {
        assert_eq!(PAYLINES[0].rows, [0, 0, 0, 0, 0]);
        assert_eq!(PAYLINES[2].rows, [2, 2, 2, 2, 2]);
        assert_eq!(PAYLINES[3].rows, [0, 1, 2, 1, 0]);
        assert_eq!(PAYLINES[4].rows, [2, 1, 0, 1, 2]);
        for (i, line) in PAYLINES.iter().enumerate() {
            assert_eq!(line.index as usize, i);
        }
    }

    #[test]
    fn test_three_of_a_kind_pays_value_bet_count() {
        let evaluator = PaylineEvaluator::default();
        // Pineapple value 100, bet 10, count 3 → 100 * 10 * 3 / 100 = 30
        let line = [Pineapple, Pineapple, Pineapple, Beach, Beach];
        let result = evaluator.evaluate_line(&line, bet(10));
        assert_eq!(result, Some((Pineapple, 3, Credits::from_whole(30))));
    }

    #[test]
    fn test_fractional_pay_is_exact() {
        let evaluator = PaylineEvaluator::default();
        // Surfer value 30, bet 1, count 3 → 0.90
        let (_, _, pay) = evaluator
            .evaluate_line(&[Surfer, Beach, Surfer, Coconut, Surfer], bet(1))
            .unwrap();
        assert_eq!(pay, Credits::from_cents(90));
    }

    #[test]
    fn test_no_triple_no_win() {
        let evaluator = PaylineEvaluator::default();
        assert_eq!(
            evaluator.evaluate_line(&[Cocktail, Cocktail, Beach, Beach, Surfer], bet(5)),
            None
        );
    }

    #[test]
    fn test_wild_excluded_not_substituted() {
        let evaluator = PaylineEvaluator::new(WildPolicy::Excluded);
        let line = [Hibiscus, Wild, Hibiscus, Wild, Hibiscus];
        // Only the three Hibiscus count
        assert_eq!(
            evaluator.evaluate_line(&line, bet(10)),
            Some((Hibiscus, 3, line_pay(Hibiscus, bet(10), 3)))
        );
        // Two Standard + three Wilds never wins
        assert_eq!(
            evaluator.evaluate_line(&[Wild, Beach, Wild, Beach, Wild], bet(10)),
            None
        );
    }

    #[test]
    fn test_wild_substitution_policy() {
        let evaluator = PaylineEvaluator::new(WildPolicy::Substitute);
        let result = evaluator.evaluate_line(&[Wild, Beach, Wild, Beach, Surfer], bet(10));
        assert_eq!(result, Some((Beach, 4, line_pay(Beach, bet(10), 4))));

        // Best-paying identity wins when two qualify
        let result = evaluator.evaluate_line(&[Surfer, Wild, Wild, Cocktail, Beach], bet(1));
        assert_eq!(result.map(|(s, _, _)| s), Some(Cocktail));

        assert_eq!(evaluator.evaluate_line(&[Wild; REELS], bet(1)), None);
    }

    #[test]
    fn test_scatter_line_pays_nothing() {
        let evaluator = PaylineEvaluator::default();
        let (symbol, count, pay) = evaluator
            .evaluate_line(&[Scatter, Scatter, Scatter, Beach, Beach], bet(10))
            .unwrap();
        assert_eq!((symbol, count), (Scatter, 3));
        assert!(pay.is_zero());
    }

    #[test]
    fn test_evaluate_grid_lines_and_scatters() {
        let evaluator = PaylineEvaluator::default();
        let grid = Grid::from_rows([
            [Cocktail, Cocktail, Cocktail, Cocktail, Cocktail],
            [Beach, Surfer, Hibiscus, Surfer, Scatter],
            [Scatter, Hibiscus, Beach, Scatter, Pineapple],
        ]);

        let result = evaluator.evaluate(&grid, bet(10));
        assert_eq!(result.winning_lines(), vec![0]);
        // Cocktail 200 * 10 * 5 / 100 = 100
        assert_eq!(result.line_total(), Credits::from_whole(100));
        assert_eq!(result.scatter_count, 3);
    }

    #[test]
    fn test_diagonal_lines() {
        let evaluator = PaylineEvaluator::default();
        let grid = Grid::from_rows([
            [Coconut, Beach, Surfer, Hibiscus, Coconut],
            [Beach, Coconut, Pineapple, Coconut, Sunglasses],
            [Surfer, Hibiscus, Coconut, Pineapple, Beach],
        ]);

        let result = evaluator.evaluate(&grid, bet(1));
        assert_eq!(result.winning_lines(), vec![3]);
        assert_eq!(result.line_wins[0].match_count, 5);
    }

    #[test]
    fn test_paytable_rows() {
        let rows = paytable_rows();
        assert_eq!(rows.len(), 9);
        assert_eq!(rows[0].pays, "200x");
        assert_eq!(rows[7].pays, "Substitutes");
        assert_eq!(rows[8].pays, "Free Spins");
    }
}
