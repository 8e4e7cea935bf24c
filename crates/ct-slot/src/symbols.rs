//! Symbol definitions and the fixed tropical symbol table

use std::fmt;

use serde::{Deserialize, Serialize};

/// Symbol category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum SymbolCategory {
    /// Regular paying symbol
    Standard = 0,
    /// Wild - advertised as substituting for others
    Wild = 1,
    /// Scatter - triggers free spins regardless of position
    Scatter = 2,
}

/// Symbol identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolId {
    Cocktail,
    Coconut,
    Pineapple,
    Hibiscus,
    Beach,
    Sunglasses,
    Surfer,
    Wild,
    Scatter,
}

impl SymbolId {
    /// Table entry for this identity
    pub fn symbol(self) -> &'static Symbol {
        SYMBOL_TABLE.get(self)
    }

    pub fn category(self) -> SymbolCategory {
        self.symbol().category
    }

    pub fn is_wild(self) -> bool {
        self.category() == SymbolCategory::Wild
    }

    pub fn is_scatter(self) -> bool {
        self.category() == SymbolCategory::Scatter
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol().key)
    }
}

/// A symbol definition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Symbol {
    pub id: SymbolId,
    /// Stable string identity (e.g. "cocktail")
    pub key: &'static str,
    /// Display glyph
    pub glyph: &'static str,
    /// Display name
    pub name: &'static str,
    /// Line pay value (percent of bet per matching cell)
    pub value: u32,
    /// Generation weight in [0, 1]
    pub weight: f64,
    pub category: SymbolCategory,
}

impl Symbol {
    const fn standard(
        id: SymbolId,
        key: &'static str,
        glyph: &'static str,
        name: &'static str,
        value: u32,
        weight: f64,
    ) -> Self {
        Self {
            id,
            key,
            glyph,
            name,
            value,
            weight,
            category: SymbolCategory::Standard,
        }
    }

    /// Check if this is a special symbol (wild, scatter)
    pub fn is_special(&self) -> bool {
        self.category != SymbolCategory::Standard
    }
}

/// Immutable registry of every symbol, in scan order.
#[derive(Debug)]
pub struct SymbolTable {
    symbols: [Symbol; 9],
}

/// The process-wide symbol table
pub static SYMBOL_TABLE: SymbolTable = SymbolTable {
    symbols: [
        Symbol::standard(SymbolId::Cocktail, "cocktail", "🍹", "Cocktail", 200, 0.05),
        Symbol::standard(SymbolId::Coconut, "coconut", "🥥", "Coconut", 150, 0.08),
        Symbol::standard(SymbolId::Pineapple, "pineapple", "🍍", "Pineapple", 100, 0.12),
        Symbol::standard(SymbolId::Hibiscus, "hibiscus", "🌺", "Hibiscus", 80, 0.15),
        Symbol::standard(SymbolId::Beach, "beach", "🏖️", "Beach", 60, 0.18),
        Symbol::standard(SymbolId::Sunglasses, "sunglasses", "🕶️", "Sunglasses", 40, 0.22),
        Symbol::standard(SymbolId::Surfer, "surfer", "🏄", "Surfer", 30, 0.20),
        Symbol {
            id: SymbolId::Wild,
            key: "wild",
            glyph: "⭐",
            name: "Wild",
            value: 0,
            weight: 0.03,
            category: SymbolCategory::Wild,
        },
        Symbol {
            id: SymbolId::Scatter,
            key: "scatter",
            glyph: "💎",
            name: "Scatter",
            value: 0,
            weight: 0.02,
            category: SymbolCategory::Scatter,
        },
    ],
};

impl SymbolTable {
    /// Get symbol by identity
    pub fn get(&self, id: SymbolId) -> &Symbol {
        // Table rows are declared in `SymbolId` discriminant order
        &self.symbols[id as usize]
    }

    /// Look up a symbol by its string key
    pub fn by_key(&self, key: &str) -> Option<&Symbol> {
        self.symbols.iter().find(|s| s.key == key)
    }

    /// All symbols in scan order
    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter()
    }

    /// Standard symbols in scan order
    pub fn standard(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols
            .iter()
            .filter(|s| s.category == SymbolCategory::Standard)
    }

    /// Get wild symbol
    pub fn wild(&self) -> &Symbol {
        self.get(SymbolId::Wild)
    }

    /// Get scatter symbol
    pub fn scatter(&self) -> &Symbol {
        self.get(SymbolId::Scatter)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}
