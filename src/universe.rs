// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use std::collections::HashSet;

/// Symbols per batch request.
pub const BATCH_SIZE: usize = 100;

/// Ordered set of ticker symbols that every fetch runs over.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecurityUniverse {
    symbols: Vec<String>,
}

impl SecurityUniverse {
    /// Build a universe, keeping the first occurrence of any repeated symbol.
    pub fn new<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let symbols = symbols
            .into_iter()
            .map(Into::into)
            .filter(|s: &String| seen.insert(s.clone()))
            .collect();
        Self { symbols }
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols.iter().any(|s| s == symbol)
    }

    /// Consecutive groups of at most `BATCH_SIZE` symbols, in order.
    pub fn batches(&self) -> std::slice::Chunks<'_, String> {
        self.symbols.chunks(BATCH_SIZE)
    }

    pub fn batch_count(&self) -> usize {
        self.symbols.len().div_ceil(BATCH_SIZE)
    }
}

impl<S: Into<String>> FromIterator<S> for SecurityUniverse {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}
