// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use crate::models::{Cell, Row};
use crate::table::Table;
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};

/// Closing prices of one symbol keyed by trading date. `None` means the
/// symbol's history could not be extracted at all.
pub type PriceSeries = Option<BTreeMap<NaiveDate, Option<f64>>>;

/// Closing prices with dates as rows and symbols as columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceTable {
    dates: Vec<NaiveDate>,
    symbols: Vec<String>,
    // values[date][symbol]
    values: Vec<Vec<Option<f64>>>,
}

impl PriceTable {
    /// Outer-join per-symbol series on date. Dates are the sorted union over
    /// all symbols; a symbol without a price on a date gets `None` there.
    pub fn assemble<I>(series: I) -> Self
    where
        I: IntoIterator<Item = (String, PriceSeries)>,
    {
        let mut symbols = Vec::new();
        let mut columns = Vec::new();
        for (symbol, prices) in series {
            if symbols.contains(&symbol) {
                continue;
            }
            symbols.push(symbol);
            columns.push(prices.unwrap_or_default());
        }

        let dates: Vec<NaiveDate> = columns
            .iter()
            .flat_map(|c| c.keys().copied())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let values = dates
            .iter()
            .map(|date| {
                columns
                    .iter()
                    .map(|c| c.get(date).copied().flatten())
                    .collect()
            })
            .collect();

        Self {
            dates,
            symbols,
            values,
        }
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn get(&self, date: NaiveDate, symbol: &str) -> Option<f64> {
        let row = self.dates.binary_search(&date).ok()?;
        let col = self.symbols.iter().position(|s| s == symbol)?;
        self.values[row][col]
    }

    /// All closing prices of one symbol, aligned with `dates()`.
    pub fn column(&self, symbol: &str) -> Option<Vec<Option<f64>>> {
        let col = self.symbols.iter().position(|s| s == symbol)?;
        Some(self.values.iter().map(|row| row[col]).collect())
    }

    /// Collapse the date axis into one mean closing price per symbol,
    /// skipping unavailable prices. The result is symbol-keyed so it can be
    /// joined with the other category tables.
    pub fn mean_by_symbol(&self, column: &str) -> Table {
        let rows = self.symbols.iter().enumerate().map(|(col, symbol)| {
            let available: Vec<f64> = self.values.iter().filter_map(|row| row[col]).collect();
            let mean = if available.is_empty() {
                None
            } else {
                Some(available.iter().sum::<f64>() / available.len() as f64)
            };
            (symbol.clone(), Row::Values(vec![Cell::from(mean)]))
        });
        Table::from_rows(vec![column.to_string()], rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn series(points: &[(&str, f64)]) -> PriceSeries {
        Some(points.iter().map(|(d, p)| (date(d), Some(*p))).collect())
    }

    #[test]
    fn test_outer_join_on_dates() {
        let table = PriceTable::assemble(vec![
            ("A".to_string(), series(&[("2020-01-01", 1.0), ("2020-01-02", 2.0)])),
            ("B".to_string(), series(&[("2020-01-03", 4.0), ("2020-01-02", 3.0)])),
        ]);

        assert_eq!(
            table.dates(),
            [date("2020-01-01"), date("2020-01-02"), date("2020-01-03")]
        );
        assert_eq!(table.symbols(), ["A", "B"]);
        assert_eq!(table.get(date("2020-01-01"), "B"), None);
        assert_eq!(table.get(date("2020-01-03"), "A"), None);
        assert_eq!(table.get(date("2020-01-02"), "A"), Some(2.0));
        assert_eq!(table.get(date("2020-01-02"), "B"), Some(3.0));
        assert_eq!(table.column("B"), Some(vec![None, Some(3.0), Some(4.0)]));
    }

    #[test]
    fn test_missing_symbol_is_all_none() {
        let table = PriceTable::assemble(vec![
            ("A".to_string(), series(&[("2020-01-01", 1.0)])),
            ("B".to_string(), None),
        ]);
        assert_eq!(table.symbols(), ["A", "B"]);
        assert_eq!(table.column("B"), Some(vec![None]));
    }

    #[test]
    fn test_mean_by_symbol_skips_unavailable() {
        let table = PriceTable::assemble(vec![
            ("A".to_string(), series(&[("2020-01-01", 10.0), ("2020-01-02", 20.0)])),
            ("B".to_string(), series(&[("2020-01-02", 6.0)])),
            ("C".to_string(), None),
        ]);
        let means = table.mean_by_symbol("avgPrice");
        assert_eq!(means.columns(), ["avgPrice"]);
        assert_eq!(means.symbols(), ["A", "B", "C"]);
        assert_relative_eq!(means.get("A", "avgPrice").unwrap().as_f64().unwrap(), 15.0);
        assert_relative_eq!(means.get("B", "avgPrice").unwrap().as_f64().unwrap(), 6.0);
        assert_eq!(means.get("C", "avgPrice"), Some(&Cell::Unavailable));
    }

    #[test]
    fn test_empty_input() {
        let table = PriceTable::assemble(Vec::new());
        assert!(table.dates().is_empty());
        assert!(table.symbols().is_empty());
        assert_eq!(table.mean_by_symbol("avgPrice").height(), 0);
    }
}
