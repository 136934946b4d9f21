// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use crate::error::{FetchError, Result};
use crate::models::{Cell, Row};
use csv::Writer;
use std::collections::{BTreeSet, HashMap};
use std::io;
use std::path::Path;

/// A table with one row per symbol and named columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    symbols: Vec<String>,
    rows: Vec<Vec<Cell>>,
    index: HashMap<String, usize>,
}

impl Table {
    /// Build a table from per-symbol rows in the given order. Missing rows
    /// and short rows are filled with `Cell::Unavailable`.
    pub fn from_rows<I>(columns: Vec<String>, rows: I) -> Self
    where
        I: IntoIterator<Item = (String, Row)>,
    {
        let width = columns.len();
        let mut table = Self {
            columns,
            ..Self::default()
        };
        for (symbol, row) in rows {
            table.push_row(symbol, row.into_cells(width));
        }
        table
    }

    fn push_row(&mut self, symbol: String, cells: Vec<Cell>) {
        if self.index.contains_key(&symbol) {
            return;
        }
        self.index.insert(symbol.clone(), self.symbols.len());
        self.symbols.push(symbol);
        self.rows.push(cells);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn height(&self) -> usize {
        self.symbols.len()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn row(&self, symbol: &str) -> Option<&[Cell]> {
        self.index.get(symbol).map(|&i| self.rows[i].as_slice())
    }

    pub fn get(&self, symbol: &str, column: &str) -> Option<&Cell> {
        let col = self.column_index(column)?;
        self.row(symbol).map(|row| &row[col])
    }

    /// Cells of one column, in row order.
    pub fn column(&self, name: &str) -> Option<Vec<&Cell>> {
        let col = self.column_index(name)?;
        Some(self.rows.iter().map(|row| &row[col]).collect())
    }

    /// Append a column computed from each row.
    pub fn push_column<F>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(&str, &[Cell]) -> Cell,
    {
        for (symbol, row) in self.symbols.iter().zip(self.rows.iter_mut()) {
            let cell = f(symbol, row.as_slice());
            row.push(cell);
        }
        self.columns.push(name.into());
    }

    pub fn drop_columns(&self, names: &[&str]) -> Table {
        let keep: Vec<usize> = (0..self.columns.len())
            .filter(|&i| !names.contains(&self.columns[i].as_str()))
            .collect();
        self.select(&keep)
    }

    fn select(&self, keep: &[usize]) -> Table {
        Table {
            columns: keep.iter().map(|&i| self.columns[i].clone()).collect(),
            symbols: self.symbols.clone(),
            rows: self
                .rows
                .iter()
                .map(|row| keep.iter().map(|&i| row[i].clone()).collect())
                .collect(),
            index: self.index.clone(),
        }
    }

    /// Keep every row of `self` and append the columns of `other`, matched on
    /// symbol. Symbols `other` does not have get unavailable cells.
    pub fn left_join(&self, other: &Table) -> Result<Table> {
        if let Some(dup) = other.columns.iter().find(|c| self.columns.contains(*c)) {
            return Err(FetchError::ColumnOverlap(dup.clone()));
        }

        let mut joined = self.clone();
        joined.columns.extend(other.columns.iter().cloned());
        for (symbol, row) in joined.symbols.iter().zip(joined.rows.iter_mut()) {
            match other.row(symbol) {
                Some(cells) => row.extend(cells.iter().cloned()),
                None => row.extend(std::iter::repeat(Cell::Unavailable).take(other.width())),
            }
        }
        Ok(joined)
    }

    /// Replace each named categorical column with one indicator column per
    /// distinct value, named `{column}_{value}` and sorted by value. Unknown
    /// column names are ignored.
    ///
    /// Categories are keyed by the cell's display text, so cells of different
    /// kinds that render the same (`Text("1")` and `Number(1.0)`) share one
    /// indicator column.
    pub fn one_hot(&self, names: &[&str]) -> Table {
        let mut columns = Vec::new();
        let mut rows: Vec<Vec<Cell>> = vec![Vec::new(); self.rows.len()];

        for (col, name) in self.columns.iter().enumerate() {
            if !names.contains(&name.as_str()) {
                columns.push(name.clone());
                for (out, row) in rows.iter_mut().zip(&self.rows) {
                    out.push(row[col].clone());
                }
                continue;
            }

            let categories: BTreeSet<String> = self
                .rows
                .iter()
                .filter(|row| row[col].is_available())
                .map(|row| row[col].to_string())
                .collect();

            for category in &categories {
                columns.push(format!("{}_{}", name, category));
                for (out, row) in rows.iter_mut().zip(&self.rows) {
                    let hit = row[col].is_available() && row[col].to_string() == *category;
                    out.push(Cell::Number(if hit { 1.0 } else { 0.0 }));
                }
            }
        }

        Table {
            columns,
            symbols: self.symbols.clone(),
            rows,
            index: self.index.clone(),
        }
    }

    /// Write the table as CSV with a leading `symbol` column. Unavailable
    /// cells are written as empty fields.
    pub fn write_csv_to<W: io::Write>(&self, writer: W) -> Result<()> {
        let mut writer = Writer::from_writer(writer);
        let mut header = vec!["symbol"];
        header.extend(self.columns.iter().map(String::as_str));
        writer.write_record(&header)?;

        for (symbol, row) in self.symbols.iter().zip(&self.rows) {
            let mut record = vec![symbol.clone()];
            record.extend(row.iter().map(Cell::to_string));
            writer.write_record(&record)?;
        }

        writer.flush()?;
        Ok(())
    }

    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)?;
        self.write_csv_to(file)
    }
}
