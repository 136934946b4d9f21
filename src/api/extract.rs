// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

//! Pulls per-symbol values out of a decoded batch response.
//!
//! Every function here is total: a payload that does not have the expected
//! shape yields a missing row (or `None`) instead of an error.

use crate::models::{Cell, Row};
use crate::prices::PriceSeries;
use chrono::NaiveDate;
use serde_json::{Map, Value};

/// Number of most recent reporting periods kept per symbol for earnings.
pub const EARNINGS_PERIODS: usize = 4;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// The response is keyed by symbol; some deployments upper-case the keys.
fn symbol_entry<'a>(payload: &'a Value, symbol: &str) -> Option<&'a Value> {
    payload
        .get(symbol)
        .or_else(|| payload.get(symbol.to_uppercase()))
}

fn category_object<'a>(
    payload: &'a Value,
    symbol: &str,
    category: &str,
) -> Option<&'a Map<String, Value>> {
    symbol_entry(payload, symbol)?
        .get(category)?
        .as_object()
        .filter(|obj| !obj.is_empty())
}

/// `resp[symbol][category]` is a list of records, or an object wrapping that
/// list under the category name again (earnings, financials).
fn category_list<'a>(payload: &'a Value, symbol: &str, category: &str) -> Option<&'a Vec<Value>> {
    let inner = symbol_entry(payload, symbol)?.get(category)?;
    match inner {
        Value::Array(list) => Some(list),
        Value::Object(obj) => obj.get(category)?.as_array(),
        _ => None,
    }
}

fn pick(record: &Map<String, Value>, params: &[String]) -> Option<Vec<Cell>> {
    params
        .iter()
        .map(|p| record.get(p).map(Cell::from))
        .collect()
}

/// `resp[symbol][category][param]` for each requested param.
pub fn attribute_row(payload: &Value, symbol: &str, category: &str, params: &[String]) -> Row {
    category_object(payload, symbol, category)
        .and_then(|obj| pick(obj, params))
        .map(Row::Values)
        .unwrap_or(Row::Missing)
}

/// Up to `EARNINGS_PERIODS` reporting periods, most recent first, each
/// contributing one block of `params`. Absent periods are unavailable.
pub fn earnings_row(payload: &Value, symbol: &str, category: &str, params: &[String]) -> Row {
    let Some(periods) = category_list(payload, symbol, category).filter(|l| !l.is_empty()) else {
        return Row::Missing;
    };

    let mut cells = Vec::with_capacity(params.len() * EARNINGS_PERIODS);
    for period in periods.iter().take(EARNINGS_PERIODS) {
        match period.as_object().and_then(|p| pick(p, params)) {
            Some(block) => cells.extend(block),
            None => return Row::Missing,
        }
    }
    cells.resize(params.len() * EARNINGS_PERIODS, Cell::Unavailable);
    Row::Values(cells)
}

/// The most recent statement as `(field, value)` pairs in response order.
pub fn financials_fields(
    payload: &Value,
    symbol: &str,
    category: &str,
) -> Option<Vec<(String, Cell)>> {
    let statement = category_list(payload, symbol, category)?
        .first()?
        .as_object()
        .filter(|obj| !obj.is_empty())?;
    Some(
        statement
            .iter()
            .map(|(k, v)| (k.clone(), Cell::from(v)))
            .collect(),
    )
}

/// Closing price per date. An entry with an unparsable date or a
/// non-numeric close invalidates the whole series.
pub fn price_series(payload: &Value, symbol: &str, category: &str) -> PriceSeries {
    let points = category_list(payload, symbol, category)?;
    if points.is_empty() {
        return None;
    }

    points
        .iter()
        .map(|point| {
            let date = point.get("date")?.as_str()?;
            let date = NaiveDate::parse_from_str(date, DATE_FORMAT).ok()?;
            let close = match point.get("close") {
                None | Some(Value::Null) => None,
                Some(v) => Some(v.as_f64()?),
            };
            Some((date, close))
        })
        .collect()
}
