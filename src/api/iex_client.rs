// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use crate::api::extract::{self, EARNINGS_PERIODS};
use crate::config::{ClientConfig, FetchPolicy};
use crate::error::{FetchError, Result};
use crate::models::{Cell, Row, SymbolRecord};
use crate::prices::{PriceSeries, PriceTable};
use crate::table::Table;
use crate::universe::SecurityUniverse;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, info, warn};

pub const COMPANY: &str = "company";
pub const STATS: &str = "stats";
pub const EARNINGS: &str = "earnings";
pub const FINANCIALS: &str = "financials";
pub const CHART: &str = "chart";

/// Client for the batch market data endpoint and the reference symbol list.
///
/// The client holds no symbol state: every fetch takes the universe it should
/// run over and returns a new table.
#[derive(Clone)]
pub struct MarketDataClient {
    client: Client,
    config: ClientConfig,
}

impl MarketDataClient {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn from_env() -> Self {
        Self::new(ClientConfig::from_env())
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    async fn get_json(&self, url: &str, query: &[(&str, String)]) -> Result<Value> {
        let response = self.client.get(url).query(query).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::Transport {
                url: url.to_string(),
                status,
            });
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|source| FetchError::Decode {
            url: url.to_string(),
            source,
        })
    }

    /// Fetch the reference symbol list, keeping only entries whose `type`
    /// equals `type_filter` when one is given.
    pub async fn resolve_symbols(&self, type_filter: Option<&str>) -> Result<SecurityUniverse> {
        let url = &self.config.symbols_endpoint;
        let listing = self.get_json(url, &[]).await?;
        let records: Vec<SymbolRecord> =
            serde_json::from_value(listing).map_err(|source| FetchError::Decode {
                url: url.clone(),
                source,
            })?;

        let universe: SecurityUniverse = records
            .into_iter()
            .filter(|r| type_filter.map_or(true, |t| r.kind.as_deref() == Some(t)))
            .map(|r| r.symbol)
            .collect();

        info!(
            filter = type_filter.unwrap_or("all"),
            symbols = universe.len(),
            "resolved symbol universe"
        );
        Ok(universe)
    }

    /// Issue one request per batch, in order, handing each decoded response
    /// to `on_batch`. Under `BestEffort` a failed batch is passed as `None`.
    async fn for_each_batch<F>(
        &self,
        universe: &SecurityUniverse,
        category: &str,
        filter: Option<String>,
        extra: &[(&str, &str)],
        mut on_batch: F,
    ) -> Result<()>
    where
        F: FnMut(&[String], Option<&Value>),
    {
        info!(
            category,
            symbols = universe.len(),
            batches = universe.batch_count(),
            "fetching category"
        );

        let progress = ProgressBar::new(universe.batch_count() as u64);
        progress.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos:>7}/{len:7} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        progress.set_message(category.to_string());

        for (i, batch) in universe.batches().enumerate() {
            let mut query: Vec<(&str, String)> = Vec::with_capacity(3 + extra.len());
            if let Some(filter) = &filter {
                query.push(("filter", filter.clone()));
            }
            query.push(("types", category.to_string()));
            query.push(("symbols", batch.join(",")));
            query.extend(extra.iter().map(|(k, v)| (*k, v.to_string())));

            debug!(category, batch = i, size = batch.len(), "requesting batch");
            match self.get_json(&self.config.batch_endpoint, &query).await {
                Ok(payload) => on_batch(batch, Some(&payload)),
                Err(e) => match self.config.policy {
                    FetchPolicy::FailFast => {
                        progress.abandon_with_message(format!("{} failed", category));
                        return Err(e);
                    }
                    FetchPolicy::BestEffort => {
                        warn!(
                            category,
                            batch = i,
                            first = batch.first().map(String::as_str).unwrap_or(""),
                            error = %e,
                            "batch failed, recording its symbols as missing"
                        );
                        on_batch(batch, None);
                    }
                },
            }
            progress.inc(1);
        }

        progress.finish_and_clear();
        Ok(())
    }

    /// Fetch `params` for every symbol from `category`, one row per symbol
    /// in universe order.
    pub async fn fetch_attributes(
        &self,
        universe: &SecurityUniverse,
        params: &[&str],
        category: &str,
        extra: &[(&str, &str)],
    ) -> Result<Table> {
        let params: Vec<String> = params.iter().map(|p| p.to_string()).collect();
        let mut rows = Vec::with_capacity(universe.len());

        self.for_each_batch(universe, category, Some(params.join(",")), extra, |batch, payload| {
            for symbol in batch {
                let row = payload
                    .map(|p| extract::attribute_row(p, symbol, category, &params))
                    .unwrap_or(Row::Missing);
                rows.push((symbol.clone(), row));
            }
        })
        .await?;

        log_missing(category, &rows);
        Ok(Table::from_rows(params, rows))
    }

    pub async fn fetch_company_info(
        &self,
        universe: &SecurityUniverse,
        params: &[&str],
        category: &str,
    ) -> Result<Table> {
        self.fetch_attributes(universe, params, category, &[]).await
    }

    /// Earnings for the four most recent periods. Columns come in one block
    /// per period: `{param}_1` (most recent) through `{param}_4`.
    pub async fn fetch_earnings(
        &self,
        universe: &SecurityUniverse,
        params: &[&str],
    ) -> Result<Table> {
        let params: Vec<String> = params.iter().map(|p| p.to_string()).collect();
        let mut rows = Vec::with_capacity(universe.len());

        self.for_each_batch(universe, EARNINGS, Some(params.join(",")), &[], |batch, payload| {
            for symbol in batch {
                let row = payload
                    .map(|p| extract::earnings_row(p, symbol, EARNINGS, &params))
                    .unwrap_or(Row::Missing);
                rows.push((symbol.clone(), row));
            }
        })
        .await?;

        let columns = (1..=EARNINGS_PERIODS)
            .flat_map(|n| params.iter().map(move |p| format!("{}_{}", p, n)))
            .collect();

        log_missing(EARNINGS, &rows);
        Ok(Table::from_rows(columns, rows))
    }

    /// Most recent financial statement per symbol for `period` (`annual` or
    /// `quarter`). Columns are every statement field seen, in first-seen order.
    pub async fn fetch_financials(
        &self,
        universe: &SecurityUniverse,
        period: &str,
    ) -> Result<Table> {
        let mut statements: Vec<(String, Option<Vec<(String, Cell)>>)> =
            Vec::with_capacity(universe.len());

        self.for_each_batch(universe, FINANCIALS, None, &[("period", period)], |batch, payload| {
            for symbol in batch {
                let fields =
                    payload.and_then(|p| extract::financials_fields(p, symbol, FINANCIALS));
                statements.push((symbol.clone(), fields));
            }
        })
        .await?;

        let mut columns: Vec<String> = Vec::new();
        for (_, fields) in &statements {
            for (name, _) in fields.iter().flatten() {
                if !columns.contains(name) {
                    columns.push(name.clone());
                }
            }
        }

        let rows: Vec<(String, Row)> = statements
            .into_iter()
            .map(|(symbol, fields)| {
                let row = match fields {
                    Some(fields) => {
                        let mut by_name: HashMap<String, Cell> = fields.into_iter().collect();
                        Row::Values(
                            columns
                                .iter()
                                .map(|c| by_name.remove(c).unwrap_or_default())
                                .collect(),
                        )
                    }
                    None => Row::Missing,
                };
                (symbol, row)
            })
            .collect();

        log_missing(FINANCIALS, &rows);
        Ok(Table::from_rows(columns, rows))
    }

    /// Closing prices over `range` (e.g. `1y`, `6m`, `ytd`) with dates as
    /// rows and symbols as columns.
    pub async fn fetch_prices(
        &self,
        universe: &SecurityUniverse,
        range: &str,
    ) -> Result<PriceTable> {
        let mut series: Vec<(String, PriceSeries)> = Vec::with_capacity(universe.len());

        self.for_each_batch(
            universe,
            CHART,
            Some("close,date".to_string()),
            &[("range", range)],
            |batch, payload| {
                for symbol in batch {
                    let prices = payload.and_then(|p| extract::price_series(p, symbol, CHART));
                    series.push((symbol.clone(), prices));
                }
            },
        )
        .await?;

        let missing = series.iter().filter(|(_, s)| s.is_none()).count();
        if missing > 0 {
            debug!(category = CHART, missing, "symbols without price history");
        }
        Ok(PriceTable::assemble(series))
    }
}

fn log_missing(category: &str, rows: &[(String, Row)]) {
    let missing = rows.iter().filter(|(_, r)| r.is_missing()).count();
    if missing > 0 {
        debug!(category, missing, total = rows.len(), "symbols recorded as missing");
    }
}
