// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use crate::api::{MarketDataClient, COMPANY, STATS};
use crate::error::Result;
use crate::models::Cell;
use crate::prices::PriceTable;
use crate::table::Table;
use tracing::info;

pub const COMMON_STOCK: &str = "cs";
pub const SHARES_OUTSTANDING: &str = "sharesOutstanding";
pub const AVG_PRICE: &str = "avgPrice";
pub const MARKET_CAP: &str = "marketCap";

const CATEGORICAL: [&str; 2] = ["industry", "sector"];

/// Resolve all common stocks and build the market cap dataset for them:
/// one-hot industry/sector, latest annual financials and `marketCap`
/// estimated from shares outstanding and the one year average close.
pub async fn compile_dataset(client: &MarketDataClient) -> Result<Table> {
    let universe = client.resolve_symbols(Some(COMMON_STOCK)).await?;

    let company = client.fetch_company_info(&universe, &CATEGORICAL, COMPANY).await?;
    let shares = client
        .fetch_company_info(&universe, &[SHARES_OUTSTANDING], STATS)
        .await?;
    let financials = client.fetch_financials(&universe, "annual").await?;
    let prices = client.fetch_prices(&universe, "1y").await?;

    let dataset = assemble_dataset(&company, &shares, &financials, &prices)?;
    info!(
        rows = dataset.height(),
        columns = dataset.width(),
        "compiled market cap dataset"
    );
    Ok(dataset)
}

/// Join the category tables onto the one-hot company table and derive
/// `marketCap`. A missing input yields an unavailable market cap.
pub fn assemble_dataset(
    company: &Table,
    shares: &Table,
    financials: &Table,
    prices: &PriceTable,
) -> Result<Table> {
    let average_price = prices.mean_by_symbol(AVG_PRICE);

    let mut dataset = company
        .one_hot(&CATEGORICAL)
        .left_join(financials)?
        .left_join(shares)?
        .left_join(&average_price)?;

    let shares_col = dataset.column_index(SHARES_OUTSTANDING);
    let price_col = dataset.column_index(AVG_PRICE);
    dataset.push_column(MARKET_CAP, |_, row| {
        let shares = shares_col.and_then(|i| row[i].as_f64());
        let price = price_col.and_then(|i| row[i].as_f64());
        match (shares, price) {
            (Some(s), Some(p)) => Cell::Number(s * p),
            _ => Cell::Unavailable,
        }
    });

    Ok(dataset.drop_columns(&[SHARES_OUTSTANDING, AVG_PRICE]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Row;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 1, d).unwrap()
    }

    fn inputs() -> (Table, Table, Table, PriceTable) {
        let company = Table::from_rows(
            vec!["industry".to_string(), "sector".to_string()],
            vec![
                ("A".to_string(), Row::Values(vec![text("Tech"), text("X")])),
                ("B".to_string(), Row::Values(vec![text("Finance"), text("Y")])),
            ],
        );
        let shares = Table::from_rows(
            vec![SHARES_OUTSTANDING.to_string()],
            vec![
                ("A".to_string(), Row::Values(vec![Cell::Number(1000.0)])),
                ("B".to_string(), Row::Missing),
            ],
        );
        let financials = Table::from_rows(
            vec!["totalRevenue".to_string()],
            vec![
                ("A".to_string(), Row::Values(vec![Cell::Number(500.0)])),
                ("B".to_string(), Row::Values(vec![Cell::Number(0.0)])),
            ],
        );
        let prices = PriceTable::assemble(vec![
            (
                "A".to_string(),
                Some([(date(1), Some(8.0)), (date(2), Some(12.0))].into_iter().collect()),
            ),
            (
                "B".to_string(),
                Some([(date(2), Some(20.0))].into_iter().collect()),
            ),
        ]);
        (company, shares, financials, prices)
    }

    #[test]
    fn test_market_cap_propagates_missing() {
        let (company, shares, financials, prices) = inputs();
        let dataset = assemble_dataset(&company, &shares, &financials, &prices).unwrap();

        assert_relative_eq!(dataset.get("A", MARKET_CAP).unwrap().as_f64().unwrap(), 10000.0);
        assert_eq!(dataset.get("B", MARKET_CAP), Some(&Cell::Unavailable));
    }

    #[test]
    fn test_dataset_columns() {
        let (company, shares, financials, prices) = inputs();
        let dataset = assemble_dataset(&company, &shares, &financials, &prices).unwrap();

        assert_eq!(
            dataset.columns(),
            [
                "industry_Finance",
                "industry_Tech",
                "sector_X",
                "sector_Y",
                "totalRevenue",
                MARKET_CAP
            ]
        );
        assert_eq!(dataset.symbols(), ["A", "B"]);
        assert_eq!(dataset.get("B", "totalRevenue"), Some(&Cell::Number(0.0)));
        assert!(dataset.column_index(SHARES_OUTSTANDING).is_none());
        assert!(dataset.column_index(AVG_PRICE).is_none());
    }

    #[test]
    fn test_symbol_without_prices_has_no_market_cap() {
        let (company, shares, financials, _) = inputs();
        let prices = PriceTable::assemble(vec![("A".to_string(), None), ("B".to_string(), None)]);
        let dataset = assemble_dataset(&company, &shares, &financials, &prices).unwrap();
        assert_eq!(dataset.get("A", MARKET_CAP), Some(&Cell::Unavailable));
    }
}
