// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

pub mod extract;
pub mod iex_client;

pub use iex_client::{MarketDataClient, CHART, COMPANY, EARNINGS, FINANCIALS, STATS};
