// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

pub mod api;
pub mod config;
pub mod dataset;
pub mod error;
pub mod models;
pub mod prices;
pub mod table;
pub mod universe;

pub use api::MarketDataClient;
pub use config::{ClientConfig, FetchPolicy};
pub use dataset::{assemble_dataset, compile_dataset};
pub use error::FetchError;
pub use models::{Cell, Row};
pub use prices::PriceTable;
pub use table::Table;
pub use universe::SecurityUniverse;
