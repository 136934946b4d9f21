// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use thiserror::Error;

/// Errors surfaced by the market data client and the table operations.
///
/// Malformed per-symbol payloads are not errors; they become missing rows.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed with status {status}")]
    Transport {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("column `{0}` exists on both sides of the join")]
    ColumnOverlap(String),

    #[error("csv export failed: {0}")]
    Export(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FetchError>;
