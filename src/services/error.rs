// src/services/error.rs
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("request to market-data provider failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("market-data provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("market-data provider reported an error: {0}")]
    Provider(String),

    #[error("malformed market-data response: {0}")]
    Malformed(String),

    #[error("no data found for {0}")]
    NotFound(String),
}

/// A derived metric that cannot be produced from the available history.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComputationGap {
    #[error("no price data available for {0}")]
    NoPriceData(String),

    #[error(
        "not enough price history for a {years}-year window \
         ({available} trading days available, more than {required} required)"
    )]
    InsufficientHistory {
        years: u32,
        available: usize,
        required: usize,
    },

    #[error("annualized return is undefined for a maximum rolling return of {0}")]
    UndefinedReturn(f64),
}
