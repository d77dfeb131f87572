// tests/common/mod.rs
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

use etf_dashboard::models::{
    FundComposition, FundOverview, Holding, HistoryPeriod, NewsItem, PriceBar, PriceSeries,
    QuoteSnapshot, TickerSymbol,
};
use etf_dashboard::services::error::ProviderError;
use etf_dashboard::services::market_data::MarketDataClient;

/// Canned provider. A `None` field fails that call with a provider error.
#[derive(Default)]
pub struct FakeMarketData {
    pub overview: Option<FundOverview>,
    pub quote: Option<QuoteSnapshot>,
    pub news: Option<Vec<NewsItem>>,
    pub composition: Option<FundComposition>,
    pub histories: HashMap<String, PriceSeries>,
    /// When set, every call waits for one notification before answering.
    pub gate: Option<Arc<Notify>>,
    pub calls: AtomicUsize,
}

impl FakeMarketData {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn with_history(mut self, symbol: &str, bars: Vec<PriceBar>) -> Self {
        self.histories.insert(
            symbol.to_string(),
            PriceSeries {
                currency: Some("USD".to_string()),
                bars,
            },
        );
        self
    }

    async fn enter(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
    }
}

fn unavailable<T>(what: &str) -> Result<T, ProviderError> {
    Err(ProviderError::Provider(format!("{} unavailable", what)))
}

#[async_trait]
impl MarketDataClient for FakeMarketData {
    async fn quote(&self, _symbol: &TickerSymbol) -> Result<QuoteSnapshot, ProviderError> {
        self.enter().await;
        self.quote.clone().map_or_else(|| unavailable("quote"), Ok)
    }

    async fn overview(&self, _symbol: &TickerSymbol) -> Result<FundOverview, ProviderError> {
        self.enter().await;
        self.overview.clone().map_or_else(|| unavailable("overview"), Ok)
    }

    async fn composition(&self, _symbol: &TickerSymbol) -> Result<FundComposition, ProviderError> {
        self.enter().await;
        self.composition.clone().map_or_else(|| unavailable("composition"), Ok)
    }

    async fn price_history(
        &self,
        symbol: &TickerSymbol,
        _period: HistoryPeriod,
    ) -> Result<PriceSeries, ProviderError> {
        self.enter().await;
        self.histories
            .get(symbol.as_str())
            .cloned()
            .ok_or_else(|| ProviderError::NotFound(symbol.to_string()))
    }

    async fn news(&self, _symbol: &TickerSymbol) -> Result<Vec<NewsItem>, ProviderError> {
        self.enter().await;
        self.news.clone().map_or_else(|| unavailable("news"), Ok)
    }
}

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// One bar per calendar day starting at `start`.
pub fn bars_from(start: NaiveDate, closes: &[f64]) -> Vec<PriceBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, close)| PriceBar {
            date: start + Duration::days(i as i64),
            close: *close,
            volume: Some(1_000),
        })
        .collect()
}

pub fn spy_overview() -> FundOverview {
    FundOverview {
        name: "SPDR S&P 500 ETF Trust".to_string(),
        current_price: Some(500.05),
        net_assets: Some(503_000_000_000.0),
        ytd_return: Some(0.1),
        fund_yield: Some(0.0137),
        description: Some("Tracks the S&P 500 Index.".to_string()),
    }
}

pub fn spy_quote() -> QuoteSnapshot {
    QuoteSnapshot {
        bid: Some(500.00),
        ask: Some(500.10),
        currency: Some("USD".to_string()),
        volume: Some(61_234_567),
    }
}

pub fn headlines() -> Vec<NewsItem> {
    vec![NewsItem {
        title: "Stocks rally".to_string(),
        publisher: "Reuters".to_string(),
        link: "https://example.com/rally".to_string(),
    }]
}

pub fn spy_composition() -> FundComposition {
    FundComposition {
        holdings: vec![
            Holding {
                symbol: "MSFT".to_string(),
                name: Some("Microsoft Corp".to_string()),
                weight: 0.071,
            },
            Holding {
                symbol: "AAPL".to_string(),
                name: Some("Apple Inc".to_string()),
                weight: 0.069,
            },
            Holding {
                symbol: "NVDA".to_string(),
                name: Some("NVIDIA Corp".to_string()),
                weight: 0.05,
            },
        ],
        sector_weights: vec![
            ("realestate".to_string(), 0.02),
            ("technology".to_string(), 0.3),
            ("healthcare".to_string(), 0.12),
        ],
    }
}

/// Everything the overview tab needs for a healthy fund.
pub fn healthy_fund() -> FakeMarketData {
    FakeMarketData {
        overview: Some(spy_overview()),
        quote: Some(spy_quote()),
        news: Some(headlines()),
        composition: Some(spy_composition()),
        ..FakeMarketData::default()
    }
}
