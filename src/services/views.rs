// src/services/views.rs
//! View-models handed to the rendering layer. Every view is a tagged outcome
//! so a failure in one never blanks out the others.

use serde::Serialize;

use crate::models::{
    FundOverview, InvestmentProjection, NewsItem, QuoteSnapshot, ReturnPoint, ReturnStats,
    TickerSymbol, NOT_AVAILABLE,
};
use crate::services::benchmark::BenchmarkComparison;
use crate::services::metrics::{
    format_money, format_percent, format_volume, spread, RankedWeights,
};

pub const SELECT_PROMPT: &str = "Enter an ETF and click Fetch Data to see updates.";
pub const INVALID_SYMBOL_PROMPT: &str = "Please enter a valid ETF symbol!";
pub const BENCHMARKING_PROMPT: &str = "Please enter a valid ETF symbol and click Fetch Data.";
pub const BENCHMARK_SYMBOL_PROMPT: &str = "Please enter the ETF symbol to use as benchmark.";
pub const SUPERSEDED_MESSAGE: &str = "Superseded by a newer ETF selection.";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum View<T> {
    Ready { data: T },
    Prompt { message: String },
    Error { message: String },
    Superseded { message: String },
}

impl<T> View<T> {
    pub fn ready(data: T) -> Self {
        View::Ready { data }
    }

    pub fn prompt(message: impl Into<String>) -> Self {
        View::Prompt {
            message: message.into(),
        }
    }

    /// Renders as `Error: <reason>`.
    pub fn error(reason: impl std::fmt::Display) -> Self {
        View::Error {
            message: format!("Error: {}", reason),
        }
    }

    pub fn superseded() -> Self {
        View::Superseded {
            message: SUPERSEDED_MESSAGE.to_string(),
        }
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            View::Ready { data } => Some(data),
            _ => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            View::Ready { .. } => None,
            View::Prompt { message } | View::Error { message } | View::Superseded { message } => {
                Some(message)
            }
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, View::Ready { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverviewBlock {
    pub overview: FundOverview,
    pub markdown: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpreadVolumeBlock {
    pub quote: QuoteSnapshot,
    #[serde(serialize_with = "serialize_spread")]
    pub spread: Option<f64>,
    pub volume: String,
    pub markdown: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewsBlock {
    pub items: Vec<NewsItem>,
    pub markdown: String,
}

/// First tab: overview text, spread/volume snapshot and headlines.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverviewTab {
    pub symbol: Option<TickerSymbol>,
    pub overview: View<OverviewBlock>,
    pub spread_volume: View<SpreadVolumeBlock>,
    pub news: View<NewsBlock>,
}

impl OverviewTab {
    pub fn prompt(message: &str) -> Self {
        OverviewTab {
            symbol: None,
            overview: View::prompt(message),
            spread_volume: View::prompt(message),
            news: View::prompt(message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightChart {
    pub title: String,
    pub top: usize,
    pub ranked: RankedWeights,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnsView {
    pub title: String,
    pub years: u32,
    pub series: Vec<ReturnPoint>,
    pub stats: ReturnStats,
    pub markdown: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectionView {
    pub projection: InvestmentProjection,
    pub future_value: String,
    pub amount_invested: String,
    pub total_return: String,
}

fn serialize_spread<S>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match value {
        Some(v) => serializer.serialize_f64(*v),
        None => serializer.serialize_str(NOT_AVAILABLE),
    }
}

fn or_na<T: std::fmt::Display>(value: Option<T>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

pub fn overview_block(overview: FundOverview) -> OverviewBlock {
    let price = overview
        .current_price
        .map(|p| format!("{:.2}", p))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    let net_assets = overview
        .net_assets
        .map(|a| format!("{:.2}B", a / 1e9))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    let ytd = overview
        .ytd_return
        .map(format_percent)
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    let fund_yield = overview
        .fund_yield
        .map(format_percent)
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    let markdown = format!(
        "### ETF Overview:\n\n\
         - **ETF Name**: {}\n\
         - **Current Price**: $ {}\n\
         - **Net Assets**: $ {}\n\
         - **YTD Daily Total Return**: {}\n\
         - **Yield**: {}\n\
         - **Replication**: {}\n",
        overview.name,
        price,
        net_assets,
        ytd,
        fund_yield,
        or_na(overview.description.as_deref()),
    );

    OverviewBlock { overview, markdown }
}

pub fn spread_volume_block(quote: QuoteSnapshot) -> SpreadVolumeBlock {
    let spread = spread(quote.bid, quote.ask);
    let volume = format_volume(quote.volume);
    let markdown = format!(
        "### Spread and Volume\n\n\
         - **Bid**: {}\n\
         - **Ask**: {}\n\
         - **Spread**: {}\n\
         - **Currency**: {}\n\
         - **Daily Volume**: {}\n",
        or_na(quote.bid),
        or_na(quote.ask),
        or_na(spread),
        quote.currency.as_deref().unwrap_or("Unknown"),
        volume,
    );

    SpreadVolumeBlock {
        quote,
        spread,
        volume,
        markdown,
    }
}

pub fn news_block(items: Vec<NewsItem>) -> NewsBlock {
    let mut markdown = String::from("### News\n\n");
    for item in &items {
        markdown.push_str(&format!(
            "- **{}**\n  *{}*\n  [Read more]({})\n\n",
            item.title, item.publisher, item.link
        ));
    }
    NewsBlock { items, markdown }
}

pub fn holdings_chart(ranked: RankedWeights, top: usize) -> WeightChart {
    WeightChart {
        title: format!(
            "The Top {} Companies represent {}",
            top,
            format_percent(ranked.coverage)
        ),
        top,
        ranked,
    }
}

pub fn sectors_chart(ranked: RankedWeights, top: usize) -> WeightChart {
    WeightChart {
        title: format!(
            "Top {} sectors representing {} of portfolio",
            top,
            format_percent(ranked.coverage)
        ),
        top,
        ranked,
    }
}

pub fn returns_view(
    symbol: &TickerSymbol,
    years: u32,
    series: Vec<ReturnPoint>,
    stats: ReturnStats,
) -> ReturnsView {
    let markdown = format!(
        "### Key Statistics\n**Mean Return:** {}\n**Standard Deviation:** {}",
        format_percent(stats.mean),
        stats
            .std_dev
            .map(format_percent)
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
    );
    ReturnsView {
        title: format!("{}-Year Rolling Returns for {}", years, symbol),
        years,
        series,
        stats,
        markdown,
    }
}

pub fn projection_view(projection: InvestmentProjection) -> ProjectionView {
    ProjectionView {
        future_value: format!("Future Value: {}", format_money(projection.future_value)),
        amount_invested: format!(
            "Amount invested: {}",
            format_money(projection.total_contributed)
        ),
        total_return: format!("Total return: {}", format_money(projection.net_gain)),
        projection,
    }
}

/// Chart-ready comparison; `labels` name the two lines.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkView {
    pub labels: [String; 2],
    pub comparison: BenchmarkComparison,
}

pub fn benchmark_view(comparison: BenchmarkComparison) -> BenchmarkView {
    BenchmarkView {
        labels: [
            comparison.subject.to_string(),
            comparison.benchmark.to_string(),
        ],
        comparison,
    }
}
