// src/models.rs
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Marker shown wherever the provider omitted a value.
pub const NOT_AVAILABLE: &str = "N/A";

/// Trimmed, upper-cased fund symbol. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TickerSymbol(String);

impl TickerSymbol {
    /// Returns `None` for blank input, which means "no selection".
    pub fn normalize(raw: &str) -> Option<Self> {
        let symbol = raw.trim().to_uppercase();
        if symbol.is_empty() {
            None
        } else {
            Some(TickerSymbol(symbol))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TickerSymbol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for TickerSymbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryPeriod {
    OneDay,
    Max,
}

impl HistoryPeriod {
    pub fn as_range(&self) -> &'static str {
        match self {
            HistoryPeriod::OneDay => "1d",
            HistoryPeriod::Max => "max",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub close: f64,
    pub volume: Option<u64>,
}

/// Daily bars ordered by date ascending.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PriceSeries {
    pub currency: Option<String>,
    pub bars: Vec<PriceBar>,
}

impl PriceSeries {
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last_close(&self) -> Option<f64> {
        self.bars.last().map(|bar| bar.close)
    }

    pub fn last_volume(&self) -> Option<u64> {
        self.bars.last().and_then(|bar| bar.volume)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QuoteSnapshot {
    #[serde(serialize_with = "serialize_or_na")]
    pub bid: Option<f64>,
    #[serde(serialize_with = "serialize_or_na")]
    pub ask: Option<f64>,
    pub currency: Option<String>,
    #[serde(serialize_with = "serialize_or_na")]
    pub volume: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FundOverview {
    pub name: String,
    #[serde(serialize_with = "serialize_or_na")]
    pub current_price: Option<f64>,
    #[serde(serialize_with = "serialize_or_na")]
    pub net_assets: Option<f64>,
    #[serde(serialize_with = "serialize_or_na")]
    pub ytd_return: Option<f64>,
    #[serde(rename = "yield", serialize_with = "serialize_or_na")]
    pub fund_yield: Option<f64>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Holding {
    pub symbol: String,
    pub name: Option<String>,
    pub weight: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FundComposition {
    pub holdings: Vec<Holding>,
    /// Sector name to weight fraction, in provider order.
    pub sector_weights: Vec<(String, f64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewsItem {
    pub title: String,
    pub publisher: String,
    pub link: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Frequency {
    Yearly,
    Monthly,
    Quarterly,
}

impl Frequency {
    pub fn periods_per_year(&self) -> u32 {
        match self {
            Frequency::Yearly => 1,
            Frequency::Monthly => 12,
            Frequency::Quarterly => 4,
        }
    }
}

impl FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yearly" => Ok(Frequency::Yearly),
            "monthly" => Ok(Frequency::Monthly),
            "quarterly" => Ok(Frequency::Quarterly),
            other => Err(format!(
                "unknown investment frequency '{}' (expected Yearly, Monthly or Quarterly)",
                other
            )),
        }
    }
}

impl<'de> Deserialize<'de> for Frequency {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReturnPoint {
    pub date: NaiveDate,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReturnStats {
    pub mean: f64,
    /// Sample standard deviation; undefined below two observations.
    pub std_dev: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct InvestmentProjection {
    pub years: u32,
    pub contribution: f64,
    pub frequency: Frequency,
    pub annualized_return: f64,
    pub future_value: f64,
    pub total_contributed: f64,
    pub net_gain: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AlignedReturn {
    pub date: NaiveDate,
    pub subject: f64,
    pub benchmark: f64,
}

fn serialize_or_na<S, T>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: Serialize,
{
    match value {
        Some(v) => v.serialize(serializer),
        None => serializer.serialize_str(NOT_AVAILABLE),
    }
}
