// src/services/market_data.rs
use anyhow::Context;
use async_trait::async_trait;
use chrono::TimeZone;
use chrono_tz::Tz;
use log::{debug, error, info, warn};
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::config::YahooConfig;
use crate::models::{
    FundComposition, FundOverview, Holding, HistoryPeriod, NewsItem, PriceBar, PriceSeries,
    QuoteSnapshot, TickerSymbol,
};
use crate::services::error::ProviderError;

pub const NEWS_LIMIT: usize = 5;

const SUMMARY_MODULES: &str = "price,summaryDetail,defaultKeyStatistics,assetProfile,topHoldings";
const ERROR_BODY_LIMIT: usize = 200;

/// Best-effort access to the market-data provider. Every call is independent
/// and reports failure as a value.
#[async_trait]
pub trait MarketDataClient: Send + Sync {
    async fn quote(&self, symbol: &TickerSymbol) -> Result<QuoteSnapshot, ProviderError>;

    async fn overview(&self, symbol: &TickerSymbol) -> Result<FundOverview, ProviderError>;

    async fn composition(&self, symbol: &TickerSymbol) -> Result<FundComposition, ProviderError>;

    async fn price_history(
        &self,
        symbol: &TickerSymbol,
        period: HistoryPeriod,
    ) -> Result<PriceSeries, ProviderError>;

    /// At most `NEWS_LIMIT` items, in provider order.
    async fn news(&self, symbol: &TickerSymbol) -> Result<Vec<NewsItem>, ProviderError>;
}

pub struct YahooClient {
    http: Client,
    query_url: Url,
    cookie_url: String,
    crumb: Mutex<Option<String>>,
}

impl YahooClient {
    pub fn new(config: &YahooConfig) -> anyhow::Result<Self> {
        let http = Client::builder()
            .user_agent(config.user_agent.as_str())
            .cookie_store(true)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("failed to build market-data http client")?;
        let query_url = Url::parse(&config.query_url)
            .with_context(|| format!("invalid YAHOO_QUERY_URL '{}'", config.query_url))?;

        Ok(YahooClient {
            http,
            query_url,
            cookie_url: config.cookie_url.clone(),
            crumb: Mutex::new(None),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ProviderError> {
        let mut url = self.query_url.clone();
        url.path_segments_mut()
            .map_err(|_| ProviderError::Malformed(format!("{} cannot be a base URL", self.query_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn crumb(&self) -> Option<String> {
        let mut crumb = self.crumb.lock().await;
        if crumb.is_none() {
            match self.fetch_crumb().await {
                Ok(value) => {
                    debug!("Obtained Yahoo session crumb");
                    *crumb = Some(value);
                }
                Err(e) => warn!("Proceeding without Yahoo crumb: {}", e),
            }
        }
        crumb.clone()
    }

    async fn fetch_crumb(&self) -> Result<String, ProviderError> {
        // Only sets the session cookie; the status is irrelevant.
        if let Err(e) = self.http.get(&self.cookie_url).send().await {
            debug!("Cookie request to {} failed: {}", self.cookie_url, e);
        }

        let url = self.endpoint(&["v1", "test", "getcrumb"])?;
        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body: truncate(&body),
            });
        }

        let crumb = body.trim();
        if crumb.is_empty() || crumb.contains('<') {
            return Err(ProviderError::Malformed("crumb endpoint returned no crumb".to_string()));
        }
        Ok(crumb.to_string())
    }

    async fn get_json(&self, url: Url) -> Result<Value, ProviderError> {
        debug!("Fetching {}", url);
        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        let text = resp.text().await?;

        match (serde_json::from_str::<Value>(&text), status.is_success()) {
            (Ok(payload), true) => Ok(payload),
            (Ok(payload), false) => Err(match provider_error_in(&payload) {
                Some(message) => ProviderError::Provider(message),
                None => ProviderError::Status {
                    status: status.as_u16(),
                    body: truncate(&text),
                },
            }),
            (Err(e), true) => Err(ProviderError::Malformed(format!(
                "response is not valid JSON ({}): {}",
                e,
                truncate(&text)
            ))),
            (Err(_), false) => Err(ProviderError::Status {
                status: status.as_u16(),
                body: truncate(&text),
            }),
        }
    }

    async fn quote_summary(&self, symbol: &TickerSymbol) -> Result<Value, ProviderError> {
        let crumb = self.crumb().await;
        let mut url = self.endpoint(&["v10", "finance", "quoteSummary", symbol.as_str()])?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("modules", SUMMARY_MODULES);
            if let Some(crumb) = &crumb {
                query.append_pair("crumb", crumb);
            }
        }

        let payload = match self.get_json(url).await {
            Ok(payload) => payload,
            Err(e) => {
                if let ProviderError::Status { status, .. } = &e {
                    if *status == StatusCode::UNAUTHORIZED.as_u16() {
                        warn!("Yahoo rejected the session crumb; it will be refreshed on the next call");
                        *self.crumb.lock().await = None;
                    }
                }
                return Err(e);
            }
        };

        if let Some(message) = provider_error_in(&payload) {
            return Err(ProviderError::Provider(message));
        }
        first_result(&payload, "quoteSummary").ok_or_else(|| ProviderError::NotFound(symbol.to_string()))
    }
}

#[async_trait]
impl MarketDataClient for YahooClient {
    async fn quote(&self, symbol: &TickerSymbol) -> Result<QuoteSnapshot, ProviderError> {
        let summary = self.quote_summary(symbol).await?;
        let session = self.price_history(symbol, HistoryPeriod::OneDay).await?;

        let mut quote = parse_quote(&summary);
        quote.volume = session.last_volume();
        info!("Fetched quote for {}: bid {:?}, ask {:?}", symbol, quote.bid, quote.ask);
        Ok(quote)
    }

    async fn overview(&self, symbol: &TickerSymbol) -> Result<FundOverview, ProviderError> {
        let summary = self.quote_summary(symbol).await?;
        let session = self.price_history(symbol, HistoryPeriod::OneDay).await?;

        let mut overview = parse_overview(&summary, symbol);
        overview.current_price = session.last_close();
        info!("Fetched overview for {} ({})", symbol, overview.name);
        Ok(overview)
    }

    async fn composition(&self, symbol: &TickerSymbol) -> Result<FundComposition, ProviderError> {
        let summary = self.quote_summary(symbol).await?;
        let composition = parse_composition(&summary, symbol)?;
        info!(
            "Fetched composition for {}: {} holdings, {} sectors",
            symbol,
            composition.holdings.len(),
            composition.sector_weights.len()
        );
        Ok(composition)
    }

    async fn price_history(
        &self,
        symbol: &TickerSymbol,
        period: HistoryPeriod,
    ) -> Result<PriceSeries, ProviderError> {
        let mut url = self.endpoint(&["v8", "finance", "chart", symbol.as_str()])?;
        url.query_pairs_mut()
            .append_pair("range", period.as_range())
            .append_pair("interval", "1d");

        let payload = self.get_json(url).await.map_err(|e| {
            error!("Failed to fetch {} history for {}: {}", period.as_range(), symbol, e);
            e
        })?;
        let series = parse_chart(&payload)?;
        if series.is_empty() {
            warn!("Provider returned no {} bars for {}", period.as_range(), symbol);
        } else {
            info!("Fetched {} {} bars for {}", series.bars.len(), period.as_range(), symbol);
        }
        Ok(series)
    }

    async fn news(&self, symbol: &TickerSymbol) -> Result<Vec<NewsItem>, ProviderError> {
        let mut url = self.endpoint(&["v1", "finance", "search"])?;
        url.query_pairs_mut()
            .append_pair("q", symbol.as_str())
            .append_pair("quotesCount", "0")
            .append_pair("newsCount", &NEWS_LIMIT.to_string());

        let payload = self.get_json(url).await?;
        let news = parse_news(&payload);
        info!("Fetched {} news items for {}", news.len(), symbol);
        Ok(news)
    }
}

fn truncate(text: &str) -> String {
    match text.char_indices().nth(ERROR_BODY_LIMIT) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

/// Finds a `{"<section>": {"error": {...}}}` report in a provider payload.
fn provider_error_in(payload: &Value) -> Option<String> {
    payload.as_object()?.values().find_map(|section| {
        let err = section.get("error")?;
        if err.is_null() {
            return None;
        }
        err.get("description")
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| Some(err.to_string()))
    })
}

fn first_result(payload: &Value, section: &str) -> Option<Value> {
    payload.get(section)?.get("result")?.as_array()?.first().cloned()
}

fn field<'a>(root: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(root, |value, key| value.get(key))
}

/// Numbers arrive either bare or as `{"raw": n, "fmt": "..."}`; `{}` means absent.
fn raw_f64(root: &Value, path: &[&str]) -> Option<f64> {
    let value = field(root, path)?;
    value
        .as_f64()
        .or_else(|| value.get("raw").and_then(Value::as_f64))
}

fn text(root: &Value, path: &[&str]) -> Option<String> {
    field(root, path)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

pub fn parse_quote(summary: &Value) -> QuoteSnapshot {
    QuoteSnapshot {
        bid: raw_f64(summary, &["summaryDetail", "bid"]),
        ask: raw_f64(summary, &["summaryDetail", "ask"]),
        currency: text(summary, &["summaryDetail", "currency"])
            .or_else(|| text(summary, &["price", "currency"])),
        volume: None,
    }
}

pub fn parse_overview(summary: &Value, symbol: &TickerSymbol) -> FundOverview {
    FundOverview {
        name: text(summary, &["price", "longName"])
            .or_else(|| text(summary, &["price", "shortName"]))
            .unwrap_or_else(|| symbol.to_string()),
        current_price: None,
        net_assets: raw_f64(summary, &["summaryDetail", "totalAssets"]),
        ytd_return: raw_f64(summary, &["defaultKeyStatistics", "ytdReturn"]),
        fund_yield: raw_f64(summary, &["summaryDetail", "yield"]),
        description: text(summary, &["assetProfile", "longBusinessSummary"]),
    }
}

pub fn parse_composition(summary: &Value, symbol: &TickerSymbol) -> Result<FundComposition, ProviderError> {
    let top = summary
        .get("topHoldings")
        .filter(|v| v.is_object())
        .ok_or_else(|| ProviderError::NotFound(format!("fund composition for {}", symbol)))?;

    let holdings = top
        .get("holdings")
        .and_then(Value::as_array)
        .map(|rows| {
            rows.iter()
                .filter_map(|row| {
                    let name = text(row, &["holdingName"]);
                    let symbol = text(row, &["symbol"]).or_else(|| name.clone())?;
                    let weight = raw_f64(row, &["holdingPercent"])?;
                    Some(Holding { symbol, name, weight })
                })
                .collect()
        })
        .unwrap_or_default();

    // A list of single-key objects, e.g. [{"technology": {"raw": 0.31}}, ...]
    let sector_weights = top
        .get("sectorWeightings")
        .and_then(Value::as_array)
        .map(|rows| {
            rows.iter()
                .filter_map(Value::as_object)
                .flat_map(|entry| entry.iter())
                .filter_map(|(sector, weight)| {
                    let weight = weight
                        .as_f64()
                        .or_else(|| weight.get("raw").and_then(Value::as_f64))?;
                    Some((sector.clone(), weight))
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(FundComposition {
        holdings,
        sector_weights,
    })
}

pub fn parse_chart(payload: &Value) -> Result<PriceSeries, ProviderError> {
    if let Some(message) = provider_error_in(payload) {
        return Err(ProviderError::Provider(message));
    }
    let result = first_result(payload, "chart")
        .ok_or_else(|| ProviderError::Malformed("chart response has no result".to_string()))?;

    let currency = text(&result, &["meta", "currency"]);
    let tz: Tz = text(&result, &["meta", "exchangeTimezoneName"])
        .and_then(|name| name.parse().ok())
        .unwrap_or(Tz::UTC);

    let empty = Vec::new();
    let timestamps = field(&result, &["timestamp"])
        .and_then(Value::as_array)
        .unwrap_or(&empty);
    let quote = field(&result, &["indicators", "quote"])
        .and_then(Value::as_array)
        .and_then(|q| q.first());
    let closes = quote
        .and_then(|q| q.get("close"))
        .and_then(Value::as_array)
        .unwrap_or(&empty);
    let volumes = quote
        .and_then(|q| q.get("volume"))
        .and_then(Value::as_array)
        .unwrap_or(&empty);

    let mut bars: Vec<PriceBar> = Vec::with_capacity(timestamps.len());
    for (i, ts) in timestamps.iter().enumerate() {
        let (ts, close) = match (ts.as_i64(), closes.get(i).and_then(Value::as_f64)) {
            (Some(ts), Some(close)) => (ts, close),
            _ => continue,
        };
        let date = match tz.timestamp_opt(ts, 0).single() {
            Some(dt) => dt.date_naive(),
            None => continue,
        };
        let volume = volumes.get(i).and_then(|v| {
            v.as_u64()
                .or_else(|| v.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
        });
        bars.push(PriceBar { date, close, volume });
    }

    bars.sort_by_key(|bar| bar.date);
    // A live session can repeat the last date; the later bar wins.
    let mut deduped: Vec<PriceBar> = Vec::with_capacity(bars.len());
    for bar in bars {
        match deduped.last_mut() {
            Some(last) if last.date == bar.date => *last = bar,
            _ => deduped.push(bar),
        }
    }

    Ok(PriceSeries {
        currency,
        bars: deduped,
    })
}

pub fn parse_news(payload: &Value) -> Vec<NewsItem> {
    payload
        .get("news")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .take(NEWS_LIMIT)
                .map(|item| NewsItem {
                    title: text(item, &["title"]).unwrap_or_else(|| "No title".to_string()),
                    publisher: text(item, &["publisher"]).unwrap_or_else(|| "No publisher".to_string()),
                    link: text(item, &["link"]).unwrap_or_else(|| "No link".to_string()),
                })
                .collect()
        })
        .unwrap_or_default()
}
