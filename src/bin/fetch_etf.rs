use dotenv::dotenv;
use log::{error, info};

use etf_dashboard::config::Settings;
use etf_dashboard::models::{HistoryPeriod, TickerSymbol};
use etf_dashboard::services::market_data::{MarketDataClient, YahooClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let settings = Settings::from_env()?;
    let client = YahooClient::new(&settings.yahoo)?;

    let mut tickers: Vec<String> = std::env::args().skip(1).collect();
    if tickers.is_empty() {
        tickers.push("SPY".to_string());
    }

    let mut failures = 0;
    for raw in &tickers {
        let symbol = match TickerSymbol::normalize(raw) {
            Some(symbol) => symbol,
            None => {
                error!("Skipping blank ticker '{}'", raw);
                continue;
            }
        };
        info!("Testing market data fetching for {}...", symbol);

        match client.overview(&symbol).await {
            Ok(overview) => info!(
                "SUCCESS: {} overview: {} at {:?}",
                symbol, overview.name, overview.current_price
            ),
            Err(e) => {
                failures += 1;
                error!("ERROR: Failed to fetch overview for {}: {}", symbol, e);
            }
        }

        match client.quote(&symbol).await {
            Ok(quote) => info!(
                "SUCCESS: {} quote: bid {:?}, ask {:?}, volume {:?}",
                symbol, quote.bid, quote.ask, quote.volume
            ),
            Err(e) => {
                failures += 1;
                error!("ERROR: Failed to fetch quote for {}: {}", symbol, e);
            }
        }

        match client.composition(&symbol).await {
            Ok(composition) => info!(
                "SUCCESS: {} composition: {} holdings, {} sectors",
                symbol,
                composition.holdings.len(),
                composition.sector_weights.len()
            ),
            Err(e) => {
                failures += 1;
                error!("ERROR: Failed to fetch composition for {}: {}", symbol, e);
            }
        }

        match client.price_history(&symbol, HistoryPeriod::Max).await {
            Ok(series) => match (series.bars.first(), series.bars.last()) {
                (Some(first), Some(last)) => info!(
                    "SUCCESS: {} history: {} bars from {} to {}",
                    symbol,
                    series.bars.len(),
                    first.date,
                    last.date
                ),
                _ => info!("SUCCESS: {} history is empty", symbol),
            },
            Err(e) => {
                failures += 1;
                error!("ERROR: Failed to fetch price history for {}: {}", symbol, e);
            }
        }

        match client.news(&symbol).await {
            Ok(news) => {
                info!("SUCCESS: {} news items for {}", news.len(), symbol);
                for item in &news {
                    info!("  {} ({})", item.title, item.publisher);
                }
            }
            Err(e) => {
                failures += 1;
                error!("ERROR: Failed to fetch news for {}: {}", symbol, e);
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{} market data request(s) failed", failures);
    }
    Ok(())
}
