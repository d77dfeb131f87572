// src/services/dashboard.rs
use log::{error, info, warn};
use std::sync::Arc;

use crate::models::{Frequency, HistoryPeriod, ReturnPoint, TickerSymbol};
use crate::services::benchmark::compare;
use crate::services::error::{ComputationGap, ProviderError};
use crate::services::market_data::MarketDataClient;
use crate::services::metrics::{mean_and_std_dev, rolling_returns, top_n_by_weight, top_sectors, window_len};
use crate::services::projection::{annualized_return, future_value};
use crate::services::state::{DashboardState, Selection};
use crate::services::views::{
    benchmark_view, holdings_chart, news_block, overview_block, projection_view, returns_view,
    sectors_chart, spread_volume_block, BenchmarkView, OverviewTab, ProjectionView, ReturnsView,
    View, WeightChart, BENCHMARKING_PROMPT, BENCHMARK_SYMBOL_PROMPT, INVALID_SYMBOL_PROMPT,
    SELECT_PROMPT,
};

/// Owns the shared selection and recomputes each view from it on demand.
pub struct Dashboard {
    client: Arc<dyn MarketDataClient>,
    state: DashboardState,
}

impl Dashboard {
    pub fn new(client: Arc<dyn MarketDataClient>) -> Self {
        Dashboard {
            client,
            state: DashboardState::new(),
        }
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    /// Submits a new ticker and refreshes the overview tab for it.
    pub async fn select(&self, raw: &str) -> OverviewTab {
        let selection = self.state.submit(raw);
        self.overview_tab_for(selection, INVALID_SYMBOL_PROMPT).await
    }

    pub async fn overview_tab(&self) -> OverviewTab {
        let selection = self.state.current();
        let prompt = idle_prompt(&selection);
        self.overview_tab_for(selection, prompt).await
    }

    async fn overview_tab_for(&self, selection: Selection, prompt: &str) -> OverviewTab {
        let symbol = match &selection.symbol {
            Some(symbol) => symbol.clone(),
            None => return OverviewTab::prompt(prompt),
        };

        let (overview, quote, news) = tokio::join!(
            self.client.overview(&symbol),
            self.client.quote(&symbol),
            self.client.news(&symbol),
        );

        if !self.state.is_current(&selection) {
            info!("Discarding overview for {}: selection changed", symbol);
            return OverviewTab {
                symbol: Some(symbol),
                overview: View::superseded(),
                spread_volume: View::superseded(),
                news: View::superseded(),
            };
        }

        OverviewTab {
            overview: settle(overview, overview_block, &symbol, "overview"),
            spread_volume: settle(quote, spread_volume_block, &symbol, "spread and volume"),
            news: settle(news, news_block, &symbol, "news"),
            symbol: Some(symbol),
        }
    }

    pub async fn holdings(&self, top: usize) -> View<WeightChart> {
        self.composition_view(|composition| {
            holdings_chart(top_n_by_weight(&composition.holdings, top), top)
        })
        .await
    }

    pub async fn sectors(&self, top: usize) -> View<WeightChart> {
        self.composition_view(|composition| sectors_chart(top_sectors(composition, top), top))
            .await
    }

    async fn composition_view<F>(&self, build: F) -> View<WeightChart>
    where
        F: FnOnce(&crate::models::FundComposition) -> WeightChart,
    {
        let selection = self.state.current();
        let symbol = match &selection.symbol {
            Some(symbol) => symbol.clone(),
            None => return View::prompt(idle_prompt(&selection)),
        };

        let fetched = self.client.composition(&symbol).await;
        if !self.state.is_current(&selection) {
            return View::superseded();
        }
        let composition = match fetched {
            Ok(composition) => composition,
            Err(e) => return unable_to_fetch(&symbol, "composition", e),
        };

        View::ready(build(&composition))
    }

    /// Rolling-return series and its key statistics over a `years` window.
    pub async fn returns(&self, years: u32) -> View<ReturnsView> {
        let selection = self.state.current();
        let symbol = match &selection.symbol {
            Some(symbol) => symbol.clone(),
            None => return View::prompt(idle_prompt(&selection)),
        };

        let fetched = self.client.price_history(&symbol, HistoryPeriod::Max).await;
        if !self.state.is_current(&selection) {
            return View::superseded();
        }
        let series = match fetched {
            Ok(series) => series,
            Err(e) => return unable_to_fetch(&symbol, "price history", e),
        };
        if series.is_empty() {
            return unable_to_compute(ComputationGap::NoPriceData(symbol.to_string()));
        }

        let returns: Vec<ReturnPoint> = rolling_returns(&series.bars, years).collect();
        match mean_and_std_dev(returns.iter().map(|p| p.value)) {
            Some(stats) => View::ready(returns_view(&symbol, years, returns, stats)),
            None => unable_to_compute(ComputationGap::InsufficientHistory {
                years,
                available: series.bars.len(),
                required: window_len(years),
            }),
        }
    }

    pub async fn projection(
        &self,
        years: u32,
        amount: f64,
        frequency: Frequency,
    ) -> View<ProjectionView> {
        let selection = self.state.current();
        let symbol = match &selection.symbol {
            Some(symbol) => symbol.clone(),
            None => return View::prompt(BENCHMARKING_PROMPT),
        };

        let fetched = self.client.price_history(&symbol, HistoryPeriod::Max).await;
        if !self.state.is_current(&selection) {
            return View::superseded();
        }
        let series = match fetched {
            Ok(series) => series,
            Err(e) => {
                error!("Failed to fetch price history for {}: {}", symbol, e);
                return View::error(e);
            }
        };
        if series.is_empty() {
            return unable_to_compute(ComputationGap::NoPriceData(symbol.to_string()));
        }

        match annualized_return(&series.bars, years) {
            Ok(rate) => {
                let projection = future_value(years, amount, frequency, rate);
                info!(
                    "Projected {} over {} years at {:.4}: {:.2}",
                    symbol, years, rate, projection.future_value
                );
                View::ready(projection_view(projection))
            }
            Err(gap) => unable_to_compute(gap),
        }
    }

    pub async fn benchmark(&self, years: u32, benchmark: &str) -> View<BenchmarkView> {
        let selection = self.state.current();
        let symbol = match &selection.symbol {
            Some(symbol) => symbol.clone(),
            None => return View::prompt(BENCHMARKING_PROMPT),
        };
        let benchmark = match TickerSymbol::normalize(benchmark) {
            Some(benchmark) => benchmark,
            None => return View::prompt(BENCHMARK_SYMBOL_PROMPT),
        };

        let (subject_history, benchmark_history) = tokio::join!(
            self.client.price_history(&symbol, HistoryPeriod::Max),
            self.client.price_history(&benchmark, HistoryPeriod::Max),
        );
        if !self.state.is_current(&selection) {
            return View::superseded();
        }

        let subject_series = match subject_history {
            Ok(series) if series.is_empty() => {
                return unable_to_compute(ComputationGap::NoPriceData(symbol.to_string()))
            }
            Ok(series) => series,
            Err(e) => {
                error!("Failed to fetch price history for {}: {}", symbol, e);
                return View::error(e);
            }
        };
        let benchmark_series = match benchmark_history {
            Ok(series) if series.is_empty() => {
                return unable_to_compute(ComputationGap::NoPriceData(format!(
                    "benchmark {}",
                    benchmark
                )))
            }
            Ok(series) => series,
            Err(e) => {
                error!("Failed to fetch price history for benchmark {}: {}", benchmark, e);
                return View::error(e);
            }
        };

        let comparison = compare(
            &symbol,
            &subject_series.bars,
            &benchmark,
            &benchmark_series.bars,
            years,
        );
        if comparison.points.is_empty() {
            warn!(
                "No overlapping {}-year returns between {} and {}",
                years, symbol, benchmark
            );
        }
        View::ready(benchmark_view(comparison))
    }
}

fn idle_prompt(selection: &Selection) -> &'static str {
    if selection.generation == 0 {
        SELECT_PROMPT
    } else {
        INVALID_SYMBOL_PROMPT
    }
}

fn settle<T, U>(
    result: Result<T, ProviderError>,
    build: impl FnOnce(T) -> U,
    symbol: &TickerSymbol,
    what: &str,
) -> View<U> {
    match result {
        Ok(value) => View::ready(build(value)),
        Err(e) => {
            error!("Failed to fetch {} for {}: {}", what, symbol, e);
            View::error(e)
        }
    }
}

fn unable_to_fetch<T>(symbol: &TickerSymbol, what: &str, e: ProviderError) -> View<T> {
    error!("Failed to fetch {} for {}: {}", what, symbol, e);
    View::error(format!("Unable to fetch data for {}: {}", symbol, e))
}

fn unable_to_compute<T>(gap: ComputationGap) -> View<T> {
    warn!("Unable to compute: {}", gap);
    View::error(format!("Unable to compute: {}", gap))
}
