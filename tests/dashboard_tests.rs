// tests/dashboard_tests.rs
mod common;

use std::sync::Arc;
use tokio::sync::Notify;

use common::{bars_from, day, healthy_fund, FakeMarketData};
use etf_dashboard::models::Frequency;
use etf_dashboard::services::dashboard::Dashboard;
use etf_dashboard::services::views::{
    View, BENCHMARKING_PROMPT, BENCHMARK_SYMBOL_PROMPT, INVALID_SYMBOL_PROMPT, SELECT_PROMPT,
};

fn dashboard_over(fake: FakeMarketData) -> (Arc<FakeMarketData>, Dashboard) {
    let fake = Arc::new(fake);
    let dashboard = Dashboard::new(fake.clone());
    (fake, dashboard)
}

/// 252 flat sessions followed by one at double the price.
fn doubling_bars() -> Vec<etf_dashboard::models::PriceBar> {
    let mut closes = vec![100.0; 252];
    closes.push(200.0);
    bars_from(day(2020, 1, 1), &closes)
}

#[tokio::test]
async fn before_any_submission_every_view_prompts() {
    let (fake, dashboard) = dashboard_over(healthy_fund());

    let tab = dashboard.overview_tab().await;
    assert_eq!(tab.overview.message(), Some(SELECT_PROMPT));
    assert_eq!(tab.spread_volume.message(), Some(SELECT_PROMPT));
    assert_eq!(tab.news.message(), Some(SELECT_PROMPT));
    assert_eq!(dashboard.holdings(10).await.message(), Some(SELECT_PROMPT));
    assert_eq!(
        dashboard.projection(5, 100.0, Frequency::Yearly).await.message(),
        Some(BENCHMARKING_PROMPT)
    );
    assert_eq!(fake.calls(), 0);
}

#[tokio::test]
async fn blank_ticker_prompts_without_calling_the_provider() {
    let (fake, dashboard) = dashboard_over(healthy_fund());

    let tab = dashboard.select("   ").await;
    assert!(tab.symbol.is_none());
    assert_eq!(tab.overview.message(), Some(INVALID_SYMBOL_PROMPT));
    assert_eq!(tab.news.message(), Some(INVALID_SYMBOL_PROMPT));

    assert_eq!(dashboard.sectors(5).await.message(), Some(INVALID_SYMBOL_PROMPT));
    assert_eq!(dashboard.returns(5).await.message(), Some(INVALID_SYMBOL_PROMPT));
    assert_eq!(
        dashboard.benchmark(5, "VOO").await.message(),
        Some(BENCHMARKING_PROMPT)
    );
    assert_eq!(fake.calls(), 0);
}

#[tokio::test]
async fn spy_overview_tab_reports_spread_and_volume() {
    let (_fake, dashboard) = dashboard_over(healthy_fund());

    let tab = dashboard.select("spy").await;
    assert_eq!(tab.symbol.as_ref().map(|s| s.as_str()), Some("SPY"));

    let block = tab.spread_volume.data().expect("spread block");
    assert!((block.spread.unwrap() - 0.1).abs() < 1e-12);
    assert_eq!(block.volume, "61,234,567");

    let overview = tab.overview.data().expect("overview block");
    assert!(overview.markdown.contains("- **ETF Name**: SPDR S&P 500 ETF Trust\n"));
    assert!(overview.markdown.contains("- **Yield**: 1.37%\n"));

    let news = tab.news.data().expect("news block");
    assert!(news.markdown.contains("**Stocks rally**"));
}

#[tokio::test]
async fn one_failing_source_does_not_blank_the_others() {
    let fake = FakeMarketData {
        news: None,
        ..healthy_fund()
    };
    let (_fake, dashboard) = dashboard_over(fake);

    let tab = dashboard.select("SPY").await;
    assert!(tab.overview.is_ready());
    assert!(tab.spread_volume.is_ready());
    match &tab.news {
        View::Error { message } => {
            assert!(message.starts_with("Error: "));
            assert!(message.contains("news unavailable"));
        }
        other => panic!("expected an error view, got {:?}", other),
    }
}

#[tokio::test]
async fn resubmitting_a_blank_ticker_clears_the_selection() {
    let (_fake, dashboard) = dashboard_over(healthy_fund());

    assert!(dashboard.select("SPY").await.overview.is_ready());
    dashboard.select("").await;

    assert!(!dashboard.state().current().is_active());
    let tab = dashboard.overview_tab().await;
    assert_eq!(tab.overview.message(), Some(INVALID_SYMBOL_PROMPT));
}

#[tokio::test]
async fn holdings_and_sectors_rank_by_weight() {
    let (_fake, dashboard) = dashboard_over(healthy_fund());
    dashboard.select("SPY").await;

    let holdings = dashboard.holdings(2).await;
    let chart = holdings.data().expect("holdings chart");
    let labels: Vec<&str> = chart.ranked.rows.iter().map(|r| r.label.as_str()).collect();
    assert_eq!(labels, vec!["MSFT", "AAPL"]);
    assert_eq!(chart.title, "The Top 2 Companies represent 14.00%");

    let sectors = dashboard.sectors(2).await;
    let chart = sectors.data().expect("sector chart");
    assert_eq!(chart.ranked.rows[0].label, "technology");
    assert_eq!(chart.ranked.rows[1].label, "healthcare");
    assert_eq!(chart.title, "Top 2 sectors representing 42.00% of portfolio");
}

#[tokio::test]
async fn composition_failure_is_reported_with_the_symbol() {
    let fake = FakeMarketData {
        composition: None,
        ..healthy_fund()
    };
    let (_fake, dashboard) = dashboard_over(fake);
    dashboard.select("SPY").await;

    let message = dashboard.holdings(10).await.message().map(str::to_string);
    let message = message.expect("error message");
    assert!(message.starts_with("Error: Unable to fetch data for SPY"));
}

#[tokio::test]
async fn rolling_returns_cover_every_full_window() {
    let closes: Vec<f64> = (0..300).map(|i| 100.0 + i as f64).collect();
    let fake = healthy_fund().with_history("SPY", bars_from(day(2020, 1, 1), &closes));
    let (_fake, dashboard) = dashboard_over(fake);
    dashboard.select("SPY").await;

    let view = dashboard.returns(1).await;
    let returns = view.data().expect("returns view");
    assert_eq!(returns.title, "1-Year Rolling Returns for SPY");
    assert_eq!(returns.series.len(), 300 - 252);
    assert!((returns.series[0].value - (352.0 / 100.0 - 1.0)).abs() < 1e-12);
    assert!(returns.stats.std_dev.is_some());
    assert!(returns.markdown.starts_with("### Key Statistics\n**Mean Return:** "));
}

#[tokio::test]
async fn a_single_window_has_no_standard_deviation() {
    let fake = healthy_fund().with_history("SPY", doubling_bars());
    let (_fake, dashboard) = dashboard_over(fake);
    dashboard.select("SPY").await;

    let view = dashboard.returns(1).await;
    let returns = view.data().expect("returns view");
    assert_eq!(returns.series.len(), 1);
    assert!((returns.stats.mean - 1.0).abs() < 1e-12);
    assert!(returns.stats.std_dev.is_none());
    assert!(returns.markdown.contains("**Mean Return:** 100.00%"));
    assert!(returns.markdown.contains("**Standard Deviation:** N/A"));
}

#[tokio::test]
async fn short_history_is_a_computation_gap() {
    let fake = healthy_fund().with_history("SPY", bars_from(day(2020, 1, 1), &[100.0; 200]));
    let (_fake, dashboard) = dashboard_over(fake);
    dashboard.select("SPY").await;

    let returns = dashboard.returns(1).await;
    assert!(returns
        .message()
        .unwrap()
        .starts_with("Error: Unable to compute: not enough price history"));

    let projection = dashboard.projection(1, 100.0, Frequency::Yearly).await;
    assert!(projection
        .message()
        .unwrap()
        .starts_with("Error: Unable to compute"));
}

#[tokio::test]
async fn empty_history_is_reported_as_missing_data() {
    let fake = healthy_fund().with_history("SPY", Vec::new());
    let (_fake, dashboard) = dashboard_over(fake);
    dashboard.select("SPY").await;

    let message = dashboard.returns(5).await.message().map(str::to_string);
    assert_eq!(
        message.as_deref(),
        Some("Error: Unable to compute: no price data available for SPY")
    );
}

#[tokio::test]
async fn projection_at_zero_growth_returns_contributions() {
    // A max rolling return of 1.0 annualizes to exactly zero.
    let fake = healthy_fund().with_history("SPY", doubling_bars());
    let (_fake, dashboard) = dashboard_over(fake);
    dashboard.select("SPY").await;

    let view = dashboard.projection(1, 100.0, Frequency::Monthly).await;
    let projection = view.data().expect("projection view");
    assert_eq!(projection.projection.annualized_return, 0.0);
    assert_eq!(projection.future_value, "Future Value: $1,200.00");
    assert_eq!(projection.amount_invested, "Amount invested: $1,200.00");
    assert_eq!(projection.total_return, "Total return: $0.00");
}

#[tokio::test]
async fn projection_surfaces_provider_errors() {
    let (_fake, dashboard) = dashboard_over(healthy_fund());
    dashboard.select("SPY").await;

    let view = dashboard.projection(5, 100.0, Frequency::Yearly).await;
    assert_eq!(view.message(), Some("Error: no data found for SPY"));
}

#[tokio::test]
async fn benchmark_keeps_only_shared_dates() {
    let subject: Vec<f64> = (0..260).map(|i| 100.0 + i as f64).collect();
    let benchmark: Vec<f64> = (0..260).map(|i| 50.0 + i as f64).collect();
    let fake = healthy_fund()
        .with_history("SPY", bars_from(day(2020, 1, 1), &subject))
        // Starts three days later, so three subject windows have no partner.
        .with_history("VOO", bars_from(day(2020, 1, 4), &benchmark));
    let (_fake, dashboard) = dashboard_over(fake);
    dashboard.select("SPY").await;

    let view = dashboard.benchmark(1, " voo ").await;
    let comparison = view.data().expect("benchmark view");
    assert_eq!(comparison.labels, ["SPY".to_string(), "VOO".to_string()]);
    assert_eq!(comparison.comparison.points.len(), 260 - 252 - 3);
    let first = comparison.comparison.points[0];
    assert_eq!(first.date, day(2020, 1, 1) + chrono::Duration::days(255));
    assert!((first.subject - (355.0 / 103.0 - 1.0)).abs() < 1e-12);
    assert!((first.benchmark - (302.0 / 50.0 - 1.0)).abs() < 1e-12);
}

#[tokio::test]
async fn benchmark_needs_a_symbol_and_data() {
    let fake = healthy_fund().with_history("SPY", doubling_bars());
    let (_fake, dashboard) = dashboard_over(fake);
    dashboard.select("SPY").await;

    assert_eq!(
        dashboard.benchmark(1, "  ").await.message(),
        Some(BENCHMARK_SYMBOL_PROMPT)
    );
    let missing = dashboard.benchmark(1, "ZZZZ").await;
    assert!(missing.message().unwrap().starts_with("Error: "));
}

#[tokio::test]
async fn results_for_a_replaced_selection_are_superseded() {
    let gate = Arc::new(Notify::new());
    let fake = FakeMarketData {
        gate: Some(gate.clone()),
        ..healthy_fund().with_history("SPY", doubling_bars())
    };
    let (fake, dashboard) = dashboard_over(fake);
    let dashboard = Arc::new(dashboard);
    dashboard.state().submit("SPY");

    let pending = tokio::spawn({
        let dashboard = dashboard.clone();
        async move { dashboard.returns(1).await }
    });
    while fake.calls() == 0 {
        tokio::task::yield_now().await;
    }

    dashboard.state().submit("QQQ");
    gate.notify_one();

    let view = pending.await.unwrap();
    assert!(matches!(view, View::Superseded { .. }));
}

#[tokio::test]
async fn failed_fetches_for_a_replaced_selection_are_superseded() {
    let gate = Arc::new(Notify::new());
    let fake = FakeMarketData {
        composition: None,
        gate: Some(gate.clone()),
        ..healthy_fund()
    };
    let (fake, dashboard) = dashboard_over(fake);
    let dashboard = Arc::new(dashboard);
    dashboard.state().submit("OLD");

    let holdings = tokio::spawn({
        let dashboard = dashboard.clone();
        async move { dashboard.holdings(10).await }
    });
    let returns = tokio::spawn({
        let dashboard = dashboard.clone();
        async move { dashboard.returns(1).await }
    });
    let projection = tokio::spawn({
        let dashboard = dashboard.clone();
        async move { dashboard.projection(1, 100.0, Frequency::Yearly).await }
    });
    while fake.calls() < 3 {
        tokio::task::yield_now().await;
    }

    dashboard.state().submit("NEW");
    for _ in 0..3 {
        gate.notify_one();
        tokio::task::yield_now().await;
    }

    assert!(matches!(holdings.await.unwrap(), View::Superseded { .. }));
    assert!(matches!(returns.await.unwrap(), View::Superseded { .. }));
    assert!(matches!(projection.await.unwrap(), View::Superseded { .. }));
}
