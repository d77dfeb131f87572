// src/services/benchmark.rs
use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::HashMap;

use crate::models::{AlignedReturn, PriceBar, ReturnPoint, TickerSymbol};
use crate::services::metrics::rolling_returns;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkComparison {
    pub subject: TickerSymbol,
    pub benchmark: TickerSymbol,
    pub years: u32,
    pub points: Vec<AlignedReturn>,
}

/// Inner join on date. Only dates present on both sides survive, in the
/// subject's order.
pub fn align_returns(subject: &[ReturnPoint], benchmark: &[ReturnPoint]) -> Vec<AlignedReturn> {
    let by_date: HashMap<_, f64> = benchmark.iter().map(|p| (p.date, p.value)).collect();

    subject
        .iter()
        .filter_map(|p| {
            by_date.get(&p.date).map(|b| AlignedReturn {
                date: p.date,
                subject: p.value,
                benchmark: *b,
            })
        })
        .collect()
}

pub fn compare(
    subject: &TickerSymbol,
    subject_bars: &[PriceBar],
    benchmark: &TickerSymbol,
    benchmark_bars: &[PriceBar],
    years: u32,
) -> BenchmarkComparison {
    let subject_returns: Vec<ReturnPoint> = rolling_returns(subject_bars, years).collect();
    let benchmark_returns: Vec<ReturnPoint> = rolling_returns(benchmark_bars, years).collect();

    BenchmarkComparison {
        subject: subject.clone(),
        benchmark: benchmark.clone(),
        years,
        points: align_returns(&subject_returns, &benchmark_returns),
    }
}

/// `date,<subject>,<benchmark>` rows for chart tooling.
pub fn to_csv(comparison: &BenchmarkComparison) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "date",
        comparison.subject.as_str(),
        comparison.benchmark.as_str(),
    ])?;
    for point in &comparison.points {
        wtr.write_record([
            point.date.format("%Y-%m-%d").to_string(),
            point.subject.to_string(),
            point.benchmark.to_string(),
        ])?;
    }
    let bytes = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(bytes).context("CSV output is not valid UTF-8")
}
