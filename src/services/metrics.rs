// src/services/metrics.rs
use log::warn;
use serde::Serialize;

use crate::models::{FundComposition, Holding, PriceBar, ReturnPoint, ReturnStats, NOT_AVAILABLE};

/// Approximate number of trading sessions in a year.
pub const TRADING_DAYS_PER_YEAR: usize = 252;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedWeight {
    pub rank: usize,
    pub label: String,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedWeights {
    pub rows: Vec<RankedWeight>,
    /// Sum of the kept weights, i.e. the share of the portfolio they represent.
    pub coverage: f64,
}

pub fn window_len(years: u32) -> usize {
    years as usize * TRADING_DAYS_PER_YEAR
}

/// `ask - bid` rounded to three decimals, or `None` when either side is missing.
pub fn spread(bid: Option<f64>, ask: Option<f64>) -> Option<f64> {
    match (bid, ask) {
        (Some(bid), Some(ask)) => Some(round_to(ask - bid, 3)),
        _ => None,
    }
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

pub fn format_volume(volume: Option<u64>) -> String {
    match volume {
        Some(v) => group_digits(&v.to_string()),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// Fixed-point rendering with comma thousands separators, e.g. `1,234.50`.
pub fn format_grouped(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (formatted.as_str(), None),
    };
    let mut out = String::new();
    if value < 0.0 {
        out.push('-');
    }
    out.push_str(&group_digits(int_part));
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

pub fn format_money(value: f64) -> String {
    format!("${}", format_grouped(value, 2))
}

/// Renders a fraction as a percentage with two decimals (`0.1234` -> `12.34%`).
pub fn format_percent(fraction: f64) -> String {
    format!("{:.2}%", fraction * 100.0)
}

fn group_digits(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Ranks `(label, weight)` pairs by weight descending and keeps ranks `1..=n`.
/// Equal weights keep their source order.
pub fn rank_by_weight<I>(items: I, n: usize) -> RankedWeights
where
    I: IntoIterator<Item = (String, f64)>,
{
    let mut sorted: Vec<(String, f64)> = items.into_iter().collect();
    sorted.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    let rows: Vec<RankedWeight> = sorted
        .into_iter()
        .take(n)
        .enumerate()
        .map(|(i, (label, weight))| RankedWeight {
            rank: i + 1,
            label,
            weight,
        })
        .collect();
    let coverage = rows.iter().map(|row| row.weight).sum();

    RankedWeights { rows, coverage }
}

pub fn top_n_by_weight(holdings: &[Holding], n: usize) -> RankedWeights {
    rank_by_weight(
        holdings.iter().map(|h| (h.symbol.clone(), h.weight)),
        n,
    )
}

pub fn top_sectors(composition: &FundComposition, n: usize) -> RankedWeights {
    rank_by_weight(composition.sector_weights.iter().cloned(), n)
}

/// Percent change of the close over a trailing `years * 252` session window.
///
/// Yields one point per bar that has a full window behind it, so the sequence
/// has `max(0, len - window)` elements. Bars are expected in date order.
pub fn rolling_returns(bars: &[PriceBar], years: u32) -> impl Iterator<Item = ReturnPoint> + '_ {
    let window = window_len(years);
    bars.iter()
        .zip(bars.iter().skip(window))
        .map(|(start, end)| ReturnPoint {
            date: end.date,
            value: end.close / start.close - 1.0,
        })
}

fn calculate_average(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Mean and sample standard deviation over the finite entries.
/// `None` when there is nothing to average.
pub fn mean_and_std_dev<I>(returns: I) -> Option<ReturnStats>
where
    I: IntoIterator<Item = f64>,
{
    let values: Vec<f64> = returns.into_iter().filter(|v| v.is_finite()).collect();
    if values.is_empty() {
        warn!("No finite returns available for mean/std-dev");
        return None;
    }

    let mean = calculate_average(&values);
    let std_dev = if values.len() < 2 {
        None
    } else {
        let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
        Some((sum_sq / (values.len() - 1) as f64).sqrt())
    };

    Some(ReturnStats { mean, std_dev })
}
