// src/services/projection.rs
use log::{debug, warn};

use crate::models::{Frequency, InvestmentProjection, PriceBar};
use crate::services::error::ComputationGap;
use crate::services::metrics::{rolling_returns, window_len, TRADING_DAYS_PER_YEAR};

/// Annualizes the *largest* rolling return seen over the history:
/// `max^(252 / (years * 252)) - 1`.
///
/// Uses the maximum rather than the mean or a CAGR, and the raw return rather
/// than `1 + return` as the base. Kept as-is pending a product decision.
pub fn annualized_return(bars: &[PriceBar], years: u32) -> Result<f64, ComputationGap> {
    let max_return = rolling_returns(bars, years)
        .map(|point| point.value)
        .filter(|v| !v.is_nan())
        .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |m| m.max(v))));

    let max_return = match max_return {
        Some(v) => v,
        None => {
            warn!(
                "Cannot annualize: {} bars for a {}-year window",
                bars.len(),
                years
            );
            return Err(ComputationGap::InsufficientHistory {
                years,
                available: bars.len(),
                required: window_len(years),
            });
        }
    };

    let exponent = TRADING_DAYS_PER_YEAR as f64 / window_len(years) as f64;
    let annualized = max_return.powf(exponent) - 1.0;
    debug!(
        "Max {}-year rolling return {} annualizes to {}",
        years, max_return, annualized
    );

    if annualized.is_finite() {
        Ok(annualized)
    } else {
        Err(ComputationGap::UndefinedReturn(max_return))
    }
}

/// Future value of equal end-of-period contributions (ordinary annuity).
pub fn future_value(
    years: u32,
    contribution: f64,
    frequency: Frequency,
    annualized_return: f64,
) -> InvestmentProjection {
    let n = frequency.periods_per_year() as f64;
    let periods = years as f64 * n;
    let total_contributed = contribution * periods;

    let (future_value, net_gain) = if annualized_return == 0.0 {
        (total_contributed, 0.0)
    } else {
        let rate = annualized_return / n;
        let fv = contribution * (((1.0 + rate).powf(periods) - 1.0) / rate);
        (fv, fv - total_contributed)
    };

    InvestmentProjection {
        years,
        contribution,
        frequency,
        annualized_return,
        future_value,
        total_contributed,
        net_gain,
    }
}
