// src/handlers/benchmarking.rs
use log::{error, info};
use serde::Deserialize;
use std::sync::Arc;
use warp::{Rejection, Reply};

use super::analysis::{check_years, default_years};
use super::error::ApiError;
use crate::models::Frequency;
use crate::services::benchmark::to_csv;
use crate::services::dashboard::Dashboard;
use crate::services::views::View;

pub const DEFAULT_AMOUNT: f64 = 100.0;

fn default_amount() -> f64 {
    DEFAULT_AMOUNT
}

fn default_frequency() -> Frequency {
    Frequency::Yearly
}

#[derive(Debug, Deserialize)]
pub struct ProjectionQuery {
    #[serde(default = "default_years")]
    pub years: u32,
    #[serde(default = "default_amount")]
    pub amount: f64,
    #[serde(default = "default_frequency")]
    pub frequency: Frequency,
}

#[derive(Debug, Deserialize)]
pub struct BenchmarkQuery {
    #[serde(default = "default_years")]
    pub years: u32,
    #[serde(default)]
    pub benchmark: String,
    pub format: Option<String>,
}

pub async fn get_projection(query: ProjectionQuery, dashboard: Arc<Dashboard>) -> Result<impl Reply, Rejection> {
    info!(
        "Handling projection request: {} years, {} {:?}",
        query.years, query.amount, query.frequency
    );
    check_years(query.years)?;
    if !query.amount.is_finite() || query.amount < 0.0 {
        return Err(warp::reject::custom(ApiError::bad_request(
            "amount must be a non-negative number",
        )));
    }

    let view = dashboard
        .projection(query.years, query.amount, query.frequency)
        .await;
    Ok(warp::reply::json(&view))
}

pub async fn get_benchmark(query: BenchmarkQuery, dashboard: Arc<Dashboard>) -> Result<Box<dyn Reply>, Rejection> {
    info!(
        "Handling benchmark request against '{}' over {} years",
        query.benchmark, query.years
    );
    check_years(query.years)?;
    let as_csv = match query.format.as_deref().map(str::to_ascii_lowercase).as_deref() {
        None | Some("json") => false,
        Some("csv") => true,
        Some(other) => {
            return Err(warp::reject::custom(ApiError::bad_request(format!(
                "unsupported format '{}' (expected json or csv)",
                other
            ))))
        }
    };

    let view = dashboard.benchmark(query.years, &query.benchmark).await;
    match (&view, as_csv) {
        (View::Ready { data }, true) => {
            let body = to_csv(&data.comparison).map_err(|e| {
                error!("Failed to render benchmark CSV: {:#}", e);
                warp::reject::custom(ApiError::internal(e.to_string()))
            })?;
            Ok(Box::new(warp::reply::with_header(
                body,
                "content-type",
                "text/csv; charset=utf-8",
            )))
        }
        _ => Ok(Box::new(warp::reply::json(&view))),
    }
}
