// src/handlers/analysis.rs
use log::info;
use serde::Deserialize;
use std::sync::Arc;
use warp::reply::Json;
use warp::Rejection;

use super::error::ApiError;
use crate::services::dashboard::Dashboard;

pub const MAX_TOP_HOLDINGS: usize = 20;
pub const MAX_TOP_SECTORS: usize = 11;
pub const DEFAULT_TOP: usize = 10;
pub const DEFAULT_YEARS: u32 = 5;

fn default_top() -> usize {
    DEFAULT_TOP
}

pub(crate) fn default_years() -> u32 {
    DEFAULT_YEARS
}

#[derive(Debug, Deserialize)]
pub struct TopQuery {
    #[serde(default = "default_top")]
    pub top: usize,
}

#[derive(Debug, Deserialize)]
pub struct YearsQuery {
    #[serde(default = "default_years")]
    pub years: u32,
}

fn check_top(top: usize, max: usize) -> Result<(), Rejection> {
    if top == 0 || top > max {
        return Err(warp::reject::custom(ApiError::bad_request(format!(
            "top must be between 1 and {}, got {}",
            max, top
        ))));
    }
    Ok(())
}

pub(crate) fn check_years(years: u32) -> Result<(), Rejection> {
    if years == 0 {
        return Err(warp::reject::custom(ApiError::bad_request(
            "years must be at least 1",
        )));
    }
    Ok(())
}

pub async fn get_holdings(query: TopQuery, dashboard: Arc<Dashboard>) -> Result<Json, Rejection> {
    info!("Handling request for top {} holdings", query.top);
    check_top(query.top, MAX_TOP_HOLDINGS)?;
    Ok(warp::reply::json(&dashboard.holdings(query.top).await))
}

pub async fn get_sectors(query: TopQuery, dashboard: Arc<Dashboard>) -> Result<Json, Rejection> {
    info!("Handling request for top {} sectors", query.top);
    check_top(query.top, MAX_TOP_SECTORS)?;
    Ok(warp::reply::json(&dashboard.sectors(query.top).await))
}

pub async fn get_returns(query: YearsQuery, dashboard: Arc<Dashboard>) -> Result<Json, Rejection> {
    info!("Handling request for {}-year rolling returns", query.years);
    check_years(query.years)?;
    Ok(warp::reply::json(&dashboard.returns(query.years).await))
}
