// src/handlers/ticker.rs
use log::info;
use serde::Deserialize;
use std::sync::Arc;
use warp::reply::Json;
use warp::Rejection;

use crate::services::dashboard::Dashboard;

#[derive(Debug, Deserialize)]
pub struct TickerRequest {
    #[serde(default)]
    pub symbol: String,
}

pub async fn submit_ticker(request: TickerRequest, dashboard: Arc<Dashboard>) -> Result<Json, Rejection> {
    info!("Handling ticker submission '{}'", request.symbol);
    let tab = dashboard.select(&request.symbol).await;
    Ok(warp::reply::json(&tab))
}

pub async fn get_selection(dashboard: Arc<Dashboard>) -> Result<Json, Rejection> {
    Ok(warp::reply::json(&dashboard.state().current()))
}
