// src/handlers/overview.rs
use log::info;
use std::sync::Arc;
use warp::reply::Json;
use warp::Rejection;

use crate::services::dashboard::Dashboard;

pub async fn get_overview(dashboard: Arc<Dashboard>) -> Result<Json, Rejection> {
    info!("Handling request to get the overview tab");
    let tab = dashboard.overview_tab().await;
    Ok(warp::reply::json(&tab))
}
