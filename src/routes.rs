// src/routes.rs
use log::info;
use std::convert::Infallible;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::reject::Rejection;
use warp::{Filter, Reply};

use crate::handlers::analysis::{get_holdings, get_returns, get_sectors, TopQuery, YearsQuery};
use crate::handlers::benchmarking::{get_benchmark, get_projection, BenchmarkQuery, ProjectionQuery};
use crate::handlers::error::ApiError;
use crate::handlers::overview::get_overview;
use crate::handlers::ticker::{get_selection, submit_ticker};
use crate::services::dashboard::Dashboard;

const MAX_BODY_BYTES: u64 = 16 * 1024;

async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let code;
    let message;

    if err.is_not_found() {
        code = StatusCode::NOT_FOUND;
        message = "Not Found".to_string();
    } else if let Some(api_error) = err.find::<ApiError>() {
        code = api_error.status;
        message = api_error.message.clone();
    } else if let Some(e) = err.find::<warp::reject::InvalidQuery>() {
        code = StatusCode::BAD_REQUEST;
        message = e.to_string();
    } else if let Some(e) = err.find::<warp::body::BodyDeserializeError>() {
        code = StatusCode::BAD_REQUEST;
        message = e.to_string();
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        code = StatusCode::METHOD_NOT_ALLOWED;
        message = "Method Not Allowed".to_string();
    } else {
        code = StatusCode::INTERNAL_SERVER_ERROR;
        message = "Internal Server Error".to_string();
    }

    Ok(warp::reply::with_status(
        warp::reply::json(&serde_json::json!({
            "error": message,
        })),
        code,
    ))
}

pub fn routes(dashboard: Arc<Dashboard>) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
    info!("Configuring routes...");

    let dashboard_filter = warp::any().map(move || dashboard.clone());

    let health_route = warp::path!("api" / "v1" / "health")
        .and(warp::get())
        .map(|| "OK");

    let submit_ticker_route = warp::path!("api" / "v1" / "ticker")
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::json())
        .and(dashboard_filter.clone())
        .and_then(submit_ticker);

    let selection_route = warp::path!("api" / "v1" / "ticker")
        .and(warp::get())
        .and(dashboard_filter.clone())
        .and_then(get_selection);

    let overview_route = warp::path!("api" / "v1" / "overview")
        .and(warp::get())
        .and(dashboard_filter.clone())
        .and_then(get_overview);

    let holdings_route = warp::path!("api" / "v1" / "holdings")
        .and(warp::get())
        .and(warp::query::<TopQuery>())
        .and(dashboard_filter.clone())
        .and_then(get_holdings);

    let sectors_route = warp::path!("api" / "v1" / "sectors")
        .and(warp::get())
        .and(warp::query::<TopQuery>())
        .and(dashboard_filter.clone())
        .and_then(get_sectors);

    let returns_route = warp::path!("api" / "v1" / "returns")
        .and(warp::get())
        .and(warp::query::<YearsQuery>())
        .and(dashboard_filter.clone())
        .and_then(get_returns);

    let projection_route = warp::path!("api" / "v1" / "projection")
        .and(warp::get())
        .and(warp::query::<ProjectionQuery>())
        .and(dashboard_filter.clone())
        .and_then(get_projection);

    let benchmark_route = warp::path!("api" / "v1" / "benchmark")
        .and(warp::get())
        .and(warp::query::<BenchmarkQuery>())
        .and(dashboard_filter.clone())
        .and_then(get_benchmark);

    info!("All routes configured successfully.");

    health_route
        .or(submit_ticker_route)
        .or(selection_route)
        .or(overview_route)
        .or(holdings_route)
        .or(sectors_route)
        .or(returns_route)
        .or(projection_route)
        .or(benchmark_route)
        .recover(handle_rejection)
}
