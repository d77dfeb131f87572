use anyhow::Result;
use dotenv::dotenv;
use log::info;
use std::net::SocketAddr;
use std::sync::Arc;
use warp::Filter;

use etf_dashboard::config::Settings;
use etf_dashboard::routes;
use etf_dashboard::services::dashboard::Dashboard;
use etf_dashboard::services::market_data::YahooClient;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    env_logger::init();
    info!("Logger initialized. Starting the application...");

    let settings = Settings::from_env()?;
    info!("Using PORT: {}", settings.port);
    info!("Market data from {}", settings.yahoo.query_url);

    let client = YahooClient::new(&settings.yahoo)?;
    let dashboard = Arc::new(Dashboard::new(Arc::new(client)));

    // Log every selection change for operators following along.
    let mut selections = dashboard.state().subscribe();
    tokio::spawn(async move {
        while selections.changed().await.is_ok() {
            let selection = selections.borrow_and_update().clone();
            match selection.symbol {
                Some(symbol) => info!("Dashboard now tracking {}", symbol),
                None => info!("Dashboard selection cleared"),
            }
        }
    });

    // Bind to 0.0.0.0 so the server is reachable from containers
    let addr: SocketAddr = ([0, 0, 0, 0], settings.port).into();
    info!("Will bind to: {}", addr);

    let cors = warp::cors()
        .allow_any_origin()
        .allow_header("content-type")
        .allow_methods(vec!["GET", "POST"]);

    let api = routes::routes(dashboard).with(cors);
    info!("Routes configured successfully with CORS.");

    info!("Starting server on {}", addr);
    warp::serve(api).run(addr).await;
    Ok(())
}
