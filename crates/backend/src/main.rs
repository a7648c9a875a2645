use axum::http::{header, Method};
use axum::middleware;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

use backend::dashboards::d100_sales_returns::{DatasetCache, LoadError, SalesLoader};
use backend::routes::{self, AppState};
use backend::shared::config;
use backend::system;
use backend::usecases::u100_build_sales_db;

const USAGE: &str = "Usage: backend [build-db]";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    system::tracing::initialize()?;

    let config = config::load_config()?;

    match std::env::args().nth(1).as_deref() {
        None => {}
        Some("build-db") => {
            u100_build_sales_db::executor::execute(&config.data).await?;
            return Ok(());
        }
        Some(other) => anyhow::bail!("Unknown command: {}. {}", other, USAGE),
    }

    // Load once at startup; handlers share the cached table
    let cache = Arc::new(DatasetCache::new(SalesLoader::from_config(&config.data)));
    match cache.get().await {
        Ok(table) => tracing::info!(
            "Sales data ready: {} rows (synthetic dates: {})",
            table.len(),
            table.synthetic_dates
        ),
        Err(LoadError::NoData) => tracing::error!(
            "{} Dashboard endpoints will answer 404 until data is added.",
            LoadError::NoData
        ),
        Err(e) => tracing::error!("Failed to load sales data: {}", e),
    }

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    let app = routes::configure_routes(AppState { cache })
        .fallback_service(ServeDir::new("dist"))
        .layer(middleware::from_fn(
            system::middleware::request_logger::request_logger,
        ))
        .layer(cors);

    let port = config.server.port;
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();

    tracing::info!("Attempting to bind server to http://{}", addr);
    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => {
            tracing::info!("Server successfully bound to {}", addr);
            listener
        }
        Err(e) => {
            if e.kind() == std::io::ErrorKind::AddrInUse {
                tracing::error!(
                    "Error: Port {} is already in use. Please ensure no other process is using this port.",
                    port
                );
            } else {
                tracing::error!("Failed to bind to port {}. Error: {}", port, e);
            }
            // Propagate the error to stop the application
            return Err(e.into());
        }
    };

    axum::serve(listener, app).await?;

    Ok(())
}
