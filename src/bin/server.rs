//! Process entry point for the timetable solver's HTTP surface.
//!
//! Configuration is environment-variable driven (`HOST`, `PORT`, `RUST_LOG`)
//! — no config file format, since a single process serves a single
//! weekly-cycle workload.

use std::net::SocketAddr;

use timetable_solver::http::{router, AppState};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8000);
    let addr: SocketAddr = format!("{host}:{port}").parse()?;

    let app = router(AppState::new());
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "timetable solver listening");
    axum::serve(listener, app).await?;
    Ok(())
}
