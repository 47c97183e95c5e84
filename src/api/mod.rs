//! REST API over a completed analysis run.
//!
//! Provides four GET endpoints:
//! - `/report`: full report bundle
//! - `/kpis`: KPI set, or 404 when the run had no valid readings
//! - `/daily`: daily rollup with optional date range filtering
//! - `/hourly`: 24-bucket hourly profile

mod handlers;
mod types;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tracing::info;

use crate::runner::AuditRun;

pub use types::{DailyQuery, ErrorResponse};

/// Immutable application state shared across all request handlers.
///
/// Built once after the analysis completes and wrapped in `Arc`; the data is
/// read-only so handlers need no locks.
pub struct AppState {
    /// The analysis run being served.
    pub run: AuditRun,
}

/// Builds the axum router with all API routes.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/report", get(handlers::get_report))
        .route("/kpis", get(handlers::get_kpis))
        .route("/daily", get(handlers::get_daily))
        .route("/hourly", get(handlers::get_hourly))
        .with_state(state)
}

/// Binds to the given address and serves the API until the process stops.
///
/// # Errors
///
/// Returns an I/O error if the listener cannot bind or the server fails.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> std::io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "API server listening");
    axum::serve(listener, app).await
}
