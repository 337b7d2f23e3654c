//! botwatch -- hour-by-bot status matrix for scheduled automation flows.
//!
//! The core pipeline (normalize, project heuristic, matrix builder) is pure
//! and synchronous. Record sources, the CLI and the HTTP API sit around it.

pub mod analysis;
pub mod api;
pub mod config;
pub mod dashboard;
pub mod matrix;
pub mod records;
pub mod render;
pub mod source;
pub mod storage;

use anyhow::{Context, Result};

use crate::config::DashboardConfig;
use crate::source::mapping::FlowMapping;

/// Start the HTTP server on `bind`, serving views of the configured source.
pub async fn serve(config: DashboardConfig, bind: &str) -> Result<()> {
    let source = source::from_config(&config.source)?;
    let mapping = FlowMapping::load_or_empty(&config.mapping.path);
    tracing::info!(source = %source.describe(), mapped_flows = mapping.len(), "record source ready");

    let addr: std::net::SocketAddr = bind
        .parse()
        .with_context(|| format!("invalid bind address: {}", bind))?;
    let app = api::router(api::state::AppState::new(config, source, mapping));

    tracing::info!(%addr, "botwatch listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
