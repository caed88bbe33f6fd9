//! API server: serves the contact-group REST surface and the metrics exporter.

use crate::groups_rest;
use crate::rest::{self, AppState};
use axum::routing::{get, post};
use axum::Router;
use mailreach_core::config::AppConfig;
use mailreach_segmentation::SegmentationEngine;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Build the application router over shared state.
pub fn router(state: AppState) -> Router {
    Router::new()
        // Contact groups
        .route("/v1/contact-groups", get(groups_rest::handle_list_groups))
        .route(
            "/v1/contact-groups/recipients",
            post(groups_rest::handle_resolve_recipients),
        )
        .route(
            "/v1/contact-groups/refresh",
            post(groups_rest::handle_refresh_cache),
        )
        .route("/v1/contact-groups/cache", get(groups_rest::handle_cache_status))
        .route(
            "/v1/contact-groups/:id/contacts",
            get(groups_rest::handle_group_contacts),
        )
        // Operational endpoints
        .route("/health", get(rest::health_check))
        .route("/ready", get(rest::readiness))
        .route("/live", get(rest::liveness))
        // Middleware
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub struct ApiServer {
    config: AppConfig,
    engine: Arc<SegmentationEngine>,
}

impl ApiServer {
    pub fn new(config: AppConfig, engine: Arc<SegmentationEngine>) -> Self {
        Self { config, engine }
    }

    /// Start the HTTP REST server.
    pub async fn start_http(&self) -> anyhow::Result<()> {
        let app = router(AppState {
            engine: self.engine.clone(),
            node_id: self.config.node_id.clone(),
            start_time: Instant::now(),
        });

        let addr = SocketAddr::new(self.config.api.host.parse()?, self.config.api.http_port);

        info!(addr = %addr, "Starting HTTP server");

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }

    /// Start the metrics server on a separate port.
    pub fn start_metrics(&self) -> anyhow::Result<()> {
        metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(SocketAddr::new(
                self.config.api.host.parse()?,
                self.config.metrics.port,
            ))
            .install()?;

        info!(port = self.config.metrics.port, "Metrics exporter started");
        Ok(())
    }
}
