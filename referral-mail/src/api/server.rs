//! API Server - HTTP server for the REST API

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::handlers::{self, AppState};
use crate::api::{email, templates};
use crate::config::ServerConfig;
use crate::mailer::Mailer;
use crate::templates::TemplateStore;

/// API Server configuration
pub struct ApiServer {
    state: Arc<AppState>,
    addr: String,
    max_upload_bytes: usize,
}

impl ApiServer {
    /// Create a new API server
    pub fn new(
        store: Arc<dyn TemplateStore>,
        mailer: Arc<dyn Mailer>,
        config: &ServerConfig,
    ) -> Self {
        Self {
            state: Arc::new(AppState { store, mailer }),
            addr: config.listen_addr.clone(),
            max_upload_bytes: config.max_upload_bytes,
        }
    }

    /// Build the router with all routes
    pub fn router(&self) -> Router {
        build_router(self.state.clone(), self.max_upload_bytes)
    }

    /// Start the API server
    pub async fn run(&self) -> std::io::Result<()> {
        let router = self.router();

        info!("Starting API server on {}", self.addr);

        let listener = tokio::net::TcpListener::bind(&self.addr).await?;
        axum::serve(listener, router).await?;

        Ok(())
    }
}

pub fn build_router(state: Arc<AppState>, max_upload_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/templates",
            get(templates::list_templates).post(templates::create_template),
        )
        .route(
            "/templates/:id",
            get(templates::get_template)
                .put(templates::replace_template)
                .delete(templates::delete_template),
        )
        .route("/templates/:id/preview", post(templates::preview_template))
        .route("/email/send", post(email::send_email))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
