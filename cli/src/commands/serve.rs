//! HTTP boundary.
//!
//! `GET /tree?v=<host>&v=<host>&f=<filter>` answers with the JSON array of
//! host trees, in the order the hosts were given. Without any `v` the request
//! is refused with `400` and an empty body before any naming service is
//! touched; a malformed `f` is refused with `400` and the reason.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use devtree_core::TreeBuilder;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::commands::BuildArgs;

const HOST_PARAM: &str = "v";
const FILTER_PARAM: &str = "f";

#[derive(Clone)]
pub struct AppState {
    pub builder: Arc<TreeBuilder>,
}

pub async fn serve(bind: SocketAddr, build: &BuildArgs) -> anyhow::Result<()> {
    let builder = Arc::new(build.tree_builder()?);
    let app = router(AppState { builder });

    let listener = TcpListener::bind(bind)
        .await
        .with_context(|| format!("cannot listen on {bind}"))?;
    info!("Serving device trees on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server stopped unexpectedly")
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/tree", get(device_tree))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Cannot listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

/// Query parameters of a tree request, repeated keys kept in order.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct TreeRequest {
    pub hosts: Vec<String>,
    pub filters: Vec<String>,
}

impl TreeRequest {
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut request = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                HOST_PARAM => request.hosts.push(value),
                FILTER_PARAM => request.filters.push(value),
                _ => {}
            }
        }
        request
    }
}

async fn device_tree(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Response {
    let request = TreeRequest::from_pairs(pairs);
    if request.hosts.is_empty() {
        return StatusCode::BAD_REQUEST.into_response();
    }

    match state
        .builder
        .build_for_hosts(&request.hosts, &request.filters)
        .await
    {
        Ok(trees) => Json(trees).into_response(),
        Err(e) => {
            warn!("Rejecting tree request: {e}");
            (StatusCode::BAD_REQUEST, e.to_string()).into_response()
        }
    }
}

async fn health() -> &'static str {
    "ok"
}
