// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP surface: assembles the axum router over shared [`crate::state::AppState`].

mod http;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/tickets", post(http::submit_ticket))
        .route("/tickets/{id}/status", get(http::ticket_status))
        .route("/tickets/next", get(http::next_ticket))
        .route("/queue", get(http::queue))
        .route("/health", get(http::health))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
