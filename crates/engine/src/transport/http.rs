// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use tracing::{info, warn};

use crate::consumer;
use crate::error::AppError;
use crate::ingest::IngestController;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SubmitTicketRequest {
    #[serde(default)]
    pub ticket_id: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

pub async fn submit_ticket(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SubmitTicketRequest>,
) -> Response {
    let controller = IngestController::new(Arc::clone(&state.broker), state.config.clone());
    match controller.admit(req.ticket_id, req.subject, req.body, req.description).await {
        Ok(record) => {
            info!(ticket_id = %record.ticket_id, "ticket admitted");
            (StatusCode::ACCEPTED, Json(record)).into_response()
        }
        Err(err @ AppError::Validation) => err.to_http_response("no text field present").into_response(),
        Err(err @ AppError::SubmitLockExhausted) => {
            warn!("submit lock exhausted, rejecting admission");
            err.to_http_response("system busy, retry later").into_response()
        }
        Err(err) => err.to_http_response("unexpected ingest error").into_response(),
    }
}

pub async fn ticket_status(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    match state.broker.get_status(&id).await {
        Some(status) => Json(status).into_response(),
        None => AppError::TicketNotFound.to_http_response(format!("no ticket {id}")).into_response(),
    }
}

pub async fn next_ticket(State(state): State<Arc<AppState>>) -> Response {
    match consumer::pop_next_ready(&state.broker).await {
        Ok(status) => Json(status).into_response(),
        Err(err) => err.to_http_response("ready index is empty").into_response(),
    }
}

pub async fn queue(State(state): State<Arc<AppState>>) -> Response {
    Json(consumer::list_queue(&state.broker).await).into_response()
}

pub async fn health() -> Response {
    Json(serde_json::json!({ "status": "ok" })).into_response()
}
