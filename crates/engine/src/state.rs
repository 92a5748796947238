// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared state handed to every HTTP handler behind `Arc<AppState>`.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::broker::Broker;
use crate::config::EngineConfig;
use crate::router::AgentRouter;

pub struct AppState {
    pub broker: Arc<dyn Broker>,
    pub router: Arc<AgentRouter>,
    pub config: EngineConfig,
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(
        broker: Arc<dyn Broker>,
        router: Arc<AgentRouter>,
        config: EngineConfig,
        shutdown: CancellationToken,
    ) -> Self {
        Self { broker, router, config, shutdown }
    }
}
