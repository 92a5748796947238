// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ticketflow: asynchronous support-ticket ingestion and routing engine.

pub mod breaker;
pub mod broker;
pub mod config;
pub mod consumer;
pub mod dedup;
pub mod domain;
pub mod error;
pub mod ingest;
pub mod notifier;
pub mod router;
pub mod scorer;
pub mod state;
pub mod transport;
pub mod worker;

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::broker::InMemoryBroker;
use crate::config::EngineConfig;
use crate::notifier::{NullNotifier, WebhookNotifier};
use crate::router::{AgentRegistration, AgentRouter};
use crate::scorer::{BaselineScorer, RemoteScorer};
use crate::state::AppState;
use crate::transport::build_router;
use crate::worker::ProcessingWorker;

/// Run the engine until shutdown: binds the HTTP server and spawns the
/// configured number of processing workers against the shared broker.
pub async fn run(config: EngineConfig) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let shutdown = CancellationToken::new();

    let broker: Arc<dyn broker::Broker> = Arc::new(InMemoryBroker::new());
    let router = Arc::new(AgentRouter::new(default_agents()));

    let notifier: Arc<dyn notifier::Notifier> = match &config.notifier_webhook_url {
        Some(url) => Arc::new(WebhookNotifier::new(url.clone())),
        None => Arc::new(NullNotifier),
    };

    let scorer: Arc<dyn scorer::Scorer> = match &config.remote_scorer_url {
        Some(url) => Arc::new(RemoteScorer::new(url.clone())),
        None => Arc::new(BaselineScorer),
    };

    let state = Arc::new(AppState::new(
        Arc::clone(&broker),
        Arc::clone(&router),
        config.clone(),
        shutdown.clone(),
    ));

    for _ in 0..config.worker_count {
        let worker = ProcessingWorker::new(
            Arc::clone(&broker),
            Arc::clone(&router),
            Arc::clone(&scorer),
            Arc::clone(&notifier),
            config.clone(),
            shutdown.clone(),
        );
        tokio::spawn(worker.run());
    }

    tracing::info!(%addr, workers = config.worker_count, "ticketflow listening");
    let app = build_router(state);
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).with_graceful_shutdown(shutdown.cancelled_owned()).await?;

    Ok(())
}

/// Default agent roster used when no registry file is configured, so the
/// shipped binary is exercisable out of the box.
fn default_agents() -> Vec<AgentRegistration> {
    use crate::domain::Category;
    use std::collections::HashMap;

    fn skills(entries: &[(Category, f64)]) -> HashMap<Category, f64> {
        entries.iter().copied().collect()
    }

    vec![
        AgentRegistration {
            name: "agent-1".to_owned(),
            capacity: 5,
            skills: skills(&[(Category::Billing, 0.6), (Category::Technical, 0.9), (Category::Legal, 0.3)]),
        },
        AgentRegistration {
            name: "agent-2".to_owned(),
            capacity: 4,
            skills: skills(&[(Category::Billing, 0.5), (Category::Technical, 0.7), (Category::Legal, 0.4)]),
        },
        AgentRegistration {
            name: "agent-3".to_owned(),
            capacity: 5,
            skills: skills(&[(Category::Billing, 0.9), (Category::Technical, 0.4), (Category::Legal, 0.8)]),
        },
    ]
}
