// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Processing worker: consumes the queue and orchestrates breaker → Scorer
//! → dedup → agent router for each ticket, one at a time. Each worker owns
//! its own [`CircuitBreaker`] and [`DedupWindow`] — both are worker-local by
//! design (see the dedup module's design note).

use std::sync::Arc;
use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::breaker::{CircuitBreaker, EXCEPTION_LATENCY_MS};
use crate::broker::Broker;
use crate::config::EngineConfig;
use crate::dedup::DedupWindow;
use crate::domain::{Category, QueueMessage, TicketStatus};
use crate::notifier::Notifier;
use crate::router::AgentRouter;
use crate::scorer::{BaselineScorer, Scorer};

pub struct ProcessingWorker {
    broker: Arc<dyn Broker>,
    router: Arc<AgentRouter>,
    scorer: Arc<dyn Scorer>,
    notifier: Arc<dyn Notifier>,
    config: EngineConfig,
    shutdown: CancellationToken,
    breaker: CircuitBreaker,
    dedup: DedupWindow,
}

impl ProcessingWorker {
    pub fn new(
        broker: Arc<dyn Broker>,
        router: Arc<AgentRouter>,
        scorer: Arc<dyn Scorer>,
        notifier: Arc<dyn Notifier>,
        config: EngineConfig,
        shutdown: CancellationToken,
    ) -> Self {
        Self { broker, router, scorer, notifier, config, shutdown, breaker: CircuitBreaker::new(), dedup: DedupWindow::new() }
    }

    /// Poll-dequeue loop. A timeout tick is not an error — it exists so a
    /// pending shutdown is noticed between tickets. A ticket already being
    /// processed always runs to completion.
    pub async fn run(mut self) {
        loop {
            if self.shutdown.is_cancelled() {
                return;
            }
            match self.broker.dequeue(self.config.dequeue_timeout()).await {
                Some(msg) => self.process_ticket(msg).await,
                None => continue,
            }
        }
    }

    async fn process_ticket(&mut self, msg: QueueMessage) {
        let ticket_id = msg.ticket_id.clone();
        if ticket_id.trim().is_empty() {
            warn!("dropping queue message with missing ticket_id");
            return;
        }

        if !self.broker.acquire_processing_lock(&ticket_id).await {
            debug!(ticket_id, "processing lock denied, dropping message");
            return;
        }

        let text = if !msg.combined_text.trim().is_empty() {
            msg.combined_text.clone()
        } else {
            [&msg.subject, &msg.body, &msg.description]
                .into_iter()
                .filter_map(|f| f.as_deref())
                .collect::<Vec<_>>()
                .join(" ")
        };

        let mut status =
            self.broker.get_status(&ticket_id).await.unwrap_or_else(|| TicketStatus::from_queue_message(&msg));
        status.mark_processing();
        self.broker.set_status(&ticket_id, status.clone()).await;

        let (category, urgency_score) = self.classify(&text).await;

        let flood = self.dedup.is_flash_flood(&ticket_id, &text);
        if flood {
            status.mark_master_incident(category, urgency_score);
            self.broker.set_status(&ticket_id, status).await;
            info!(ticket_id, "flash flood detected, terminating in master_incident");
            self.broker.release_processing_lock(&ticket_id).await;
            return;
        }

        let assigned_agent = self.router.select(category).await.unwrap_or_else(|| "unassigned".to_owned());
        status.mark_completed(category, urgency_score, assigned_agent);
        self.broker.set_status(&ticket_id, status).await;
        self.broker.ready_add(&ticket_id, urgency_score).await;

        if urgency_score > self.config.urgency_notify_threshold {
            self.notifier.notify_high_urgency(&ticket_id, urgency_score, category, &text).await;
        }

        self.broker.release_processing_lock(&ticket_id).await;
    }

    /// Breaker-gated classification. Falls back to the deterministic
    /// keyword baseline when the breaker denies the call or the Scorer
    /// raises.
    async fn classify(&self, text: &str) -> (Category, f64) {
        if self.breaker.allow() {
            let start = Instant::now();
            match self.scorer.score(text).await {
                Ok((category, urgency)) => {
                    let latency_ms = start.elapsed().as_millis() as u64;
                    self.breaker.record(latency_ms);
                    (category, urgency.clamp(0.0, 1.0))
                }
                Err(err) => {
                    warn!(%err, "scorer call failed, falling back to baseline");
                    self.breaker.record(EXCEPTION_LATENCY_MS);
                    (BaselineScorer::categorize(text), BaselineScorer::get_urgency(text))
                }
            }
        } else {
            (BaselineScorer::categorize(text), BaselineScorer::get_urgency(text))
        }
    }
}
