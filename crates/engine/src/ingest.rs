// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Admission protocol: validate, acquire the submit lock (with linear
//! backoff), write the initial status, and enqueue for a worker.

use std::sync::Arc;

use serde::Serialize;
use tokio::time::sleep;

use crate::broker::Broker;
use crate::config::EngineConfig;
use crate::domain::{epoch_secs, QueueMessage, Ticket, TicketStatus};
use crate::error::AppError;

#[derive(Debug, Clone, Serialize)]
pub struct AcceptanceRecord {
    pub ticket_id: String,
    pub status: &'static str,
    pub status_url: String,
}

pub struct IngestController {
    broker: Arc<dyn Broker>,
    config: EngineConfig,
}

impl IngestController {
    pub fn new(broker: Arc<dyn Broker>, config: EngineConfig) -> Self {
        Self { broker, config }
    }

    pub async fn admit(
        &self,
        ticket_id: Option<String>,
        subject: Option<String>,
        body: Option<String>,
        description: Option<String>,
    ) -> Result<AcceptanceRecord, AppError> {
        if !Ticket::has_text(&subject, &body, &description) {
            return Err(AppError::Validation);
        }

        if !self.acquire_with_backoff().await {
            return Err(AppError::SubmitLockExhausted);
        }

        let ticket_id = ticket_id.unwrap_or_else(|| self.broker.generate_ticket_id());
        let created_at = epoch_secs();
        let combined_text = Ticket::combine_text(&subject, &body, &description);

        let ticket = Ticket {
            ticket_id: ticket_id.clone(),
            subject: subject.clone(),
            body: body.clone(),
            description: description.clone(),
            created_at,
            combined_text: combined_text.clone(),
        };

        self.broker.set_status(&ticket_id, TicketStatus::pending(&ticket)).await;
        self.broker.add_to_all_ids(&ticket_id).await;
        self.broker
            .enqueue(QueueMessage { ticket_id: ticket_id.clone(), subject, body, description, combined_text, created_at })
            .await;

        self.broker.release_submit_lock().await;

        Ok(AcceptanceRecord {
            ticket_id: ticket_id.clone(),
            status: "accepted",
            status_url: format!("/tickets/{ticket_id}/status"),
        })
    }

    async fn acquire_with_backoff(&self) -> bool {
        for attempt in 0..self.config.submit_lock_retries {
            if self.broker.acquire_submit_lock().await {
                return true;
            }
            sleep(std::time::Duration::from_secs_f64(0.05 * (attempt as f64 + 1.0))).await;
        }
        false
    }
}
