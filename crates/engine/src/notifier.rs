// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `Notifier` capability: fire-and-forget high-urgency alerts. Invoked
//! when `urgency_score > 0.8`.

use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, warn};

use crate::domain::Category;

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify_high_urgency(&self, ticket_id: &str, urgency_score: f64, category: Category, text: &str);
}

/// First 200 characters of `text`, newlines collapsed to spaces.
pub fn text_preview(text: &str) -> String {
    let collapsed: String = text.chars().map(|c| if c == '\n' || c == '\r' { ' ' } else { c }).collect();
    collapsed.chars().take(200).collect()
}

/// Suppresses external calls entirely — the default when no webhook URL is
/// configured. Still logs, so a high-urgency event is visible in the
/// process logs even without a configured sink.
pub struct NullNotifier;

#[async_trait]
impl Notifier for NullNotifier {
    async fn notify_high_urgency(
        &self,
        ticket_id: &str,
        urgency_score: f64,
        _category: Category,
        _text: &str,
    ) {
        info!(ticket_id, urgency_score, "high-urgency notification suppressed, no webhook configured");
    }
}

#[derive(Serialize)]
struct WebhookPayload<'a> {
    ticket_id: &'a str,
    urgency_score: f64,
    category: Category,
    text_preview: String,
}

pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: String) -> Self {
        Self { client: reqwest::Client::new(), url }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify_high_urgency(&self, ticket_id: &str, urgency_score: f64, category: Category, text: &str) {
        let payload =
            WebhookPayload { ticket_id, urgency_score, category, text_preview: text_preview(text) };
        if let Err(err) = self.client.post(&self.url).json(&payload).send().await {
            warn!(ticket_id, %err, "high-urgency notification delivery failed");
        }
    }
}
