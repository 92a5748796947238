// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `Scorer` capability: classify ticket text into a category and an
//! urgency score. The real classifier is treated as an external
//! collaborator; [`BaselineScorer`] is the deterministic keyword fallback
//! the breaker falls back to, and [`RemoteScorer`] is the pluggable
//! HTTP-delegating implementation for a real model service.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::Category;

#[derive(Debug)]
pub enum ScorerError {
    Transport(String),
    Timeout,
    Decode(String),
}

impl fmt::Display for ScorerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(msg) => write!(f, "scorer transport error: {msg}"),
            Self::Timeout => write!(f, "scorer call timed out"),
            Self::Decode(msg) => write!(f, "scorer response decode error: {msg}"),
        }
    }
}

impl std::error::Error for ScorerError {}

#[async_trait]
pub trait Scorer: Send + Sync {
    async fn score(&self, text: &str) -> Result<(Category, f64), ScorerError>;
}

const LEGAL_KEYWORDS: &[&str] =
    &["lawyer", "legal", "compliance", "gdpr", "contract", "lawsuit", "subpoena"];
const BILLING_KEYWORDS: &[&str] =
    &["invoice", "payment", "refund", "subscription", "charge", "billing", "credit card"];
const TECHNICAL_KEYWORDS: &[&str] =
    &["error", "bug", "crash", "login", "api", "broken", "not working", "down", "outage"];
const URGENCY_KEYWORDS: &[&str] = &[
    "asap",
    "urgent",
    "critical",
    "broken",
    "down",
    "outage",
    "emergency",
    "immediately",
    "high priority",
    "p0",
    "as soon as possible",
];

/// Case-insensitive keyword scan, precedence Legal > Billing > Technical,
/// default Technical. Used both as the breaker's degraded path and as the
/// baseline category source after a flash-flood skip (neither consult
/// [`RemoteScorer`]).
pub struct BaselineScorer;

impl BaselineScorer {
    pub fn categorize(text: &str) -> Category {
        let lower = text.to_lowercase();
        if LEGAL_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
            Category::Legal
        } else if BILLING_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
            Category::Billing
        } else if TECHNICAL_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
            Category::Technical
        } else {
            Category::Technical
        }
    }

    pub fn get_urgency(text: &str) -> f64 {
        let lower = text.to_lowercase();
        if URGENCY_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
            1.0
        } else {
            0.0
        }
    }
}

#[async_trait]
impl Scorer for BaselineScorer {
    async fn score(&self, text: &str) -> Result<(Category, f64), ScorerError> {
        Ok((Self::categorize(text), Self::get_urgency(text)))
    }
}

#[derive(Serialize)]
struct RemoteScorerRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct RemoteScorerResponse {
    category: Category,
    urgency: f64,
}

/// Delegates classification to an HTTP model service. Any transport error,
/// timeout, or malformed response surfaces as a [`ScorerError`] so the
/// worker can fall back to the baseline for this ticket.
pub struct RemoteScorer {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl RemoteScorer {
    pub fn new(url: String) -> Self {
        Self::with_timeout(url, Duration::from_secs(2))
    }

    pub fn with_timeout(url: String, timeout: Duration) -> Self {
        Self { client: reqwest::Client::new(), url, timeout }
    }
}

#[async_trait]
impl Scorer for RemoteScorer {
    async fn score(&self, text: &str) -> Result<(Category, f64), ScorerError> {
        let request = self.client.post(&self.url).timeout(self.timeout).json(&RemoteScorerRequest { text });

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ScorerError::Timeout
            } else {
                ScorerError::Transport(e.to_string())
            }
        })?;

        let body: RemoteScorerResponse =
            response.json().await.map_err(|e| ScorerError::Decode(e.to_string()))?;

        Ok((body.category, body.urgency.clamp(0.0, 1.0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legal_precedes_billing() {
        let category = BaselineScorer::categorize("Please contact our lawyer about this invoice");
        assert_eq!(category, Category::Legal);
    }

    #[test]
    fn billing_precedes_technical() {
        let category = BaselineScorer::categorize("refund request, the api error is unrelated");
        assert_eq!(category, Category::Billing);
    }

    #[test]
    fn defaults_to_technical() {
        let category = BaselineScorer::categorize("hello, just saying hi");
        assert_eq!(category, Category::Technical);
    }

    #[test]
    fn urgency_matches_keyword_list() {
        assert_eq!(BaselineScorer::get_urgency("this is urgent, please help"), 1.0);
        assert_eq!(BaselineScorer::get_urgency("P0 outage on login"), 1.0);
        assert_eq!(BaselineScorer::get_urgency("just a general question"), 0.0);
    }
}
