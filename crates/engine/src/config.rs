// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

/// Configuration for the ticketflow engine.
#[derive(Debug, Clone, clap::Parser)]
pub struct EngineConfig {
    /// Host to bind on.
    #[arg(long, default_value = "127.0.0.1", env = "TICKETFLOW_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(long, default_value_t = 8080, env = "TICKETFLOW_PORT")]
    pub port: u16,

    /// Number of processing worker tasks to spawn.
    #[arg(long, default_value_t = 4, env = "TICKETFLOW_WORKERS")]
    pub worker_count: usize,

    /// Submit lock TTL in milliseconds.
    #[arg(long, default_value_t = 5_000, env = "TICKETFLOW_SUBMIT_LOCK_TTL_MS")]
    pub submit_lock_ttl_ms: u64,

    /// Per-ticket processing lock TTL in milliseconds.
    #[arg(long, default_value_t = 300_000, env = "TICKETFLOW_PROCESSING_LOCK_TTL_MS")]
    pub processing_lock_ttl_ms: u64,

    /// Status record TTL in seconds (7 days by default, per spec).
    #[arg(long, default_value_t = 7 * 24 * 3_600, env = "TICKETFLOW_STATUS_TTL_SECS")]
    pub status_ttl_secs: u64,

    /// Dequeue poll timeout in seconds, used by the worker loop between ticks.
    #[arg(long, default_value_t = 5, env = "TICKETFLOW_DEQUEUE_TIMEOUT_SECS")]
    pub dequeue_timeout_secs: u64,

    /// Maximum submit-lock acquisition attempts before failing with a
    /// transient-overload error.
    #[arg(long, default_value_t = 10, env = "TICKETFLOW_SUBMIT_LOCK_RETRIES")]
    pub submit_lock_retries: u32,

    /// Outbound webhook URL for high-urgency notifications. Unset suppresses
    /// external calls.
    #[arg(long, env = "TICKETFLOW_NOTIFIER_WEBHOOK_URL")]
    pub notifier_webhook_url: Option<String>,

    /// Urgency score above which a completed ticket triggers a notification.
    #[arg(long, default_value_t = 0.8, env = "TICKETFLOW_URGENCY_NOTIFY_THRESHOLD")]
    pub urgency_notify_threshold: f64,

    /// Optional URL of a remote classify-and-score service. When unset, the
    /// deterministic keyword baseline is used directly (no breaker needed).
    #[arg(long, env = "TICKETFLOW_REMOTE_SCORER_URL")]
    pub remote_scorer_url: Option<String>,
}

#[cfg(test)]
impl EngineConfig {
    /// Config with production defaults, for unit tests that need an
    /// `EngineConfig` without going through `clap::Parser::parse_from`.
    pub fn for_test() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 8080,
            worker_count: 1,
            submit_lock_ttl_ms: 5_000,
            processing_lock_ttl_ms: 300_000,
            status_ttl_secs: 7 * 24 * 3_600,
            dequeue_timeout_secs: 5,
            submit_lock_retries: 10,
            notifier_webhook_url: None,
            urgency_notify_threshold: 0.8,
            remote_scorer_url: None,
        }
    }
}

impl EngineConfig {
    pub fn submit_lock_ttl(&self) -> Duration {
        Duration::from_millis(self.submit_lock_ttl_ms)
    }

    pub fn processing_lock_ttl(&self) -> Duration {
        Duration::from_millis(self.processing_lock_ttl_ms)
    }

    pub fn status_ttl(&self) -> Duration {
        Duration::from_secs(self.status_ttl_secs)
    }

    pub fn dequeue_timeout(&self) -> Duration {
        Duration::from_secs(self.dequeue_timeout_secs)
    }
}
