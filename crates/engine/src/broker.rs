// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable primitives the rest of the engine is built on: a FIFO queue, a
//! status map, an all-ids set, a priority ready index, a submit lock, and
//! per-ticket processing locks.
//!
//! `Broker` is a trait so the ingest/worker/consumer components depend only
//! on this interface, treating the backing store as an external
//! key-value/queue collaborator. `InMemoryBroker` is the shipped
//! implementation; a networked implementation (redis, etc.) would implement
//! the same trait without touching any caller.

use std::cmp::Ordering as CmpOrdering;
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify, RwLock};
use uuid::Uuid;

use crate::domain::{QueueMessage, TicketStatus};

pub const SUBMIT_LOCK_TTL: Duration = Duration::from_secs(5);
pub const PROCESSING_LOCK_TTL: Duration = Duration::from_secs(300);
pub const STATUS_TTL: Duration = Duration::from_secs(7 * 24 * 3_600);

/// Durable queue/store primitives consumed by ingest, workers, and the
/// consumer endpoints. All operations are total — transport failures of a
/// real backing store surface as a plain error the caller may retry.
#[async_trait]
pub trait Broker: Send + Sync {
    /// Opaque, globally unique ticket id (>= 64 bits of entropy).
    fn generate_ticket_id(&self) -> String {
        Uuid::new_v4().to_string()
    }

    async fn acquire_submit_lock(&self) -> bool;
    async fn release_submit_lock(&self);

    async fn enqueue(&self, msg: QueueMessage);
    async fn dequeue(&self, timeout: Duration) -> Option<QueueMessage>;

    async fn set_status(&self, id: &str, record: TicketStatus);
    async fn get_status(&self, id: &str) -> Option<TicketStatus>;

    async fn add_to_all_ids(&self, id: &str);
    async fn list_all_ids(&self) -> Vec<String>;

    async fn acquire_processing_lock(&self, id: &str) -> bool;
    async fn release_processing_lock(&self, id: &str);

    async fn ready_add(&self, id: &str, score: f64);
    async fn ready_pop_max(&self) -> Option<String>;
}

/// Total-ordered wrapper so `f64` urgency scores can key a `BTreeMap`.
/// Urgency scores are always finite (clamped to `[0, 1]` before storage),
/// so `total_cmp` gives a correct total order.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Score(f64);

impl Eq for Score {}

impl PartialOrd for Score {
    fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
        Some(self.cmp(other))
    }
}

impl Ord for Score {
    fn cmp(&self, other: &Self) -> CmpOrdering {
        self.0.total_cmp(&other.0)
    }
}

struct StatusEntry {
    record: TicketStatus,
    expires_at: Instant,
}

/// Single-process, in-memory implementation of [`Broker`]. Locks are
/// advisory: an expired holder may be supplanted by a new acquirer.
pub struct InMemoryBroker {
    queue: Mutex<VecDeque<QueueMessage>>,
    queue_notify: Notify,
    statuses: RwLock<HashMap<String, StatusEntry>>,
    all_ids: RwLock<HashSet<String>>,
    submit_lock: Mutex<Option<Instant>>,
    processing_locks: Mutex<HashMap<String, Instant>>,
    ready_index: Mutex<BTreeMap<Score, HashSet<String>>>,
    submit_lock_ttl: Duration,
    processing_lock_ttl: Duration,
    status_ttl: Duration,
}

impl Default for InMemoryBroker {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryBroker {
    pub fn new() -> Self {
        Self::with_ttls(SUBMIT_LOCK_TTL, PROCESSING_LOCK_TTL, STATUS_TTL)
    }

    pub fn with_ttls(
        submit_lock_ttl: Duration,
        processing_lock_ttl: Duration,
        status_ttl: Duration,
    ) -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            queue_notify: Notify::new(),
            statuses: RwLock::new(HashMap::new()),
            all_ids: RwLock::new(HashSet::new()),
            submit_lock: Mutex::new(None),
            processing_locks: Mutex::new(HashMap::new()),
            ready_index: Mutex::new(BTreeMap::new()),
            submit_lock_ttl,
            processing_lock_ttl,
            status_ttl,
        }
    }
}

#[async_trait]
impl Broker for InMemoryBroker {
    async fn acquire_submit_lock(&self) -> bool {
        let mut holder = self.submit_lock.lock().await;
        let now = Instant::now();
        let free = match *holder {
            None => true,
            Some(expires_at) => now >= expires_at,
        };
        if free {
            *holder = Some(now + self.submit_lock_ttl);
        }
        free
    }

    async fn release_submit_lock(&self) {
        *self.submit_lock.lock().await = None;
    }

    async fn enqueue(&self, msg: QueueMessage) {
        self.queue.lock().await.push_back(msg);
        self.queue_notify.notify_one();
    }

    async fn dequeue(&self, timeout: Duration) -> Option<QueueMessage> {
        let deadline = Instant::now() + timeout;
        loop {
            // Register interest before checking the queue so a concurrent
            // `enqueue` between the check and the wait can't be missed.
            let notified = self.queue_notify.notified();
            {
                let mut queue = self.queue.lock().await;
                if let Some(msg) = queue.pop_front() {
                    return Some(msg);
                }
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return None;
            }
            if tokio::time::timeout(remaining, notified).await.is_err() {
                return None;
            }
        }
    }

    async fn set_status(&self, id: &str, record: TicketStatus) {
        let expires_at = Instant::now() + self.status_ttl;
        self.statuses.write().await.insert(id.to_owned(), StatusEntry { record, expires_at });
    }

    async fn get_status(&self, id: &str) -> Option<TicketStatus> {
        let statuses = self.statuses.read().await;
        let entry = statuses.get(id)?;
        if Instant::now() >= entry.expires_at {
            return None;
        }
        Some(entry.record.clone())
    }

    async fn add_to_all_ids(&self, id: &str) {
        self.all_ids.write().await.insert(id.to_owned());
    }

    async fn list_all_ids(&self) -> Vec<String> {
        self.all_ids.read().await.iter().cloned().collect()
    }

    async fn acquire_processing_lock(&self, id: &str) -> bool {
        let mut locks = self.processing_locks.lock().await;
        let now = Instant::now();
        let free = match locks.get(id) {
            None => true,
            Some(expires_at) => now >= *expires_at,
        };
        if free {
            locks.insert(id.to_owned(), now + self.processing_lock_ttl);
        }
        free
    }

    async fn release_processing_lock(&self, id: &str) {
        self.processing_locks.lock().await.remove(id);
    }

    async fn ready_add(&self, id: &str, score: f64) {
        self.ready_index.lock().await.entry(Score(score)).or_default().insert(id.to_owned());
    }

    async fn ready_pop_max(&self) -> Option<String> {
        let mut index = self.ready_index.lock().await;
        let (&score, ids) = index.iter_mut().next_back()?;
        // `ids` iteration order is unspecified among equal scores, matching
        // the spec's "tie-break unspecified" contract.
        let id = ids.iter().next().cloned()?;
        ids.remove(&id);
        if ids.is_empty() {
            index.remove(&score);
        }
        Some(id)
    }
}
