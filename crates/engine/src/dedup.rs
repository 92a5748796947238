// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sliding-window semantic de-duplication ("flash flood" detector).
//! Worker-local: each [`crate::worker::ProcessingWorker`] owns one, per the
//! "Worker-local dedup window" design note — a flood spread across workers
//! is missed by this design.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use sha2::{Digest, Sha256};

const WINDOW: Duration = Duration::from_secs(5 * 60);
const SIMILARITY_THRESHOLD: f32 = 0.9;
const FLOOD_COUNT: usize = 10;
const EMBED_DIM: usize = 256;

pub type Embedding = [f32; EMBED_DIM];

struct Entry {
    #[allow(dead_code)]
    ticket_id: String,
    embedding: Embedding,
    arrived_at: Instant,
}

/// Deterministic stand-in for a real text-embedding model: a SHA-256-hashed
/// bag-of-words projected into a fixed 256-dim space and L2-normalized, so
/// near-duplicate phrasing lands close in cosine distance.
pub fn embed(text: &str) -> Embedding {
    let mut v = [0f32; EMBED_DIM];
    for token in text.to_lowercase().split(|c: char| !c.is_alphanumeric()).filter(|t| !t.is_empty())
    {
        let digest = Sha256::digest(token.as_bytes());
        let bucket = (u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]) as usize)
            % EMBED_DIM;
        v[bucket] += 1.0;
    }
    normalize(v)
}

fn normalize(mut v: Embedding) -> Embedding {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
    v
}

fn dot(a: &Embedding, b: &Embedding) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

pub struct DedupWindow {
    entries: VecDeque<Entry>,
}

impl Default for DedupWindow {
    fn default() -> Self {
        Self::new()
    }
}

impl DedupWindow {
    pub fn new() -> Self {
        Self { entries: VecDeque::new() }
    }

    /// Evicts stale entries, counts near-duplicates, appends the candidate,
    /// and reports whether this arrival constitutes a flash flood.
    pub fn is_flash_flood(&mut self, ticket_id: &str, text: &str) -> bool {
        let e = embed(text);
        let now = Instant::now();

        while let Some(front) = self.entries.front() {
            if now.duration_since(front.arrived_at) >= WINDOW {
                self.entries.pop_front();
            } else {
                break;
            }
        }

        let k = self.entries.iter().filter(|entry| dot(&entry.embedding, &e) > SIMILARITY_THRESHOLD).count();

        self.entries.push_back(Entry { ticket_id: ticket_id.to_owned(), embedding: e, arrived_at: now });

        k >= FLOOD_COUNT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_text_has_cosine_one() {
        let a = embed("cannot login to the portal");
        let b = embed("cannot login to the portal");
        assert!((dot(&a, &b) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn unrelated_text_has_low_similarity() {
        let a = embed("cannot login to the portal");
        let b = embed("invoice refund request for last month");
        assert!(dot(&a, &b) < 0.5);
    }

    #[test]
    fn first_few_admits_do_not_flood() {
        let mut window = DedupWindow::new();
        for i in 0..9 {
            let flood = window.is_flash_flood(&format!("t{i}"), "cannot login, getting a 500 error");
            assert!(!flood);
        }
    }

    #[test]
    fn tenth_near_duplicate_floods() {
        let mut window = DedupWindow::new();
        for i in 0..10 {
            window.is_flash_flood(&format!("t{i}"), "cannot login, getting a 500 error");
        }
        let flood = window.is_flash_flood("t10", "cannot login, getting a 500 error");
        assert!(flood);
    }

    #[test]
    fn distinct_texts_never_flood() {
        let mut window = DedupWindow::new();
        for i in 0..20 {
            let flood = window.is_flash_flood(&format!("t{i}"), &format!("unique ticket body number {i}"));
            assert!(!flood);
        }
    }
}
