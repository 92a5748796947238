// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Skill-and-load-based agent router. Shared process-wide via `Arc<AgentRouter>`
//! rather than per-worker state — the "Module-level agent registry" design
//! note flags that per-worker load counters would let `load` exceed
//! `capacity` (invariant I4) once more than one worker is assigning
//! concurrently, so the registry lives once per process and every worker
//! holds the same handle.

use std::collections::HashMap;

use indexmap::IndexMap;
use tokio::sync::Mutex;

use crate::domain::Category;

const SKILL_WEIGHT: f64 = 0.6;
const AVAILABILITY_WEIGHT: f64 = 0.4;

/// Static description of one agent's skills and capacity, supplied at
/// startup.
#[derive(Debug, Clone)]
pub struct AgentRegistration {
    pub name: String,
    pub skills: HashMap<Category, f64>,
    pub capacity: u32,
}

struct AgentState {
    skills: HashMap<Category, f64>,
    capacity: u32,
    load: u32,
}

/// `load <= capacity` for every agent is maintained by construction: `select`
/// only considers agents with `load < capacity` and increments `load`
/// atomically with the selection under a single lock.
pub struct AgentRouter {
    agents: Mutex<IndexMap<String, AgentState>>,
}

impl AgentRouter {
    pub fn new(registrations: Vec<AgentRegistration>) -> Self {
        let mut agents = IndexMap::new();
        for reg in registrations {
            agents.insert(reg.name, AgentState { skills: reg.skills, capacity: reg.capacity, load: 0 });
        }
        Self { agents: Mutex::new(agents) }
    }

    /// Picks the highest-scoring eligible agent for `category`, ties broken
    /// by registry insertion order. `none` when every agent is saturated.
    pub async fn select(&self, category: Category) -> Option<String> {
        let mut agents = self.agents.lock().await;
        let mut best: Option<(String, f64)> = None;
        for (name, state) in agents.iter() {
            if state.load >= state.capacity {
                continue;
            }
            let skill = state.skills.get(&category).copied().unwrap_or(0.0);
            let availability = 1.0 - (state.load as f64 / state.capacity as f64);
            let score = SKILL_WEIGHT * skill + AVAILABILITY_WEIGHT * availability;
            if best.as_ref().map(|(_, s)| score > *s).unwrap_or(true) {
                best = Some((name.clone(), score));
            }
        }
        let (name, _) = best?;
        if let Some(state) = agents.get_mut(&name) {
            state.load += 1;
        }
        Some(name)
    }

    /// Decrements `load` on handoff completion. Unused by the default
    /// processing path today (the source this was modeled on never
    /// decrements either — see the "Agent load release" design note) but
    /// kept as the seam a future redesign would call from.
    #[allow(dead_code)]
    pub async fn release(&self, name: &str) {
        let mut agents = self.agents.lock().await;
        if let Some(state) = agents.get_mut(name) {
            state.load = state.load.saturating_sub(1);
        }
    }
}
