// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Read-side of the pipeline: pop the highest-urgency completed ticket, or
//! list everything admitted so far in display order.

use std::sync::Arc;

use crate::broker::Broker;
use crate::domain::{TicketState, TicketStatus};
use crate::error::AppError;

pub async fn pop_next_ready(broker: &Arc<dyn Broker>) -> Result<TicketStatus, AppError> {
    let id = broker.ready_pop_max().await.ok_or(AppError::ReadyEmpty)?;
    broker.get_status(&id).await.ok_or(AppError::ReadyEmpty)
}

/// Completed tickets first, sorted by descending `urgency_score` then
/// ascending `created_at`; all other states follow, sorted by ascending
/// `created_at`.
pub async fn list_queue(broker: &Arc<dyn Broker>) -> Vec<TicketStatus> {
    let ids = broker.list_all_ids().await;
    let mut statuses = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(status) = broker.get_status(&id).await {
            statuses.push(status);
        }
    }

    statuses.sort_by(|a, b| {
        let a_completed = a.status == TicketState::Completed;
        let b_completed = b.status == TicketState::Completed;
        match (a_completed, b_completed) {
            (true, false) => std::cmp::Ordering::Less,
            (false, true) => std::cmp::Ordering::Greater,
            (true, true) => b
                .urgency_score
                .unwrap_or(0.0)
                .total_cmp(&a.urgency_score.unwrap_or(0.0))
                .then(a.created_at.cmp(&b.created_at)),
            (false, false) => a.created_at.cmp(&b.created_at),
        }
    });

    statuses
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broker::InMemoryBroker;
    use crate::domain::Category;

    fn status(id: &str, state: TicketState, score: Option<f64>, created_at: u64) -> TicketStatus {
        TicketStatus {
            ticket_id: id.to_owned(),
            status: state,
            subject: Some("x".to_owned()),
            body: None,
            description: None,
            created_at,
            category: Some(Category::Technical),
            urgency_score: score,
            urgency_label: None,
            assigned_agent: None,
        }
    }

    #[tokio::test]
    async fn pop_returns_highest_then_empty() {
        let broker: Arc<dyn Broker> = Arc::new(InMemoryBroker::new());
        broker.set_status("low", status("low", TicketState::Completed, Some(0.2), 1)).await;
        broker.set_status("high", status("high", TicketState::Completed, Some(0.95), 2)).await;
        broker.set_status("mid", status("mid", TicketState::Completed, Some(0.7), 3)).await;
        broker.ready_add("low", 0.2).await;
        broker.ready_add("high", 0.95).await;
        broker.ready_add("mid", 0.7).await;

        assert_eq!(pop_next_ready(&broker).await.map(|s| s.ticket_id), Ok("high".to_owned()));
        assert_eq!(pop_next_ready(&broker).await.map(|s| s.ticket_id), Ok("mid".to_owned()));
        assert_eq!(pop_next_ready(&broker).await.map(|s| s.ticket_id), Ok("low".to_owned()));
        assert!(matches!(pop_next_ready(&broker).await, Err(AppError::ReadyEmpty)));
    }

    #[tokio::test]
    async fn list_queue_sorts_completed_first_by_urgency_then_others_by_age() {
        let broker: Arc<dyn Broker> = Arc::new(InMemoryBroker::new());
        broker.add_to_all_ids("pending-old").await;
        broker.add_to_all_ids("pending-new").await;
        broker.add_to_all_ids("completed-low").await;
        broker.add_to_all_ids("completed-high").await;

        broker.set_status("pending-old", status("pending-old", TicketState::Pending, None, 1)).await;
        broker.set_status("pending-new", status("pending-new", TicketState::Pending, None, 2)).await;
        broker
            .set_status("completed-low", status("completed-low", TicketState::Completed, Some(0.3), 3))
            .await;
        broker
            .set_status("completed-high", status("completed-high", TicketState::Completed, Some(0.9), 4))
            .await;

        let listed = list_queue(&broker).await;
        let ids: Vec<&str> = listed.iter().map(|s| s.ticket_id.as_str()).collect();
        assert_eq!(ids, vec!["completed-high", "completed-low", "pending-old", "pending-new"]);
    }
}
