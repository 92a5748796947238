// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Core ticket types: the immutable ingest payload, the mutable status
//! record it grows into, and the small value types they're built from.

use serde::{Deserialize, Serialize};

/// One of the three categories a ticket can be classified into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Billing,
    Technical,
    Legal,
}

/// Coarse urgency bucket, a pure function of `urgency_score`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrgencyLabel {
    Low,
    High,
}

impl UrgencyLabel {
    /// `high` iff `urgency_score >= 0.5` (invariant I5).
    pub fn from_score(score: f64) -> Self {
        if score >= 0.5 {
            UrgencyLabel::High
        } else {
            UrgencyLabel::Low
        }
    }
}

/// Ticket lifecycle state. Forms a DAG: `pending -> processing ->
/// {completed, master_incident}`. No transitions out of a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketState {
    Pending,
    Processing,
    Completed,
    MasterIncident,
}

impl TicketState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TicketState::Completed | TicketState::MasterIncident)
    }
}

/// Immutable ingest payload. At least one of `subject`/`body`/`description`
/// must be non-empty — enforced at admission, not here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    pub ticket_id: String,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub created_at: u64,
    pub combined_text: String,
}

impl Ticket {
    /// Space-joined non-empty text fields, in subject/body/description order.
    pub fn combine_text(
        subject: &Option<String>,
        body: &Option<String>,
        description: &Option<String>,
    ) -> String {
        [subject, body, description]
            .into_iter()
            .filter_map(|f| f.as_deref())
            .filter(|s| !s.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// True if at least one text field carries non-whitespace content.
    pub fn has_text(
        subject: &Option<String>,
        body: &Option<String>,
        description: &Option<String>,
    ) -> bool {
        [subject, body, description]
            .into_iter()
            .any(|f| f.as_deref().is_some_and(|s| !s.trim().is_empty()))
    }
}

/// What the ingest controller writes and a worker consumes. FIFO over the
/// queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueMessage {
    pub ticket_id: String,
    pub subject: Option<String>,
    pub body: Option<String>,
    pub description: Option<String>,
    pub combined_text: String,
    pub created_at: u64,
}

/// Mutable record keyed by `ticket_id`, grown in place as the ticket moves
/// through the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketStatus {
    pub ticket_id: String,
    pub status: TicketState,
    pub subject: Option<String>,
    pub body: Option<String>,
    pub description: Option<String>,
    pub created_at: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urgency_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urgency_label: Option<UrgencyLabel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_agent: Option<String>,
}

impl TicketStatus {
    /// Reconstructs a `pending` record from a dequeued message, for the rare
    /// case a worker picks up a ticket whose status record has already
    /// expired out of the broker.
    pub fn from_queue_message(msg: &QueueMessage) -> Self {
        Self {
            ticket_id: msg.ticket_id.clone(),
            status: TicketState::Pending,
            subject: msg.subject.clone(),
            body: msg.body.clone(),
            description: msg.description.clone(),
            created_at: msg.created_at,
            category: None,
            urgency_score: None,
            urgency_label: None,
            assigned_agent: None,
        }
    }

    pub fn pending(ticket: &Ticket) -> Self {
        Self {
            ticket_id: ticket.ticket_id.clone(),
            status: TicketState::Pending,
            subject: ticket.subject.clone(),
            body: ticket.body.clone(),
            description: ticket.description.clone(),
            created_at: ticket.created_at,
            category: None,
            urgency_score: None,
            urgency_label: None,
            assigned_agent: None,
        }
    }

    pub fn mark_processing(&mut self) {
        self.status = TicketState::Processing;
    }

    pub fn mark_master_incident(&mut self, category: Category, urgency_score: f64) {
        self.status = TicketState::MasterIncident;
        self.category = Some(category);
        self.urgency_score = Some(urgency_score);
        self.urgency_label = Some(UrgencyLabel::from_score(urgency_score));
    }

    pub fn mark_completed(
        &mut self,
        category: Category,
        urgency_score: f64,
        assigned_agent: String,
    ) {
        self.status = TicketState::Completed;
        self.category = Some(category);
        self.urgency_score = Some(urgency_score);
        self.urgency_label = Some(UrgencyLabel::from_score(urgency_score));
        self.assigned_agent = Some(assigned_agent);
    }
}

/// Seconds since the Unix epoch, used for `created_at` and TTL bookkeeping.
pub fn epoch_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combine_text_joins_non_empty_fields() {
        let text = Ticket::combine_text(
            &Some("Subject".to_owned()),
            &None,
            &Some("Description".to_owned()),
        );
        assert_eq!(text, "Subject Description");
    }

    #[test]
    fn combine_text_skips_blank_fields() {
        let text =
            Ticket::combine_text(&Some("  ".to_owned()), &Some("Body".to_owned()), &None);
        assert_eq!(text, "Body");
    }

    #[test]
    fn has_text_requires_non_whitespace() {
        assert!(!Ticket::has_text(&Some("   ".to_owned()), &None, &None));
        assert!(Ticket::has_text(&None, &Some("x".to_owned()), &None));
    }

    #[test]
    fn urgency_label_boundary_is_high() {
        assert_eq!(UrgencyLabel::from_score(0.5), UrgencyLabel::High);
        assert_eq!(UrgencyLabel::from_score(0.499_999), UrgencyLabel::Low);
    }
}
