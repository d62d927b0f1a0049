//! The desk event contract.
//!
//! RULE: Stores never reach into user progress or the UI.
//! They queue DeskEvents in an outbox; the Desk drains the outboxes
//! after each operation and routes the events to progress and observers.

use crate::{
    case_store::{CaseStatus, RiskLevel},
    transaction_store::TransactionStatus,
    types::{Day, EntityId},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DeskEvent {
    // ── Transactions ───────────────────────────────
    TransactionAdded {
        transaction_id: EntityId,
        risk_score: u8,
        status: TransactionStatus,
    },
    TransactionStatusChanged {
        transaction_id: EntityId,
        from: TransactionStatus,
        to: TransactionStatus,
    },
    /// The store held no transactions before this one.
    FirstTransactionAdded,

    // ── Cases ──────────────────────────────────────
    CaseOpened {
        case_id: EntityId,
        risk_level: RiskLevel,
    },
    CasesDerived {
        case_ids: Vec<EntityId>,
    },
    CaseStatusChanged {
        case_id: EntityId,
        from: CaseStatus,
        to: CaseStatus,
    },
    /// The store held no cases before this operation.
    FirstCaseAdded,

    // ── Users ──────────────────────────────────────
    UserRegistered {
        user_id: String,
        email: String,
        date: Day,
    },
}

impl DeskEvent {
    /// Stable snake_case name of the variant, for logs.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::TransactionAdded { .. } => "transaction_added",
            Self::TransactionStatusChanged { .. } => "transaction_status_changed",
            Self::FirstTransactionAdded => "first_transaction_added",
            Self::CaseOpened { .. } => "case_opened",
            Self::CasesDerived { .. } => "cases_derived",
            Self::CaseStatusChanged { .. } => "case_status_changed",
            Self::FirstCaseAdded => "first_case_added",
            Self::UserRegistered { .. } => "user_registered",
        }
    }
}

/// Anything outside the core that wants to hear about desk activity.
pub trait DeskObserver {
    fn on_event(&mut self, event: &DeskEvent);
}

impl<F: FnMut(&DeskEvent)> DeskObserver for F {
    fn on_event(&mut self, event: &DeskEvent) {
        self(event)
    }
}
