//! In-memory transaction store.
//!
//! Transactions are held newest-first and live only as long as the
//! store. The risk score is assigned once at creation; only the status
//! changes afterwards, and only through `update_transaction_status`.

use crate::{
    analyzer::{NoiseSource, RiskAnalyzer},
    clock::{Clock, IdStamper},
    config::DeskConfig,
    event::DeskEvent,
    types::{Day, EntityId},
};
use serde::{Deserialize, Serialize};
use std::{fmt, sync::Arc};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TransactionStatus {
    Pending,
    Cleared,
    Flagged,
    Blocked,
}

impl TransactionStatus {
    pub const ALL: [TransactionStatus; 4] = [
        Self::Pending,
        Self::Cleared,
        Self::Flagged,
        Self::Blocked,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Cleared => "Cleared",
            Self::Flagged => "Flagged",
            Self::Blocked => "Blocked",
        }
    }

    /// Flagged and Blocked transactions need an analyst's attention.
    pub fn is_actionable(&self) -> bool {
        matches!(self, Self::Flagged | Self::Blocked)
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The fields a user supplies when recording a transaction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDraft {
    pub amount: f64,
    pub sender: String,
    pub recipient: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: EntityId,
    pub date: Day,
    pub amount: f64,
    pub sender: String,
    pub recipient: String,
    pub risk_score: u8,
    pub status: TransactionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

pub struct TransactionStore {
    transactions: Vec<Transaction>,
    analyzer: RiskAnalyzer,
    noise: Box<dyn NoiseSource>,
    clock: Arc<dyn Clock>,
    stamper: IdStamper,
    high_risk_score: u8,
    outbox: Vec<DeskEvent>,
}

impl TransactionStore {
    pub fn new(config: &DeskConfig, clock: Arc<dyn Clock>, noise: Box<dyn NoiseSource>) -> Self {
        Self {
            transactions: Vec::new(),
            analyzer: RiskAnalyzer::new(config.scoring.clone()),
            noise,
            clock,
            stamper: IdStamper::default(),
            high_risk_score: config.derivation.high_risk_score,
            outbox: Vec::new(),
        }
    }

    /// Score the draft, stamp it and put it at the front of the list.
    pub fn add_transaction(&mut self, draft: TransactionDraft) -> Transaction {
        let assessment = self.analyzer.analyze(&draft, self.noise.as_mut());
        let stamp = self.stamper.next(self.clock.now_millis());

        let transaction = Transaction {
            id: format!("TX-{stamp}"),
            date: self.clock.today(),
            amount: draft.amount,
            sender: draft.sender,
            recipient: draft.recipient,
            risk_score: assessment.risk_score,
            status: assessment.status,
            description: draft.description,
        };

        log::debug!(
            "Scored {} at {} ({}): {}",
            transaction.id,
            transaction.risk_score,
            transaction.status,
            if assessment.factors.is_empty() {
                "no risk factors".to_string()
            } else {
                assessment.factors.join(", ")
            }
        );

        let was_empty = self.transactions.is_empty();
        self.transactions.insert(0, transaction.clone());

        self.outbox.push(DeskEvent::TransactionAdded {
            transaction_id: transaction.id.clone(),
            risk_score: transaction.risk_score,
            status: transaction.status,
        });
        if was_empty {
            self.outbox.push(DeskEvent::FirstTransactionAdded);
        }

        transaction
    }

    /// Set the status of transaction `id`. Unknown ids are ignored.
    /// Returns whether a transaction was found.
    pub fn update_transaction_status(&mut self, id: &str, status: TransactionStatus) -> bool {
        let Some(tx) = self.transactions.iter_mut().find(|tx| tx.id == id) else {
            log::debug!("Status update for unknown transaction {id} ignored");
            return false;
        };
        let from = tx.status;
        tx.status = status;
        self.outbox.push(DeskEvent::TransactionStatusChanged {
            transaction_id: id.to_string(),
            from,
            to: status,
        });
        true
    }

    /// Newest first.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn get(&self, id: &str) -> Option<&Transaction> {
        self.transactions.iter().find(|tx| tx.id == id)
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn high_risk_transactions(&self) -> Vec<Transaction> {
        self.transactions
            .iter()
            .filter(|tx| tx.risk_score >= self.high_risk_score)
            .cloned()
            .collect()
    }

    /// Transactions whose status is Flagged or Blocked.
    pub fn flagged_transactions(&self) -> Vec<Transaction> {
        self.transactions
            .iter()
            .filter(|tx| tx.status.is_actionable())
            .cloned()
            .collect()
    }

    pub fn analyzer(&self) -> &RiskAnalyzer {
        &self.analyzer
    }

    pub fn drain_events(&mut self) -> Vec<DeskEvent> {
        std::mem::take(&mut self.outbox)
    }
}
