//! Onboarding / user-progress flags.
//!
//! The only desk state that outlives a session. The Desk feeds every
//! drained event through `apply`; `store::DeskStore` persists the result.

use crate::{event::DeskEvent, types::Day};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserProgress {
    pub is_first_time: bool,
    pub has_transactions: bool,
    pub has_cases: bool,
    pub registration_date: Option<Day>,
}

impl Default for UserProgress {
    fn default() -> Self {
        Self {
            is_first_time: true,
            has_transactions: false,
            has_cases: false,
            registration_date: None,
        }
    }
}

impl UserProgress {
    pub fn set_first_time_complete(&mut self) {
        self.is_first_time = false;
    }

    pub fn set_has_transactions(&mut self, value: bool) {
        self.has_transactions = value;
    }

    pub fn set_has_cases(&mut self, value: bool) {
        self.has_cases = value;
    }

    pub fn set_registration_date(&mut self, date: Day) {
        self.registration_date = Some(date);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Fold one event into the flags. Returns true if anything changed.
    pub fn apply(&mut self, event: &DeskEvent) -> bool {
        let before = self.clone();
        match event {
            // Every add raises the flag, not just the first.
            DeskEvent::FirstTransactionAdded | DeskEvent::TransactionAdded { .. } => {
                self.set_has_transactions(true)
            }
            DeskEvent::FirstCaseAdded | DeskEvent::CaseOpened { .. } => self.set_has_cases(true),
            DeskEvent::CasesDerived { case_ids } if !case_ids.is_empty() => {
                self.set_has_cases(true)
            }
            DeskEvent::UserRegistered { date, .. } => self.set_registration_date(*date),
            _ => {}
        }
        *self != before
    }
}
