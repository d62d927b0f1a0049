//! In-memory compliance case store.
//!
//! Cases are opened manually or derived from risky transactions by
//! `sync_with_transactions`. A transaction backs at most one derived
//! case; manual cases carry no such constraint. Cases are never deleted.

use crate::{
    clock::{Clock, IdStamper},
    config::DerivationConfig,
    error::DeskError,
    event::DeskEvent,
    rng::StreamRng,
    transaction_store::{Transaction, TransactionStatus},
    types::{Day, EntityId},
};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr, sync::Arc};

const DERIVED_ID_SUFFIX_LEN: usize = 5;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 3] = [Self::High, Self::Medium, Self::Low];

    pub fn label(&self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RiskLevel {
    type Err = DeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|level| level.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DeskError::UnknownVariant {
                kind: "risk level",
                value: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum CaseStatus {
    Open,
    #[serde(rename = "In Review")]
    InReview,
    Closed,
    Escalated,
}

impl CaseStatus {
    pub const ALL: [CaseStatus; 4] = [Self::Open, Self::InReview, Self::Closed, Self::Escalated];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::InReview => "In Review",
            Self::Closed => "Closed",
            Self::Escalated => "Escalated",
        }
    }

    /// Lowercase label with the first space turned into a hyphen,
    /// the form status filters are written in ("in-review").
    pub fn slug(&self) -> String {
        self.label().to_lowercase().replacen(' ', "-", 1)
    }

    /// The transitions the case review screen offers from this status.
    /// `CaseStore::update_case_status` does not enforce these: any
    /// status may be set from any other.
    pub fn ui_transitions(&self) -> &'static [CaseStatus] {
        match self {
            Self::Open => &[Self::InReview, Self::Closed, Self::Escalated],
            Self::InReview => &[Self::Closed, Self::Escalated, Self::Open],
            Self::Escalated => &[Self::Closed, Self::InReview],
            Self::Closed => &[],
        }
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for CaseStatus {
    type Err = DeskError;

    /// Accepts either the label ("In Review") or the slug ("in-review").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|status| status.label().to_lowercase() == wanted || status.slug() == wanted)
            .ok_or_else(|| DeskError::UnknownVariant {
                kind: "case status",
                value: s.to_string(),
            })
    }
}

/// The fields supplied when opening a case by hand.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CaseDraft {
    pub title: String,
    pub description: String,
    pub risk_level: RiskLevel,
    pub ml_confidence: u8,
    pub status: CaseStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Case {
    pub id: EntityId,
    pub date: Day,
    pub title: String,
    pub description: String,
    pub risk_level: RiskLevel,
    pub ml_confidence: u8,
    pub status: CaseStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
}

/// Search, risk and status predicates, combined with AND.
/// A filter value of "all" disables that predicate.
#[derive(Debug, Clone, Default)]
pub struct CaseFilter {
    query: String,
    // None: "all". Some(None): a value no case can carry.
    risk: Option<Option<RiskLevel>>,
    status: Option<Option<CaseStatus>>,
}

impl CaseFilter {
    pub fn new(search_query: &str, risk_filter: &str, status_filter: &str) -> Self {
        Self {
            query: search_query.to_lowercase(),
            risk: (risk_filter != "all").then(|| risk_filter.parse().ok()),
            status: (status_filter != "all").then(|| status_filter.parse().ok()),
        }
    }

    pub fn matches(&self, case: &Case) -> bool {
        let matches_search = case.id.to_lowercase().contains(&self.query)
            || case.title.to_lowercase().contains(&self.query)
            || case.description.to_lowercase().contains(&self.query);

        let matches_risk = self.risk.map_or(true, |risk| risk == Some(case.risk_level));
        let matches_status = self.status.map_or(true, |status| status == Some(case.status));

        matches_search && matches_risk && matches_status
    }
}

pub struct CaseStore {
    cases: Vec<Case>,
    derivation: DerivationConfig,
    rng: StreamRng,
    clock: Arc<dyn Clock>,
    stamper: IdStamper,
    outbox: Vec<DeskEvent>,
}

impl CaseStore {
    pub fn new(derivation: DerivationConfig, clock: Arc<dyn Clock>, rng: StreamRng) -> Self {
        Self {
            cases: Vec::new(),
            derivation,
            rng,
            clock,
            stamper: IdStamper::default(),
            outbox: Vec::new(),
        }
    }

    /// Stores the draft as given; `Desk::add_case` validates first.
    pub fn add_case(&mut self, draft: CaseDraft) -> Case {
        let stamp = self.stamper.next(self.clock.now_millis());
        let case = Case {
            id: format!("AML-{stamp}"),
            date: self.clock.today(),
            title: draft.title,
            description: draft.description,
            risk_level: draft.risk_level,
            ml_confidence: draft.ml_confidence,
            status: draft.status,
            transaction_id: draft.transaction_id,
            assigned_to: draft.assigned_to,
        };

        let was_empty = self.cases.is_empty();
        self.cases.insert(0, case.clone());

        self.outbox.push(DeskEvent::CaseOpened {
            case_id: case.id.clone(),
            risk_level: case.risk_level,
        });
        if was_empty {
            self.outbox.push(DeskEvent::FirstCaseAdded);
        }
        case
    }

    /// Set the status of case `id`. Any status may follow any other.
    /// Unknown ids are ignored. Returns whether a case was found.
    pub fn update_case_status(&mut self, id: &str, status: CaseStatus) -> bool {
        let Some(case) = self.cases.iter_mut().find(|c| c.id == id) else {
            log::debug!("Status update for unknown case {id} ignored");
            return false;
        };
        let from = case.status;
        case.status = status;
        self.outbox.push(DeskEvent::CaseStatusChanged {
            case_id: id.to_string(),
            from,
            to: status,
        });
        true
    }

    /// Derive a case for every qualifying transaction not yet covered.
    ///
    /// A transaction qualifies when its score is at or above the
    /// high-risk threshold or its status is Flagged or Blocked. Cases
    /// from one pass keep the transactions' order and are prepended
    /// as a block. Returns the newly derived cases.
    pub fn sync_with_transactions(&mut self, transactions: &[Transaction]) -> Vec<Case> {
        let now = self.clock.now_millis();
        let mut derived: Vec<Case> = Vec::new();

        for tx in transactions {
            let qualifies =
                tx.risk_score >= self.derivation.high_risk_score || tx.status.is_actionable();
            if !qualifies || self.covers(&tx.id) {
                continue;
            }
            let suffix = self.rng.base36(DERIVED_ID_SUFFIX_LEN);
            derived.push(self.derive_case(tx, format!("AML-{now}-{suffix}")));
        }

        if derived.is_empty() {
            return derived;
        }

        let was_empty = self.cases.is_empty();
        let older = std::mem::take(&mut self.cases);
        self.cases = derived.iter().cloned().chain(older).collect();

        log::info!(
            "Derived {} case(s) from {} transaction(s)",
            derived.len(),
            transactions.len()
        );
        self.outbox.push(DeskEvent::CasesDerived {
            case_ids: derived.iter().map(|c| c.id.clone()).collect(),
        });
        if was_empty {
            self.outbox.push(DeskEvent::FirstCaseAdded);
        }
        derived
    }

    pub fn get_filtered_cases(
        &self,
        search_query: &str,
        risk_filter: &str,
        status_filter: &str,
    ) -> Vec<Case> {
        let filter = CaseFilter::new(search_query, risk_filter, status_filter);
        self.cases
            .iter()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect()
    }

    pub fn cases(&self) -> &[Case] {
        &self.cases
    }

    pub fn get(&self, id: &str) -> Option<&Case> {
        self.cases.iter().find(|c| c.id == id)
    }

    /// The derived case backing `transaction_id`, if any.
    pub fn case_for_transaction(&self, transaction_id: &str) -> Option<&Case> {
        self.cases
            .iter()
            .find(|c| c.transaction_id.as_deref() == Some(transaction_id))
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    pub fn drain_events(&mut self) -> Vec<DeskEvent> {
        std::mem::take(&mut self.outbox)
    }

    fn covers(&self, transaction_id: &str) -> bool {
        self.case_for_transaction(transaction_id).is_some()
    }

    fn derive_case(&self, tx: &Transaction, id: EntityId) -> Case {
        Case {
            id,
            date: tx.date,
            title: format!("Suspicious transaction: {} to {}", tx.sender, tx.recipient),
            description: format!(
                "{} transaction of ${} from {} to {}. {}",
                tx.status,
                format_amount(tx.amount),
                tx.sender,
                tx.recipient,
                tx.description
                    .as_deref()
                    .filter(|d| !d.is_empty())
                    .unwrap_or("No additional details.")
            ),
            risk_level: self.risk_level_for(tx.risk_score),
            ml_confidence: tx.risk_score,
            status: if tx.status == TransactionStatus::Blocked {
                CaseStatus::Escalated
            } else {
                CaseStatus::Open
            },
            transaction_id: Some(tx.id.clone()),
            assigned_to: None,
        }
    }

    // Derived cases are never Low. Scores of 90+ and 70..90 both map to
    // High; the separate 90 tier of the dashboard collapsed into this.
    fn risk_level_for(&self, risk_score: u8) -> RiskLevel {
        if risk_score >= self.derivation.high_level_score {
            RiskLevel::High
        } else {
            RiskLevel::Medium
        }
    }
}

/// US-style amount: thousands separators, at most three decimals,
/// trailing zeros dropped.
fn format_amount(amount: f64) -> String {
    let fixed = format!("{:.3}", amount.abs());
    let (whole, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let frac = frac.trim_end_matches('0');
    let sign = if amount < 0.0 { "-" } else { "" };
    if frac.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{frac}")
    }
}

#[cfg(test)]
mod tests {
    use super::format_amount;

    #[test]
    fn amounts_are_grouped_like_the_dashboard() {
        assert_eq!(format_amount(0.0), "0");
        assert_eq!(format_amount(999.0), "999");
        assert_eq!(format_amount(9_999.0), "9,999");
        assert_eq!(format_amount(1_234_567.5), "1,234,567.5");
        assert_eq!(format_amount(60_000.125), "60,000.125");
        assert_eq!(format_amount(12.3456), "12.346");
    }
}
