//! Dashboard headline numbers, computed from the live stores.

use crate::{
    case_store::{Case, CaseStatus, RiskLevel},
    transaction_store::{Transaction, TransactionStatus},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// Badge thresholds of the transaction table.
const HIGH_BAND: u8 = 80;
const MEDIUM_BAND: u8 = 50;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RiskBands {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DeskSummary {
    pub total_transactions: usize,
    pub transactions_by_status: BTreeMap<String, usize>,
    pub risk_bands: RiskBands,
    pub flagged_transactions: usize,
    pub mean_risk_score: f64,
    pub total_cases: usize,
    pub open_cases: usize,
    pub cases_by_status: BTreeMap<String, usize>,
    pub cases_by_risk_level: BTreeMap<String, usize>,
}

impl DeskSummary {
    pub fn compute(transactions: &[Transaction], cases: &[Case]) -> Self {
        let mut summary = Self {
            total_transactions: transactions.len(),
            total_cases: cases.len(),
            ..Self::default()
        };

        for status in TransactionStatus::ALL {
            summary.transactions_by_status.insert(status.label().to_string(), 0);
        }
        for status in CaseStatus::ALL {
            summary.cases_by_status.insert(status.label().to_string(), 0);
        }
        for level in RiskLevel::ALL {
            summary.cases_by_risk_level.insert(level.label().to_string(), 0);
        }

        let mut score_total: u64 = 0;
        for tx in transactions {
            *summary
                .transactions_by_status
                .entry(tx.status.label().to_string())
                .or_default() += 1;
            match tx.risk_score {
                s if s >= HIGH_BAND => summary.risk_bands.high += 1,
                s if s >= MEDIUM_BAND => summary.risk_bands.medium += 1,
                _ => summary.risk_bands.low += 1,
            }
            if tx.status.is_actionable() {
                summary.flagged_transactions += 1;
            }
            score_total += tx.risk_score as u64;
        }
        if !transactions.is_empty() {
            summary.mean_risk_score = score_total as f64 / transactions.len() as f64;
        }

        for case in cases {
            *summary
                .cases_by_status
                .entry(case.status.label().to_string())
                .or_default() += 1;
            *summary
                .cases_by_risk_level
                .entry(case.risk_level.label().to_string())
                .or_default() += 1;
            if case.status == CaseStatus::Open {
                summary.open_cases += 1;
            }
        }

        summary
    }
}
