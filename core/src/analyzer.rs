//! Risk analyzer: additive scoring of a candidate transaction.
//!
//! Score components, all summed:
//!   1. Amount tier (highest matching tier only)
//!   2. High-risk counterparty keywords
//!   3. Medium-risk counterparty keywords
//!   4. Structuring: amounts sized just under reporting thresholds
//!   5. Noise from an injectable NoiseSource
//!
//! The sum is clamped to [0, 100] and mapped to an initial status.
//! The analyzer is total over its inputs and never fails.

use crate::{
    config::{KeywordMatchMode, ScoringConfig},
    rng::StreamRng,
    transaction_store::{TransactionDraft, TransactionStatus},
};
use serde::{Deserialize, Serialize};

const MAX_SCORE: i32 = 100;

/// Source of the scoring noise term.
pub trait NoiseSource {
    /// Draw an integer in [min, max], both inclusive.
    fn draw(&mut self, min: i32, max: i32) -> i32;
}

impl NoiseSource for StreamRng {
    fn draw(&mut self, min: i32, max: i32) -> i32 {
        self.next_i32_between(min, max)
    }
}

/// Noise switched off.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoNoise;

impl NoiseSource for NoNoise {
    fn draw(&mut self, _min: i32, _max: i32) -> i32 {
        0
    }
}

/// Always draws the same value, clamped into the requested range.
#[derive(Debug, Clone, Copy)]
pub struct FixedNoise(pub i32);

impl NoiseSource for FixedNoise {
    fn draw(&mut self, min: i32, max: i32) -> i32 {
        self.0.clamp(min, max.max(min))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskAssessment {
    pub risk_score: u8,
    pub status: TransactionStatus,
    /// Human-readable reasons that contributed points.
    pub factors: Vec<String>,
}

pub struct RiskAnalyzer {
    config: ScoringConfig,
}

impl RiskAnalyzer {
    pub fn new(mut config: ScoringConfig) -> Self {
        // Tiers are mutually exclusive and evaluated highest-first.
        config
            .amount_tiers
            .sort_by(|a, b| b.above.total_cmp(&a.above));
        config.high_risk_keywords = lowercase_all(&config.high_risk_keywords);
        config.medium_risk_keywords = lowercase_all(&config.medium_risk_keywords);
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn analyze(&self, draft: &TransactionDraft, noise: &mut dyn NoiseSource) -> RiskAssessment {
        let mut score: i32 = 0;
        let mut factors = Vec::new();

        if let Some(tier) = self
            .config
            .amount_tiers
            .iter()
            .find(|tier| draft.amount > tier.above)
        {
            score += tier.points;
            factors.push(format!("Amount above {:.0} (+{})", tier.above, tier.points));
        }

        let sender = draft.sender.to_lowercase();
        let recipient = draft.recipient.to_lowercase();

        score += self.keyword_points(
            &sender,
            &recipient,
            &self.config.high_risk_keywords,
            self.config.high_risk_points,
            "High-risk",
            &mut factors,
        );
        score += self.keyword_points(
            &sender,
            &recipient,
            &self.config.medium_risk_keywords,
            self.config.medium_risk_points,
            "Medium-risk",
            &mut factors,
        );

        if self
            .config
            .structuring_amounts
            .iter()
            .any(|&amount| draft.amount == amount)
        {
            score += self.config.structuring_points;
            factors.push(format!(
                "Possible structuring at {:.0} (+{})",
                draft.amount, self.config.structuring_points
            ));
        }

        score += noise.draw(self.config.noise_min, self.config.noise_max);

        let risk_score = score.clamp(0, MAX_SCORE) as u8;
        RiskAssessment {
            risk_score,
            status: self.status_for(risk_score),
            factors,
        }
    }

    /// Initial status for a clamped score.
    pub fn status_for(&self, risk_score: u8) -> TransactionStatus {
        if risk_score >= self.config.blocked_at {
            TransactionStatus::Blocked
        } else if risk_score >= self.config.flagged_at {
            TransactionStatus::Flagged
        } else if risk_score >= self.config.pending_at {
            TransactionStatus::Pending
        } else {
            TransactionStatus::Cleared
        }
    }

    fn keyword_points(
        &self,
        sender: &str,
        recipient: &str,
        keywords: &[String],
        points: i32,
        label: &str,
        factors: &mut Vec<String>,
    ) -> i32 {
        let mut total = 0;
        for keyword in keywords {
            let hits = match self.config.keyword_match {
                KeywordMatchMode::PerField => {
                    sender.contains(keyword.as_str()) as i32
                        + recipient.contains(keyword.as_str()) as i32
                }
                KeywordMatchMode::PerKeyword => {
                    (sender.contains(keyword.as_str()) || recipient.contains(keyword.as_str()))
                        as i32
                }
            };
            if hits > 0 {
                total += hits * points;
                factors.push(format!("{label} keyword '{keyword}' x{hits} (+{})", hits * points));
            }
        }
        total
    }
}

fn lowercase_all(words: &[String]) -> Vec<String> {
    words.iter().map(|w| w.to_lowercase()).collect()
}
