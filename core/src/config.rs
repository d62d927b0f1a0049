//! Desk configuration: scoring weights, derivation thresholds,
//! form validation limits and the case sync interval.
//!
//! Every section has a `Default` matching the dashboard's built-in
//! constants, so a config file only needs the keys it overrides.

use crate::types::Millis;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeskConfig {
    pub scoring: ScoringConfig,
    pub derivation: DerivationConfig,
    pub validation: ValidationConfig,
    pub sync_interval_ms: Millis,
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            scoring: ScoringConfig::default(),
            derivation: DerivationConfig::default(),
            validation: ValidationConfig::default(),
            sync_interval_ms: 5_000,
        }
    }
}

impl DeskConfig {
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = format!("{data_dir}/desk/desk_config.json");
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: DeskConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        log::debug!(
            "Loaded desk config from {path}: {} amount tiers, {} high-risk keywords",
            config.scoring.amount_tiers.len(),
            config.scoring.high_risk_keywords.len()
        );
        Ok(config)
    }

    /// Defaults with a short sync interval, for tests.
    pub fn default_test() -> Self {
        Self {
            sync_interval_ms: 1_000,
            ..Self::default()
        }
    }
}

// ── Scoring ────────────────────────────────────────────────────────

/// Points added when the amount is strictly above `above`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AmountTier {
    pub above: f64,
    pub points: i32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum KeywordMatchMode {
    /// Each keyword scores once for the sender and once more for the recipient.
    #[default]
    PerField,
    /// Each keyword scores at most once across both fields.
    PerKeyword,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub amount_tiers: Vec<AmountTier>,
    pub high_risk_keywords: Vec<String>,
    pub high_risk_points: i32,
    pub medium_risk_keywords: Vec<String>,
    pub medium_risk_points: i32,
    pub keyword_match: KeywordMatchMode,
    pub structuring_amounts: Vec<f64>,
    pub structuring_points: i32,
    pub noise_min: i32,
    pub noise_max: i32,
    pub blocked_at: u8,
    pub flagged_at: u8,
    pub pending_at: u8,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            amount_tiers: vec![
                AmountTier { above: 50_000.0, points: 30 },
                AmountTier { above: 20_000.0, points: 20 },
                AmountTier { above: 10_000.0, points: 10 },
            ],
            high_risk_keywords: ["offshore", "anonymous", "cash", "shell", "unknown"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            high_risk_points: 25,
            medium_risk_keywords: ["trading", "holdings", "international", "foreign"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            medium_risk_points: 15,
            keyword_match: KeywordMatchMode::PerField,
            structuring_amounts: vec![9_999.0, 4_999.0],
            structuring_points: 35,
            noise_min: -5,
            noise_max: 4,
            blocked_at: 90,
            flagged_at: 70,
            pending_at: 50,
        }
    }
}

// ── Case derivation ────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DerivationConfig {
    /// Transactions at or above this score count as high risk and
    /// qualify for an auto-derived case regardless of status.
    pub high_risk_score: u8,
    /// Derived cases at or above this score are `High`, otherwise `Medium`.
    pub high_level_score: u8,
}

impl Default for DerivationConfig {
    fn default() -> Self {
        Self {
            high_risk_score: 80,
            high_level_score: 70,
        }
    }
}

// ── Form validation ────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub min_party_len: usize,
    pub min_case_title_len: usize,
    pub min_case_description_len: usize,
    pub min_name_len: usize,
    pub min_password_len: usize,
    pub min_organization_len: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_party_len: 2,
            min_case_title_len: 5,
            min_case_description_len: 10,
            min_name_len: 2,
            min_password_len: 8,
            min_organization_len: 2,
        }
    }
}
