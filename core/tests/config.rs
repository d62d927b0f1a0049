//! Configuration loading and section defaults.

use aml_desk_core::{
    analyzer::{NoNoise, RiskAnalyzer},
    config::{DeskConfig, KeywordMatchMode},
    transaction_store::TransactionDraft,
};

#[test]
fn shipped_config_matches_defaults() {
    // Integration tests run from the crate directory.
    let loaded = DeskConfig::load("../data").expect("load ../data/desk/desk_config.json");
    let defaults = DeskConfig::default();

    assert_eq!(loaded.scoring.amount_tiers, defaults.scoring.amount_tiers);
    assert_eq!(loaded.scoring.high_risk_keywords, defaults.scoring.high_risk_keywords);
    assert_eq!(loaded.scoring.medium_risk_keywords, defaults.scoring.medium_risk_keywords);
    assert_eq!(loaded.scoring.structuring_amounts, defaults.scoring.structuring_amounts);
    assert_eq!(loaded.scoring.keyword_match, KeywordMatchMode::PerField);
    assert_eq!(loaded.derivation.high_risk_score, 80);
    assert_eq!(loaded.derivation.high_level_score, 70);
    assert_eq!(loaded.sync_interval_ms, defaults.sync_interval_ms);
}

#[test]
fn missing_config_is_an_error_naming_the_path() {
    let err = DeskConfig::load("/definitely/not/here").unwrap_err();
    assert!(err.to_string().contains("desk_config.json"), "{err}");
}

#[test]
fn partial_config_falls_back_to_defaults() {
    let config: DeskConfig = serde_json::from_str(
        r#"{ "scoring": { "keyword_match": "per_keyword", "structuring_points": 50 } }"#,
    )
    .unwrap();
    assert_eq!(config.scoring.keyword_match, KeywordMatchMode::PerKeyword);
    assert_eq!(config.scoring.structuring_points, 50);
    assert_eq!(config.scoring.high_risk_points, 25);
    assert_eq!(config.validation.min_password_len, 8);

    let analyzer = RiskAnalyzer::new(config.scoring);
    let assessment = analyzer.analyze(
        &TransactionDraft {
            amount: 4_999.0,
            sender: "Cash Co".to_string(),
            recipient: "Cash Inc".to_string(),
            description: None,
        },
        &mut NoNoise,
    );
    // 50 structuring + 25 once for "cash" = 75
    assert_eq!(assessment.risk_score, 75);
}

#[test]
fn amount_tiers_are_sorted_on_construction() {
    let mut config = DeskConfig::default().scoring;
    config.amount_tiers.reverse();
    let analyzer = RiskAnalyzer::new(config);
    let assessment = analyzer.analyze(
        &TransactionDraft {
            amount: 60_000.0,
            sender: "Alice Smith".to_string(),
            recipient: "Bob Jones".to_string(),
            description: None,
        },
        &mut NoNoise,
    );
    assert_eq!(assessment.risk_score, 30);
}
