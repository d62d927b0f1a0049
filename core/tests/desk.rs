//! Desk: event routing into user progress, observers, validation gate,
//! periodic sync, and command execution.

use aml_desk_core::{
    analyzer::NoNoise,
    case_store::{CaseDraft, CaseStatus, RiskLevel},
    clock::ManualClock,
    command::{CommandReply, DeskCommand},
    config::DeskConfig,
    desk::Desk,
    error::DeskError,
    event::DeskEvent,
    transaction_store::{TransactionDraft, TransactionStatus},
};
use std::{cell::RefCell, rc::Rc, sync::Arc};

const T0: i64 = 1_705_276_800_000; // 2024-01-15

fn quiet_desk() -> (Desk, Arc<ManualClock>) {
    let _ = env_logger::builder().is_test(true).try_init();
    let clock = Arc::new(ManualClock::new(T0));
    let desk = Desk::with_noise(DeskConfig::default_test(), 1, clock.clone(), Box::new(NoNoise));
    (desk, clock)
}

fn risky() -> TransactionDraft {
    // 30 + 25 + 25 = 80: high risk and Flagged
    TransactionDraft {
        amount: 60_000.0,
        sender: "Offshore Ltd".to_string(),
        recipient: "Shell Co".to_string(),
        description: None,
    }
}

fn benign() -> TransactionDraft {
    TransactionDraft {
        amount: 120.0,
        sender: "Alice Smith".to_string(),
        recipient: "Bob Jones".to_string(),
        description: Some("Dinner".to_string()),
    }
}

fn recorder(desk: &mut Desk) -> Rc<RefCell<Vec<DeskEvent>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    desk.subscribe(Box::new(move |event: &DeskEvent| sink.borrow_mut().push(event.clone())));
    seen
}

#[test]
fn fresh_desk_is_empty_and_first_time() {
    let (desk, _clock) = quiet_desk();
    assert!(desk.transactions().is_empty());
    assert!(desk.cases().is_empty());
    assert!(desk.progress().is_first_time);
    assert!(!desk.progress().has_transactions);
    assert!(!desk.progress().has_cases);
    assert!(!desk.is_mounted());
}

#[test]
fn first_transaction_flips_progress_flag() {
    let (mut desk, _clock) = quiet_desk();
    desk.add_transaction(benign()).unwrap();
    assert!(desk.progress().has_transactions);
    assert!(!desk.progress().has_cases);
}

#[test]
fn first_derived_case_flips_progress_flag() {
    let (mut desk, _clock) = quiet_desk();
    desk.add_transaction(risky()).unwrap();
    let derived = desk.sync_cases().unwrap();
    assert_eq!(derived.len(), 1);
    assert!(desk.progress().has_cases);
}

#[test]
fn observers_see_events_in_order() {
    let (mut desk, _clock) = quiet_desk();
    let seen = recorder(&mut desk);

    let tx = desk.add_transaction(risky()).unwrap();
    desk.update_transaction_status(&tx.id, TransactionStatus::Blocked).unwrap();
    desk.sync_cases().unwrap();

    let names: Vec<&str> = seen.borrow().iter().map(|e| e.type_name()).collect();
    assert_eq!(
        names,
        vec![
            "transaction_added",
            "first_transaction_added",
            "transaction_status_changed",
            "cases_derived",
            "first_case_added",
        ]
    );
}

#[test]
fn blocked_transaction_yields_escalated_case() {
    let (mut desk, _clock) = quiet_desk();
    let tx = desk.add_transaction(benign()).unwrap();
    assert!(desk.sync_cases().unwrap().is_empty());

    desk.update_transaction_status(&tx.id, TransactionStatus::Blocked).unwrap();
    let derived = desk.sync_cases().unwrap();
    assert_eq!(derived.len(), 1);
    assert_eq!(derived[0].status, CaseStatus::Escalated);
    assert_eq!(derived[0].risk_level, RiskLevel::Medium);
    assert_eq!(derived[0].transaction_id.as_deref(), Some(tx.id.as_str()));
    assert_eq!(
        derived[0].description,
        "Blocked transaction of $120 from Alice Smith to Bob Jones. Dinner"
    );
}

#[test]
fn repeated_sync_is_idempotent() {
    let (mut desk, _clock) = quiet_desk();
    desk.add_transaction(risky()).unwrap();
    desk.add_transaction(risky()).unwrap();
    desk.sync_cases().unwrap();
    let count = desk.cases().len();
    assert_eq!(count, 2);

    assert!(desk.sync_cases().unwrap().is_empty());
    assert_eq!(desk.cases().len(), count);
}

#[test]
fn unknown_ids_are_silently_ignored() {
    let (mut desk, _clock) = quiet_desk();
    desk.add_transaction(benign()).unwrap();
    let seen = recorder(&mut desk);

    assert!(!desk.update_transaction_status("TX-0", TransactionStatus::Flagged).unwrap());
    assert!(!desk.update_case_status("AML-0", CaseStatus::Closed).unwrap());
    assert!(seen.borrow().is_empty());
    assert_eq!(desk.transactions()[0].status, TransactionStatus::Cleared);
}

#[test]
fn invalid_transaction_never_reaches_the_store() {
    let (mut desk, _clock) = quiet_desk();
    let seen = recorder(&mut desk);

    let err = desk
        .add_transaction(TransactionDraft {
            amount: 0.0,
            sender: "A".to_string(),
            recipient: "Bob Jones".to_string(),
            description: None,
        })
        .unwrap_err();

    match err {
        DeskError::Validation(errors) => {
            let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
            assert_eq!(fields, vec!["sender", "amount"]);
        }
        other => panic!("expected validation error, got {other:?}"),
    }
    assert!(desk.transactions().is_empty());
    assert!(seen.borrow().is_empty());
    assert!(!desk.progress().has_transactions);
}

#[test]
fn invalid_case_is_rejected() {
    let (mut desk, _clock) = quiet_desk();
    let err = desk
        .add_case(CaseDraft {
            title: "Hm".to_string(),
            description: "short".to_string(),
            risk_level: RiskLevel::Low,
            ml_confidence: 150,
            status: CaseStatus::Open,
            transaction_id: None,
            assigned_to: None,
        })
        .unwrap_err();
    match err {
        DeskError::Validation(errors) => assert_eq!(errors.len(), 3),
        other => panic!("expected validation error, got {other:?}"),
    }
    assert!(desk.cases().is_empty());
}

#[test]
fn mount_syncs_then_poll_follows_interval() {
    let (mut desk, clock) = quiet_desk();
    desk.add_transaction(risky()).unwrap();

    // Not mounted yet: polling does nothing.
    assert!(desk.poll().unwrap().is_empty());
    assert!(desk.cases().is_empty());

    assert_eq!(desk.mount().unwrap().len(), 1);
    assert!(desk.is_mounted());

    desk.add_transaction(risky()).unwrap();
    assert!(desk.poll().unwrap().is_empty(), "interval has not elapsed");

    clock.advance(999);
    assert!(desk.poll().unwrap().is_empty());
    clock.advance(1);
    assert_eq!(desk.poll().unwrap().len(), 1);
    assert_eq!(desk.cases().len(), 2);

    desk.add_transaction(risky()).unwrap();
    desk.unmount();
    clock.advance(10_000);
    assert!(desk.poll().unwrap().is_empty(), "unmounted desk never syncs");
    assert_eq!(desk.cases().len(), 2);
}

#[test]
fn manual_case_sets_has_cases() {
    let (mut desk, _clock) = quiet_desk();
    let case = desk
        .add_case(CaseDraft {
            title: "Watchlist match".to_string(),
            description: "Counterparty appears on an internal watchlist.".to_string(),
            risk_level: RiskLevel::High,
            ml_confidence: 95,
            status: CaseStatus::Open,
            transaction_id: None,
            assigned_to: Some("J. Analyst".to_string()),
        })
        .unwrap();
    assert!(desk.progress().has_cases);
    assert!(desk.update_case_status(&case.id, CaseStatus::InReview).unwrap());
    assert_eq!(desk.cases()[0].status, CaseStatus::InReview);
}

#[test]
fn onboarding_complete_and_reset() {
    let (mut desk, _clock) = quiet_desk();
    desk.add_transaction(benign()).unwrap();
    desk.complete_onboarding().unwrap();
    assert!(!desk.progress().is_first_time);

    desk.reset_user_data().unwrap();
    assert!(desk.progress().is_first_time);
    assert!(!desk.progress().has_transactions);
    assert_eq!(desk.transactions().len(), 1, "reset leaves store data alone");
}

#[test]
fn adds_after_reset_raise_flags_again() {
    let (mut desk, _clock) = quiet_desk();
    desk.add_transaction(risky()).unwrap();
    desk.sync_cases().unwrap();
    desk.reset_user_data().unwrap();
    assert!(!desk.progress().has_transactions);
    assert!(!desk.progress().has_cases);

    desk.add_transaction(benign()).unwrap();
    assert!(desk.progress().has_transactions);
    assert!(!desk.progress().has_cases);

    desk.add_case(CaseDraft {
        title: "Watchlist match".to_string(),
        description: "Counterparty appears on an internal watchlist.".to_string(),
        risk_level: RiskLevel::High,
        ml_confidence: 95,
        status: CaseStatus::Open,
        transaction_id: None,
        assigned_to: None,
    })
    .unwrap();
    assert!(desk.progress().has_cases);
}

#[test]
fn derived_cases_after_reset_raise_has_cases() {
    let (mut desk, _clock) = quiet_desk();
    desk.add_transaction(risky()).unwrap();
    desk.sync_cases().unwrap();
    desk.reset_user_data().unwrap();

    desk.add_transaction(risky()).unwrap();
    assert_eq!(desk.sync_cases().unwrap().len(), 1);
    assert!(desk.progress().has_cases);
}

#[test]
fn summary_reflects_stores() {
    let (mut desk, _clock) = quiet_desk();
    desk.add_transaction(risky()).unwrap();
    desk.add_transaction(benign()).unwrap();
    desk.add_transaction(TransactionDraft {
        amount: 9_999.0,
        sender: "Cash Corp".to_string(),
        recipient: "Bob Jones".to_string(),
        description: None,
    })
    .unwrap();
    desk.sync_cases().unwrap();

    let summary = desk.summary();
    assert_eq!(summary.total_transactions, 3);
    assert_eq!(summary.risk_bands.high, 1);
    assert_eq!(summary.risk_bands.medium, 1);
    assert_eq!(summary.risk_bands.low, 1);
    assert_eq!(summary.flagged_transactions, 1);
    assert_eq!(summary.transactions_by_status["Pending"], 1);
    assert_eq!(summary.transactions_by_status["Blocked"], 0);
    assert!((summary.mean_risk_score - 140.0 / 3.0).abs() < 1e-9);
    assert_eq!(summary.total_cases, 1);
    assert_eq!(summary.open_cases, 1);
    assert_eq!(summary.cases_by_risk_level["High"], 1);
}

#[test]
fn commands_parse_from_json_and_execute() {
    let (mut desk, _clock) = quiet_desk();

    let command: DeskCommand = serde_json::from_str(
        r#"{"cmd":"add_transaction","transaction":{"amount":9999,"sender":"Cash Corp","recipient":"Bob Jones"}}"#,
    )
    .unwrap();
    let id = match desk.execute(command).unwrap() {
        CommandReply::Transaction { transaction } => {
            assert_eq!(transaction.risk_score, 60);
            assert_eq!(transaction.status, TransactionStatus::Pending);
            transaction.id
        }
        other => panic!("unexpected reply {other:?}"),
    };

    let command: DeskCommand = serde_json::from_str(&format!(
        r#"{{"cmd":"update_transaction_status","id":"{id}","status":"Flagged"}}"#
    ))
    .unwrap();
    assert!(matches!(desk.execute(command).unwrap(), CommandReply::Updated { found: true }));

    let synced = desk.execute(DeskCommand::SyncCases).unwrap();
    assert!(matches!(synced, CommandReply::Cases { ref cases } if cases.len() == 1));

    let command: DeskCommand =
        serde_json::from_str(r#"{"cmd":"filter_cases","status":"open"}"#).unwrap();
    match desk.execute(command).unwrap() {
        CommandReply::Cases { cases } => assert_eq!(cases.len(), 1),
        other => panic!("unexpected reply {other:?}"),
    }

    let reply = serde_json::to_value(desk.execute(DeskCommand::GetProgress).unwrap()).unwrap();
    assert_eq!(reply["reply"], "progress");
    assert_eq!(reply["progress"]["hasTransactions"], true);
    assert_eq!(reply["progress"]["hasCases"], true);
}
