//! Two desks, same seed, same operations: identical scores and case ids.

use aml_desk_core::{desk::Desk, transaction_store::TransactionDraft};

fn drafts() -> Vec<TransactionDraft> {
    let parties = [
        ("Offshore Ltd", "Shell Co"),
        ("Cash Express", "Unknown Beneficiary"),
        ("Alice Smith", "Bob Jones"),
        ("Foreign Trading", "Global Holdings"),
        ("Anonymous Donor", "Charity Fund"),
    ];
    let amounts = [9_999.0, 4_999.0, 12_000.0, 25_000.0, 75_000.0];
    (0..50)
        .map(|i| {
            let (sender, recipient) = parties[i % parties.len()];
            TransactionDraft {
                amount: amounts[(i / parties.len()) % amounts.len()],
                sender: sender.to_string(),
                recipient: recipient.to_string(),
                description: None,
            }
        })
        .collect()
}

fn run(seed: u64) -> (Vec<u8>, Vec<String>) {
    let mut desk = Desk::build_test(seed);
    for draft in drafts() {
        desk.add_transaction(draft).expect("valid draft");
    }
    desk.sync_cases().expect("sync");
    let scores = desk.transactions().iter().map(|t| t.risk_score).collect();
    let case_ids = desk.cases().iter().map(|c| c.id.clone()).collect();
    (scores, case_ids)
}

#[test]
fn same_seed_produces_identical_results() {
    let (scores_a, cases_a) = run(0xDEAD_BEEF_CAFE_1234);
    let (scores_b, cases_b) = run(0xDEAD_BEEF_CAFE_1234);
    assert_eq!(scores_a, scores_b);
    assert_eq!(cases_a, cases_b);
    assert!(!cases_a.is_empty());
}

#[test]
fn different_seeds_produce_different_noise() {
    let (scores_a, _) = run(42);
    let (scores_b, _) = run(99);
    assert_eq!(scores_a.len(), scores_b.len());
    assert!(
        scores_a.iter().zip(&scores_b).any(|(a, b)| a != b),
        "Different seeds produced identical scores; seed is not being used"
    );
}

#[test]
fn noisy_scores_stay_within_noise_of_base() {
    // "Alice Smith" -> "Bob Jones" at 9,999 scores 35 before noise.
    let mut desk = Desk::build_test(7);
    for _ in 0..200 {
        let tx = desk
            .add_transaction(TransactionDraft {
                amount: 9_999.0,
                sender: "Alice Smith".to_string(),
                recipient: "Bob Jones".to_string(),
                description: None,
            })
            .unwrap();
        assert!((30..=39).contains(&tx.risk_score), "score {}", tx.risk_score);
    }
}
