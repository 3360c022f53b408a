//! Property-based tests for interaction reconciliation

use super::*;
use crate::testing::{StubAdvisor, StubInteractionDb};
use proptest::prelude::*;

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
        .block_on(future)
}

fn arb_drug() -> impl Strategy<Value = String> {
    "[a-z]{3,10}"
}

/// Candidates, current medications, and a lookup that knows some of the pairs
fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<String>, StubInteractionDb)> {
    (
        prop::collection::vec(arb_drug(), 0..6),
        prop::collection::vec(arb_drug(), 0..6),
    )
        .prop_flat_map(|(candidates, current)| {
            let pairs = candidates.len() * current.len();
            (
                Just(candidates),
                Just(current),
                prop::collection::vec(0u8..3, pairs),
            )
        })
        .prop_map(|(candidates, current, verdicts)| {
            let mut db = StubInteractionDb::new();
            let all_pairs = candidates
                .iter()
                .flat_map(|c| current.iter().map(move |m| (c.clone(), m.clone())));
            for ((candidate, med), verdict) in all_pairs.zip(verdicts) {
                db = match verdict {
                    0 => db,
                    1 => db.with_finding(&candidate, &med, "moderate", "interaction"),
                    _ => db.with_failure(&candidate, &med),
                };
            }
            (candidates, current, db)
        })
}

proptest! {
    #[test]
    fn report_has_no_empty_entries((candidates, current, db) in arb_scenario()) {
        let report = block_on(reconcile(
            &candidates,
            &current,
            &db,
            &StubAdvisor::failing(),
            ReconcileOptions::default(),
        ));

        for (name, findings) in report.iter() {
            prop_assert!(!findings.is_empty());
            prop_assert!(candidates.iter().any(|c| c == name));
            for finding in findings {
                prop_assert!(current.contains(&finding.partner_drug));
            }
        }
        if current.is_empty() {
            prop_assert!(report.is_empty());
        }
    }

    #[test]
    fn reconcile_is_idempotent((candidates, current, db) in arb_scenario()) {
        let advisor = StubAdvisor::failing();
        let first = block_on(reconcile(&candidates, &current, &db, &advisor, ReconcileOptions::default()));
        let second = block_on(reconcile(&candidates, &current, &db, &advisor, ReconcileOptions::default()));

        prop_assert_eq!(&first, &second);
        prop_assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn failures_never_abort_the_batch((candidates, current, db) in arb_scenario()) {
        let report = block_on(reconcile(
            &candidates,
            &current,
            &db,
            &StubAdvisor::failing(),
            ReconcileOptions::default(),
        ));

        let distinct: std::collections::HashSet<_> = candidates.iter().collect();
        prop_assert_eq!(report.pairs().len(), distinct.len() * current.len());
    }
}
