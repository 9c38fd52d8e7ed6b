//! Architectural Contract Test: Diff Partition
//!
//! This test verifies the differ's classification over generated inputs.
//!
//! Constraints verified:
//! - Every desired record lands in exactly one of unchanged/create/modify
//! - Every current record lands in exactly one of unchanged/delete/modify
//! - Creates and deletes never share a (name, type, target) key
//! - Corrections touch each record-set at most once and are kind-ordered
//!
//! Inputs are generated with proptest; failing cases shrink to a minimal
//! pair of record lists.

mod common;

use std::collections::HashSet;

use common::*;
use proptest::prelude::*;
use zonesync_core::{CorrectionBuilder, Record, diff};

const NAMES: &[&str] = &["example.com", "www.example.com", "api.example.com", "mx.example.com"];
const TYPES: &[&str] = &["A", "TXT", "MX"];
const TARGETS: &[&str] = &["1", "2", "3", "4"];
const TTLS: &[u32] = &[0, 300, 600];

prop_compose! {
    fn arb_record()(
        name in prop::sample::select(NAMES),
        rtype in prop::sample::select(TYPES),
        target in prop::sample::select(TARGETS),
        ttl in prop::sample::select(TTLS),
    ) -> Record {
        rec(name, rtype, target, ttl)
    }
}

prop_compose! {
    /// Records free of exact-key duplicates; the first occurrence wins
    fn arb_records()(records in prop::collection::vec(arb_record(), 0..8)) -> Vec<Record> {
        let mut seen = HashSet::new();
        records
            .into_iter()
            .filter(|record| seen.insert(key(record)))
            .collect()
    }
}

fn key(record: &Record) -> (String, String, String) {
    (record.name.clone(), record.rtype.clone(), record.target.clone())
}

proptest! {
    #[test]
    fn diff_partitions_both_inputs(desired in arb_records(), current in arb_records()) {
        let changes = diff(&desired, &current);

        let mut expected: Vec<_> = desired.iter().map(key).collect();
        let mut actual: Vec<_> = changes
            .unchanged
            .iter()
            .chain(&changes.create)
            .chain(&changes.modify)
            .filter_map(|c| c.desired.as_ref())
            .map(key)
            .collect();
        expected.sort();
        actual.sort();
        prop_assert_eq!(actual, expected, "desired side");

        let mut expected: Vec<_> = current.iter().map(key).collect();
        let mut actual: Vec<_> = changes
            .unchanged
            .iter()
            .chain(&changes.delete)
            .chain(&changes.modify)
            .filter_map(|c| c.existing.as_ref())
            .map(key)
            .collect();
        expected.sort();
        actual.sort();
        prop_assert_eq!(actual, expected, "current side");

        let created: HashSet<_> = changes
            .create
            .iter()
            .filter_map(|c| c.desired.as_ref())
            .map(key)
            .collect();
        for deleted in changes.delete.iter().filter_map(|c| c.existing.as_ref()) {
            prop_assert!(
                !created.contains(&key(deleted)),
                "{} both created and deleted",
                deleted
            );
        }
    }

    #[test]
    fn corrections_touch_each_set_once_in_kind_order(
        desired in arb_records(),
        current in arb_records(),
    ) {
        let changes = diff(&desired, &current);

        let corrections = CorrectionBuilder::new(ZONE, ZONE, 300)
            .build_all(&changes, &desired, &current)
            .unwrap();

        let mut sets = HashSet::new();
        for correction in &corrections {
            prop_assert!(
                sets.insert((correction.change.name.clone(), correction.change.rtype.clone())),
                "record-set {} {} touched twice",
                correction.change.rtype,
                correction.change.name
            );
        }

        prop_assert!(
            corrections.windows(2).all(|pair| pair[0].kind <= pair[1].kind),
            "corrections not ordered by kind"
        );

        if changes.is_empty() {
            prop_assert!(corrections.is_empty(), "no-op produced corrections");
        }
    }
}
