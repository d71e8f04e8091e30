//! Property-based tests for deep copies.
//!
//! Properties under test:
//! 1. identity copies are equal to their source
//! 2. the transform runs once per property value and once per element
//! 3. a tag-scoped transform leaves untagged values unchanged

use std::{
    cell::Cell,
    collections::{BTreeMap, HashMap, HashSet, VecDeque},
};

use proptest::prelude::*;
use transcopy::{deep_copy, deep_copy_and_apply, transform::on_sensitive, DeepCopy};

#[derive(Clone, Debug, PartialEq, DeepCopy)]
struct Record {
    id: u64,
    #[sensitive]
    secret: String,
    labels: Vec<String>,
    scores: BTreeMap<String, i64>,
    note: Option<String>,
}

#[derive(Clone, Debug, PartialEq, DeepCopy)]
enum Entry {
    Single(Record),
    Many { records: Vec<Record>, tags: HashSet<String> },
    Empty,
}

fn arb_record() -> impl Strategy<Value = Record> {
    (
        any::<u64>(),
        "[[:print:]]{0,16}",
        proptest::collection::vec("[a-z]{0,8}", 0..6),
        proptest::collection::btree_map("[a-z]{1,6}", any::<i64>(), 0..6),
        proptest::option::of("[[:print:]]{0,12}"),
    )
        .prop_map(|(id, secret, labels, scores, note)| Record {
            id,
            secret,
            labels,
            scores,
            note,
        })
}

fn arb_entry() -> impl Strategy<Value = Entry> {
    prop_oneof![
        arb_record().prop_map(Entry::Single),
        (
            proptest::collection::vec(arb_record(), 0..4),
            proptest::collection::hash_set("[a-z]{0,6}", 0..4),
        )
            .prop_map(|(records, tags)| Entry::Many { records, tags }),
        Just(Entry::Empty),
    ]
}

/// Property values plus collection elements below a `Record`.
fn transform_calls(record: &Record) -> usize {
    5 + record.labels.len() + record.scores.len()
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 128, ..Default::default() })]

    /// Property: identity copies of nested structures are equal to the source.
    #[test]
    fn identity_copy_is_equal(entries in proptest::collection::vec(arb_entry(), 0..6)) {
        let copy = deep_copy(&entries).unwrap();
        prop_assert_eq!(copy, entries);
    }

    /// Property: identity copies of maps and deques are equal to the source.
    #[test]
    fn identity_copy_of_std_collections(
        map in proptest::collection::hash_map(
            "[a-z]{0,8}",
            proptest::collection::vec(any::<u8>(), 0..4),
            0..8,
        ),
        deque in proptest::collection::vec_deque(any::<i32>(), 0..16),
    ) {
        let map: HashMap<String, Vec<u8>> = map;
        let deque: VecDeque<i32> = deque;
        prop_assert_eq!(deep_copy(&map).unwrap(), map);
        prop_assert_eq!(deep_copy(&deque).unwrap(), deque);
    }

    /// Property: the transform runs once per property value and per element.
    #[test]
    fn transform_runs_once_per_value(record in arb_record()) {
        let calls = Cell::new(0_usize);
        deep_copy_and_apply(&record, |_, value| {
            calls.set(calls.get() + 1);
            Ok(value)
        })
        .unwrap();
        prop_assert_eq!(calls.get(), transform_calls(&record));
    }

    /// Property: a sensitive-only transform changes nothing else.
    #[test]
    fn sensitive_transform_is_scoped(record in arb_record()) {
        let copy =
            deep_copy_and_apply(&record, on_sensitive(|text| Ok(format!("<{text}>")))).unwrap();
        prop_assert_eq!(&copy.secret, &format!("<{}>", record.secret));
        prop_assert_eq!(copy.id, record.id);
        prop_assert_eq!(&copy.labels, &record.labels);
        prop_assert_eq!(&copy.scores, &record.scores);
        prop_assert_eq!(&copy.note, &record.note);
    }
}

#[test]
fn transform_calls_matches_a_known_record() {
    let record = Record {
        id: 1,
        secret: "s".into(),
        labels: vec!["a".into(), "b".into()],
        scores: BTreeMap::from([("x".into(), 1)]),
        note: None,
    };
    assert_eq!(transform_calls(&record), 8);
}
