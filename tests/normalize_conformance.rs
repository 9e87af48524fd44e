//! Property tests for the normalizer and the comparator built on it.

use mrup_oracle::compare::normalize;
use mrup_oracle::{check, Cell, OrderSpec, ResultSet, Row, Schema, SortKey, Verdict};
use proptest::prelude::*;

fn schema() -> Schema {
    Schema::new(["dept", "salary", "note", "wf_result"]).unwrap()
}

/// Mostly numbers, with text that can turn the column lexical.
fn cell_strategy() -> impl Strategy<Value = Cell> {
    prop_oneof![
        2 => Just(Cell::Null),
        8 => (-50i64..50).prop_map(Cell::from),
        2 => (-5.0f64..5.0).prop_map(Cell::from),
        1 => prop_oneof![
            Just(Cell::text("9")),
            Just(Cell::text("10")),
            Just(Cell::text("10a")),
            Just(Cell::text("x")),
        ],
    ]
}

fn row_strategy() -> impl Strategy<Value = Row> {
    (
        prop_oneof![
            Just(Cell::Null),
            Just(Cell::text("eng")),
            Just(Cell::text("ops")),
            Just(Cell::text("sales")),
        ],
        cell_strategy(),
        prop_oneof![Just(Cell::text("a")), Just(Cell::text("b")), Just(Cell::Null)],
        cell_strategy(),
    )
        .prop_map(|(dept, salary, note, wf)| Row::new(vec![dept, salary, note, wf]))
}

fn spec_strategy() -> impl Strategy<Value = OrderSpec> {
    (any::<bool>(), any::<bool>(), any::<bool>()).prop_map(|(desc, nulls_first, with_note)| {
        let key = if desc { SortKey::desc(1) } else { SortKey::asc(1) };
        let key = if nulls_first {
            key.nulls_first()
        } else {
            key.nulls_last()
        };
        let mut keys = vec![key];
        if with_note {
            keys.push(SortKey::asc(2));
        }
        OrderSpec::new(keys)
    })
}

/// Rows plus a permutation of the same rows.
fn rows_and_permutation() -> impl Strategy<Value = (Vec<Row>, Vec<Row>)> {
    prop::collection::vec(row_strategy(), 0..40).prop_flat_map(|rows| {
        let shuffled = Just(rows.clone()).prop_shuffle();
        (Just(rows), shuffled)
    })
}

fn set(rows: Vec<Row>) -> ResultSet {
    ResultSet::new(schema(), rows).unwrap()
}

proptest! {
    #[test]
    fn prop_idempotent((rows, _) in rows_and_permutation(), spec in spec_strategy()) {
        let once = normalize(&set(rows), &spec).unwrap();
        prop_assert_eq!(normalize(&once, &spec).unwrap(), once);
    }

    #[test]
    fn prop_order_independent((rows, shuffled) in rows_and_permutation(), spec in spec_strategy()) {
        prop_assert_eq!(
            normalize(&set(rows), &spec).unwrap(),
            normalize(&set(shuffled), &spec).unwrap()
        );
    }

    #[test]
    fn prop_nulls_first_precede_values((rows, _) in rows_and_permutation(), desc in any::<bool>()) {
        let key = if desc { SortKey::desc(1) } else { SortKey::asc(1) };
        let spec = OrderSpec::new(vec![key.nulls_first()]);
        let out = normalize(&set(rows), &spec).unwrap();
        for pair in out.rows().windows(2) {
            if pair[0].partition_key() == pair[1].partition_key() {
                // Within a partition no value row precedes a NULL row.
                prop_assert!(!(!pair[0].cells()[1].is_null() && pair[1].cells()[1].is_null()));
            }
        }
    }

    #[test]
    fn prop_split_by_partition_passes((rows, shuffled) in rows_and_permutation(), spec in spec_strategy()) {
        // t1 holds eng and NULL partitions, t2 the rest: disjoint by construction.
        let in_t1 = |r: &Row| matches!(r.partition_key(), Cell::Null) || r.partition_key() == &Cell::text("eng");
        let t1: Vec<Row> = rows.iter().filter(|r| in_t1(*r)).cloned().collect();
        let t2: Vec<Row> = rows.iter().filter(|r| !in_t1(*r)).cloned().collect();

        let outcome = check(&set(t1), &set(t2), &set(shuffled), &spec).unwrap();
        prop_assert_eq!(outcome.verdict, Verdict::Pass);
    }

    #[test]
    fn prop_altered_wf_result_detected(
        (rows, shuffled) in rows_and_permutation(),
        spec in spec_strategy(),
        pick in any::<prop::sample::Index>(),
    ) {
        prop_assume!(!shuffled.is_empty());
        let mut altered = shuffled;
        let i = pick.index(altered.len());
        altered[i].0[3] = Cell::text("altered");

        let outcome = check(&set(rows), &ResultSet::empty(schema()), &set(altered), &spec).unwrap();
        prop_assert_eq!(outcome.verdict, Verdict::FailPartitionMismatch);
        prop_assert_eq!(outcome.diagnostics.mismatches.len(), 1);
    }
}

#[test]
fn test_nulls_first_under_desc() {
    let rows = vec![
        Row::new(vec!["eng".into(), 1.into(), "a".into(), 1.into()]),
        Row::new(vec!["eng".into(), Cell::Null, "a".into(), 2.into()]),
        Row::new(vec!["eng".into(), 3.into(), "a".into(), 3.into()]),
    ];
    let spec = OrderSpec::new(vec![SortKey::desc(1).nulls_first()]);
    let out = normalize(&set(rows), &spec).unwrap();
    let salaries: Vec<Cell> = out.iter().map(|r| r.cells()[1].clone()).collect();
    assert_eq!(salaries, vec![Cell::Null, Cell::from(3), Cell::from(1)]);
}

proptest! {
    #[test]
    fn prop_mixed_column_order_independent(
        (rows, shuffled) in rows_and_permutation(),
        spec in spec_strategy(),
    ) {
        // Force a lexical salary column on both sides.
        let tags = [
            Row::new(vec!["eng".into(), "10a".into(), Cell::Null, 1.into()]),
            Row::new(vec!["eng".into(), 9.into(), Cell::Null, 1.into()]),
        ];
        let mut rows = rows;
        let mut shuffled = shuffled;
        rows.extend(tags.iter().cloned());
        shuffled.splice(0..0, tags.iter().rev().cloned());

        let one = normalize(&set(rows), &spec).unwrap();
        let two = normalize(&set(shuffled), &spec).unwrap();
        prop_assert_eq!(normalize(&one, &spec).unwrap(), one.clone());
        prop_assert_eq!(one, two);
    }
}

#[test]
fn test_unresolved_order_column_is_error() {
    let rows = vec![Row::new(vec!["eng".into(), 1.into(), "a".into(), 1.into()])];
    let err = normalize(&set(rows), &OrderSpec::new(vec![SortKey::asc(7)])).unwrap_err();
    assert_eq!(err, mrup_oracle::ErrorCode::E300_UnresolvedOrderColumn(7, 4));
}
