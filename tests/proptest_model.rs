//! Property tests for the time-series model.
//!
//! Run: cargo test --test proptest_model

#![allow(clippy::unwrap_used, missing_docs)]

use proptest::prelude::*;
use trueno_strip::model::{RingColumn, TableEvent, TimeSeriesTable};
use trueno_strip::Error;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// After N appends a column holds the last min(N, C) values in order.
    #[test]
    fn prop_column_keeps_most_recent(
        capacity in 1usize..64,
        values in prop::collection::vec(-1000i64..1000, 0..256)
    ) {
        let mut column = RingColumn::new("v", capacity).unwrap();
        for &v in &values {
            column.append(v);
        }

        let kept = values.len().min(capacity);
        prop_assert_eq!(column.len(), kept);
        let expected = &values[values.len() - kept..];
        prop_assert_eq!(column.iter().collect::<Vec<_>>(), expected.to_vec());
    }

    /// Resizing retains min(len, new capacity) newest values in order.
    #[test]
    fn prop_resize_keeps_newest(
        capacity in 1usize..64,
        new_capacity in 1usize..64,
        values in prop::collection::vec(any::<i32>(), 0..128)
    ) {
        let mut column = RingColumn::new("v", capacity).unwrap();
        for &v in &values {
            column.append(v);
        }
        let before: Vec<i32> = column.iter().collect();

        column.resize(new_capacity).unwrap();

        let kept = before.len().min(new_capacity);
        prop_assert_eq!(column.capacity(), new_capacity);
        prop_assert_eq!(column.iter().collect::<Vec<_>>(), before[before.len() - kept..].to_vec());

        // The new capacity is enforced on later appends.
        for v in 0..(new_capacity as i32 + 3) {
            column.append(v);
        }
        prop_assert_eq!(column.len(), new_capacity);
    }

    /// A row with the wrong number of values changes nothing.
    #[test]
    fn prop_append_is_atomic(
        series in 1usize..5,
        rows in prop::collection::vec(-50.0f64..150.0, 0..20),
        bad_count in 0usize..8,
        bad_value in -1.0e6f64..1.0e6
    ) {
        prop_assume!(bad_count != series);
        let names: Vec<String> = (0..series).map(|i| format!("s{i}")).collect();
        let mut table = TimeSeriesTable::new(&names, 16).unwrap();
        for (t, &v) in rows.iter().enumerate() {
            table.append(t as i64, &vec![v; series]).unwrap();
        }
        let events = table.subscribe();
        let (len, min, max) = (table.len(), table.value_min(), table.value_max());

        let result = table.append(1_000, &vec![bad_value; bad_count]);

        let is_mismatch = matches!(
            result,
            Err(Error::ValueCountMismatch { expected, actual })
                if expected == series && actual == bad_count
        );
        prop_assert!(is_mismatch);
        prop_assert_eq!(table.len(), len);
        prop_assert_eq!(table.value_min(), min);
        prop_assert_eq!(table.value_max(), max);
        prop_assert!(events.try_recv().is_err());
    }

    /// Bounds only widen through appends and stay ordered.
    #[test]
    fn prop_bounds_expand_monotonically(
        values in prop::collection::vec(-1.0e6f64..1.0e6, 1..100)
    ) {
        let mut table = TimeSeriesTable::new(&["v"], 8).unwrap();
        let mut events = Vec::new();
        let rx = table.subscribe();

        for (t, &v) in values.iter().enumerate() {
            let (min, max) = (table.value_min(), table.value_max());
            table.append(t as i64, &[v]).unwrap();
            prop_assert!(table.value_min() <= min);
            prop_assert!(table.value_max() >= max);
            prop_assert!(table.value_min() < table.value_max());
            prop_assert!(table.value_min() <= v && v <= table.value_max());
            events.extend(rx.try_iter());
        }

        let changed = events.iter().filter(|e| **e == TableEvent::Changed).count();
        prop_assert_eq!(changed, values.len());
    }

    /// Advancing a cursor succeeds exactly len times, then every read fails.
    #[test]
    fn prop_cursor_exhaustion(
        capacity in 1usize..32,
        appends in 0usize..64
    ) {
        let mut table = TimeSeriesTable::new(&["v"], capacity).unwrap();
        for i in 0..appends {
            table.append(i as i64, &[i as f64]).unwrap();
        }

        let mut cursor = table.first_cursor();
        let mut advanced = 0;
        while cursor.advance() {
            prop_assert!(cursor.read(0).is_ok());
            advanced += 1;
        }
        prop_assert_eq!(advanced, table.len());
        prop_assert!(cursor.is_detached());
        prop_assert!(matches!(cursor.read(0), Err(Error::InvalidCursor)));
        prop_assert!(matches!(cursor.timestamp(), Err(Error::InvalidCursor)));
        prop_assert!(!cursor.advance());
    }

    /// A row read back through a fresh cursor equals what was appended.
    #[test]
    fn prop_round_trip(
        prefix in prop::collection::vec(-100.0f64..100.0, 0..10),
        row in prop::collection::vec(-1.0e9f64..1.0e9, 3),
        timestamp in 0i64..i64::MAX / 2
    ) {
        let mut table = TimeSeriesTable::new(&["a", "b", "c"], 8).unwrap();
        for (t, &v) in prefix.iter().enumerate() {
            table.append(t as i64, &[v, v, v]).unwrap();
        }
        table.append(timestamp, &row).unwrap();

        let mut cursor = table.first_cursor();
        for _ in 0..table.len() {
            prop_assert!(cursor.advance());
        }
        prop_assert_eq!(cursor.timestamp().unwrap(), timestamp);
        for (column, &expected) in row.iter().enumerate() {
            prop_assert_eq!(cursor.read(column).unwrap(), expected);
        }
    }
}
