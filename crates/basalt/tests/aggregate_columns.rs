//! Integration battery: the column/aggregation contract end to end.
//!
//! Covers the cache discipline (one execution per key, ever, including
//! under concurrent first access), the type-validation matrix, null
//! strictness, and idempotence of repeated aggregation.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use basalt::{
    AggregateValue, Aggregation, All, Any, BasaltError, CacheKey, Column, Count, DataType,
    Deciles, Iqr, Length, Mad, Max, MaxLength, MaxPrecision, Mean, Median, Min, Mode,
    Percentiles, PopulationStDev, PopulationVariance, Quartiles, Quintiles, Result, StDev,
    Sum, Value, Variance,
};
use rust_decimal::Decimal;

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn number_column(name: &str, values: &[Option<&str>]) -> Column {
    Column::new(
        name,
        DataType::Number,
        values
            .iter()
            .map(|v| v.map(|s| Value::Number(dec(s))).unwrap_or(Value::Null))
            .collect(),
    )
    .unwrap()
}

/// A stand-in aggregation that counts how often `run` executes.
struct InstrumentedLength {
    runs: Arc<AtomicUsize>,
}

impl Aggregation for InstrumentedLength {
    fn cache_key(&self) -> Option<CacheKey> {
        Some(CacheKey::Length)
    }

    fn validate(&self, _column: &Column) -> Result<()> {
        Ok(())
    }

    fn run(&self, column: &Column) -> Result<AggregateValue> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        Ok(AggregateValue::Value(Value::Number(Decimal::from(
            column.len() as u64,
        ))))
    }
}

/// A stand-in aggregation that always fails at run time.
struct AlwaysFails {
    runs: Arc<AtomicUsize>,
}

impl Aggregation for AlwaysFails {
    fn cache_key(&self) -> Option<CacheKey> {
        Some(CacheKey::Mode)
    }

    fn validate(&self, _column: &Column) -> Result<()> {
        Ok(())
    }

    fn run(&self, _column: &Column) -> Result<AggregateValue> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        Err(BasaltError::EmptyData("instrumented failure".to_string()))
    }
}

#[test]
fn test_cache_executes_once_per_key() {
    let column = number_column("one", &[Some("1"), Some("2"), None]);
    let runs = Arc::new(AtomicUsize::new(0));
    let agg = InstrumentedLength { runs: runs.clone() };

    let first = column.aggregate(&agg).unwrap();
    assert_eq!(first.as_number(), Some(Decimal::from(3)));
    assert_eq!(runs.load(Ordering::SeqCst), 1);

    let second = column.aggregate(&agg).unwrap();
    assert_eq!(second, first);
    assert_eq!(runs.load(Ordering::SeqCst), 1);

    // A separate instance with the same key also hits the cache.
    let other = InstrumentedLength { runs: runs.clone() };
    column.aggregate(&other).unwrap();
    assert_eq!(runs.load(Ordering::SeqCst), 1);
}

#[test]
fn test_distinct_parameters_are_distinct_cache_entries() {
    let column = number_column("one", &[Some("1"), Some("2"), None, Some("1"), Some("1")]);

    assert_eq!(
        column
            .aggregate(&Count::new(Value::from(1)))
            .unwrap()
            .as_number(),
        Some(Decimal::from(3))
    );
    assert_eq!(
        column
            .aggregate(&Count::new(Value::from(4)))
            .unwrap()
            .as_number(),
        Some(Decimal::ZERO)
    );
    assert_eq!(
        column
            .aggregate(&Count::new(Value::Null))
            .unwrap()
            .as_number(),
        Some(Decimal::ONE)
    );
}

#[test]
fn test_failures_are_never_cached() {
    let column = number_column("one", &[Some("1")]);
    let runs = Arc::new(AtomicUsize::new(0));
    let agg = AlwaysFails { runs: runs.clone() };

    assert!(column.aggregate(&agg).is_err());
    assert!(column.aggregate(&agg).is_err());
    assert_eq!(runs.load(Ordering::SeqCst), 2);

    // The failed key is still open for a working aggregation.
    let mode = column.aggregate(&Mode::new()).unwrap();
    assert_eq!(mode.as_number(), Some(Decimal::ONE));
}

#[test]
fn test_concurrent_first_access_executes_once() {
    let column = Arc::new(number_column("one", &[Some("1"), Some("2"), Some("3")]));
    let runs = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let column = column.clone();
            let runs = runs.clone();
            thread::spawn(move || {
                let agg = InstrumentedLength { runs };
                column.aggregate(&agg).unwrap().as_number()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), Some(Decimal::from(3)));
    }
    assert_eq!(runs.load(Ordering::SeqCst), 1);
}

#[test]
fn test_predicate_aggregations_bypass_the_cache() {
    let column = number_column("one", &[Some("1"), Some("2"), None]);

    // Distinct closures must not collide: contradictory results would be
    // served from the cache if they shared a key.
    assert_eq!(
        column
            .aggregate(&Any::with(|v| *v == Value::from(2)))
            .unwrap()
            .as_boolean(),
        Some(true)
    );
    assert_eq!(
        column
            .aggregate(&Any::with(|v| *v == Value::from(5)))
            .unwrap()
            .as_boolean(),
        Some(false)
    );
    assert_eq!(
        column
            .aggregate(&All::with(|v| *v != Value::from(5)))
            .unwrap()
            .as_boolean(),
        Some(true)
    );
    assert_eq!(
        column
            .aggregate(&All::with(|v| *v == Value::from(2)))
            .unwrap()
            .as_boolean(),
        Some(false)
    );
}

#[test]
fn test_type_validation_matrix() {
    let text = Column::new(
        "three",
        DataType::Text,
        vec![Value::from("a"), Value::from("b"), Value::from("c")],
    )
    .unwrap();

    let numeric_only: Vec<Box<dyn Aggregation>> = vec![
        Box::new(MaxPrecision::new()),
        Box::new(Sum::new()),
        Box::new(Min::new()),
        Box::new(Max::new()),
        Box::new(Mean::new()),
        Box::new(Median::new()),
        Box::new(Mode::new()),
        Box::new(Variance::new()),
        Box::new(PopulationVariance::new()),
        Box::new(StDev::new()),
        Box::new(PopulationStDev::new()),
        Box::new(Mad::new()),
        Box::new(Iqr::new()),
        Box::new(Percentiles::new()),
        Box::new(Quartiles::new()),
        Box::new(Quintiles::new()),
        Box::new(Deciles::new()),
    ];

    for agg in &numeric_only {
        assert!(matches!(
            text.aggregate(agg.as_ref()).unwrap_err(),
            BasaltError::Type(_)
        ));
    }

    // Counting aggregations accept text.
    assert_eq!(
        text.aggregate(&Length::new()).unwrap().as_number(),
        Some(Decimal::from(3))
    );
    assert_eq!(
        text.aggregate(&Count::new(Value::from("b")))
            .unwrap()
            .as_number(),
        Some(Decimal::ONE)
    );
    assert_eq!(
        text.aggregate(&MaxLength::new()).unwrap().as_number(),
        Some(Decimal::ONE)
    );
}

#[test]
fn test_null_strictness() {
    let column = number_column("one", &[Some("1.1"), Some("2.7"), None, Some("2.7")]);

    let strict: Vec<Box<dyn Aggregation>> = vec![
        Box::new(Mean::new()),
        Box::new(Median::new()),
        Box::new(Mode::new()),
        Box::new(Variance::new()),
        Box::new(PopulationVariance::new()),
        Box::new(StDev::new()),
        Box::new(PopulationStDev::new()),
        Box::new(Mad::new()),
        Box::new(Iqr::new()),
        Box::new(Percentiles::new()),
        Box::new(Quartiles::new()),
        Box::new(Quintiles::new()),
        Box::new(Deciles::new()),
    ];

    for agg in &strict {
        assert!(matches!(
            column.aggregate(agg.as_ref()).unwrap_err(),
            BasaltError::NullData(_)
        ));
    }

    // Sum is the exception: nulls are skipped, and an all-null column sums
    // to zero.
    assert_eq!(
        column.aggregate(&Sum::new()).unwrap().as_number(),
        Some(dec("6.5"))
    );
    let all_null = number_column("empty", &[None, None]);
    assert_eq!(
        all_null.aggregate(&Sum::new()).unwrap().as_number(),
        Some(Decimal::ZERO)
    );
}

#[test]
fn test_repeated_aggregation_is_idempotent() {
    let column = number_column(
        "two",
        &[Some("2.19"), Some("3.42"), Some("4.1"), Some("3.42")],
    );

    let aggs: Vec<Box<dyn Aggregation>> = vec![
        Box::new(Length::new()),
        Box::new(Sum::new()),
        Box::new(Min::new()),
        Box::new(Max::new()),
        Box::new(Mean::new()),
        Box::new(Median::new()),
        Box::new(Mode::new()),
        Box::new(Variance::new()),
        Box::new(StDev::new()),
        Box::new(Mad::new()),
        Box::new(Iqr::new()),
        Box::new(Quartiles::new()),
        Box::new(Percentiles::new()),
    ];

    for agg in &aggs {
        let first = column.aggregate(agg.as_ref()).unwrap();
        let second = column.aggregate(agg.as_ref()).unwrap();
        assert_eq!(first, second);
    }
}

#[test]
fn test_clones_share_the_cache() {
    let column = number_column("one", &[Some("1"), Some("2")]);
    let runs = Arc::new(AtomicUsize::new(0));

    let agg = InstrumentedLength { runs: runs.clone() };
    column.aggregate(&agg).unwrap();

    let clone = column.clone();
    clone.aggregate(&agg).unwrap();
    assert_eq!(runs.load(Ordering::SeqCst), 1);
}

#[test]
fn test_quantile_results_round_trip_through_the_cache() {
    let column = number_column("one", &[Some("1"), Some("2"), Some("3"), Some("4")]);

    let first = column.aggregate(&Quartiles::new()).unwrap();
    let quartiles = first.as_quantiles().unwrap();
    assert_eq!(quartiles.boundaries().len(), 5);
    assert_eq!(quartiles[2], dec("2.5"));
    assert_eq!(quartiles.locate(dec("3")).unwrap(), 2);

    let second = column.aggregate(&Quartiles::new()).unwrap();
    assert_eq!(first, second);
}
