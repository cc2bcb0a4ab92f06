//! Counting, boolean, and length aggregations.

use std::sync::Arc;

use basalt_types::{BasaltError, DataType, Result, Value};
use rust_decimal::Decimal;

use crate::aggregation::{require_type, AggregateValue, Aggregation, CacheKey};
use crate::aggregations::NUMERIC;
use crate::column::Column;

/// Predicate over a single value, used by [`Any`] and [`All`].
pub type Predicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

fn boolean_truth(value: &Value) -> bool {
    matches!(value, Value::Boolean(true))
}

/// True if at least one non-null value satisfies the predicate.
///
/// Without an explicit predicate the values themselves are tested for
/// truth, which only makes sense on a boolean column. Nulls are ignored,
/// never counted as failures.
pub struct Any {
    predicate: Option<Predicate>,
}

impl Any {
    /// Test the truth of the boolean values themselves.
    pub fn new() -> Self {
        Any { predicate: None }
    }

    /// Test values against a caller-supplied predicate.
    pub fn with<F>(predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Any {
            predicate: Some(Arc::new(predicate)),
        }
    }

    fn test(&self, value: &Value) -> bool {
        match &self.predicate {
            Some(p) => p(value),
            None => boolean_truth(value),
        }
    }
}

impl Default for Any {
    fn default() -> Self {
        Self::new()
    }
}

impl Aggregation for Any {
    fn cache_key(&self) -> Option<CacheKey> {
        // A closure has no comparable identity; custom predicates bypass
        // the cache entirely.
        match self.predicate {
            None => Some(CacheKey::Any),
            Some(_) => None,
        }
    }

    fn validate(&self, column: &Column) -> Result<()> {
        if self.predicate.is_none() && column.data_type() != DataType::Boolean {
            return Err(BasaltError::Usage(format!(
                "Any without a predicate requires a boolean column, got {} column '{}'",
                column.data_type(),
                column.name()
            )));
        }
        Ok(())
    }

    fn run(&self, column: &Column) -> Result<AggregateValue> {
        let result = column
            .data()
            .iter()
            .filter(|v| !v.is_null())
            .any(|v| self.test(v));
        Ok(Value::Boolean(result).into())
    }
}

/// True if every non-null value satisfies the predicate.
///
/// Same predicate rules as [`Any`]; an empty or all-null column is
/// vacuously true.
pub struct All {
    predicate: Option<Predicate>,
}

impl All {
    /// Test the truth of the boolean values themselves.
    pub fn new() -> Self {
        All { predicate: None }
    }

    /// Test values against a caller-supplied predicate.
    pub fn with<F>(predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        All {
            predicate: Some(Arc::new(predicate)),
        }
    }

    fn test(&self, value: &Value) -> bool {
        match &self.predicate {
            Some(p) => p(value),
            None => boolean_truth(value),
        }
    }
}

impl Default for All {
    fn default() -> Self {
        Self::new()
    }
}

impl Aggregation for All {
    fn cache_key(&self) -> Option<CacheKey> {
        match self.predicate {
            None => Some(CacheKey::All),
            Some(_) => None,
        }
    }

    fn validate(&self, column: &Column) -> Result<()> {
        if self.predicate.is_none() && column.data_type() != DataType::Boolean {
            return Err(BasaltError::Usage(format!(
                "All without a predicate requires a boolean column, got {} column '{}'",
                column.data_type(),
                column.name()
            )));
        }
        Ok(())
    }

    fn run(&self, column: &Column) -> Result<AggregateValue> {
        let result = column
            .data()
            .iter()
            .filter(|v| !v.is_null())
            .all(|v| self.test(v));
        Ok(Value::Boolean(result).into())
    }
}

/// Total row count, nulls included.
pub struct Length;

impl Length {
    pub fn new() -> Self {
        Length
    }
}

impl Default for Length {
    fn default() -> Self {
        Self::new()
    }
}

impl Aggregation for Length {
    fn cache_key(&self) -> Option<CacheKey> {
        Some(CacheKey::Length)
    }

    fn validate(&self, _column: &Column) -> Result<()> {
        Ok(())
    }

    fn run(&self, column: &Column) -> Result<AggregateValue> {
        Ok(Value::Number(Decimal::from(column.len() as u64)).into())
    }
}

/// Number of values exactly equal to a target.
///
/// The target may be null, counting the column's nulls.
pub struct Count {
    target: Value,
}

impl Count {
    pub fn new(target: Value) -> Self {
        Count { target }
    }
}

impl Aggregation for Count {
    fn cache_key(&self) -> Option<CacheKey> {
        Some(CacheKey::Count(self.target.clone()))
    }

    fn validate(&self, _column: &Column) -> Result<()> {
        Ok(())
    }

    fn run(&self, column: &Column) -> Result<AggregateValue> {
        let count = column.data().iter().filter(|v| **v == self.target).count();
        Ok(Value::Number(Decimal::from(count as u64)).into())
    }
}

/// Maximum character length among non-null text values.
///
/// Characters, not bytes. An all-null column yields 0.
pub struct MaxLength;

impl MaxLength {
    pub fn new() -> Self {
        MaxLength
    }
}

impl Default for MaxLength {
    fn default() -> Self {
        Self::new()
    }
}

impl Aggregation for MaxLength {
    fn cache_key(&self) -> Option<CacheKey> {
        Some(CacheKey::MaxLength)
    }

    fn validate(&self, column: &Column) -> Result<()> {
        require_type(column, &[DataType::Text], "MaxLength")
    }

    fn run(&self, column: &Column) -> Result<AggregateValue> {
        let max = column
            .data()
            .iter()
            .filter_map(Value::as_text)
            .map(|s| s.chars().count())
            .max()
            .unwrap_or(0);
        Ok(Value::Number(Decimal::from(max as u64)).into())
    }
}

/// Maximum count of significant fractional digits among non-null numbers.
///
/// Trailing zeros are not significant: 2.70 has one fractional digit. This
/// drives display quantization elsewhere; it is not itself a statistic. An
/// all-null column yields 0.
pub struct MaxPrecision;

impl MaxPrecision {
    pub fn new() -> Self {
        MaxPrecision
    }
}

impl Default for MaxPrecision {
    fn default() -> Self {
        Self::new()
    }
}

impl Aggregation for MaxPrecision {
    fn cache_key(&self) -> Option<CacheKey> {
        Some(CacheKey::MaxPrecision)
    }

    fn validate(&self, column: &Column) -> Result<()> {
        require_type(column, NUMERIC, "MaxPrecision")
    }

    fn run(&self, column: &Column) -> Result<AggregateValue> {
        let max = column
            .data()
            .iter()
            .filter_map(Value::as_number)
            .map(|n| n.normalize().scale())
            .max()
            .unwrap_or(0);
        Ok(Value::Number(Decimal::from(max)).into())
    }
}
