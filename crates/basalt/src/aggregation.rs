//! The aggregation contract.
//!
//! Every statistic implements [`Aggregation`]: a structural cache key, a
//! data-type validation step, and the computation itself. A `Column` runs an
//! aggregation at most once per cache key; validation and computation
//! failures are never cached.

use basalt_types::{BasaltError, DataType, Result, Value};
use rust_decimal::Decimal;

use crate::aggregations::rank::Quantiles;
use crate::column::Column;

/// Structural identity of an aggregation instance.
///
/// Two instances with equal parameters collide on the same key; distinct
/// parameters never do. Keys are plain data rather than formatted strings,
/// so parameter values cannot alias each other.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Any,
    All,
    Length,
    Count(Value),
    MaxLength,
    MaxPrecision,
    Sum,
    Min,
    Max,
    Mean,
    Median,
    Mode,
    Variance,
    PopulationVariance,
    StDev,
    PopulationStDev,
    Mad,
    Iqr,
    Percentiles,
    Quartiles,
    Quintiles,
    Deciles,
}

/// Result of running an aggregation: a scalar value or a quantile table.
#[derive(Debug, Clone, PartialEq)]
pub enum AggregateValue {
    Value(Value),
    Quantiles(Quantiles),
}

impl AggregateValue {
    /// The scalar result, if this is one.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            AggregateValue::Value(v) => Some(v),
            AggregateValue::Quantiles(_) => None,
        }
    }

    /// The numeric scalar result, if this is one.
    pub fn as_number(&self) -> Option<Decimal> {
        self.as_value().and_then(Value::as_number)
    }

    /// The boolean scalar result, if this is one.
    pub fn as_boolean(&self) -> Option<bool> {
        self.as_value().and_then(Value::as_boolean)
    }

    /// The quantile table, if this is one.
    pub fn as_quantiles(&self) -> Option<&Quantiles> {
        match self {
            AggregateValue::Value(_) => None,
            AggregateValue::Quantiles(q) => Some(q),
        }
    }
}

impl From<Value> for AggregateValue {
    fn from(v: Value) -> Self {
        AggregateValue::Value(v)
    }
}

impl From<Quantiles> for AggregateValue {
    fn from(q: Quantiles) -> Self {
        AggregateValue::Quantiles(q)
    }
}

/// A reusable statistic definition.
///
/// Implementations are value objects: parameters are baked in at
/// construction, no state is kept across invocations, and instances are safe
/// to apply to many columns from many threads.
pub trait Aggregation: Send + Sync {
    /// Structural cache key, or `None` when results must not be cached
    /// (aggregations parameterized by closures have no comparable identity).
    fn cache_key(&self) -> Option<CacheKey>;

    /// Check the column's data type against the accepted set. Runs before
    /// [`Aggregation::run`]; a failure here means the computation was never
    /// started.
    fn validate(&self, column: &Column) -> Result<()>;

    /// Compute the statistic. `validate` has already passed.
    fn run(&self, column: &Column) -> Result<AggregateValue>;
}

/// Validation helper: the column's data type must be one of `accepted`.
pub(crate) fn require_type(column: &Column, accepted: &[DataType], name: &str) -> Result<()> {
    if accepted.contains(&column.data_type()) {
        Ok(())
    } else {
        Err(BasaltError::Type(format!(
            "{} cannot operate on {} column '{}'",
            name,
            column.data_type(),
            column.name()
        )))
    }
}
