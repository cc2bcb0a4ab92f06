//! Central-tendency statistics: mean, median, mode.
//!
//! All three are defined only on fully-populated numeric columns; a single
//! null fails the precondition scan before anything is computed.

use std::collections::HashMap;

use basalt_types::{Result, Value};
use rust_decimal::Decimal;

use crate::aggregation::{require_type, AggregateValue, Aggregation, CacheKey};
use crate::aggregations::rank::Quantiles;
use crate::aggregations::{complete_numbers, empty_data, NUMERIC};
use crate::column::Column;

/// Mean of a non-empty slice.
pub(crate) fn mean_of(values: &[Decimal]) -> Decimal {
    let total: Decimal = values.iter().sum();
    total / Decimal::from(values.len() as u64)
}

/// Arithmetic mean.
pub struct Mean;

impl Mean {
    pub fn new() -> Self {
        Mean
    }
}

impl Default for Mean {
    fn default() -> Self {
        Self::new()
    }
}

impl Aggregation for Mean {
    fn cache_key(&self) -> Option<CacheKey> {
        Some(CacheKey::Mean)
    }

    fn validate(&self, column: &Column) -> Result<()> {
        require_type(column, NUMERIC, "Mean")
    }

    fn run(&self, column: &Column) -> Result<AggregateValue> {
        let data = complete_numbers(column)?;
        if data.is_empty() {
            return Err(empty_data(column));
        }
        Ok(Value::Number(mean_of(&data)).into())
    }
}

/// Median: the 50th percentile boundary.
///
/// An even population takes the midpoint of the two middle values.
pub struct Median;

impl Median {
    pub fn new() -> Self {
        Median
    }
}

impl Default for Median {
    fn default() -> Self {
        Self::new()
    }
}

impl Aggregation for Median {
    fn cache_key(&self) -> Option<CacheKey> {
        Some(CacheKey::Median)
    }

    fn validate(&self, column: &Column) -> Result<()> {
        require_type(column, NUMERIC, "Median")
    }

    fn run(&self, column: &Column) -> Result<AggregateValue> {
        let mut data = complete_numbers(column)?;
        if data.is_empty() {
            return Err(empty_data(column));
        }
        data.sort();
        let halves = Quantiles::compute(&data, 2);
        Ok(Value::Number(halves[1]).into())
    }
}

/// Most frequent value.
///
/// When several values share the maximal count, the one appearing first in
/// row order wins, which keeps the result deterministic.
pub struct Mode;

impl Mode {
    pub fn new() -> Self {
        Mode
    }
}

impl Default for Mode {
    fn default() -> Self {
        Self::new()
    }
}

impl Aggregation for Mode {
    fn cache_key(&self) -> Option<CacheKey> {
        Some(CacheKey::Mode)
    }

    fn validate(&self, column: &Column) -> Result<()> {
        require_type(column, NUMERIC, "Mode")
    }

    fn run(&self, column: &Column) -> Result<AggregateValue> {
        let data = complete_numbers(column)?;
        if data.is_empty() {
            return Err(empty_data(column));
        }

        let mut counts: HashMap<Decimal, usize> = HashMap::new();
        for n in &data {
            *counts.entry(*n).or_insert(0) += 1;
        }
        let best = counts.values().copied().max().unwrap_or(0);
        let mode = data
            .iter()
            .find(|n| counts.get(*n) == Some(&best))
            .copied()
            .ok_or_else(|| empty_data(column))?;
        Ok(Value::Number(mode).into())
    }
}
