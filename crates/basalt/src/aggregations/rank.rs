//! Rank-based statistics: the percentile family and its boundary table.
//!
//! One shared algorithm divides a sorted, fully-populated numeric column
//! into G equal-sized groups and reports the G + 1 boundary values. Interior
//! boundaries sit at the fractional rank `k = n * i / G`: when the rank
//! lands between two data points the boundary is the midpoint of the
//! adjacent values, so the output reproduces the classical published
//! quartile tables under ties and even/odd population sizes.

use std::ops::Index;
use std::sync::Arc;

use basalt_types::{BasaltError, Result};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::aggregation::{require_type, AggregateValue, Aggregation, CacheKey};
use crate::aggregations::{complete_numbers, empty_data, NUMERIC};
use crate::column::Column;

/// Boundaries dividing a sorted numeric column into equal-sized groups.
///
/// Holds `groups + 1` boundary values in ascending order. Boundary 0 is the
/// minimum, boundary `groups` the maximum.
#[derive(Debug, Clone, PartialEq)]
pub struct Quantiles {
    boundaries: Arc<[Decimal]>,
}

impl Quantiles {
    /// Compute the boundaries for `groups` groups.
    ///
    /// `sorted` must be non-empty and sorted ascending; `groups` at least 1.
    pub(crate) fn compute(sorted: &[Decimal], groups: usize) -> Quantiles {
        debug_assert!(!sorted.is_empty());
        debug_assert!(groups >= 1);

        let n = sorted.len();
        let count = Decimal::from(n as u64);
        let mut boundaries = Vec::with_capacity(groups + 1);

        boundaries.push(sorted[0]);
        for i in 1..groups {
            let rank = count * Decimal::from(i as u64) / Decimal::from(groups as u64);
            let low = rank.ceil().to_usize().unwrap_or(1).max(1);
            let high = (rank.floor().to_usize().unwrap_or(n) + 1).min(n);
            if low == high {
                boundaries.push(sorted[low - 1]);
            } else {
                // The rank falls between two data points; take their midpoint.
                boundaries.push((sorted[low - 1] + sorted[high - 1]) / Decimal::TWO);
            }
        }
        boundaries.push(sorted[n - 1]);

        Quantiles {
            boundaries: boundaries.into(),
        }
    }

    /// Number of groups.
    pub fn groups(&self) -> usize {
        self.boundaries.len() - 1
    }

    /// All boundary values, ascending; length is `groups() + 1`.
    pub fn boundaries(&self) -> &[Decimal] {
        &self.boundaries
    }

    /// The group whose interval `[boundary[i], boundary[i + 1])` contains
    /// `value`.
    ///
    /// Intervals are half-open, with one exception: a value equal to the
    /// series maximum belongs to the last group. Anything below the first
    /// boundary or beyond the maximum is out of range.
    pub fn locate(&self, value: Decimal) -> Result<usize> {
        let last = self.boundaries.len() - 1;
        let below_or_at = self.boundaries.partition_point(|b| *b <= value);
        if below_or_at == 0 {
            return Err(BasaltError::Range(format!(
                "{} is below the first boundary {}",
                value, self.boundaries[0]
            )));
        }
        if below_or_at > last {
            if value == self.boundaries[last] {
                return Ok(last - 1);
            }
            return Err(BasaltError::Range(format!(
                "{} is beyond the last boundary {}",
                value, self.boundaries[last]
            )));
        }
        Ok(below_or_at - 1)
    }
}

impl Index<usize> for Quantiles {
    type Output = Decimal;

    fn index(&self, i: usize) -> &Decimal {
        &self.boundaries[i]
    }
}

/// Shared runner: null-strict scan, sort, compute boundaries.
fn run_groups(column: &Column, groups: usize) -> Result<AggregateValue> {
    let mut data = complete_numbers(column)?;
    if data.is_empty() {
        return Err(empty_data(column));
    }
    data.sort();
    Ok(Quantiles::compute(&data, groups).into())
}

/// Percentile boundaries: 100 groups, 101 boundaries.
pub struct Percentiles;

impl Percentiles {
    pub fn new() -> Self {
        Percentiles
    }
}

impl Default for Percentiles {
    fn default() -> Self {
        Self::new()
    }
}

impl Aggregation for Percentiles {
    fn cache_key(&self) -> Option<CacheKey> {
        Some(CacheKey::Percentiles)
    }

    fn validate(&self, column: &Column) -> Result<()> {
        require_type(column, NUMERIC, "Percentiles")
    }

    fn run(&self, column: &Column) -> Result<AggregateValue> {
        run_groups(column, 100)
    }
}

/// Quartile boundaries: 4 groups, 5 boundaries.
pub struct Quartiles;

impl Quartiles {
    pub fn new() -> Self {
        Quartiles
    }
}

impl Default for Quartiles {
    fn default() -> Self {
        Self::new()
    }
}

impl Aggregation for Quartiles {
    fn cache_key(&self) -> Option<CacheKey> {
        Some(CacheKey::Quartiles)
    }

    fn validate(&self, column: &Column) -> Result<()> {
        require_type(column, NUMERIC, "Quartiles")
    }

    fn run(&self, column: &Column) -> Result<AggregateValue> {
        run_groups(column, 4)
    }
}

/// Quintile boundaries: 5 groups, 6 boundaries.
pub struct Quintiles;

impl Quintiles {
    pub fn new() -> Self {
        Quintiles
    }
}

impl Default for Quintiles {
    fn default() -> Self {
        Self::new()
    }
}

impl Aggregation for Quintiles {
    fn cache_key(&self) -> Option<CacheKey> {
        Some(CacheKey::Quintiles)
    }

    fn validate(&self, column: &Column) -> Result<()> {
        require_type(column, NUMERIC, "Quintiles")
    }

    fn run(&self, column: &Column) -> Result<AggregateValue> {
        run_groups(column, 5)
    }
}

/// Decile boundaries: 10 groups, 11 boundaries.
pub struct Deciles;

impl Deciles {
    pub fn new() -> Self {
        Deciles
    }
}

impl Default for Deciles {
    fn default() -> Self {
        Self::new()
    }
}

impl Aggregation for Deciles {
    fn cache_key(&self) -> Option<CacheKey> {
        Some(CacheKey::Deciles)
    }

    fn validate(&self, column: &Column) -> Result<()> {
        require_type(column, NUMERIC, "Deciles")
    }

    fn run(&self, column: &Column) -> Result<AggregateValue> {
        run_groups(column, 10)
    }
}
