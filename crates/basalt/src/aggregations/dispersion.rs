//! Dispersion statistics: variance family, mean absolute deviation, IQR.
//!
//! Null-strict like the central-tendency statistics: partial dispersion over
//! sparse data is a methodological error the caller must resolve first.

use basalt_types::{BasaltError, Result, Value};
use rust_decimal::{Decimal, MathematicalOps};

use crate::aggregation::{require_type, AggregateValue, Aggregation, CacheKey};
use crate::aggregations::central::mean_of;
use crate::aggregations::rank::Quantiles;
use crate::aggregations::{complete_numbers, empty_data, NUMERIC};
use crate::column::Column;

/// Sum of squared deviations from the mean.
fn squared_deviations(values: &[Decimal]) -> Decimal {
    let mean = mean_of(values);
    values
        .iter()
        .map(|n| {
            let delta = n - mean;
            delta * delta
        })
        .sum()
}

/// Null-strict scan requiring at least `minimum` values.
fn complete_at_least(column: &Column, minimum: usize, name: &str) -> Result<Vec<Decimal>> {
    let data = complete_numbers(column)?;
    if data.is_empty() {
        return Err(empty_data(column));
    }
    if data.len() < minimum {
        return Err(BasaltError::EmptyData(format!(
            "{} requires at least {} values in column '{}'",
            name,
            minimum,
            column.name()
        )));
    }
    Ok(data)
}

fn decimal_sqrt(value: Decimal, name: &str) -> Result<Decimal> {
    value.sqrt().ok_or_else(|| {
        BasaltError::Range(format!("{} of a negative quantity: {}", name, value))
    })
}

/// Sample variance (n − 1 divisor).
pub struct Variance;

impl Variance {
    pub fn new() -> Self {
        Variance
    }
}

impl Default for Variance {
    fn default() -> Self {
        Self::new()
    }
}

impl Aggregation for Variance {
    fn cache_key(&self) -> Option<CacheKey> {
        Some(CacheKey::Variance)
    }

    fn validate(&self, column: &Column) -> Result<()> {
        require_type(column, NUMERIC, "Variance")
    }

    fn run(&self, column: &Column) -> Result<AggregateValue> {
        let data = complete_at_least(column, 2, "Variance")?;
        let variance = squared_deviations(&data) / Decimal::from(data.len() as u64 - 1);
        Ok(Value::Number(variance).into())
    }
}

/// Population variance (n divisor).
pub struct PopulationVariance;

impl PopulationVariance {
    pub fn new() -> Self {
        PopulationVariance
    }
}

impl Default for PopulationVariance {
    fn default() -> Self {
        Self::new()
    }
}

impl Aggregation for PopulationVariance {
    fn cache_key(&self) -> Option<CacheKey> {
        Some(CacheKey::PopulationVariance)
    }

    fn validate(&self, column: &Column) -> Result<()> {
        require_type(column, NUMERIC, "PopulationVariance")
    }

    fn run(&self, column: &Column) -> Result<AggregateValue> {
        let data = complete_at_least(column, 1, "PopulationVariance")?;
        let variance = squared_deviations(&data) / Decimal::from(data.len() as u64);
        Ok(Value::Number(variance).into())
    }
}

/// Sample standard deviation: the square root of [`Variance`].
pub struct StDev;

impl StDev {
    pub fn new() -> Self {
        StDev
    }
}

impl Default for StDev {
    fn default() -> Self {
        Self::new()
    }
}

impl Aggregation for StDev {
    fn cache_key(&self) -> Option<CacheKey> {
        Some(CacheKey::StDev)
    }

    fn validate(&self, column: &Column) -> Result<()> {
        require_type(column, NUMERIC, "StDev")
    }

    fn run(&self, column: &Column) -> Result<AggregateValue> {
        // Computed from scratch rather than through `column.aggregate`: the
        // column's cache lock is already held while this runs.
        let data = complete_at_least(column, 2, "StDev")?;
        let variance = squared_deviations(&data) / Decimal::from(data.len() as u64 - 1);
        Ok(Value::Number(decimal_sqrt(variance, "StDev")?).into())
    }
}

/// Population standard deviation: the square root of [`PopulationVariance`].
pub struct PopulationStDev;

impl PopulationStDev {
    pub fn new() -> Self {
        PopulationStDev
    }
}

impl Default for PopulationStDev {
    fn default() -> Self {
        Self::new()
    }
}

impl Aggregation for PopulationStDev {
    fn cache_key(&self) -> Option<CacheKey> {
        Some(CacheKey::PopulationStDev)
    }

    fn validate(&self, column: &Column) -> Result<()> {
        require_type(column, NUMERIC, "PopulationStDev")
    }

    fn run(&self, column: &Column) -> Result<AggregateValue> {
        let data = complete_at_least(column, 1, "PopulationStDev")?;
        let variance = squared_deviations(&data) / Decimal::from(data.len() as u64);
        Ok(Value::Number(decimal_sqrt(variance, "PopulationStDev")?).into())
    }
}

/// Mean absolute deviation: the mean of |x − mean|.
pub struct Mad;

impl Mad {
    pub fn new() -> Self {
        Mad
    }
}

impl Default for Mad {
    fn default() -> Self {
        Self::new()
    }
}

impl Aggregation for Mad {
    fn cache_key(&self) -> Option<CacheKey> {
        Some(CacheKey::Mad)
    }

    fn validate(&self, column: &Column) -> Result<()> {
        require_type(column, NUMERIC, "Mad")
    }

    fn run(&self, column: &Column) -> Result<AggregateValue> {
        let data = complete_at_least(column, 1, "Mad")?;
        let mean = mean_of(&data);
        let deviations: Vec<Decimal> = data.iter().map(|n| (n - mean).abs()).collect();
        Ok(Value::Number(mean_of(&deviations)).into())
    }
}

/// Interquartile range: the 3rd quartile boundary minus the 1st.
pub struct Iqr;

impl Iqr {
    pub fn new() -> Self {
        Iqr
    }
}

impl Default for Iqr {
    fn default() -> Self {
        Self::new()
    }
}

impl Aggregation for Iqr {
    fn cache_key(&self) -> Option<CacheKey> {
        Some(CacheKey::Iqr)
    }

    fn validate(&self, column: &Column) -> Result<()> {
        require_type(column, NUMERIC, "Iqr")
    }

    fn run(&self, column: &Column) -> Result<AggregateValue> {
        let mut data = complete_at_least(column, 1, "Iqr")?;
        data.sort();
        let quartiles = Quantiles::compute(&data, 4);
        Ok(Value::Number(quartiles[3] - quartiles[1]).into())
    }
}
