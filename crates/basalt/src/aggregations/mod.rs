//! Built-in aggregation implementations.
//!
//! One file per family: counting/boolean, extremal, central tendency,
//! dispersion, and the rank-based percentile family.

pub mod central;
pub mod counting;
pub mod dispersion;
pub mod extremal;
pub mod rank;

use basalt_types::{BasaltError, DataType, Result, Value};
use rust_decimal::Decimal;

use crate::column::Column;

/// The accepted set of the numeric statistics.
pub(crate) const NUMERIC: &[DataType] = &[DataType::Number];

/// Extract every value as a number, failing on the first null.
///
/// Statistics defined only on fully-populated data use this as their
/// precondition scan; nothing is computed once a null is seen.
pub(crate) fn complete_numbers(column: &Column) -> Result<Vec<Decimal>> {
    let mut out = Vec::with_capacity(column.len());
    for value in column.data() {
        match value {
            Value::Number(n) => out.push(*n),
            Value::Null => {
                return Err(BasaltError::NullData(format!(
                    "Column '{}' contains null values",
                    column.name()
                )))
            }
            other => {
                return Err(BasaltError::Type(format!(
                    "Column '{}' contains a non-numeric value: {}",
                    column.name(),
                    other
                )))
            }
        }
    }
    Ok(out)
}

/// The non-null values as numbers, in row order.
pub(crate) fn numbers_without_nulls(column: &Column) -> Vec<Decimal> {
    column.data().iter().filter_map(Value::as_number).collect()
}

/// Error for aggregations that need at least one non-null value.
pub(crate) fn empty_data(column: &Column) -> BasaltError {
    BasaltError::EmptyData(format!(
        "No non-null values in column '{}'",
        column.name()
    ))
}
