//! Sum and extremal aggregations over summable/orderable values.

use std::cmp::Ordering;

use basalt_types::{compare_values, BasaltError, DataType, Result, Value};
use chrono::TimeDelta;
use rust_decimal::Decimal;

use crate::aggregation::{require_type, AggregateValue, Aggregation, CacheKey};
use crate::aggregations::{empty_data, numbers_without_nulls};
use crate::column::Column;

const SUMMABLE: &[DataType] = &[DataType::Number, DataType::TimeDelta];
const ORDERABLE: &[DataType] = &[
    DataType::Number,
    DataType::Date,
    DataType::DateTime,
    DataType::TimeDelta,
];

/// Sum of the non-null values.
///
/// An all-null column sums to the type's additive identity. Calendar types
/// are rejected: a date has nothing to add to another date.
pub struct Sum;

impl Sum {
    pub fn new() -> Self {
        Sum
    }
}

impl Default for Sum {
    fn default() -> Self {
        Self::new()
    }
}

impl Aggregation for Sum {
    fn cache_key(&self) -> Option<CacheKey> {
        Some(CacheKey::Sum)
    }

    fn validate(&self, column: &Column) -> Result<()> {
        require_type(column, SUMMABLE, "Sum")
    }

    fn run(&self, column: &Column) -> Result<AggregateValue> {
        match column.data_type() {
            DataType::Number => {
                let mut total = Decimal::ZERO;
                for n in numbers_without_nulls(column) {
                    total = total.checked_add(n).ok_or_else(|| {
                        BasaltError::Range(format!(
                            "Sum of column '{}' overflows",
                            column.name()
                        ))
                    })?;
                }
                Ok(Value::Number(total).into())
            }
            DataType::TimeDelta => {
                let mut total = TimeDelta::zero();
                for value in column.data() {
                    if let Value::TimeDelta(td) = value {
                        total = total.checked_add(td).ok_or_else(|| {
                            BasaltError::Range(format!(
                                "Sum of column '{}' overflows",
                                column.name()
                            ))
                        })?;
                    }
                }
                Ok(Value::TimeDelta(total).into())
            }
            other => Err(BasaltError::Type(format!(
                "Sum cannot operate on {} column '{}'",
                other,
                column.name()
            ))),
        }
    }
}

/// Smallest non-null value.
pub struct Min;

impl Min {
    pub fn new() -> Self {
        Min
    }
}

impl Default for Min {
    fn default() -> Self {
        Self::new()
    }
}

impl Aggregation for Min {
    fn cache_key(&self) -> Option<CacheKey> {
        Some(CacheKey::Min)
    }

    fn validate(&self, column: &Column) -> Result<()> {
        require_type(column, ORDERABLE, "Min")
    }

    fn run(&self, column: &Column) -> Result<AggregateValue> {
        extremum(column, Ordering::Less)
    }
}

/// Largest non-null value.
pub struct Max;

impl Max {
    pub fn new() -> Self {
        Max
    }
}

impl Default for Max {
    fn default() -> Self {
        Self::new()
    }
}

impl Aggregation for Max {
    fn cache_key(&self) -> Option<CacheKey> {
        Some(CacheKey::Max)
    }

    fn validate(&self, column: &Column) -> Result<()> {
        require_type(column, ORDERABLE, "Max")
    }

    fn run(&self, column: &Column) -> Result<AggregateValue> {
        extremum(column, Ordering::Greater)
    }
}

/// The non-null value that compares `wanted` against everything else.
fn extremum(column: &Column, wanted: Ordering) -> Result<AggregateValue> {
    let mut best: Option<&Value> = None;
    for value in column.data() {
        if value.is_null() {
            continue;
        }
        match best {
            None => best = Some(value),
            Some(current) => {
                if compare_values(value, current) == wanted {
                    best = Some(value);
                }
            }
        }
    }
    best.map(|v| v.clone().into())
        .ok_or_else(|| empty_data(column))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn decimals(values: &[Option<&str>]) -> Column {
        Column::new(
            "one",
            DataType::Number,
            values
                .iter()
                .map(|v| v.map(|s| Value::Number(dec(s))).unwrap_or(Value::Null))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_sum_skips_nulls() {
        let column = decimals(&[Some("1.1"), Some("2.7"), None, Some("2.7")]);
        assert_eq!(
            column.aggregate(&Sum::new()).unwrap().as_number(),
            Some(dec("6.5"))
        );
    }

    #[test]
    fn test_sum_of_all_nulls_is_zero() {
        let column = decimals(&[None, None]);
        assert_eq!(
            column.aggregate(&Sum::new()).unwrap().as_number(),
            Some(Decimal::ZERO)
        );
    }

    #[test]
    fn test_sum_of_time_deltas() {
        let column = Column::new(
            "one",
            DataType::TimeDelta,
            vec![
                Value::TimeDelta(TimeDelta::seconds(30)),
                Value::Null,
                Value::TimeDelta(TimeDelta::seconds(90)),
            ],
        )
        .unwrap();
        assert_eq!(
            column.aggregate(&Sum::new()).unwrap().as_value(),
            Some(&Value::TimeDelta(TimeDelta::seconds(120)))
        );
    }

    #[test]
    fn test_sum_rejects_text_and_dates() {
        let text = Column::new("three", DataType::Text, vec![Value::from("a")]).unwrap();
        assert!(matches!(
            text.aggregate(&Sum::new()).unwrap_err(),
            BasaltError::Type(_)
        ));

        let dates = Column::new(
            "when",
            DataType::Date,
            vec![Value::Date(NaiveDate::from_ymd_opt(1994, 3, 3).unwrap())],
        )
        .unwrap();
        assert!(matches!(
            dates.aggregate(&Sum::new()).unwrap_err(),
            BasaltError::Type(_)
        ));
    }

    #[test]
    fn test_min_max_numbers() {
        let column = decimals(&[Some("1.1"), Some("2.7"), None, Some("2.7")]);
        assert_eq!(
            column.aggregate(&Min::new()).unwrap().as_number(),
            Some(dec("1.1"))
        );
        assert_eq!(
            column.aggregate(&Max::new()).unwrap().as_number(),
            Some(dec("2.7"))
        );
    }

    #[test]
    fn test_min_max_datetimes() {
        let dt = |h: u32, m: u32, s: u32| {
            Value::DateTime(
                NaiveDate::from_ymd_opt(1994, 3, 3)
                    .unwrap()
                    .and_hms_opt(h, m, s)
                    .unwrap(),
            )
        };
        let column = Column::new(
            "when",
            DataType::DateTime,
            vec![dt(6, 31, 0), dt(6, 30, 30), dt(6, 30, 0)],
        )
        .unwrap();

        assert_eq!(
            column.aggregate(&Min::new()).unwrap().as_value(),
            Some(&dt(6, 30, 0))
        );
        assert_eq!(
            column.aggregate(&Max::new()).unwrap().as_value(),
            Some(&dt(6, 31, 0))
        );
    }

    #[test]
    fn test_min_max_require_orderable() {
        let text = Column::new("three", DataType::Text, vec![Value::from("a")]).unwrap();
        assert!(matches!(
            text.aggregate(&Min::new()).unwrap_err(),
            BasaltError::Type(_)
        ));
        assert!(matches!(
            text.aggregate(&Max::new()).unwrap_err(),
            BasaltError::Type(_)
        ));
    }

    #[test]
    fn test_min_max_of_all_nulls_is_empty_data() {
        let column = decimals(&[None, None]);
        assert!(matches!(
            column.aggregate(&Min::new()).unwrap_err(),
            BasaltError::EmptyData(_)
        ));
        assert!(matches!(
            column.aggregate(&Max::new()).unwrap_err(),
            BasaltError::EmptyData(_)
        ));
    }
}
