//! Basalt — per-column statistics over immutable typed columns.
//!
//! A [`Column`] is an immutable, ordered, nullable sequence of typed values
//! bound to a name and a data type. An [`Aggregation`] is a reusable
//! statistic definition: it declares which data types it accepts, validates
//! a column before running, and its result is cached on the column under a
//! structural key so each distinct statistic is computed at most once per
//! column.
//!
//! ```
//! use basalt::{Column, DataType, Mean, Value};
//!
//! let column = Column::new(
//!     "price",
//!     DataType::Number,
//!     vec![Value::from(2), Value::from(3), Value::from(4)],
//! )
//! .unwrap();
//!
//! let mean = column.aggregate(&Mean::new()).unwrap();
//! assert_eq!(mean.as_number(), Some(3.into()));
//! ```

pub mod aggregation;
pub mod aggregations;
pub mod column;
pub mod config;

pub use aggregation::{AggregateValue, Aggregation, CacheKey};
pub use aggregations::central::{Mean, Median, Mode};
pub use aggregations::counting::{All, Any, Count, Length, MaxLength, MaxPrecision, Predicate};
pub use aggregations::dispersion::{
    Iqr, Mad, PopulationStDev, PopulationVariance, StDev, Variance,
};
pub use aggregations::extremal::{Max, Min, Sum};
pub use aggregations::rank::{Deciles, Percentiles, Quantiles, Quartiles, Quintiles};
pub use column::Column;

pub use basalt_types::{compare_values, BasaltError, DataType, Result, Value};
