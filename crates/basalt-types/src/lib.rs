//! Typed value domain for the Basalt column-statistics engine.
//!
//! A column cell is a [`Value`]: null or a single datum of one of the
//! supported data types. Numbers are exact decimals so aggregate results are
//! reproducible and free of binary rounding error.

pub mod error;
pub mod value;

pub use error::{BasaltError, Result};
pub use value::{check_value, compare_values, DataType, Value};
