//! The core value type and its data-type tags.
//!
//! A [`Value`] is one cell of a column: null, or a single typed datum.
//! Numbers use exact decimal representation; binary floating point is not
//! admitted anywhere in the domain, so values are `Eq + Hash` and can serve
//! as structural cache-key parameters.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{BasaltError, Result};

/// Type tag for column declarations and capability checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    Number,
    Text,
    Boolean,
    Date,
    DateTime,
    TimeDelta,
}

impl DataType {
    /// Numeric statistics (sum, mean, dispersion, the rank family) require
    /// this.
    pub fn is_number(self) -> bool {
        matches!(self, DataType::Number)
    }

    /// Types with a total order: numbers and the temporal types.
    pub fn is_orderable(self) -> bool {
        matches!(
            self,
            DataType::Number | DataType::Date | DataType::DateTime | DataType::TimeDelta
        )
    }

    /// Types with an additive identity, so an all-null sum can be zero.
    pub fn is_summable(self) -> bool {
        matches!(self, DataType::Number | DataType::TimeDelta)
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataType::Number => write!(f, "number"),
            DataType::Text => write!(f, "text"),
            DataType::Boolean => write!(f, "boolean"),
            DataType::Date => write!(f, "date"),
            DataType::DateTime => write!(f, "datetime"),
            DataType::TimeDelta => write!(f, "timedelta"),
        }
    }
}

/// One cell of a column: null, or a single typed datum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Number(Decimal),
    Text(Arc<str>),
    Boolean(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    #[serde(with = "timedelta_nanos")]
    TimeDelta(TimeDelta),
}

impl Value {
    /// The type tag of this value, or `None` for null.
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Value::Null => None,
            Value::Number(_) => Some(DataType::Number),
            Value::Text(_) => Some(DataType::Text),
            Value::Boolean(_) => Some(DataType::Boolean),
            Value::Date(_) => Some(DataType::Date),
            Value::DateTime(_) => Some(DataType::DateTime),
            Value::TimeDelta(_) => Some(DataType::TimeDelta),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_number(&self) -> Option<Decimal> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

// No variant holds a float, so numeric equality is a true equivalence.
impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Null => {}
            Value::Number(n) => n.hash(state),
            Value::Text(s) => s.hash(state),
            Value::Boolean(b) => b.hash(state),
            Value::Date(d) => d.hash(state),
            Value::DateTime(dt) => dt.hash(state),
            Value::TimeDelta(td) => {
                td.num_seconds().hash(state);
                td.subsec_nanos().hash(state);
            }
        }
    }
}

impl From<Decimal> for Value {
    fn from(n: Decimal) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(Decimal::from(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(Arc::from(s))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Number(n) => write!(f, "{}", n),
            Value::Text(s) => write!(f, "{}", s),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Date(d) => write!(f, "{}", d),
            Value::DateTime(dt) => write!(f, "{}", dt),
            Value::TimeDelta(td) => write!(f, "TimeDelta({}s)", td.num_seconds()),
        }
    }
}

/// Compare two values for ordering.
///
/// Same-type values compare naturally. Null sorts last; cross-type
/// comparison falls back to tag order. Aggregations never compare across
/// types — a column is homogeneous by construction — so the fallback only
/// matters for generic sorting of mixed sequences.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Greater,
        (_, Value::Null) => Ordering::Less,
        (Value::Number(x), Value::Number(y)) => x.cmp(y),
        (Value::Text(x), Value::Text(y)) => x.cmp(y),
        (Value::Boolean(x), Value::Boolean(y)) => x.cmp(y),
        (Value::Date(x), Value::Date(y)) => x.cmp(y),
        (Value::DateTime(x), Value::DateTime(y)) => x.cmp(y),
        (Value::TimeDelta(x), Value::TimeDelta(y)) => x.cmp(y),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Number(_) => 0,
        Value::Text(_) => 1,
        Value::Boolean(_) => 2,
        Value::Date(_) => 3,
        Value::DateTime(_) => 4,
        Value::TimeDelta(_) => 5,
        Value::Null => 6,
    }
}

/// chrono provides no serde impl for `TimeDelta`; store it as total
/// nanoseconds (i64, covering roughly ±292 years).
mod timedelta_nanos {
    use chrono::TimeDelta;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(td: &TimeDelta, serializer: S) -> Result<S::Ok, S::Error> {
        match td.num_nanoseconds() {
            Some(nanos) => serializer.serialize_i64(nanos),
            None => Err(serde::ser::Error::custom(
                "time delta exceeds the nanosecond-representable range",
            )),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<TimeDelta, D::Error> {
        let nanos = i64::deserialize(deserializer)?;
        Ok(TimeDelta::nanoseconds(nanos))
    }
}

/// Check that `value` is admissible in a column of type `data_type`.
///
/// Null is admissible everywhere; anything else must match the tag exactly.
/// No implicit coercion is ever performed.
pub fn check_value(value: &Value, data_type: DataType, context: &str) -> Result<()> {
    match value.data_type() {
        None => Ok(()),
        Some(actual) if actual == data_type => Ok(()),
        Some(actual) => Err(BasaltError::Type(format!(
            "{} is {}, expected {}",
            context, actual, data_type
        ))),
    }
}
