//! Immutable typed columns with a per-column aggregate cache.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::trace;

use basalt_types::{check_value, compare_values, BasaltError, DataType, Result, Value};

use crate::aggregation::{AggregateValue, Aggregation, CacheKey};
use crate::config;

/// An immutable, ordered, nullable sequence of typed values bound to a name
/// and a data type.
///
/// Every entry is null or matches the declared data type; this is enforced
/// at construction and never revalidated. Clones share the underlying data
/// and the aggregate cache, so a statistic computed through one handle is
/// visible through all of them.
#[derive(Debug)]
pub struct Column {
    name: String,
    data_type: DataType,
    values: Arc<[Value]>,
    row_names: Option<Arc<[Value]>>,
    cache: Arc<Mutex<HashMap<CacheKey, AggregateValue>>>,
}

impl Clone for Column {
    fn clone(&self) -> Self {
        Column {
            name: self.name.clone(),
            data_type: self.data_type,
            values: self.values.clone(),
            row_names: self.row_names.clone(),
            cache: self.cache.clone(),
        }
    }
}

impl Column {
    /// Build a column, checking that every value is null or matches
    /// `data_type`.
    pub fn new(name: impl Into<String>, data_type: DataType, values: Vec<Value>) -> Result<Self> {
        let name = name.into();
        for (row, value) in values.iter().enumerate() {
            check_value(
                value,
                data_type,
                &format!("Row {} of column '{}'", row, name),
            )?;
        }
        Ok(Column {
            name,
            data_type,
            values: values.into(),
            row_names: None,
            cache: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    /// Attach row keys for lookup by name. Must match the data length.
    pub fn with_row_names(mut self, row_names: Vec<Value>) -> Result<Self> {
        if row_names.len() != self.values.len() {
            return Err(BasaltError::Usage(format!(
                "Column '{}' has {} rows but {} row names were supplied",
                self.name,
                self.values.len(),
                row_names.len()
            )));
        }
        self.row_names = Some(row_names.into());
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    /// Total row count, nulls included.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// All values including nulls, in row order.
    pub fn data(&self) -> &[Value] {
        &self.values
    }

    /// Values with nulls filtered out, in row order.
    pub fn data_without_nulls(&self) -> Vec<Value> {
        self.values.iter().filter(|v| !v.is_null()).cloned().collect()
    }

    /// Non-null values sorted ascending.
    pub fn data_sorted(&self) -> Vec<Value> {
        let mut data = self.data_without_nulls();
        data.sort_by(compare_values);
        data
    }

    /// Row keys, if configured.
    pub fn keys(&self) -> Option<&[Value]> {
        self.row_names.as_deref()
    }

    /// `(key, value)` pairs, if row keys are configured.
    pub fn items(&self) -> Option<Vec<(Value, Value)>> {
        self.row_names.as_ref().map(|keys| {
            keys.iter()
                .cloned()
                .zip(self.values.iter().cloned())
                .collect()
        })
    }

    /// Look up a value by row key. The first matching key wins.
    ///
    /// Keyed access requires row names; asking for it on a column without
    /// them is a usage error, not a miss.
    pub fn get(&self, key: &Value) -> Result<Option<&Value>> {
        let keys = self.row_names.as_ref().ok_or_else(|| {
            BasaltError::Usage(format!("Column '{}' has no row names", self.name))
        })?;
        Ok(keys
            .iter()
            .position(|k| k == key)
            .map(|i| &self.values[i]))
    }

    /// Apply an aggregation to this column.
    ///
    /// A cached result for the aggregation's key is returned as-is, with no
    /// re-execution. Otherwise the aggregation validates, runs, and its
    /// result is stored. The cache lock is held across the computation, so
    /// even concurrent first callers observe exactly one execution per key.
    /// Failures propagate to the caller and are never cached.
    pub fn aggregate(&self, agg: &dyn Aggregation) -> Result<AggregateValue> {
        let Some(key) = agg.cache_key() else {
            agg.validate(self)?;
            return agg.run(self);
        };

        let mut cache = self.cache.lock();
        if let Some(hit) = cache.get(&key) {
            trace!(column = %self.name, key = ?key, "aggregate cache hit");
            return Ok(hit.clone());
        }
        agg.validate(self)?;
        trace!(column = %self.name, key = ?key, "computing aggregate");
        let result = agg.run(self)?;
        cache.insert(key, result.clone());
        Ok(result)
    }
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}: {}", self.name, self.data_type)?;
        writeln!(f, "Rows: {}", self.values.len())?;
        writeln!(f, "[")?;
        let preview = config::display_rows();
        for (i, v) in self.values.iter().enumerate() {
            if i >= preview && self.values.len() > preview {
                writeln!(f, "  ...")?;
                break;
            }
            writeln!(f, "  {},", v)?;
        }
        write!(f, "]")
    }
}
