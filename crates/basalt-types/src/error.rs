use thiserror::Error;

/// Errors raised by column construction and aggregation.
#[derive(Error, Debug)]
pub enum BasaltError {
    /// A value or aggregation does not match the column's data type.
    #[error("Type error: {0}")]
    Type(String),

    /// A statistic requiring fully-populated data found a null value.
    #[error("Null values present: {0}")]
    NullData(String),

    /// An aggregation requiring at least one non-null value found none.
    #[error("No data: {0}")]
    EmptyData(String),

    /// Caller-supplied arguments are invalid for the operation.
    #[error("Usage error: {0}")]
    Usage(String),

    /// A value falls outside the supported or computed range.
    #[error("Out of range: {0}")]
    Range(String),
}

pub type Result<T> = std::result::Result<T, BasaltError>;
