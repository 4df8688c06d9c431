//! Owned cell values, as seen by scans, quantifiers and row materialization.

use arrow::array::{Array, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{
    DataType, Date32Type, Date64Type, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type,
    Int8Type, Time32MillisecondType, Time32SecondType, Time64MicrosecondType, Time64NanosecondType,
    TimeUnit, TimestampMicrosecondType, TimestampMillisecondType, TimestampNanosecondType,
    TimestampSecondType, UInt16Type, UInt32Type, UInt64Type, UInt8Type,
};

use crate::error::FerryError;
use crate::vector::{is_vector_type, vector_at, NumericVector};

/// A single cell, detached from its column.
///
/// Dates are days since the epoch (`Date32`) or milliseconds (`Date64`); timestamps
/// and times of day are raw counts in the column's unit. Decimals are read as the
/// nearest `f64`, and dictionary cells as the value they point at.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Integral(i64),
    Real(f64),
    Text(String),
    Binary(Vec<u8>),
    List(Vec<Value>),
    Vector(NumericVector),
}

macro_rules! integral_at {
    ($array:expr, $row:expr, $t:ty) => {
        Value::Integral($array.as_primitive::<$t>().value($row) as i64)
    };
}

impl Value {
    /// Reads the cell at `row` of `array`.
    pub fn from_array(array: &dyn Array, row: usize) -> Result<Value, FerryError> {
        if array.is_null(row) {
            return Ok(Value::Null);
        }
        let value = match array.data_type() {
            DataType::Boolean => Value::Boolean(array.as_boolean().value(row)),
            DataType::Int8 => integral_at!(array, row, Int8Type),
            DataType::Int16 => integral_at!(array, row, Int16Type),
            DataType::Int32 => integral_at!(array, row, Int32Type),
            DataType::Int64 => integral_at!(array, row, Int64Type),
            DataType::UInt8 => integral_at!(array, row, UInt8Type),
            DataType::UInt16 => integral_at!(array, row, UInt16Type),
            DataType::UInt32 => integral_at!(array, row, UInt32Type),
            DataType::UInt64 => {
                let raw = array.as_primitive::<UInt64Type>().value(row);
                Value::Integral(i64::try_from(raw).map_err(|_| {
                    FerryError::UnsupportedType(format!("UInt64 value {} does not fit Int64", raw))
                })?)
            }
            DataType::Float32 => Value::Real(array.as_primitive::<Float32Type>().value(row) as f64),
            DataType::Float64 => Value::Real(array.as_primitive::<Float64Type>().value(row)),
            DataType::Date32 => integral_at!(array, row, Date32Type),
            DataType::Date64 => integral_at!(array, row, Date64Type),
            DataType::Timestamp(TimeUnit::Second, _) => integral_at!(array, row, TimestampSecondType),
            DataType::Timestamp(TimeUnit::Millisecond, _) => {
                integral_at!(array, row, TimestampMillisecondType)
            }
            DataType::Timestamp(TimeUnit::Microsecond, _) => {
                integral_at!(array, row, TimestampMicrosecondType)
            }
            DataType::Timestamp(TimeUnit::Nanosecond, _) => {
                integral_at!(array, row, TimestampNanosecondType)
            }
            DataType::Time32(TimeUnit::Second) => integral_at!(array, row, Time32SecondType),
            DataType::Time32(_) => integral_at!(array, row, Time32MillisecondType),
            DataType::Time64(TimeUnit::Microsecond) => integral_at!(array, row, Time64MicrosecondType),
            DataType::Time64(_) => integral_at!(array, row, Time64NanosecondType),
            DataType::Decimal128(_, _) | DataType::Decimal256(_, _) => {
                let real = cast(array.slice(row, 1).as_ref(), &DataType::Float64)?;
                Value::Real(real.as_primitive::<Float64Type>().value(0))
            }
            DataType::Dictionary(_, value_type) => {
                let cell = cast(array.slice(row, 1).as_ref(), value_type)?;
                Value::from_array(cell.as_ref(), 0)?
            }
            DataType::FixedSizeBinary(_) => Value::Binary(array.as_fixed_size_binary().value(row).to_vec()),
            DataType::Utf8 => Value::Text(array.as_string::<i32>().value(row).to_string()),
            DataType::LargeUtf8 => Value::Text(array.as_string::<i64>().value(row).to_string()),
            DataType::Binary => Value::Binary(array.as_binary::<i32>().value(row).to_vec()),
            DataType::LargeBinary => Value::Binary(array.as_binary::<i64>().value(row).to_vec()),
            DataType::List(_) => list_value(array.as_list::<i32>().value(row).as_ref())?,
            DataType::LargeList(_) => list_value(array.as_list::<i64>().value(row).as_ref())?,
            dt if is_vector_type(dt) => match vector_at(array, row)? {
                Some(vector) => Value::Vector(vector),
                None => Value::Null,
            },
            dt => {
                return Err(FerryError::UnsupportedType(format!(
                    "cannot read values of type {}",
                    dt
                )))
            }
        };
        Ok(value)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integral(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric view of the value; integral values are widened.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Real(r) => Some(*r),
            Value::Integral(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_vector(&self) -> Option<&NumericVector> {
        match self {
            Value::Vector(v) => Some(v),
            _ => None,
        }
    }
}

fn list_value(items: &dyn Array) -> Result<Value, FerryError> {
    (0..items.len())
        .map(|i| Value::from_array(items, i))
        .collect::<Result<Vec<_>, _>>()
        .map(Value::List)
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integral(i)
    }
}

impl From<f64> for Value {
    fn from(r: f64) -> Self {
        Value::Real(r)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<NumericVector> for Value {
    fn from(v: NumericVector) -> Self {
        Value::Vector(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}
