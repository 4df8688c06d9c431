//! This module defines the logical feature types callers use to describe the
//! columns they expect, and their mapping onto Arrow storage types.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use arrow::datatypes::{DataType as ArrowDataType, Field, TimeUnit};
use serde::{Deserialize, Serialize};

use crate::error::FerryError;
use crate::vector::{is_vector_type, vector_data_type};

/// The logical type of a feature.
///
/// Each variant has one canonical Arrow type (`to_arrow_type`) and accepts a small
/// family of compatible Arrow types (`is_compatible`).
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FeatureType {
    Binary,
    Integral,
    Real,
    Text,
    Date,
    DateTime,
    TextList,
    Geolocation,
    OPVector,
}

impl FeatureType {
    pub const ALL: [FeatureType; 9] = [
        Self::Binary,
        Self::Integral,
        Self::Real,
        Self::Text,
        Self::Date,
        Self::DateTime,
        Self::TextList,
        Self::Geolocation,
        Self::OPVector,
    ];

    /// The Arrow type a column of this feature type is created with.
    pub fn to_arrow_type(&self) -> ArrowDataType {
        match self {
            Self::Binary => ArrowDataType::Boolean,
            Self::Integral => ArrowDataType::Int64,
            Self::Real => ArrowDataType::Float64,
            Self::Text => ArrowDataType::Utf8,
            Self::Date => ArrowDataType::Date32,
            Self::DateTime => ArrowDataType::Timestamp(TimeUnit::Millisecond, None),
            Self::TextList => list_of(ArrowDataType::Utf8),
            Self::Geolocation => list_of(ArrowDataType::Float64),
            Self::OPVector => vector_data_type(),
        }
    }

    /// Returns `true` if a column stored as `arrow_type` can hold values of this feature type.
    pub fn is_compatible(&self, arrow_type: &ArrowDataType) -> bool {
        use ArrowDataType as A;
        match self {
            Self::Binary => matches!(arrow_type, A::Boolean),
            Self::Integral => matches!(
                arrow_type,
                A::Int8 | A::Int16 | A::Int32 | A::Int64 | A::UInt8 | A::UInt16 | A::UInt32
            ),
            Self::Real => matches!(arrow_type, A::Float32 | A::Float64),
            Self::Text => matches!(arrow_type, A::Utf8 | A::LargeUtf8),
            Self::Date => matches!(arrow_type, A::Date32 | A::Date64),
            Self::DateTime => matches!(arrow_type, A::Timestamp(_, _)),
            Self::TextList => list_item(arrow_type)
                .map_or(false, |item| matches!(item, A::Utf8 | A::LargeUtf8)),
            Self::Geolocation => list_item(arrow_type).map_or(false, |item| *item == A::Float64),
            Self::OPVector => is_vector_type(arrow_type),
        }
    }
}

fn list_of(item: ArrowDataType) -> ArrowDataType {
    ArrowDataType::List(Arc::new(Field::new("item", item, true)))
}

fn list_item(arrow_type: &ArrowDataType) -> Option<&ArrowDataType> {
    match arrow_type {
        ArrowDataType::List(field) | ArrowDataType::LargeList(field) => Some(field.data_type()),
        _ => None,
    }
}

/// Provides the canonical string representation for a `FeatureType`.
impl fmt::Display for FeatureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl FromStr for FeatureType {
    type Err = FerryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|t| t.to_string().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| FerryError::UnsupportedType(format!("unknown feature type '{}'", s)))
    }
}
