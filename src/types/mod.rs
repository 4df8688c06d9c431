//! This module defines the typed column descriptors ("features") callers use to
//! select and validate columns.
//!
//! A `Feature` pairs a column name with the `FeatureType` the caller expects that
//! column to hold. Features are built before validation and never mutated by it.

pub mod feature_type;

use std::fmt;

use serde::{Deserialize, Serialize};

// Re-export the main type(s) for easier access.
pub use feature_type::FeatureType;

/// A caller-supplied expectation of a column's name and logical type.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct Feature {
    pub name: String,
    pub feature_type: FeatureType,
}

impl Feature {
    pub fn new(name: impl Into<String>, feature_type: FeatureType) -> Self {
        Self {
            name: name.into(),
            feature_type,
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.feature_type)
    }
}
