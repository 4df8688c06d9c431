//! Boolean aggregates over a column's values.
//!
//! `for_none` is the only quantifier that scans; `exists` and `for_all` are
//! defined in terms of it so the three cannot drift apart:
//!
//! - `for_none(p) := no value satisfies p`
//! - `exists(p)   := !for_none(p)`
//! - `for_all(p)  := for_none(!p)`
//!
//! Every call scans afresh, stopping at the first witness.

use super::{Dataset, Value};
use crate::error::FerryError;
use crate::types::Feature;
use crate::validation::require_valid;

/// Identifies the column a quantifier ranges over.
#[derive(Debug, Clone, Copy)]
pub enum ColumnRef<'a> {
    /// A column looked up by name only.
    Name(&'a str),
    /// A column looked up and type-checked through a feature.
    Feature(&'a Feature),
}

impl<'a> From<&'a str> for ColumnRef<'a> {
    fn from(name: &'a str) -> Self {
        ColumnRef::Name(name)
    }
}

impl<'a> From<&'a Feature> for ColumnRef<'a> {
    fn from(feature: &'a Feature) -> Self {
        ColumnRef::Feature(feature)
    }
}

impl Dataset {
    fn resolve(&self, column: ColumnRef<'_>) -> Result<usize, FerryError> {
        match column {
            ColumnRef::Name(name) => self.column_index(name),
            ColumnRef::Feature(feature) => {
                require_valid(&self.schema, std::slice::from_ref(feature))?;
                self.column_index(&feature.name)
            }
        }
    }

    /// `true` iff no value of the column satisfies `predicate`.
    pub fn for_none<'a, P>(&self, column: impl Into<ColumnRef<'a>>, predicate: P) -> Result<bool, FerryError>
    where
        P: Fn(&Value) -> bool,
    {
        let idx = self.resolve(column.into())?;
        for value in self.scan(idx) {
            if predicate(&value?) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// `true` iff at least one value of the column satisfies `predicate`.
    pub fn exists<'a, P>(&self, column: impl Into<ColumnRef<'a>>, predicate: P) -> Result<bool, FerryError>
    where
        P: Fn(&Value) -> bool,
    {
        self.for_none(column, predicate).map(|none| !none)
    }

    /// `true` iff every value of the column satisfies `predicate`.
    pub fn for_all<'a, P>(&self, column: impl Into<ColumnRef<'a>>, predicate: P) -> Result<bool, FerryError>
    where
        P: Fn(&Value) -> bool,
    {
        self.for_none(column, |value| !predicate(value))
    }
}
