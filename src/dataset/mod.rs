// ====================================================================================
// ARCHITECTURAL OVERVIEW: The Dataset Layer
// ====================================================================================
//
// `Dataset` is the in-memory table the save/load pipelines operate on: an Arrow
// schema plus an ordered list of `RecordBatch`es sharing that schema. It offers the
// small set of engine primitives the rest of the crate needs:
//
//   - positional column projection (`project_columns`), used by the pipelines
//   - feature-driven projection (`select`), guarded by schema validation
//   - row materialization (`collect`, `take`), built on `select`
//   - column scans (`scan`), the primitive beneath the quantifiers
//
// Row order and row count are never changed by any of these.
// ====================================================================================

mod quantifiers;
pub mod value;

use std::collections::HashMap;
use std::path::Path;

use arrow::array::{Array, ArrayRef, RecordBatch, RecordBatchOptions};
use arrow::compute::{concat, concat_batches};
use arrow::datatypes::{Schema, SchemaRef};
use arrow::error::ArrowError;

use crate::config::SaveOptions;
use crate::error::FerryError;
use crate::types::Feature;
use crate::validation::require_valid;

pub use quantifiers::ColumnRef;
pub use value::Value;

/// A materialized row: one value per selected column, in selection order.
pub type Row = Vec<Value>;

#[derive(Debug, Clone)]
pub struct Dataset {
    schema: SchemaRef,
    batches: Vec<RecordBatch>,
}

impl Dataset {
    /// Builds a dataset, re-binding every batch to `schema`.
    ///
    /// Each batch must have the schema's column count and column types; names and
    /// metadata are taken from `schema`.
    pub fn try_new(schema: SchemaRef, batches: Vec<RecordBatch>) -> Result<Self, FerryError> {
        let batches = batches
            .into_iter()
            .map(|batch| rebind(&schema, batch.columns().to_vec(), batch.num_rows()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { schema, batches })
    }

    pub fn from_batch(batch: RecordBatch) -> Self {
        Self {
            schema: batch.schema(),
            batches: vec![batch],
        }
    }

    pub fn empty(schema: SchemaRef) -> Self {
        Self {
            schema,
            batches: Vec::new(),
        }
    }

    pub fn schema(&self) -> SchemaRef {
        self.schema.clone()
    }

    pub fn batches(&self) -> &[RecordBatch] {
        &self.batches
    }

    pub fn num_rows(&self) -> usize {
        self.batches.iter().map(RecordBatch::num_rows).sum()
    }

    pub fn num_columns(&self) -> usize {
        self.schema.fields().len()
    }

    pub fn column_index(&self, name: &str) -> Result<usize, FerryError> {
        self.schema
            .index_of(name)
            .map_err(|_| FerryError::ColumnNotFound(name.to_string()))
    }

    /// The full contents of one column, concatenated across batches.
    pub fn column(&self, name: &str) -> Result<ArrayRef, FerryError> {
        let idx = self.column_index(name)?;
        if self.batches.is_empty() {
            return Ok(arrow::array::new_empty_array(self.schema.field(idx).data_type()));
        }
        let parts: Vec<&dyn Array> = self.batches.iter().map(|b| b.column(idx).as_ref()).collect();
        Ok(concat(&parts)?)
    }

    /// All rows as a single batch.
    pub fn to_record_batch(&self) -> Result<RecordBatch, FerryError> {
        Ok(concat_batches(&self.schema, &self.batches)?)
    }

    /// Builds a dataset with `schema`, computing each output column from the input
    /// column at the same position. Used by the pipelines to rename, re-tag and
    /// re-encode columns in one pass.
    pub(crate) fn project_columns<F>(&self, schema: SchemaRef, transform: F) -> Result<Dataset, FerryError>
    where
        F: Fn(usize, &ArrayRef) -> Result<ArrayRef, FerryError>,
    {
        if schema.fields().len() != self.num_columns() {
            return Err(FerryError::ColumnCountMismatch {
                expected: schema.fields().len(),
                found: self.num_columns(),
            });
        }
        let batches = self
            .batches
            .iter()
            .map(|batch| {
                let columns = batch
                    .columns()
                    .iter()
                    .enumerate()
                    .map(|(idx, column)| transform(idx, column))
                    .collect::<Result<Vec<_>, _>>()?;
                rebind(&schema, columns, batch.num_rows())
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Dataset { schema, batches })
    }

    //==============================================================================
    // Feature-driven operations. Every one validates before touching data.
    //==============================================================================

    /// Projects the dataset onto the given features' columns, in feature order.
    pub fn select(&self, features: &[Feature]) -> Result<Dataset, FerryError> {
        require_valid(&self.schema, features)?;
        let indices = features
            .iter()
            .map(|f| self.column_index(&f.name))
            .collect::<Result<Vec<_>, _>>()?;

        let schema = SchemaRef::new(self.schema.project(&indices)?);
        let batches = self
            .batches
            .iter()
            .map(|batch| {
                let columns = indices.iter().map(|&i| batch.column(i).clone()).collect();
                rebind(&schema, columns, batch.num_rows())
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Dataset { schema, batches })
    }

    /// Materializes every row of the selected features into local memory.
    pub fn collect(&self, features: &[Feature]) -> Result<Vec<Row>, FerryError> {
        self.select(features)?.rows(None)
    }

    /// Materializes at most the first `n` rows of the selected features.
    pub fn take(&self, n: usize, features: &[Feature]) -> Result<Vec<Row>, FerryError> {
        self.select(features)?.rows(Some(n))
    }

    /// Maps each feature to its column's metadata.
    pub fn metadata(&self, features: &[Feature]) -> Result<HashMap<Feature, HashMap<String, String>>, FerryError> {
        require_valid(&self.schema, features)?;
        features
            .iter()
            .map(|f| {
                let field = self.schema.field(self.column_index(&f.name)?);
                Ok((f.clone(), field.metadata().clone()))
            })
            .collect()
    }

    fn rows(&self, limit: Option<usize>) -> Result<Vec<Row>, FerryError> {
        let limit = limit.unwrap_or(usize::MAX);
        let mut rows = Vec::new();
        'batches: for batch in &self.batches {
            for row in 0..batch.num_rows() {
                if rows.len() >= limit {
                    break 'batches;
                }
                let values = batch
                    .columns()
                    .iter()
                    .map(|column| Value::from_array(column.as_ref(), row))
                    .collect::<Result<Row, _>>()?;
                rows.push(values);
            }
        }
        Ok(rows)
    }

    /// Iterates the values of one column across all batches, in row order.
    pub fn scan(&self, column: usize) -> impl Iterator<Item = Result<Value, FerryError>> + '_ {
        self.batches.iter().flat_map(move |batch| {
            let array = batch.column(column);
            (0..batch.num_rows()).map(move |row| Value::from_array(array.as_ref(), row))
        })
    }

    //==============================================================================
    // Persistence shortcuts
    //==============================================================================

    /// Saves through the default interchange format. See [`crate::bridge::save`].
    pub fn save(&self, path: impl AsRef<Path>, options: &SaveOptions) -> Result<(), FerryError> {
        crate::bridge::save(self, path, options)
    }

    /// Loads a dataset written by [`Dataset::save`]. See [`crate::bridge::load`].
    pub fn load(path: impl AsRef<Path>) -> Result<Dataset, FerryError> {
        crate::bridge::load(path)
    }
}

/// Assembles `columns` into a batch carrying `schema`, tolerating zero-column schemas.
fn rebind(schema: &SchemaRef, columns: Vec<ArrayRef>, num_rows: usize) -> Result<RecordBatch, FerryError> {
    if columns.len() != schema.fields().len() {
        return Err(FerryError::Arrow(ArrowError::SchemaError(format!(
            "batch has {} columns but schema has {}",
            columns.len(),
            schema.fields().len()
        ))));
    }
    let options = RecordBatchOptions::new().with_row_count(Some(num_rows));
    Ok(RecordBatch::try_new_with_options(schema.clone(), columns, &options)?)
}

/// Convenience for tests and callers that build a dataset from a single schema.
impl TryFrom<(Schema, Vec<ArrayRef>)> for Dataset {
    type Error = FerryError;

    fn try_from((schema, columns): (Schema, Vec<ArrayRef>)) -> Result<Self, Self::Error> {
        let schema = SchemaRef::new(schema);
        let num_rows = columns.first().map_or(0, |c| c.len());
        let batch = rebind(&schema, columns, num_rows)?;
        Ok(Dataset::from_batch(batch))
    }
}
