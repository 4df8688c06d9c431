//! The decode pipeline: parse the schema side-file, read the raw data artifact,
//! then restore original names and decode vector columns positionally.

use std::path::Path;
use std::sync::Arc;

use arrow::compute::cast;
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};

use super::format::{ColumnTag, SavedLayout};
use super::schema_file::SchemaFile;
use crate::dataset::Dataset;
use crate::error::FerryError;
use crate::log_metric;
use crate::storage::ParquetFormat;
use crate::traits::InterchangeFormat;
use crate::vector::codec::decode_column;
use crate::vector::vector_data_type;

/// Everything load needs from the side-file, parsed before any data is read.
#[derive(Debug, Clone)]
pub struct DecodePlan {
    stored: SchemaRef,
    tags: Vec<ColumnTag>,
    logical: SchemaRef,
}

impl DecodePlan {
    /// Reads the tag of every side-file entry and derives the schema load will return.
    pub fn from_stored(stored: &Schema) -> Result<Self, FerryError> {
        let tags = stored
            .fields()
            .iter()
            .map(|f| ColumnTag::read(f))
            .collect::<Result<Vec<_>, _>>()?;

        let fields = stored
            .fields()
            .iter()
            .zip(&tags)
            .map(|(field, tag)| {
                let data_type = if tag.is_vector {
                    if !is_double_list(field.data_type()) {
                        return Err(FerryError::SchemaCorruption(format!(
                            "column '{}' is flagged as a vector but stored as {}",
                            field.name(),
                            field.data_type()
                        )));
                    }
                    vector_data_type()
                } else {
                    field.data_type().clone()
                };
                Ok(Field::new(tag.original_name.clone(), data_type, true)
                    .with_metadata(ColumnTag::strip(field.metadata())))
            })
            .collect::<Result<Vec<_>, FerryError>>()?;

        Ok(Self {
            stored: Arc::new(stored.clone()),
            tags,
            logical: Arc::new(Schema::new_with_metadata(fields, stored.metadata().clone())),
        })
    }

    /// The schema `load` returns: original names, vector types restored, all nullable.
    pub fn logical_schema(&self) -> SchemaRef {
        self.logical.clone()
    }

    /// Renames and decodes a raw dataset read from the data artifact.
    pub fn apply(&self, raw: &Dataset) -> Result<Dataset, FerryError> {
        let expected = self.stored.fields().len();
        if raw.num_columns() != expected {
            return Err(FerryError::ColumnCountMismatch {
                expected,
                found: raw.num_columns(),
            });
        }

        raw.project_columns(self.logical.clone(), |idx, column| {
            let stored_type = self.stored.field(idx).data_type();
            let column = if column.data_type() != stored_type {
                log_metric!(
                    "event" = "cast_on_load",
                    "column" = &self.tags[idx].original_name,
                    "from" = column.data_type(),
                    "to" = stored_type
                );
                cast(column, stored_type)?
            } else {
                column.clone()
            };
            if self.tags[idx].is_vector {
                decode_column(column.as_ref())
            } else {
                Ok(column)
            }
        })
    }
}

fn is_double_list(data_type: &DataType) -> bool {
    matches!(data_type, DataType::List(item) if *item.data_type() == DataType::Float64)
}

/// The schema side-file of the dataset saved under `path`.
pub fn read_saved_schema(path: impl AsRef<Path>) -> Result<SchemaFile, FerryError> {
    SchemaFile::read(&SavedLayout::new(path).schema_path())
}

/// Loads a dataset saved under `path` through the Parquet interchange format.
pub fn load(path: impl AsRef<Path>) -> Result<Dataset, FerryError> {
    load_with(path, &ParquetFormat)
}

/// Loads a dataset saved under `path` through the given interchange format.
///
/// Every returned column is nullable regardless of its nullability at save time.
pub fn load_with(path: impl AsRef<Path>, format: &dyn InterchangeFormat) -> Result<Dataset, FerryError> {
    let layout = SavedLayout::new(path);
    let side_file = SchemaFile::read(&layout.schema_path())?;
    let plan = DecodePlan::from_stored(&side_file.schema)?;

    let raw = format.read_all(&layout.data_dir())?;
    let dataset = plan.apply(&raw)?;

    log::info!(
        "Loaded {} columns x {} rows from {} (written by version {})",
        dataset.num_columns(),
        dataset.num_rows(),
        layout.root().display(),
        side_file.writer_version
    );
    Ok(dataset)
}
