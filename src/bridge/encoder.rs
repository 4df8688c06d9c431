//! The encode pipeline: tag, vector-encode and rename every column, then write the
//! schema side-file followed by the data artifact.
//!
//! All checks that can fail without I/O (name collisions, format restrictions,
//! write options, save-mode conflicts) run before the first byte is written.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use arrow::datatypes::{Field, Schema, SchemaRef};
use hashbrown::HashMap;

use super::format::{ColumnTag, SavedLayout};
use super::schema_file::SchemaFile;
use crate::config::{SaveMode, SaveOptions};
use crate::dataset::Dataset;
use crate::error::FerryError;
use crate::log_metric;
use crate::naming::sanitize;
use crate::storage::ParquetFormat;
use crate::traits::InterchangeFormat;
use crate::vector::codec::encode_column;
use crate::vector::{encoded_vector_type, is_vector_type};

//==================================================================================
// 1. Pure Encoding
//==================================================================================

/// Computes the post-encoding schema and the per-column vector flags.
///
/// Fails with `NameCollision` if two columns would be written under the same name.
pub fn encode_schema(schema: &Schema, clean_names: bool) -> Result<(Schema, Vec<bool>), FerryError> {
    let mut fields = Vec::with_capacity(schema.fields().len());
    let mut flags = Vec::with_capacity(schema.fields().len());
    let mut sources: HashMap<String, Vec<String>> = HashMap::new();

    for field in schema.fields() {
        // An empty display name cannot be recorded as `originalName`.
        if field.name().is_empty() {
            return Err(FerryError::InvalidColumnName {
                format: "the schema side-file",
                name: field.name().clone(),
            });
        }
        let tag = ColumnTag {
            original_name: field.name().clone(),
            is_vector: is_vector_type(field.data_type()),
        };
        let name = if clean_names {
            sanitize(field.name())
        } else {
            field.name().clone()
        };
        let data_type = if tag.is_vector {
            encoded_vector_type()
        } else {
            field.data_type().clone()
        };

        log_metric!(
            "event" = "encode_column",
            "column" = field.name(),
            "stored_as" = &name,
            "is_vector" = tag.is_vector
        );
        sources.entry(name.clone()).or_default().push(field.name().clone());
        fields.push(
            Field::new(name, data_type, field.is_nullable()).with_metadata(tag.tagged_metadata(field.metadata())),
        );
        flags.push(tag.is_vector);
    }

    // Report the first collision in column order so the error is deterministic.
    for field in &fields {
        if let Some(columns) = sources.get(field.name()) {
            if columns.len() > 1 {
                return Err(FerryError::NameCollision {
                    name: field.name().clone(),
                    columns: columns.clone(),
                });
            }
        }
    }

    Ok((Schema::new_with_metadata(fields, schema.metadata().clone()), flags))
}

/// Produces the dataset exactly as it will be written: sanitized names, tagged
/// metadata, vector columns flattened to double sequences. Row order and count
/// are unchanged.
pub fn encode_dataset(dataset: &Dataset, clean_names: bool) -> Result<Dataset, FerryError> {
    let (schema, flags) = encode_schema(&dataset.schema(), clean_names)?;
    dataset.project_columns(Arc::new(schema), |idx, column| {
        if flags[idx] {
            encode_column(column.as_ref())
        } else {
            Ok(column.clone())
        }
    })
}

//==================================================================================
// 2. Save
//==================================================================================

/// Saves `dataset` under `path` through the Parquet interchange format.
pub fn save(dataset: &Dataset, path: impl AsRef<Path>, options: &SaveOptions) -> Result<(), FerryError> {
    save_with(dataset, path, options, &ParquetFormat)
}

/// Saves `dataset` under `path` through the given interchange format.
///
/// Writes `{path}/schema` and then a new part under `{path}/data`. The two writes
/// are not atomic; a failure between them leaves a pair that must be re-saved.
pub fn save_with(
    dataset: &Dataset,
    path: impl AsRef<Path>,
    options: &SaveOptions,
    format: &dyn InterchangeFormat,
) -> Result<(), FerryError> {
    let layout = SavedLayout::new(path);

    let encoded = encode_dataset(dataset, options.clean_names)?;
    let schema: SchemaRef = encoded.schema();
    format.check_schema(&schema)?;
    format.check_options(&options.write_options)?;

    if layout.exists() && !resolve_existing(&layout, &schema, options.save_mode)? {
        log::info!(
            "Skipping save: {} already exists and save mode is {}",
            layout.root().display(),
            options.save_mode
        );
        return Ok(());
    }

    fs::create_dir_all(layout.data_dir())?;
    SchemaFile::new(schema.as_ref().clone()).write(&layout.schema_path())?;
    let part = format.write_part(&layout.data_dir(), &schema, encoded.batches(), &options.write_options)?;

    log::info!(
        "Saved {} columns x {} rows to {} ({} part {})",
        encoded.num_columns(),
        encoded.num_rows(),
        layout.root().display(),
        format.name(),
        part.display()
    );
    Ok(())
}

/// Applies the save mode to an occupied path. Returns `false` if the save should be skipped.
fn resolve_existing(layout: &SavedLayout, schema: &Schema, mode: SaveMode) -> Result<bool, FerryError> {
    match mode {
        SaveMode::ErrorIfExists => Err(FerryError::WriteConflict(format!(
            "'{}' already exists",
            layout.root().display()
        ))),
        SaveMode::Ignore => Ok(false),
        SaveMode::Overwrite => {
            if layout.root().is_dir() {
                fs::remove_dir_all(layout.root())?;
            } else {
                fs::remove_file(layout.root())?;
            }
            Ok(true)
        }
        SaveMode::Append => {
            if layout.holds_saved_dataset() {
                let stored = SchemaFile::read(&layout.schema_path())?;
                if !same_columns(&stored.schema, schema) {
                    return Err(FerryError::WriteConflict(format!(
                        "cannot append to '{}': stored schema differs from the dataset's",
                        layout.root().display()
                    )));
                }
            } else if !layout.root().is_dir() {
                return Err(FerryError::WriteConflict(format!(
                    "cannot append to '{}': not a directory",
                    layout.root().display()
                )));
            } else if layout.holds_data() {
                return Err(FerryError::WriteConflict(format!(
                    "cannot append to '{}': data parts exist without a schema side-file",
                    layout.root().display()
                )));
            }
            Ok(true)
        }
    }
}

/// Column-wise equality on name, type and metadata. Nullability is ignored since the
/// format widens it anyway.
fn same_columns(stored: &Schema, encoded: &Schema) -> bool {
    stored.fields().len() == encoded.fields().len()
        && stored.fields().iter().zip(encoded.fields()).all(|(a, b)| {
            a.name() == b.name() && a.data_type() == b.data_type() && a.metadata() == b.metadata()
        })
}
