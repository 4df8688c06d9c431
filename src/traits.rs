//! This module defines the seam between the save/load pipelines and the on-disk
//! interchange format.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use arrow::array::RecordBatch;
use arrow::datatypes::{Schema, SchemaRef};

use crate::dataset::Dataset;
use crate::error::FerryError;

/// **CONTRACT:** A columnar format that stores the data artifact of a saved dataset.
///
/// Formats are narrower than Arrow. A format may refuse column names or types it
/// cannot store (`check_schema`), and is free to widen nullability, drop field
/// metadata, or return a different but castable type on read. The pipelines
/// compensate using the schema side-file.
pub trait InterchangeFormat: Send + Sync {
    /// Short name used in logs and error messages.
    fn name(&self) -> &'static str;

    /// Verifies the schema can be written. Called before any artifact is written.
    fn check_schema(&self, schema: &Schema) -> Result<(), FerryError>;

    /// Verifies the opaque write options. Called before any artifact is written.
    fn check_options(&self, options: &BTreeMap<String, String>) -> Result<(), FerryError>;

    /// Writes one new data part into `data_dir` and returns its path.
    fn write_part(
        &self,
        data_dir: &Path,
        schema: &SchemaRef,
        batches: &[RecordBatch],
        options: &BTreeMap<String, String>,
    ) -> Result<PathBuf, FerryError>;

    /// Reads every data part in `data_dir`, in part order, as the format returns them.
    fn read_all(&self, data_dir: &Path) -> Result<Dataset, FerryError>;
}
