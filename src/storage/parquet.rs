//! Parquet interchange format.
//!
//! Parquet is written without the embedded Arrow schema and without field metadata,
//! and every field is widened to nullable, so the data artifact on its own carries
//! only sanitized names and physical types. Names must match
//! `[A-Za-z_][A-Za-z0-9_]*`. Struct, map, union and duration columns are refused,
//! as is a schema without columns.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::RecordBatch;
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::arrow_writer::ArrowWriterOptions;
use parquet::arrow::ArrowWriter;
use parquet::basic::{BrotliLevel, Compression, GzipLevel, ZstdLevel};
use parquet::file::properties::WriterProperties;

use crate::dataset::Dataset;
use crate::error::FerryError;
use crate::naming::is_legal_name;
use crate::traits::InterchangeFormat;

const FORMAT_NAME: &str = "parquet";
const PART_PREFIX: &str = "part-";
const PART_SUFFIX: &str = ".parquet";

#[derive(Debug, Clone, Copy, Default)]
pub struct ParquetFormat;

impl ParquetFormat {
    /// Translates the opaque write options into Parquet writer properties.
    ///
    /// Unknown keys are ignored with a warning; malformed values for known keys fail.
    pub fn writer_properties(options: &BTreeMap<String, String>) -> Result<WriterProperties, FerryError> {
        let mut builder = WriterProperties::builder();
        for (key, value) in options {
            builder = match key.as_str() {
                "compression" => builder.set_compression(parse_compression(value)?),
                "max_row_group_size" => builder.set_max_row_group_size(parse_positive(key, value)?),
                "write_batch_size" => builder.set_write_batch_size(parse_positive(key, value)?),
                "dictionary" => builder.set_dictionary_enabled(parse_bool(key, value)?),
                _ => {
                    log::warn!("Ignoring unknown {} write option '{}'", FORMAT_NAME, key);
                    builder
                }
            };
        }
        Ok(builder.build())
    }

    fn part_files(data_dir: &Path) -> Result<Vec<PathBuf>, FerryError> {
        let mut parts = Vec::new();
        for entry in fs::read_dir(data_dir)? {
            let path = entry?.path();
            let is_part = path
                .file_name()
                .and_then(|n| n.to_str())
                .map_or(false, |n| n.starts_with(PART_PREFIX) && n.ends_with(PART_SUFFIX));
            if is_part && path.is_file() {
                parts.push(path);
            }
        }
        parts.sort();
        Ok(parts)
    }
}

/// Returns `true` if a column of this type can be written.
fn is_storable(data_type: &DataType) -> bool {
    use DataType as D;
    match data_type {
        D::Boolean
        | D::Int8
        | D::Int16
        | D::Int32
        | D::Int64
        | D::UInt8
        | D::UInt16
        | D::UInt32
        | D::UInt64
        | D::Float32
        | D::Float64
        | D::Utf8
        | D::LargeUtf8
        | D::Binary
        | D::LargeBinary
        | D::Date32
        | D::Date64
        | D::Timestamp(_, _)
        | D::Time32(_)
        | D::Time64(_)
        | D::FixedSizeBinary(_)
        | D::Decimal128(_, _)
        | D::Decimal256(_, _) => true,
        D::List(item) | D::LargeList(item) => is_storable(item.data_type()),
        // Read back as the plain value type.
        D::Dictionary(_, value) => !matches!(**value, D::List(_) | D::LargeList(_)) && is_storable(value),
        // The arrow writer has no Duration mapping.
        _ => false,
    }
}

/// The schema as the format actually stores it: every field nullable, no metadata.
fn stored_schema(schema: &Schema) -> SchemaRef {
    let fields: Vec<Field> = schema
        .fields()
        .iter()
        .map(|f| Field::new(f.name(), f.data_type().clone(), true))
        .collect();
    Arc::new(Schema::new(fields))
}

impl InterchangeFormat for ParquetFormat {
    fn name(&self) -> &'static str {
        FORMAT_NAME
    }

    fn check_schema(&self, schema: &Schema) -> Result<(), FerryError> {
        if schema.fields().is_empty() {
            return Err(FerryError::UnsupportedType(format!(
                "{} cannot store a dataset without columns",
                FORMAT_NAME
            )));
        }
        for field in schema.fields() {
            if !is_legal_name(field.name()) {
                return Err(FerryError::InvalidColumnName {
                    format: FORMAT_NAME,
                    name: field.name().clone(),
                });
            }
            if !is_storable(field.data_type()) {
                return Err(FerryError::UnsupportedType(format!(
                    "{} cannot store column '{}' of type {}",
                    FORMAT_NAME,
                    field.name(),
                    field.data_type()
                )));
            }
        }
        Ok(())
    }

    fn check_options(&self, options: &BTreeMap<String, String>) -> Result<(), FerryError> {
        Self::writer_properties(options).map(|_| ())
    }

    fn write_part(
        &self,
        data_dir: &Path,
        schema: &SchemaRef,
        batches: &[RecordBatch],
        options: &BTreeMap<String, String>,
    ) -> Result<PathBuf, FerryError> {
        self.check_schema(schema)?;
        let part_idx = Self::part_files(data_dir)?.len();
        let path = data_dir.join(format!("{}{:05}{}", PART_PREFIX, part_idx, PART_SUFFIX));

        let stored = stored_schema(schema);
        let writer_options = ArrowWriterOptions::new()
            .with_properties(Self::writer_properties(options)?)
            .with_skip_arrow_metadata(true);
        let file = File::create(&path)?;
        let mut writer = ArrowWriter::try_new_with_options(file, stored.clone(), writer_options)?;
        for batch in batches {
            let batch = RecordBatch::try_new(stored.clone(), batch.columns().to_vec())?;
            writer.write(&batch)?;
        }
        writer.close()?;

        log::info!(
            "Wrote {} rows to {} part {}",
            batches.iter().map(RecordBatch::num_rows).sum::<usize>(),
            FORMAT_NAME,
            path.display()
        );
        Ok(path)
    }

    fn read_all(&self, data_dir: &Path) -> Result<Dataset, FerryError> {
        let parts = Self::part_files(data_dir)?;
        if parts.is_empty() {
            return Err(FerryError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no {} data parts under {}", FORMAT_NAME, data_dir.display()),
            )));
        }

        let mut schema: Option<SchemaRef> = None;
        let mut batches = Vec::new();
        for part in &parts {
            let builder = ParquetRecordBatchReaderBuilder::try_new(File::open(part)?)?;
            let part_schema = builder.schema().clone();
            let expected = schema.get_or_insert_with(|| part_schema.clone()).fields().len();
            if expected != part_schema.fields().len() {
                return Err(FerryError::ColumnCountMismatch {
                    expected,
                    found: part_schema.fields().len(),
                });
            }
            for batch in builder.build()? {
                batches.push(batch?);
            }
        }

        log::debug!("Read {} batches from {} {} parts", batches.len(), parts.len(), FORMAT_NAME);
        // `parts` is non-empty, so the first iteration always set the schema.
        let schema = schema.ok_or_else(|| FerryError::Io(io::Error::from(io::ErrorKind::NotFound)))?;
        Dataset::try_new(schema, batches)
    }
}

fn parse_compression(value: &str) -> Result<Compression, FerryError> {
    match value.to_ascii_lowercase().as_str() {
        "uncompressed" | "none" => Ok(Compression::UNCOMPRESSED),
        "snappy" => Ok(Compression::SNAPPY),
        "gzip" => Ok(Compression::GZIP(GzipLevel::default())),
        "lz4" => Ok(Compression::LZ4_RAW),
        "zstd" => Ok(Compression::ZSTD(ZstdLevel::default())),
        "brotli" => Ok(Compression::BROTLI(BrotliLevel::default())),
        other => Err(FerryError::InvalidOption {
            key: "compression".to_string(),
            reason: format!("unknown codec '{}'", other),
        }),
    }
}

fn parse_positive(key: &str, value: &str) -> Result<usize, FerryError> {
    match value.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(FerryError::InvalidOption {
            key: key.to_string(),
            reason: format!("expected a positive integer, got '{}'", value),
        }),
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, FerryError> {
    value.parse::<bool>().map_err(|_| FerryError::InvalidOption {
        key: key.to_string(),
        reason: format!("expected true or false, got '{}'", value),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Array, ArrayRef, Float64Array, Int32Array, StringArray};
    use std::sync::Arc;

    fn schema() -> SchemaRef {
        let mut metadata = std::collections::HashMap::new();
        metadata.insert("k".to_string(), "v".to_string());
        Arc::new(Schema::new(vec![
            Field::new("id", DataType::Int32, false).with_metadata(metadata),
            Field::new("label", DataType::Utf8, true),
            Field::new("score", DataType::Float64, false),
        ]))
    }

    fn batch(ids: Vec<i32>) -> RecordBatch {
        let n = ids.len();
        let columns: Vec<ArrayRef> = vec![
            Arc::new(Int32Array::from(ids)),
            Arc::new(StringArray::from(vec![Some("x"); n])),
            Arc::new(Float64Array::from(vec![1.5; n])),
        ];
        RecordBatch::try_new(schema(), columns).unwrap()
    }

    #[test]
    fn test_check_schema_rejects_illegal_names_and_structs() {
        let bad_name = Schema::new(vec![Field::new("has space", DataType::Int32, true)]);
        assert!(matches!(
            ParquetFormat.check_schema(&bad_name),
            Err(FerryError::InvalidColumnName { .. })
        ));

        let vector = Schema::new(vec![Field::new("v", crate::vector::vector_data_type(), true)]);
        assert!(matches!(
            ParquetFormat.check_schema(&vector),
            Err(FerryError::UnsupportedType(_))
        ));

        let encoded = Schema::new(vec![Field::new("v", crate::vector::encoded_vector_type(), true)]);
        assert!(ParquetFormat.check_schema(&encoded).is_ok());
    }

    #[test]
    fn test_check_schema_rejects_zero_columns() {
        assert!(matches!(
            ParquetFormat.check_schema(&Schema::empty()),
            Err(FerryError::UnsupportedType(_))
        ));
    }

    #[test]
    fn test_is_storable_covers_decimal_time_and_dictionary() {
        use arrow::datatypes::TimeUnit;
        for data_type in [
            DataType::Decimal128(10, 2),
            DataType::Decimal256(40, 4),
            DataType::Time32(TimeUnit::Millisecond),
            DataType::Time64(TimeUnit::Nanosecond),
            DataType::FixedSizeBinary(16),
            DataType::Dictionary(Box::new(DataType::Int32), Box::new(DataType::Utf8)),
        ] {
            assert!(is_storable(&data_type), "{} should be storable", data_type);
        }
        assert!(!is_storable(&DataType::Duration(TimeUnit::Second)));
        assert!(!is_storable(&DataType::Dictionary(
            Box::new(DataType::Int8),
            Box::new(crate::vector::encoded_vector_type())
        )));
    }

    #[test]
    fn test_writer_properties_parsing() {
        let mut options = BTreeMap::new();
        options.insert("compression".to_string(), "ZSTD".to_string());
        options.insert("max_row_group_size".to_string(), "1024".to_string());
        options.insert("something_else".to_string(), "ignored".to_string());
        let props = ParquetFormat::writer_properties(&options).unwrap();
        assert_eq!(props.max_row_group_size(), 1024);

        options.insert("write_batch_size".to_string(), "0".to_string());
        assert!(matches!(
            ParquetFormat::writer_properties(&options),
            Err(FerryError::InvalidOption { .. })
        ));

        let mut bad_codec = BTreeMap::new();
        bad_codec.insert("compression".to_string(), "rar".to_string());
        assert!(ParquetFormat.check_options(&bad_codec).is_err());
    }

    #[test]
    fn test_write_widens_nullability_and_drops_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let path = ParquetFormat
            .write_part(dir.path(), &schema(), &[batch(vec![1, 2, 3])], &BTreeMap::new())
            .unwrap();
        assert!(path.ends_with("part-00000.parquet"));

        let raw = ParquetFormat.read_all(dir.path()).unwrap();
        assert_eq!(raw.num_rows(), 3);
        for field in raw.schema().fields() {
            assert!(field.is_nullable(), "{} should be nullable", field.name());
            assert!(field.metadata().is_empty());
        }
        assert_eq!(raw.schema().field(0).data_type(), &DataType::Int32);
    }

    #[test]
    fn test_parts_are_read_in_order() {
        let dir = tempfile::tempdir().unwrap();
        ParquetFormat
            .write_part(dir.path(), &schema(), &[batch(vec![1, 2])], &BTreeMap::new())
            .unwrap();
        let second = ParquetFormat
            .write_part(dir.path(), &schema(), &[batch(vec![3])], &BTreeMap::new())
            .unwrap();
        assert!(second.ends_with("part-00001.parquet"));

        let raw = ParquetFormat.read_all(dir.path()).unwrap();
        let ids = raw.column("id").unwrap();
        let ids = ids.as_any().downcast_ref::<Int32Array>().unwrap();
        assert_eq!(ids.values().to_vec(), vec![1, 2, 3]);
    }

    #[test]
    fn test_read_all_on_empty_dir_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        match ParquetFormat.read_all(dir.path()) {
            Err(FerryError::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::NotFound),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }
}
