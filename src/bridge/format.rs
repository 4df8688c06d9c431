// In: src/bridge/format.rs

//! Defines the on-disk layout of a saved dataset and the reserved per-column
//! metadata keys. This is the single source of truth for both pipelines.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use arrow::datatypes::Field;

use crate::error::FerryError;

//==================================================================================
// I. Layout
//==================================================================================

/// File name of the schema side-file under the dataset root.
pub const SCHEMA_FILE_NAME: &str = "schema";
/// Directory name of the data artifact under the dataset root.
pub const DATA_DIR_NAME: &str = "data";
/// The current version of the schema side-file envelope.
pub const SCHEMA_FORMAT_VERSION: u16 = 1;

/// The pair of artifacts that make up one saved dataset.
#[derive(Debug, Clone)]
pub struct SavedLayout {
    root: PathBuf,
}

impl SavedLayout {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn schema_path(&self) -> PathBuf {
        self.root.join(SCHEMA_FILE_NAME)
    }

    pub fn data_dir(&self) -> PathBuf {
        self.root.join(DATA_DIR_NAME)
    }

    /// Something, saved dataset or not, occupies the root path.
    pub fn exists(&self) -> bool {
        self.root.exists()
    }

    /// The root holds a schema side-file.
    pub fn holds_saved_dataset(&self) -> bool {
        self.schema_path().is_file()
    }

    /// The data directory exists and is not empty.
    pub fn holds_data(&self) -> bool {
        fs::read_dir(self.data_dir()).map_or(false, |mut entries| entries.next().is_some())
    }
}

//==================================================================================
// II. Reserved Column Metadata
//==================================================================================

/// Metadata key holding a column's pre-sanitization name.
pub const ORIGINAL_NAME_KEY: &str = "originalName";
/// Metadata key flagging a column that held a numeric vector before encoding.
pub const IS_VECTOR_KEY: &str = "isVector";

/// The two facts the encode pipeline records on every column it writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnTag {
    pub original_name: String,
    pub is_vector: bool,
}

impl ColumnTag {
    /// Returns `existing` plus the reserved keys for this tag.
    pub fn tagged_metadata(&self, existing: &HashMap<String, String>) -> HashMap<String, String> {
        let mut metadata = existing.clone();
        metadata.insert(ORIGINAL_NAME_KEY.to_string(), self.original_name.clone());
        metadata.insert(IS_VECTOR_KEY.to_string(), self.is_vector.to_string());
        metadata
    }

    /// Reads the tag of a side-file entry.
    ///
    /// A missing or empty `originalName` is corruption. A missing `isVector` means
    /// `false`; any value other than `true`/`false` is corruption.
    pub fn read(field: &Field) -> Result<Self, FerryError> {
        let metadata = field.metadata();
        let original_name = match metadata.get(ORIGINAL_NAME_KEY) {
            Some(name) if !name.is_empty() => name.clone(),
            _ => {
                return Err(FerryError::SchemaCorruption(format!(
                    "column '{}' has no '{}' metadata",
                    field.name(),
                    ORIGINAL_NAME_KEY
                )))
            }
        };
        let is_vector = match metadata.get(IS_VECTOR_KEY).map(String::as_str) {
            None | Some("false") => false,
            Some("true") => true,
            Some(other) => {
                return Err(FerryError::SchemaCorruption(format!(
                    "column '{}' has non-boolean '{}' metadata '{}'",
                    field.name(),
                    IS_VECTOR_KEY,
                    other
                )))
            }
        };
        Ok(Self {
            original_name,
            is_vector,
        })
    }

    /// Returns `metadata` without the reserved keys.
    pub fn strip(metadata: &HashMap<String, String>) -> HashMap<String, String> {
        metadata
            .iter()
            .filter(|(k, _)| k.as_str() != ORIGINAL_NAME_KEY && k.as_str() != IS_VECTOR_KEY)
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::datatypes::DataType;

    fn field_with(metadata: &[(&str, &str)]) -> Field {
        let metadata = metadata
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Field::new("col", DataType::Int32, true).with_metadata(metadata)
    }

    #[test]
    fn test_tag_roundtrips_through_metadata() {
        let tag = ColumnTag {
            original_name: "Purchase Vector".to_string(),
            is_vector: true,
        };
        let mut existing = HashMap::new();
        existing.insert("owner".to_string(), "sales".to_string());

        let metadata = tag.tagged_metadata(&existing);
        assert_eq!(metadata.len(), 3);
        let field = Field::new("PurchaseVector", DataType::Int32, true).with_metadata(metadata.clone());
        assert_eq!(ColumnTag::read(&field).unwrap(), tag);
        assert_eq!(ColumnTag::strip(&metadata), existing);
    }

    #[test]
    fn test_absent_is_vector_defaults_to_false() {
        let tag = ColumnTag::read(&field_with(&[(ORIGINAL_NAME_KEY, "A b")])).unwrap();
        assert!(!tag.is_vector);
    }

    #[test]
    fn test_missing_or_bad_tags_are_corruption() {
        for metadata in [
            vec![],
            vec![(ORIGINAL_NAME_KEY, "")],
            vec![(ORIGINAL_NAME_KEY, "x"), (IS_VECTOR_KEY, "yes")],
        ] {
            assert!(matches!(
                ColumnTag::read(&field_with(&metadata)),
                Err(FerryError::SchemaCorruption(_))
            ));
        }
    }

    #[test]
    fn test_holds_data_only_for_non_empty_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let layout = SavedLayout::new(dir.path());
        assert!(!layout.holds_data());
        fs::create_dir_all(layout.data_dir()).unwrap();
        assert!(!layout.holds_data());
        fs::write(layout.data_dir().join("part-00000.parquet"), b"").unwrap();
        assert!(layout.holds_data());
    }

    #[test]
    fn test_layout_paths() {
        let layout = SavedLayout::new("/tmp/ds");
        assert_eq!(layout.schema_path(), PathBuf::from("/tmp/ds/schema"));
        assert_eq!(layout.data_dir(), PathBuf::from("/tmp/ds/data"));
    }
}
