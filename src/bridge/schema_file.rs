//! The schema side-file: a pretty-printed JSON envelope around the post-encoding
//! Arrow schema, written next to the data artifact.

use std::fs;
use std::path::Path;

use arrow::datatypes::Schema;
use serde::{Deserialize, Serialize};

use super::format::SCHEMA_FORMAT_VERSION;
use crate::error::FerryError;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SchemaFile {
    pub format_version: u16,
    pub writer_version: String,
    /// RFC 3339 UTC timestamp of the save that produced this file.
    pub written_at: String,
    /// Sanitized names, encoded types, tagged metadata; column order matches the data.
    pub schema: Schema,
}

impl SchemaFile {
    pub fn new(schema: Schema) -> Self {
        Self {
            format_version: SCHEMA_FORMAT_VERSION,
            writer_version: crate::VERSION.to_string(),
            written_at: chrono::Utc::now().to_rfc3339(),
            schema,
        }
    }

    pub fn to_json(&self) -> Result<String, FerryError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses a side-file body. Anything unparsable is `SchemaCorruption`.
    pub fn from_json(json: &str) -> Result<Self, FerryError> {
        let file: SchemaFile = serde_json::from_str(json)
            .map_err(|e| FerryError::SchemaCorruption(format!("unparsable schema side-file: {}", e)))?;
        if file.format_version != SCHEMA_FORMAT_VERSION {
            return Err(FerryError::SchemaCorruption(format!(
                "unsupported schema side-file version {} (expected {})",
                file.format_version, SCHEMA_FORMAT_VERSION
            )));
        }
        Ok(file)
    }

    pub fn write(&self, path: &Path) -> Result<(), FerryError> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn read(path: &Path) -> Result<Self, FerryError> {
        let json = fs::read_to_string(path).map_err(|e| {
            FerryError::SchemaCorruption(format!("cannot read schema side-file {}: {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }
}
