// In: src/config.rs

//! The single source of truth for how a dataset is saved.
//!
//! `SaveOptions` is created once at the application boundary (e.g., from a JSON
//! document or a CLI) and passed by reference into the save pipeline. Everything
//! the encode pipeline needs to know beyond the dataset and the target path lives
//! here.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FerryError;

//==================================================================================
// I. Save Mode
//==================================================================================

/// What `save` does when the target path already exists.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SaveMode {
    /// Remove whatever is at the target path and write a fresh pair of artifacts.
    Overwrite,

    /// Add a new data part next to the existing ones. The stored schema must match
    /// the new encoded schema exactly.
    Append,

    /// Leave the existing artifacts untouched and report success.
    Ignore,

    /// **Default:** Refuse to write if anything exists at the target path.
    #[default]
    ErrorIfExists,
}

impl FromStr for SaveMode {
    type Err = FerryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "overwrite" => Ok(SaveMode::Overwrite),
            "append" => Ok(SaveMode::Append),
            "ignore" => Ok(SaveMode::Ignore),
            "error" | "errorifexists" | "error_if_exists" => Ok(SaveMode::ErrorIfExists),
            other => Err(FerryError::InvalidOption {
                key: "save_mode".to_string(),
                reason: format!("unknown save mode '{}'", other),
            }),
        }
    }
}

impl fmt::Display for SaveMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SaveMode::Overwrite => "overwrite",
            SaveMode::Append => "append",
            SaveMode::Ignore => "ignore",
            SaveMode::ErrorIfExists => "error_if_exists",
        };
        f.write_str(name)
    }
}

//==================================================================================
// II. Save Options
//==================================================================================

/// Options for a single `save` call.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct SaveOptions {
    /// If true, every column name is passed through the name sanitizer before writing.
    /// With `false`, names the interchange format cannot store make the save fail.
    #[serde(default = "default_true")]
    pub clean_names: bool,

    /// Behaviour when the target path already exists.
    #[serde(default)]
    pub save_mode: SaveMode,

    /// Format-specific write options, forwarded to the interchange format as-is.
    /// A `BTreeMap` keeps the iteration order (and therefore logs) deterministic.
    #[serde(default)]
    pub write_options: BTreeMap<String, String>,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            clean_names: true,
            save_mode: SaveMode::default(),
            write_options: BTreeMap::new(),
        }
    }
}

impl SaveOptions {
    /// Parses options from a JSON document; absent fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, FerryError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_save_mode(mut self, save_mode: SaveMode) -> Self {
        self.save_mode = save_mode;
        self
    }

    pub fn with_clean_names(mut self, clean_names: bool) -> Self {
        self.clean_names = clean_names;
        self
    }

    pub fn with_write_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.write_options.insert(key.into(), value.into());
        self
    }
}

/// Helper for `serde` to default a boolean field to true.
fn default_true() -> bool {
    true
}
