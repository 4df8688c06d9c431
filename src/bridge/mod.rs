// In: src/bridge/mod.rs

// ====================================================================================
// ARCHITECTURAL OVERVIEW: The Bridge Layer
// ====================================================================================
//
// The `bridge` is the persistence API of the library. It sits between the in-memory
// `Dataset` and an `InterchangeFormat` that cannot represent everything the dataset
// holds, and smuggles the missing facts through the schema side-file.
//
// Data Flow (Save):
//
//   1. [encoder::encode_schema]   -> per column: tag {originalName, isVector},
//         |                          pick encoded type, sanitize name
//         `-> collision check, format check, option check, save-mode check
//
//   2. [encoder::encode_dataset]  -> vector columns -> `List<Float64>` via codec
//
//   3. [SchemaFile::write]        -> `{path}/schema`
//   4. [InterchangeFormat::write_part] -> `{path}/data/part-NNNNN.*`
//
// Data Flow (Load):
//
//   1. [SchemaFile::read]         -> stored (post-encoding) schema
//   2. [DecodePlan::from_stored]  -> tags + logical schema, before any data is read
//   3. [InterchangeFormat::read_all] -> raw dataset (sanitized names, widened types)
//   4. [DecodePlan::apply]        -> column-count check, cast to stored type,
//                                    rename to originalName, decode vectors
//
// ====================================================================================
pub mod decoder;
pub mod encoder;
pub mod format;
pub mod schema_file;

pub use decoder::{load, load_with, read_saved_schema, DecodePlan};
pub use encoder::{encode_dataset, encode_schema, save, save_with};
pub use format::{ColumnTag, SavedLayout, IS_VECTOR_KEY, ORIGINAL_NAME_KEY};
pub use schema_file::SchemaFile;
