//! This file is the root of the `schemaferry` Rust crate.
//!
//! Its responsibilities are strictly limited to:
//! 1.  Declaring all the top-level modules of our library (`bridge`, `dataset`, etc.)
//!     so the Rust compiler knows they exist.
//! 2.  Re-exporting the handful of types and functions that make up the public API,
//!     so callers can write `schemaferry::save` instead of walking the module tree.

//==================================================================================
// 0. Constants
//==================================================================================
/// The crate version, automatically set from Cargo.toml at compile time.
/// Recorded in every schema side-file this crate writes.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[doc(hidden)]
pub use log as __log;

//==================================================================================
// 1. Module Declarations
//==================================================================================
#[macro_use]
pub mod observability; // Make macros available throughout the crate

pub mod bridge;
pub mod config;
pub mod dataset;
pub mod error;
pub mod naming;
pub mod storage;
pub mod traits;
pub mod types;
pub mod validation;
pub mod vector;

//==================================================================================
// 2. Public API
//==================================================================================
pub use bridge::{load, load_with, read_saved_schema, save, save_with};
pub use config::{SaveMode, SaveOptions};
pub use dataset::{ColumnRef, Dataset, Row, Value};
pub use error::FerryError;
pub use naming::sanitize;
pub use observability::init_logging;
pub use storage::ParquetFormat;
pub use traits::InterchangeFormat;
pub use types::{Feature, FeatureType};
pub use validation::{validate, Diagnostic, DiagnosticKind};
pub use vector::NumericVector;
