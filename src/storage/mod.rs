//! Interchange format implementations.
//!
//! Parquet is the only format shipped; other formats plug in through
//! [`crate::traits::InterchangeFormat`].

pub mod parquet;

pub use self::parquet::ParquetFormat;
