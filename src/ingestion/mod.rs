//! Loading datasets from files.
//!
//! Encoders work on in-memory [`crate::types::DataSet`]s; this module builds them from headered CSV
//! using a schema whose nominal fields carry their vocabularies. See [`csv`].

pub mod csv;

pub use self::csv::{ingest_csv_from_path, ingest_csv_from_reader};
