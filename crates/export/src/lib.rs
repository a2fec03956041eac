//! # Export
//!
//! Tabular serialization of a finished session.
//!
//! One CSV file per session: a header row naming all frame columns, one data
//! row per frame in time order, then trailer rows (first field prefixed with
//! `#`) carrying session metadata. Column order and the presence of optional
//! columns are fixed by the declared schema version so downstream tooling can
//! parse deterministically; absent optional fields are serialized as empty
//! cells, never omitted columns.
//!
//! Export borrows the report, so an I/O failure never drops the in-memory
//! frame log - the caller can retry, or use [`export_with_fallback`] to fall
//! back to an alternate writable location.

mod csv_sink;

pub use csv_sink::{
    export_to_path, export_with_fallback, CsvReportSink, FRAME_COLUMNS, SCHEMA_VERSION,
};
