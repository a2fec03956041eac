//! # Ingestion
//!
//! Latest-value sensor caching between push-style sources and the sampling
//! scheduler.
//!
//! Device sensor streams arrive at irregular, platform-controlled rates from
//! their own threads; the 100 Hz scheduler only ever wants the most recent
//! sample per stream. Each stream gets a single-writer/single-reader
//! `LatestCell` built on `tokio::sync::watch` (a capacity-1, always-
//! overwriting channel): the source callback overwrites, the tick borrows,
//! neither side ever blocks the other and a 3-vector read can never tear.

mod hub;
mod latest;

pub use hub::SensorHub;
pub use latest::{CellWriter, LatestCell};
