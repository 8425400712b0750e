//! Sync coordinator
//!
//! Orchestrates the snapshot-then-incremental delivery model: new viewers
//! get a consistent snapshot of the store before any incremental frame,
//! and every ingest call appends to the store and fans one frame batch out
//! to all live viewers, atomically with respect to each other.

pub mod coordinator;

pub use coordinator::{MeasurementInput, Relay};
