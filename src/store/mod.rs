//! Entity model and append-only storage
//!
//! Devices and measurements are created once, never mutated, never deleted,
//! and kept in insertion order. The store has no knowledge of sessions or
//! the wire protocol; the sync coordinator layers those on top.

pub mod entity;
pub mod store;

pub use entity::{Device, DeviceId, Measurement, MeasurementId, MeasurementKind};
pub use store::EntityStore;
