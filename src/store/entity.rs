//! Core entity types
//!
//! Identifiers travel over the wire as their raw 16 bytes; the canonical
//! hyphenated text form is only used at the JSON boundary and in logs.

use serde::{Serialize, Serializer};
use uuid::Uuid;

/// Unique identifier for a device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DeviceId(Uuid);

impl DeviceId {
    /// Generate a fresh random identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Reconstruct an identifier from its raw wire bytes
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }

    /// Raw 16-byte wire representation
    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }
}

impl Default for DeviceId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for DeviceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct MeasurementId(Uuid);

impl MeasurementId {
    /// Generate a fresh random identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Reconstruct an identifier from its raw wire bytes
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }

    /// Raw 16-byte wire representation
    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }
}

impl Default for MeasurementId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MeasurementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named sensor device
///
/// Created on the first measurement referencing an unseen name, immutable
/// thereafter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Device {
    /// Unique identifier, assigned at creation
    pub id: DeviceId,
    /// Human-readable name, unique within the store
    pub name: String,
}

/// Kind of sensor reading
///
/// The numeric tag is the wire encoding; the textual name is the JSON
/// rendering. Both directions of the mapping live here and nowhere else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeasurementKind {
    Temperature,
    Humidity,
    Lightness,
}

impl MeasurementKind {
    /// All kinds in ingest evaluation order
    pub const ALL: [MeasurementKind; 3] = [
        MeasurementKind::Temperature,
        MeasurementKind::Humidity,
        MeasurementKind::Lightness,
    ];

    /// Wire tag for this kind
    pub fn tag(&self) -> u8 {
        match self {
            MeasurementKind::Temperature => 1,
            MeasurementKind::Humidity => 2,
            MeasurementKind::Lightness => 3,
        }
    }

    /// Look up a kind by its wire tag
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(MeasurementKind::Temperature),
            2 => Some(MeasurementKind::Humidity),
            3 => Some(MeasurementKind::Lightness),
            _ => None,
        }
    }

    /// Textual name used at the JSON boundary
    pub fn name(&self) -> &'static str {
        match self {
            MeasurementKind::Temperature => "temperature",
            MeasurementKind::Humidity => "humidity",
            MeasurementKind::Lightness => "lightness",
        }
    }

    /// Look up a kind by its textual name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "temperature" => Some(MeasurementKind::Temperature),
            "humidity" => Some(MeasurementKind::Humidity),
            "lightness" => Some(MeasurementKind::Lightness),
            _ => None,
        }
    }
}

impl std::fmt::Display for MeasurementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for MeasurementKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// A single sensor reading
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Measurement {
    /// Unique identifier, assigned at creation
    pub id: MeasurementId,
    /// Device this reading belongs to; always present in the store
    pub device_id: DeviceId,
    /// What was measured
    #[serde(rename = "type")]
    pub kind: MeasurementKind,
    /// Reading value
    pub value: f32,
    /// Unix timestamp (seconds) at creation
    pub created_at: u32,
}
