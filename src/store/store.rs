//! Append-only entity store
//!
//! Owns every `Device` and `Measurement` for the lifetime of the process.
//! Insertion order is creation order and is what snapshot encoding relies
//! on; nothing here ever reorders, mutates, or removes a record.

use std::collections::HashMap;

use crate::error::IngestError;
use crate::store::entity::{Device, DeviceId, Measurement, MeasurementId, MeasurementKind};

/// Append-only, insertion-ordered storage for devices and measurements
///
/// Not internally synchronized; the coordinator serializes all access
/// behind its own exclusive section.
#[derive(Debug, Default)]
pub struct EntityStore {
    /// Devices in creation order
    devices: Vec<Device>,
    /// Measurements in creation order
    measurements: Vec<Measurement>,
    /// Device lookup by exact name, index into `devices`
    by_name: HashMap<String, usize>,
    /// Device lookup by id, index into `devices`
    by_id: HashMap<DeviceId, usize>,
}

impl EntityStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a device by exact name, creating it if absent
    ///
    /// Returns the device and whether it was created by this call. An
    /// existing device is returned unchanged; no new identifier is
    /// generated for it.
    pub fn create_or_get_device(&mut self, name: &str) -> (Device, bool) {
        if let Some(&index) = self.by_name.get(name) {
            return (self.devices[index].clone(), false);
        }

        let device = Device {
            id: DeviceId::new(),
            name: name.to_string(),
        };

        let index = self.devices.len();
        self.by_name.insert(device.name.clone(), index);
        self.by_id.insert(device.id, index);
        self.devices.push(device.clone());

        tracing::debug!(device = %device.name, id = %device.id, "Device created");

        (device, true)
    }

    /// Record a measurement for an existing device
    ///
    /// Fails with `UnknownDevice` if `device_id` has never been created;
    /// the coordinator's sequencing makes that unreachable in practice.
    pub fn record_measurement(
        &mut self,
        device_id: DeviceId,
        kind: MeasurementKind,
        value: f32,
        created_at: u32,
    ) -> Result<Measurement, IngestError> {
        if !self.by_id.contains_key(&device_id) {
            return Err(IngestError::UnknownDevice(device_id));
        }

        let measurement = Measurement {
            id: MeasurementId::new(),
            device_id,
            kind,
            value,
            created_at,
        };
        self.measurements.push(measurement);

        Ok(measurement)
    }

    /// Look up a device by id
    pub fn device(&self, id: DeviceId) -> Option<&Device> {
        self.by_id.get(&id).map(|&index| &self.devices[index])
    }

    /// Snapshot of all devices in creation order
    pub fn devices(&self) -> Vec<Device> {
        self.devices.clone()
    }

    /// Snapshot of all measurements in creation order
    pub fn measurements(&self) -> Vec<Measurement> {
        self.measurements.clone()
    }

    /// Number of devices
    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    /// Number of measurements
    pub fn measurement_count(&self) -> usize {
        self.measurements.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_device() {
        let mut store = EntityStore::new();

        let (device, created) = store.create_or_get_device("kitchen");
        assert!(created);
        assert_eq!(device.name, "kitchen");
        assert_eq!(store.device_count(), 1);
    }

    #[test]
    fn test_device_dedup_by_name() {
        let mut store = EntityStore::new();

        let (first, created) = store.create_or_get_device("kitchen");
        assert!(created);

        // Second call with the same name reuses the device, same id.
        let (second, created) = store.create_or_get_device("kitchen");
        assert!(!created);
        assert_eq!(second.id, first.id);
        assert_eq!(store.device_count(), 1);
    }

    #[test]
    fn test_record_measurement() {
        let mut store = EntityStore::new();
        let (device, _) = store.create_or_get_device("kitchen");

        let measurement = store
            .record_measurement(device.id, MeasurementKind::Temperature, 21.5, 1_700_000_000)
            .unwrap();

        assert_eq!(measurement.device_id, device.id);
        assert_eq!(measurement.kind, MeasurementKind::Temperature);
        assert_eq!(measurement.value, 21.5);
        assert_eq!(store.measurement_count(), 1);
    }

    #[test]
    fn test_record_measurement_unknown_device() {
        let mut store = EntityStore::new();
        let bogus = DeviceId::new();

        let result = store.record_measurement(bogus, MeasurementKind::Humidity, 40.0, 0);
        assert_eq!(result, Err(IngestError::UnknownDevice(bogus)));
        assert_eq!(store.measurement_count(), 0);
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut store = EntityStore::new();

        let names = ["kitchen", "bedroom", "garage"];
        for name in names {
            store.create_or_get_device(name);
        }

        let devices = store.devices();
        let listed: Vec<&str> = devices.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(listed, names);

        let (kitchen, _) = store.create_or_get_device("kitchen");
        for value in [1.0, 2.0, 3.0] {
            store
                .record_measurement(kitchen.id, MeasurementKind::Lightness, value, 0)
                .unwrap();
        }

        let values: Vec<f32> = store.measurements().iter().map(|m| m.value).collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_snapshots_are_defensive_copies() {
        let mut store = EntityStore::new();
        store.create_or_get_device("kitchen");

        let mut snapshot = store.devices();
        snapshot.clear();

        assert_eq!(store.device_count(), 1);
    }

    #[test]
    fn test_device_lookup_by_id() {
        let mut store = EntityStore::new();
        let (device, _) = store.create_or_get_device("kitchen");

        assert_eq!(store.device(device.id), Some(&device));
        assert_eq!(store.device(DeviceId::new()), None);
    }
}
