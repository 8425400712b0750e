//! Relay coordinator implementation
//!
//! All store mutation and all fan-out happens behind one exclusive
//! section, so a connecting viewer and a concurrent ingest can never
//! interleave: a frame is either fully inside the snapshot a viewer
//! receives or arrives as a later incremental, never both, never neither.

use std::time::{SystemTime, UNIX_EPOCH};

use tokio::sync::{mpsc, Mutex};

use crate::error::{IngestError, Result};
use crate::protocol::Frame;
use crate::session::{Session, SessionId, SessionRegistry};
use crate::store::{Device, EntityStore, Measurement, MeasurementKind};

/// One validated ingest submission
///
/// Any subset of the three kinds may be present; at least one must be.
#[derive(Debug, Clone, Default)]
pub struct MeasurementInput {
    /// Device name; created on first sight, at least 2 characters
    pub device_name: String,
    /// Temperature reading, if supplied
    pub temperature: Option<f32>,
    /// Humidity reading, if supplied
    pub humidity: Option<f32>,
    /// Lightness reading, if supplied
    pub lightness: Option<f32>,
}

impl MeasurementInput {
    /// The reading for one kind, if present
    pub fn value(&self, kind: MeasurementKind) -> Option<f32> {
        match kind {
            MeasurementKind::Temperature => self.temperature,
            MeasurementKind::Humidity => self.humidity,
            MeasurementKind::Lightness => self.lightness,
        }
    }

    /// Present readings in fixed kind order
    pub fn values(&self) -> impl Iterator<Item = (MeasurementKind, f32)> + '_ {
        MeasurementKind::ALL
            .into_iter()
            .filter_map(|kind| self.value(kind).map(|value| (kind, value)))
    }

    fn is_valid(&self) -> bool {
        self.device_name.chars().count() >= 2
            && self.device_name.len() <= u16::MAX as usize
            && self.values().next().is_some()
    }
}

/// Store and registry behind the coordinator's exclusive section
#[derive(Debug, Default)]
struct Inner {
    store: EntityStore,
    registry: SessionRegistry,
}

/// The sync coordinator
///
/// Owns the entity store and the session registry. One `Relay` is one
/// independent protocol instance; nothing here is process-global.
#[derive(Debug, Default)]
pub struct Relay {
    inner: Mutex<Inner>,
}

impl Relay {
    /// Create a relay with an empty store and no sessions
    pub fn new() -> Self {
        Self::default()
    }

    /// Connect a new viewer
    ///
    /// Captures the current store contents, queues INIT_DEVICES followed
    /// by INIT_MEASUREMENTS on the new session's channel (both sent even
    /// when empty), and only then registers the session for incremental
    /// broadcasts. Anything ingested after this call returns is delivered
    /// incrementally, never duplicated into the snapshot.
    pub async fn connect(&self) -> Result<Session> {
        let mut inner = self.inner.lock().await;

        let init_devices = Frame::InitDevices(inner.store.devices()).encode()?;
        let init_measurements = Frame::InitMeasurements(inner.store.measurements()).encode()?;

        let (tx, rx) = mpsc::unbounded_channel();
        // Snapshot goes on the channel before registration, so no broadcast
        // can slot in ahead of it.
        let _ = tx.send(init_devices);
        let _ = tx.send(init_measurements);

        let id = inner.registry.register(tx);
        let mut session = Session::new(id, rx);
        session.mark_connected();

        tracing::info!(
            session_id = id,
            devices = inner.store.device_count(),
            measurements = inner.store.measurement_count(),
            "Viewer connected"
        );

        Ok(session)
    }

    /// Disconnect a viewer
    ///
    /// Safe to call for a session that is already gone.
    pub async fn disconnect(&self, id: SessionId) {
        let mut inner = self.inner.lock().await;
        inner.registry.remove(id);
    }

    /// Ingest a submission, stamping it with the current time
    pub async fn submit(&self, input: &MeasurementInput) -> Result<()> {
        self.submit_at(input, unix_now()).await
    }

    /// Ingest a submission with an explicit timestamp
    ///
    /// Validates, creates the device if its name is unseen (broadcasting
    /// NEW_DEVICE before anything else), records every present reading,
    /// and broadcasts the whole batch as a single NEW_MEASUREMENTS frame.
    /// Validation is the only rejection point; past it the submission is
    /// recorded in full.
    pub async fn submit_at(&self, input: &MeasurementInput, created_at: u32) -> Result<()> {
        if !input.is_valid() {
            return Err(IngestError::InvalidInput.into());
        }

        let mut inner = self.inner.lock().await;
        let inner = &mut *inner;

        let (device, created) = inner.store.create_or_get_device(&input.device_name);
        if created {
            // The device record must reach every viewer before any
            // measurement referencing it.
            let frame = Frame::NewDevice(device.clone()).encode()?;
            inner.registry.broadcast(&frame);
        }

        let mut batch = Vec::new();
        for (kind, value) in input.values() {
            let measurement = inner
                .store
                .record_measurement(device.id, kind, value, created_at)
                .map_err(crate::error::Error::Ingest)?;
            batch.push(measurement);
        }

        tracing::info!(
            device = %device.name,
            created = created,
            count = batch.len(),
            sessions = inner.registry.len(),
            "Measurements recorded"
        );

        if !batch.is_empty() {
            let frame = Frame::NewMeasurements(batch).encode()?;
            inner.registry.broadcast(&frame);
        }

        Ok(())
    }

    /// All devices in creation order
    pub async fn devices(&self) -> Vec<Device> {
        self.inner.lock().await.store.devices()
    }

    /// All measurements in creation order
    pub async fn measurements(&self) -> Vec<Measurement> {
        self.inner.lock().await.store.measurements()
    }

    /// Number of connected viewers
    pub async fn session_count(&self) -> usize {
        self.inner.lock().await.registry.len()
    }
}

/// Current Unix time in whole seconds
fn unix_now() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as u32)
        .unwrap_or(0)
}
