//! Real-time sensor telemetry relay
//!
//! Sensor readings are submitted over HTTP, stored append-only, and fanned
//! out to every connected viewer over a binary WebSocket protocol. A newly
//! connecting viewer always receives a full snapshot before incremental
//! updates resume, and never sees a measurement for a device it has not
//! been told about.
//!
//! # Architecture
//!
//! ```text
//!   GET /api/measurements/create          GET /ws
//!            │                               │
//!            ▼                               ▼
//!   ┌─────────────────────────────────────────────────┐
//!   │              Relay (sync coordinator)           │
//!   │  ┌──────────────┐        ┌──────────────────┐   │
//!   │  │ EntityStore  │        │ SessionRegistry  │   │
//!   │  │ append-only  │        │ live viewer set  │   │
//!   │  └──────────────┘        └──────────────────┘   │
//!   └──────────────────────┬──────────────────────────┘
//!                          │ protocol::Frame (binary)
//!         ┌────────────────┼────────────────┐
//!         ▼                ▼                ▼
//!     [viewer]         [viewer]         [viewer]
//! ```
//!
//! One ingest call or connection event is processed to completion behind
//! the coordinator's exclusive section before the next starts, which is
//! what makes the snapshot boundary exact: a record is either in the
//! snapshot a viewer receives or arrives later as an incremental frame,
//! never both.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use telemetry_relay::relay::{MeasurementInput, Relay};
//! use telemetry_relay::server::{self, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> telemetry_relay::Result<()> {
//!     let relay = Arc::new(Relay::new());
//!
//!     relay
//!         .submit(&MeasurementInput {
//!             device_name: "kitchen".into(),
//!             temperature: Some(21.5),
//!             ..Default::default()
//!         })
//!         .await?;
//!
//!     server::serve(&ServerConfig::default(), relay).await
//! }
//! ```

pub mod error;
pub mod protocol;
pub mod relay;
pub mod server;
pub mod session;
pub mod store;

pub use error::{CodecError, Error, IngestError, Result};
pub use protocol::{Frame, MessageType};
pub use relay::{MeasurementInput, Relay};
pub use server::ServerConfig;
pub use store::{Device, DeviceId, Measurement, MeasurementId, MeasurementKind};
