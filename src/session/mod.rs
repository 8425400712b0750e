//! Viewer sessions and the live-session registry
//!
//! A session is one connected viewer. The registry tracks the live set and
//! fans encoded frames out to it; it knows nothing about the wire format
//! beyond the opaque `Bytes` it forwards.

pub mod handle;
pub mod registry;

pub use handle::{Session, SessionPhase};
pub use registry::{SessionId, SessionRegistry};
