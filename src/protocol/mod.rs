//! Binary sync protocol
//!
//! Pure encode/decode between typed records and the fixed wire layout.
//! No state, no I/O; the coordinator and any conformant client share
//! these functions as the single source of framing truth.

pub mod codec;

pub use codec::{Frame, MessageType};
