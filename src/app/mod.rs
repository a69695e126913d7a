//! Controller core: intersection state and the control loop, zero I/O.
//!
//! All interaction with hardware happens through the port traits in
//! [`ports`] and embedded-hal output lines, keeping this layer testable
//! with in-memory adapters.

pub mod coordinator;
pub mod events;
pub mod intersection;
pub mod ports;
