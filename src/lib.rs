//! Intersection signal controller library.
//!
//! Exposes the controller core, drivers and adapters for integration
//! testing.  The binary wires them to sysfs GPIO and process signals.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod channels;
pub mod config;
pub mod drivers;
pub mod error;
pub mod shutdown;
