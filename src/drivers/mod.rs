//! Lamp and button drivers.

pub mod debounce;
pub mod signal_head;
