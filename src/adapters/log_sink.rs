//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured controller events to
//! the `log` facade (stderr via `env_logger` in the binary).

use log::{info, warn};

use crate::app::events::ControllerEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`ControllerEvent`].
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &ControllerEvent) {
        match event {
            ControllerEvent::Started(phase) => {
                info!("START | initial_phase={:?}", phase);
            }
            ControllerEvent::PhaseChanged { from, to } => {
                info!("PHASE | {:?} -> {:?}", from, to);
            }
            ControllerEvent::ModeChanged { from, to } => {
                info!("MODE  | {:?} -> {:?}", from, to);
            }
            ControllerEvent::OverrideEngaged => {
                info!("OVRD  | manual override pending, all heads yellow");
            }
            ControllerEvent::WriteFailed(failure) => {
                warn!("FAULT | lamp write failed: {}", failure);
            }
            ControllerEvent::Stopped(phase) => {
                info!("STOP  | final_phase={:?}", phase);
            }
        }
    }
}
