//! Outbound controller events.
//!
//! The [`Coordinator`](super::coordinator::Coordinator) emits these
//! through the [`EventSink`](super::ports::EventSink) port.  Adapters on
//! the other side decide what to do with them (log, record in tests).

use crate::error::WriteFailure;

use super::coordinator::Mode;
use super::intersection::Phase;

/// Structured events emitted by the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerEvent {
    /// Lamps initialised; the control loop is about to start.
    Started(Phase),

    /// The intersection moved one step through its cycle.
    PhaseChanged { from: Phase, to: Phase },

    /// The coordinator changed mode.
    ModeChanged { from: Mode, to: Mode },

    /// A debounced press put all heads on Yellow.
    OverrideEngaged,

    /// A lamp write failed; the logical state advanced anyway.
    WriteFailed(WriteFailure),

    /// The control loop has exited.
    Stopped(Phase),
}
