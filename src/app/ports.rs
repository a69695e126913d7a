//! Port traits: the boundary between controller logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Coordinator (domain)
//! ```
//!
//! Output lines use [`embedded_hal::digital::OutputPin`] directly; the
//! ports below cover what embedded-hal does not: edge notification and
//! event reporting.

use embedded_hal::digital::InputPin;

use crate::error::SetupError;

// ───────────────────────────────────────────────────────────────
// Edge input port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Callback invoked with the new line level on every transition.
///
/// Runs in the adapter's own context (thread or interrupt), so it must
/// hand off without blocking.
pub type EdgeCallback = Box<dyn FnMut(bool) + Send + 'static>;

/// An input line that reports both rising and falling edges.
pub trait EdgeInput: InputPin {
    /// Register the edge callback.  Replaces any earlier registration.
    fn on_edge(&mut self, callback: EdgeCallback) -> Result<(), SetupError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The coordinator emits structured
/// [`ControllerEvent`](super::events::ControllerEvent)s through this port.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::ControllerEvent);
}
