//! Inter-task queues and the process-wide shutdown request.
//!
//! Uses `embassy-sync` bounded channels so the edge callback (adapter
//! thread) can hand off without blocking, and the debounce task can
//! feed the coordinator without sharing any mutable state.
//!
//! ```text
//! ┌───────────────┐ pressed ┌───────────────┐ pressed ┌───────────────┐
//! │ Edge callback │────────▶│ Debounce task │────────▶│  Coordinator  │
//! │ (thread)      │  RAW    │ (async)       │ STABLE  │  (async)      │
//! └───────────────┘         └───────────────┘         └───────────────┘
//!                                                             ▲
//!                              signal thread ── SHUTDOWN ─────┘
//! ```

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

use crate::shutdown::Shutdown;

/// Depth of the raw edge queue.  A bouncing contact produces bursts.
pub const RAW_EDGE_DEPTH: usize = 32;

/// Depth of the debounced event queue.
pub const STABLE_DEPTH: usize = 4;

pub type RawEdgeChannel = Channel<CriticalSectionRawMutex, bool, RAW_EDGE_DEPTH>;
pub type StableChannel = Channel<CriticalSectionRawMutex, bool, STABLE_DEPTH>;

/// Raw `pressed` levels: edge callback → debounce task.
pub static RAW_EDGES: RawEdgeChannel = Channel::new();

/// Debounced `pressed` levels: debounce task → coordinator.
pub static STABLE_EVENTS: StableChannel = Channel::new();

/// Shutdown request: signal thread → coordinator.
pub static SHUTDOWN: Shutdown = Shutdown::new();
