//! One-shot shutdown request.
//!
//! Set from the signal-handling thread, observed by the coordinator as a
//! first-class event and by the debounce task as a flag.  The request is
//! latched: a coordinator that starts waiting after the request still
//! sees it.

use core::sync::atomic::{AtomicBool, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

pub struct Shutdown {
    requested: AtomicBool,
    signal: Signal<CriticalSectionRawMutex, ()>,
}

impl Shutdown {
    pub const fn new() -> Self {
        Self {
            requested: AtomicBool::new(false),
            signal: Signal::new(),
        }
    }

    /// Request shutdown.  Only the first call wakes the waiter.
    pub fn request(&self) {
        if !self.requested.swap(true, Ordering::AcqRel) {
            self.signal.signal(());
        }
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::Acquire)
    }

    /// Resolve once shutdown has been requested.  Single waiter.
    pub async fn wait(&self) {
        self.signal.wait().await;
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
