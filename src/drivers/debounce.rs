//! Button debouncer.
//!
//! ## Model
//!
//! Raw edges arrive from the input adapter's edge callback through a
//! bounded queue.  The [`Debouncer`] holds one of three states:
//!
//! | State     | Meaning                                             |
//! |-----------|-----------------------------------------------------|
//! | `Unknown` | nothing observed since start-up                     |
//! | `Pending` | a candidate is waiting out its quiet window         |
//! | `Stable`  | the last emitted value; no window armed             |
//!
//! Every raw edge while `Pending` re-arms the window, so only a quiet
//! period of `settle` with no further transitions lets the candidate
//! through.  An expired window always emits its candidate; only an edge
//! repeating the stable value with no window armed is dropped.
//!
//! [`debounce_task`] drives the state machine: it races the raw-edge
//! queue against the armed deadline and forwards stable values to the
//! coordinator's queue.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Channel;
use embassy_time::{Duration, Instant, Timer};
use futures_lite::future;
use log::{debug, info, warn};

use crate::shutdown::Shutdown;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DebounceState {
    Unknown,
    Pending {
        candidate: bool,
        deadline: Instant,
        stable: Option<bool>,
    },
    Stable(bool),
}

pub struct Debouncer {
    settle: Duration,
    state: DebounceState,
}

impl Debouncer {
    pub fn new(settle: Duration) -> Self {
        Self {
            settle,
            state: DebounceState::Unknown,
        }
    }

    pub fn settle_duration(&self) -> Duration {
        self.settle
    }

    /// Last value emitted, if any.
    pub fn stable(&self) -> Option<bool> {
        match self.state {
            DebounceState::Unknown => None,
            DebounceState::Pending { stable, .. } => stable,
            DebounceState::Stable(value) => Some(value),
        }
    }

    /// Deadline of the armed quiet window.
    pub fn deadline(&self) -> Option<Instant> {
        match self.state {
            DebounceState::Pending { deadline, .. } => Some(deadline),
            _ => None,
        }
    }

    /// Feed one raw edge observed at `now`.
    pub fn on_raw_event(&mut self, value: bool, now: Instant) {
        let stable = match self.state {
            DebounceState::Stable(current) if current == value => return,
            DebounceState::Stable(current) => Some(current),
            DebounceState::Pending { stable, .. } => stable,
            DebounceState::Unknown => None,
        };
        self.state = DebounceState::Pending {
            candidate: value,
            deadline: now + self.settle,
            stable,
        };
    }

    /// Settle the armed window if its deadline has passed.
    ///
    /// Every expired window emits its candidate exactly once, even when
    /// it matches the previous stable value.  Returns `None` when nothing
    /// is armed or the window is still open.
    pub fn poll(&mut self, now: Instant) -> Option<bool> {
        let DebounceState::Pending {
            candidate, deadline, ..
        } = self.state
        else {
            return None;
        };
        if now < deadline {
            return None;
        }
        self.state = DebounceState::Stable(candidate);
        Some(candidate)
    }

    /// Disarm any open window, keeping the last stable value.
    pub fn cancel(&mut self) {
        if let DebounceState::Pending { stable, .. } = self.state {
            self.state = stable.map_or(DebounceState::Unknown, DebounceState::Stable);
        }
    }
}

enum Wake {
    Raw(bool),
    Settled,
}

/// Debounce loop.  Runs until dropped by the executor at shutdown.
///
/// Raw values are `pressed` levels (polarity already applied by the
/// edge callback).  Nothing is forwarded once shutdown is requested.
pub async fn debounce_task<M: RawMutex, const RAW: usize, const STABLE: usize>(
    mut debouncer: Debouncer,
    raw: &Channel<M, bool, RAW>,
    stable: &Channel<M, bool, STABLE>,
    shutdown: &Shutdown,
) {
    info!(
        "Debounce task started (settle {} ms)",
        debouncer.settle_duration().as_millis()
    );
    loop {
        let wake = match debouncer.deadline() {
            Some(deadline) => {
                future::or(async { Wake::Raw(raw.receive().await) }, async {
                    Timer::at(deadline).await;
                    Wake::Settled
                })
                .await
            }
            None => Wake::Raw(raw.receive().await),
        };

        if shutdown.is_requested() {
            debouncer.cancel();
            continue;
        }

        match wake {
            Wake::Raw(value) => {
                debug!("Button raw edge: pressed={}", value);
                debouncer.on_raw_event(value, Instant::now());
            }
            Wake::Settled => {
                if let Some(value) = debouncer.poll(Instant::now()) {
                    info!("Button stable: pressed={}", value);
                    if stable.try_send(value).is_err() {
                        warn!("Stable event queue full, dropping pressed={}", value);
                    }
                }
            }
        }
    }
}
