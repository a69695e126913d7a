//! Coordinator: the control loop and sole owner of the intersection.
//!
//! ```text
//!  cycle timer ──┐
//!  stable press ─┼──▶ ┌─────────────────────────┐ ──▶ EventSink
//!  shutdown ─────┘    │       Coordinator       │
//!                     │  Cycling · Override ·   │ ──▶ Intersection
//!                     │  Draining               │
//!                     └─────────────────────────┘
//! ```
//!
//! [`Coordinator::run`] blocks until exactly one of {cycle-timer expiry,
//! debounced button event, shutdown} is ready, hands it to
//! [`Coordinator::handle`], and only then waits again.  `handle` is
//! synchronous and clock-free, so the transition table is testable
//! without timers.
//!
//! | Mode                  | Event          | Action                         | Next                  |
//! |-----------------------|----------------|--------------------------------|-----------------------|
//! | Cycling               | timer          | advance, reset timer           | Cycling               |
//! | Cycling               | pressed        | all yellow, timer untouched    | ManualOverridePending |
//! | ManualOverridePending | timer          | advance, reset timer           | Cycling               |
//! | any                   | released       | none                           | unchanged             |
//! | any but Draining      | shutdown       | exit, or finish the clearance  | Draining              |
//! | Draining              | timer          | complete the step, exit        | (exit)                |
//!
//! Button activity never resets or stops the cycle timer, so a stuck or
//! jittering button cannot hold off the automatic cycle.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Channel;
use embassy_time::{Duration, Instant, Timer};
use embedded_hal::digital::OutputPin;
use futures_lite::future;
use log::{debug, info, warn};

use crate::config::CycleTiming;
use crate::error::{Result, WriteFailure};
use crate::shutdown::Shutdown;

use super::events::ControllerEvent;
use super::intersection::{Intersection, Phase};
use super::ports::EventSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Cycling,
    ManualOverridePending,
    Draining,
}

/// One input to the control loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEvent {
    CycleTimerFired,
    /// Debounced button level, `true` = pressed.
    ButtonSettled(bool),
    Shutdown,
}

/// What the loop does with the cycle timer after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    ResetTimer(Duration),
    KeepTimer,
    Exit,
}

pub struct Coordinator<P, S> {
    intersection: Intersection<P>,
    timing: CycleTiming,
    sink: S,
    mode: Mode,
}

impl<P: OutputPin, S: EventSink> Coordinator<P, S> {
    pub fn new(intersection: Intersection<P>, timing: CycleTiming, sink: S) -> Self {
        Self {
            intersection,
            timing,
            sink,
            mode: Mode::Cycling,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Drive the initial NS green / EW red display.
    ///
    /// A write failure here is fatal: the caller must not enter the loop.
    pub fn start(&mut self) -> Result<()> {
        self.intersection.enter_ns_green()?;
        self.mode = Mode::Cycling;
        let phase = self.intersection.phase();
        self.sink.emit(&ControllerEvent::Started(phase));
        info!("Coordinator started in {:?}", phase);
        Ok(())
    }

    /// Service events until shutdown completes.  Call after [`start`](Self::start).
    pub async fn run<M: RawMutex, const N: usize>(
        &mut self,
        stable: &Channel<M, bool, N>,
        shutdown: &Shutdown,
    ) {
        let mut deadline = Instant::now() + self.interval();
        loop {
            let event = if self.mode == Mode::Draining {
                Timer::at(deadline).await;
                ControlEvent::CycleTimerFired
            } else {
                let stop = async {
                    shutdown.wait().await;
                    ControlEvent::Shutdown
                };
                let timer = async {
                    Timer::at(deadline).await;
                    ControlEvent::CycleTimerFired
                };
                let button = async { ControlEvent::ButtonSettled(stable.receive().await) };
                future::or(stop, future::or(timer, button)).await
            };

            match self.handle(event) {
                Flow::ResetTimer(interval) => deadline = Instant::now() + interval,
                Flow::KeepTimer => {}
                Flow::Exit => break,
            }
        }
    }

    // ── Event handling ────────────────────────────────────────

    /// Process exactly one event to completion.
    pub fn handle(&mut self, event: ControlEvent) -> Flow {
        match event {
            ControlEvent::CycleTimerFired => {
                self.advance();
                if self.mode == Mode::Draining {
                    return self.exit();
                }
                self.set_mode(Mode::Cycling);
                Flow::ResetTimer(self.interval())
            }

            ControlEvent::ButtonSettled(pressed) => match (self.mode, pressed) {
                (Mode::Draining, _) => {
                    debug!("Button event while draining, ignored");
                    Flow::KeepTimer
                }
                (Mode::Cycling, true) => {
                    self.set_mode(Mode::ManualOverridePending);
                    if let Err(e) = self.intersection.emergency_all_yellow() {
                        self.report(e);
                    }
                    self.sink.emit(&ControllerEvent::OverrideEngaged);
                    Flow::KeepTimer
                }
                (Mode::ManualOverridePending, true) | (_, false) => Flow::KeepTimer,
            },

            ControlEvent::Shutdown => {
                if self.mode == Mode::Draining {
                    return Flow::KeepTimer;
                }
                self.set_mode(Mode::Draining);
                if self.intersection.phase().is_transitioning() {
                    info!("Shutdown requested mid-clearance, finishing the step");
                    Flow::KeepTimer
                } else {
                    self.exit()
                }
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn phase(&self) -> Phase {
        self.intersection.phase()
    }

    pub fn intersection(&self) -> &Intersection<P> {
        &self.intersection
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Cycle timer interval for the current phase.
    pub fn interval(&self) -> Duration {
        if self.intersection.phase().is_transitioning() {
            self.timing.yellow_clearance
        } else {
            self.timing.green_hold
        }
    }

    // ── Internal ──────────────────────────────────────────────

    fn advance(&mut self) {
        let from = self.intersection.phase();
        if let Err(e) = self.intersection.advance_phase() {
            self.report(e);
        }
        let to = self.intersection.phase();
        debug_assert!(!self.intersection.is_conflicting());
        self.sink.emit(&ControllerEvent::PhaseChanged { from, to });
    }

    fn set_mode(&mut self, to: Mode) {
        let from = self.mode;
        if from != to {
            info!("Coordinator mode: {:?} -> {:?}", from, to);
            self.mode = to;
            self.sink.emit(&ControllerEvent::ModeChanged { from, to });
        }
    }

    fn report(&mut self, failure: WriteFailure) {
        warn!("Lamp write failed ({}), continuing", failure);
        self.sink.emit(&ControllerEvent::WriteFailed(failure));
    }

    fn exit(&mut self) -> Flow {
        let phase = self.intersection.phase();
        info!("Coordinator stopped in {:?}", phase);
        self.sink.emit(&ControllerEvent::Stopped(phase));
        Flow::Exit
    }
}
