//! Coordinator event loop against real embassy timers.
//!
//! Timings are shortened to a few hundred milliseconds; every assertion
//! about "before" or "after" a timer leaves at least 100 ms of slack.

use edge_executor::LocalExecutor;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_time::{Duration, Instant, Timer};
use futures_lite::future;

use trafficlight::adapters::memory::{MemoryBank, MemoryLine};
use trafficlight::app::coordinator::{Coordinator, Mode};
use trafficlight::app::events::ControllerEvent;
use trafficlight::app::intersection::{Axis, Phase};
use trafficlight::config::CycleTiming;
use trafficlight::drivers::debounce::{Debouncer, debounce_task};
use trafficlight::drivers::signal_head::Color;
use trafficlight::shutdown::Shutdown;

use crate::mock_lines::{RecordingSink, intersection, journal_ever_conflicts};

type Queue = Channel<CriticalSectionRawMutex, bool, 8>;

const NS_CLEARING: Phase = Phase::Transitioning {
    clearing: Axis::NorthSouth,
};

fn started(
    green_hold_ms: u64,
    yellow_clearance_ms: u64,
) -> (Coordinator<MemoryLine, RecordingSink>, RecordingSink, MemoryBank) {
    let (intersection, bank) = intersection();
    let sink = RecordingSink::new();
    let timing = CycleTiming {
        green_hold: Duration::from_millis(green_hold_ms),
        yellow_clearance: Duration::from_millis(yellow_clearance_ms),
    };
    let mut coordinator = Coordinator::new(intersection, timing, sink.clone());
    coordinator.start().unwrap();
    (coordinator, sink, bank)
}

#[test]
fn shutdown_in_green_exits_without_waiting_for_timer() {
    let (mut coordinator, sink, _bank) = started(10_000, 2_000);
    let stable = Queue::new();
    let shutdown = Shutdown::new();

    let began = Instant::now();
    let script = async {
        Timer::after_millis(20).await;
        shutdown.request();
    };
    future::block_on(future::zip(coordinator.run(&stable, &shutdown), script));

    assert!(began.elapsed() < Duration::from_secs(2));
    assert_eq!(coordinator.phase(), Phase::NsGreen);
    assert_eq!(
        sink.events(),
        vec![
            ControllerEvent::Started(Phase::NsGreen),
            ControllerEvent::ModeChanged {
                from: Mode::Cycling,
                to: Mode::Draining
            },
            ControllerEvent::Stopped(Phase::NsGreen),
        ]
    );
}

#[test]
fn shutdown_mid_clearance_finishes_step_to_green() {
    let (mut coordinator, sink, bank) = started(100, 200);
    let stable = Queue::new();
    let shutdown = Shutdown::new();

    let began = Instant::now();
    let script = async {
        Timer::after_millis(150).await;
        assert_eq!(sink.last(), Some(ControllerEvent::PhaseChanged {
            from: Phase::NsGreen,
            to: NS_CLEARING,
        }));
        shutdown.request();
    };
    future::block_on(future::zip(coordinator.run(&stable, &shutdown), script));

    // Clearance ends 300 ms after start; the loop must not exit before it.
    assert!(began.elapsed() >= Duration::from_millis(300));
    assert_eq!(coordinator.phase(), Phase::EwGreen);
    assert_eq!(coordinator.intersection().color(Axis::NorthSouth), Color::Red);
    assert_eq!(coordinator.intersection().color(Axis::EastWest), Color::Green);
    assert_eq!(
        sink.events(),
        vec![
            ControllerEvent::Started(Phase::NsGreen),
            ControllerEvent::PhaseChanged {
                from: Phase::NsGreen,
                to: NS_CLEARING
            },
            ControllerEvent::ModeChanged {
                from: Mode::Cycling,
                to: Mode::Draining
            },
            ControllerEvent::PhaseChanged {
                from: NS_CLEARING,
                to: Phase::EwGreen
            },
            ControllerEvent::Stopped(Phase::EwGreen),
        ]
    );
    assert!(!journal_ever_conflicts(&bank));
}

#[test]
fn jittering_button_cannot_hold_off_the_cycle() {
    let (mut coordinator, sink, bank) = started(300, 300);
    let stable = Queue::new();
    let shutdown = Shutdown::new();

    let script = async {
        // A press/release pair every 50 ms for 400 ms.
        for _ in 0..8 {
            let _ = stable.try_send(true);
            Timer::after_millis(25).await;
            let _ = stable.try_send(false);
            Timer::after_millis(25).await;
        }
        assert!(sink.contains(&ControllerEvent::OverrideEngaged));
        assert!(sink.contains(&ControllerEvent::PhaseChanged {
            from: Phase::NsGreen,
            to: NS_CLEARING,
        }));
        assert!(sink.contains(&ControllerEvent::ModeChanged {
            from: Mode::ManualOverridePending,
            to: Mode::Cycling,
        }));
        shutdown.request();
    };
    future::block_on(future::zip(coordinator.run(&stable, &shutdown), script));

    assert_eq!(coordinator.phase(), Phase::EwGreen);
    assert_eq!(sink.last(), Some(ControllerEvent::Stopped(Phase::EwGreen)));
    assert!(!journal_ever_conflicts(&bank));
}

#[test]
fn bouncing_raw_press_reaches_coordinator_as_override() {
    let (mut coordinator, sink, _bank) = started(10_000, 2_000);
    let raw = Queue::new();
    let stable = Queue::new();
    let shutdown = Shutdown::new();

    let executor: LocalExecutor<'_, 4> = LocalExecutor::new();
    executor
        .spawn(debounce_task(
            Debouncer::new(Duration::from_millis(40)),
            &raw,
            &stable,
            &shutdown,
        ))
        .detach();

    let script = async {
        for level in [true, false, true, false, true] {
            raw.try_send(level).unwrap();
            Timer::after_millis(5).await;
        }
        Timer::after_millis(150).await;
        shutdown.request();
    };
    future::block_on(executor.run(future::zip(
        coordinator.run(&stable, &shutdown),
        script,
    )));
    drop(executor);

    assert_eq!(coordinator.mode(), Mode::Draining);
    assert_eq!(coordinator.phase(), Phase::NsGreen);
    assert_eq!(coordinator.intersection().color(Axis::NorthSouth), Color::Yellow);
    assert_eq!(coordinator.intersection().color(Axis::EastWest), Color::Yellow);
    let overrides = sink
        .events()
        .iter()
        .filter(|e| **e == ControllerEvent::OverrideEngaged)
        .count();
    assert_eq!(overrides, 1);
}
