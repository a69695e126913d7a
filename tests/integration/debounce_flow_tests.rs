//! Debounce task against real embassy timers.
//!
//! Each test races a scripted sequence of raw levels against
//! `debounce_task`; the task never returns, so the script's completion
//! ends the test and the stable channel is inspected afterwards.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_time::{Duration, Timer};
use futures_lite::future;

use trafficlight::drivers::debounce::{Debouncer, debounce_task};
use trafficlight::shutdown::Shutdown;

type Queue = Channel<CriticalSectionRawMutex, bool, 16>;

const SETTLE: Duration = Duration::from_millis(40);

fn drain(queue: &Queue) -> Vec<bool> {
    let mut out = Vec::new();
    while let Ok(value) = queue.try_receive() {
        out.push(value);
    }
    out
}

/// Run `script` alongside a fresh debounce task and return what it emitted.
fn run_script<F, Fut>(script: F) -> Vec<bool>
where
    F: FnOnce(&'static Queue, &'static Shutdown) -> Fut,
    Fut: core::future::Future<Output = ()>,
{
    // Leaked so the task and the script can share them without lifetimes
    // leaking into every test body.
    let raw: &'static Queue = Box::leak(Box::new(Channel::new()));
    let stable: &'static Queue = Box::leak(Box::new(Channel::new()));
    let shutdown: &'static Shutdown = Box::leak(Box::new(Shutdown::new()));

    let task = debounce_task(Debouncer::new(SETTLE), raw, stable, shutdown);
    future::block_on(future::or(script(raw, shutdown), task));
    drain(stable)
}

async fn bounce(raw: &Queue, levels: &[bool]) {
    for &level in levels {
        raw.try_send(level).unwrap();
        Timer::after_millis(5).await;
    }
}

#[test]
fn bouncing_press_emits_single_stable_press() {
    let emitted = run_script(|raw, _| async move {
        bounce(raw, &[true, false, true, false, true]).await;
        Timer::after_millis(150).await;
    });
    assert_eq!(emitted, vec![true]);
}

#[test]
fn press_then_release_emits_both_levels() {
    let emitted = run_script(|raw, _| async move {
        bounce(raw, &[true]).await;
        Timer::after_millis(120).await;
        bounce(raw, &[false, true, false]).await;
        Timer::after_millis(120).await;
    });
    assert_eq!(emitted, vec![true, false]);
}

#[test]
fn dip_back_to_stable_level_is_reported_again() {
    let emitted = run_script(|raw, _| async move {
        bounce(raw, &[true]).await;
        Timer::after_millis(120).await;
        // Brief dip that returns to the stable level inside one window.
        bounce(raw, &[false, true]).await;
        Timer::after_millis(120).await;
    });
    assert_eq!(emitted, vec![true, true]);
}

#[test]
fn repeat_of_stable_level_without_window_is_dropped() {
    let emitted = run_script(|raw, _| async move {
        bounce(raw, &[true]).await;
        Timer::after_millis(120).await;
        bounce(raw, &[true]).await;
        Timer::after_millis(120).await;
    });
    assert_eq!(emitted, vec![true]);
}

#[test]
fn shutdown_cancels_pending_window() {
    let emitted = run_script(|raw, shutdown| async move {
        bounce(raw, &[true]).await;
        shutdown.request();
        Timer::after_millis(120).await;
        // Late edges after shutdown are swallowed too.
        bounce(raw, &[false]).await;
        Timer::after_millis(120).await;
    });
    assert!(emitted.is_empty());
}
