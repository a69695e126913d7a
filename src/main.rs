//! Trafficlight: Main Entry Point
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  SysfsOutput ×12   SysfsInput (button)   LogEventSink          │
//! │  (OutputPin)       (EdgeInput)           (EventSink)           │
//! │  MemoryLine ×12 in dry-run mode                                │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  edge thread ─▶ RAW_EDGES ─▶ debounce task ─▶ STABLE_EVENTS    │
//! │                                                   │            │
//! │  signal thread ─▶ SHUTDOWN ─▶ Coordinator ◀───────┘            │
//! │                                 │                              │
//! │                            Intersection (4 × SignalHead)       │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::{Context, Result};
use edge_executor::LocalExecutor;
use embedded_hal::digital::OutputPin;
use log::{info, warn};
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::iterator::Signals;

use trafficlight::adapters::log_sink::LogEventSink;
use trafficlight::adapters::memory::MemoryBank;
use trafficlight::adapters::sysfs_gpio::SysfsGpio;
use trafficlight::app::coordinator::Coordinator;
use trafficlight::app::intersection::{Heads, Intersection};
use trafficlight::app::ports::EdgeInput;
use trafficlight::channels::{RAW_EDGES, SHUTDOWN, STABLE_EVENTS};
use trafficlight::config::{ControllerConfig, HeadPins, LineMap};
use trafficlight::drivers::debounce::{Debouncer, debounce_task};
use trafficlight::drivers::signal_head::{Direction, HeadLines, SignalHead};
use trafficlight::error::SetupError;

fn main() -> Result<()> {
    // ── 1. Logging ────────────────────────────────────────────
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    info!("trafficlight v{}", env!("CARGO_PKG_VERSION"));

    // ── 2. Configuration ──────────────────────────────────────
    let config = ControllerConfig::from_env()?;
    config.validate()?;
    info!("Config: {}", serde_json::to_string(&config)?);

    // ── 3. Shutdown delivery ──────────────────────────────────
    install_signal_handler()?;

    // ── 4. Lines + control loop ───────────────────────────────
    if config.dry_run {
        warn!("Dry run: driving in-memory lines, button disabled");
        let bank = MemoryBank::new();
        let heads = build_heads(&config.lines, |_| Ok(bank.line()))?;
        run_controller(heads, &config)?;
    } else {
        let gpio = SysfsGpio::new(&config.gpio_root);
        let heads = build_heads(&config.lines, |line| gpio.output(line))
            .context("signal head setup")?;

        let mut button = gpio
            .input(config.lines.button, config.edge_poll())
            .context("button setup")?;
        let active_low = config.button_active_low;
        button
            .on_edge(Box::new(move |level| {
                let pressed = level != active_low;
                if RAW_EDGES.try_send(pressed).is_err() {
                    warn!("Raw edge queue full, dropping pressed={}", pressed);
                }
            }))
            .context("button edge watch")?;

        run_controller(heads, &config)?;
        // Stops the edge watcher and unexports the button line.
        drop(button);
    }

    info!("Goodbye!");
    Ok(())
}

/// First SIGINT/SIGTERM requests a graceful drain; a second one exits.
fn install_signal_handler() -> Result<()> {
    let mut signals = Signals::new([SIGINT, SIGTERM]).context("registering signal handlers")?;
    std::thread::Builder::new()
        .name("signals".into())
        .spawn(move || {
            for (count, signal) in signals.forever().enumerate() {
                if count == 0 {
                    info!("Signal {} received, shutting down", signal);
                    SHUTDOWN.request();
                } else {
                    warn!("Signal {} received again, exiting now", signal);
                    std::process::exit(1);
                }
            }
        })
        .context("spawning signal thread")?;
    Ok(())
}

fn build_heads<P>(
    lines: &LineMap,
    mut make: impl FnMut(u32) -> core::result::Result<P, SetupError>,
) -> core::result::Result<Heads<P>, SetupError> {
    let mut head = |direction, pins: HeadPins| -> core::result::Result<SignalHead<P>, SetupError> {
        let lines = HeadLines {
            red: make(pins.red)?,
            yellow: make(pins.yellow)?,
            green: make(pins.green)?,
        };
        Ok(SignalHead::new(direction, lines))
    };
    Ok(Heads {
        north: head(Direction::North, lines.north)?,
        south: head(Direction::South, lines.south)?,
        east: head(Direction::East, lines.east)?,
        west: head(Direction::West, lines.west)?,
    })
}

fn run_controller<P: OutputPin>(heads: Heads<P>, config: &ControllerConfig) -> Result<()> {
    let mut coordinator = Coordinator::new(
        Intersection::new(heads),
        config.timing(),
        LogEventSink::new(),
    );
    coordinator.start().context("initial lamp state")?;

    let executor: LocalExecutor<'_, 4> = LocalExecutor::new();
    executor
        .spawn(debounce_task(
            Debouncer::new(config.settle()),
            &RAW_EDGES,
            &STABLE_EVENTS,
            &SHUTDOWN,
        ))
        .detach();

    info!("Controller ready. Entering event loop.");
    futures_lite::future::block_on(executor.run(coordinator.run(&STABLE_EVENTS, &SHUTDOWN)));

    // Drops the debounce task along with any armed settle timer.
    drop(executor);
    Ok(())
}
