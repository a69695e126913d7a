//! Linux sysfs GPIO adapter.
//!
//! | Type          | Implements              | sysfs files                     |
//! |---------------|-------------------------|---------------------------------|
//! | `SysfsOutput` | `OutputPin`             | `gpioN/direction`, `gpioN/value`|
//! | `SysfsInput`  | `InputPin`, `EdgeInput` | `gpioN/direction`, `gpioN/value`|
//!
//! Lines are exported on construction and unexported on drop.  Outputs
//! are configured with direction `low` so lamps start dark.  Edges are
//! detected by a sampling thread that reads `value` every poll interval
//! and hands each level change to the registered callback.

use core::fmt::Write as _;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

use embedded_hal::digital::{ErrorKind, ErrorType, InputPin, OutputPin};
use log::{debug, info, warn};

use crate::app::ports::{EdgeCallback, EdgeInput};
use crate::error::{SetupError, SetupStage};

/// udev may take a moment to fix permissions on a freshly exported line.
const DIRECTION_RETRIES: u32 = 20;
const DIRECTION_RETRY_DELAY: Duration = Duration::from_millis(50);

/// A sysfs read or write failed during steady-state operation.
///
/// embedded-hal has no kind for I/O causes, so [`kind`](embedded_hal::digital::Error::kind)
/// reports `Other`; the io kind is kept here and logged where it occurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SysfsLineError(pub io::ErrorKind);

impl embedded_hal::digital::Error for SysfsLineError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// Factory for lines under one sysfs GPIO class directory.
pub struct SysfsGpio {
    root: PathBuf,
}

impl SysfsGpio {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Export `line` as an output driven low.
    pub fn output(&self, line: u32) -> Result<SysfsOutput, SetupError> {
        let exported = Exported::export(&self.root, line, "low")?;
        Ok(SysfsOutput { exported })
    }

    /// Export `line` as an input sampled every `poll` for edges.
    pub fn input(&self, line: u32, poll: Duration) -> Result<SysfsInput, SetupError> {
        let exported = Exported::export(&self.root, line, "in")?;
        Ok(SysfsInput {
            exported,
            poll,
            watcher: None,
        })
    }
}

// ── Exported line (shared by both directions) ────────────────

struct Exported {
    root: PathBuf,
    line: u32,
    value: PathBuf,
}

impl Exported {
    fn export(root: &Path, line: u32, direction: &str) -> Result<Self, SetupError> {
        let dir = root.join(line_dir(line).as_str());
        let fail = |stage, e: io::Error| SetupError {
            line,
            stage,
            kind: e.kind(),
        };

        let reused = dir.is_dir();
        if reused {
            debug!("GPIO {} already exported, reusing", line);
        } else {
            std::fs::write(root.join("export"), line.to_string())
                .map_err(|e| fail(SetupStage::Export, e))?;
        }

        let direction_path = dir.join("direction");
        let mut attempt = 0;
        loop {
            match std::fs::write(&direction_path, direction) {
                Ok(()) => break,
                Err(e)
                    if attempt < DIRECTION_RETRIES
                        && matches!(
                            e.kind(),
                            io::ErrorKind::PermissionDenied | io::ErrorKind::NotFound
                        ) =>
                {
                    attempt += 1;
                    std::thread::sleep(DIRECTION_RETRY_DELAY);
                }
                Err(e) => {
                    // Release a line we exported ourselves; a reused one
                    // belongs to whoever exported it.
                    if !reused {
                        unexport(root, line);
                    }
                    return Err(fail(SetupStage::Direction, e));
                }
            }
        }

        info!("GPIO {} exported ({})", line, direction);
        Ok(Self {
            root: root.to_path_buf(),
            line,
            value: dir.join("value"),
        })
    }

    fn read(&self) -> io::Result<bool> {
        read_level(&self.value)
    }

    fn write(&self, level: bool) -> Result<(), SysfsLineError> {
        std::fs::write(&self.value, if level { "1" } else { "0" }).map_err(|e| {
            warn!("GPIO {} write failed: {}", self.line, e);
            SysfsLineError(e.kind())
        })
    }
}

impl Drop for Exported {
    fn drop(&mut self) {
        unexport(&self.root, self.line);
    }
}

fn unexport(root: &Path, line: u32) {
    if let Err(e) = std::fs::write(root.join("unexport"), line.to_string()) {
        warn!("GPIO {} unexport failed: {}", line, e);
    } else {
        debug!("GPIO {} unexported", line);
    }
}

fn line_dir(line: u32) -> heapless::String<16> {
    let mut s = heapless::String::new();
    // u32::MAX is 10 digits; "gpio" + 10 always fits.
    let _ = write!(s, "gpio{}", line);
    s
}

fn read_level(path: &Path) -> io::Result<bool> {
    let raw = std::fs::read(path)?;
    Ok(raw.first() == Some(&b'1'))
}

// ── Output ───────────────────────────────────────────────────

pub struct SysfsOutput {
    exported: Exported,
}

impl SysfsOutput {
    pub fn line(&self) -> u32 {
        self.exported.line
    }
}

impl ErrorType for SysfsOutput {
    type Error = SysfsLineError;
}

impl OutputPin for SysfsOutput {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.exported.write(false)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.exported.write(true)
    }
}

// ── Input ────────────────────────────────────────────────────

struct Watcher {
    stop: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

pub struct SysfsInput {
    exported: Exported,
    poll: Duration,
    watcher: Option<Watcher>,
}

impl SysfsInput {
    pub fn line(&self) -> u32 {
        self.exported.line
    }

    fn stop_watcher(&mut self) {
        if let Some(watcher) = self.watcher.take() {
            watcher.stop.store(true, Ordering::Release);
            if watcher.handle.join().is_err() {
                warn!("GPIO {} edge watcher panicked", self.exported.line);
            }
        }
    }
}

impl ErrorType for SysfsInput {
    type Error = SysfsLineError;
}

impl InputPin for SysfsInput {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        self.exported.read().map_err(|e| SysfsLineError(e.kind()))
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.is_high().map(|high| !high)
    }
}

impl EdgeInput for SysfsInput {
    fn on_edge(&mut self, mut callback: EdgeCallback) -> Result<(), SetupError> {
        self.stop_watcher();

        let line = self.exported.line;
        let value = self.exported.value.clone();
        let poll = self.poll;
        let mut last = read_level(&value).map_err(|e| SetupError {
            line,
            stage: SetupStage::EdgeWatch,
            kind: e.kind(),
        })?;

        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);
        let handle = std::thread::Builder::new()
            .name(format!("gpio{line}-edges"))
            .spawn(move || {
                let mut failing = false;
                while !stop_flag.load(Ordering::Acquire) {
                    match read_level(&value) {
                        Ok(level) => {
                            failing = false;
                            if level != last {
                                last = level;
                                callback(level);
                            }
                        }
                        Err(e) if !failing => {
                            failing = true;
                            warn!("GPIO {} read failed: {}", line, e);
                        }
                        Err(_) => {}
                    }
                    std::thread::sleep(poll);
                }
            })
            .map_err(|e| SetupError {
                line,
                stage: SetupStage::EdgeWatch,
                kind: e.kind(),
            })?;

        info!("GPIO {} edge watch started ({} ms poll)", line, poll.as_millis());
        self.watcher = Some(Watcher { stop, handle });
        Ok(())
    }
}

impl Drop for SysfsInput {
    fn drop(&mut self) {
        self.stop_watcher();
    }
}
