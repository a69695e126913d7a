//! Unified error types for the signal controller.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! start-up path's error handling uniform.  All variants are `Copy` so
//! they can be passed through the coordinator and event sink without
//! allocation.
//!
//! Start-up errors reach the operator and stop the process.  Steady-state
//! [`WriteFailure`]s are logged by the coordinator and the logical state
//! machine proceeds regardless.

use core::fmt;

use embedded_hal::digital::ErrorKind;

use crate::drivers::signal_head::{Direction, Lamp};

// ---------------------------------------------------------------------------
// Top-level controller error
// ---------------------------------------------------------------------------

/// Every fallible start-up operation funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A line could not be exported or configured.
    Setup(SetupError),
    /// A lamp write failed.  Fatal only from `Coordinator::start`.
    Write(WriteFailure),
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Setup(e) => write!(f, "setup: {e}"),
            Self::Write(e) => write!(f, "write: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Setup errors
// ---------------------------------------------------------------------------

/// Which step of line bring-up failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupStage {
    Export,
    Direction,
    EdgeWatch,
}

impl fmt::Display for SetupStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Export => write!(f, "export"),
            Self::Direction => write!(f, "direction"),
            Self::EdgeWatch => write!(f, "edge watch"),
        }
    }
}

/// A line could not be brought up.  Fatal: the control loop never starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetupError {
    pub line: u32,
    pub stage: SetupStage,
    pub kind: std::io::ErrorKind,
}

impl fmt::Display for SetupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {} {} failed ({})", self.line, self.stage, self.kind)
    }
}

impl std::error::Error for SetupError {}

impl From<SetupError> for Error {
    fn from(e: SetupError) -> Self {
        Self::Setup(e)
    }
}

// ---------------------------------------------------------------------------
// Write failures
// ---------------------------------------------------------------------------

/// A single lamp write failed.  The head's logical color was still updated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteFailure {
    pub direction: Direction,
    pub lamp: Lamp,
    pub kind: ErrorKind,
}

impl fmt::Display for WriteFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} {:?} lamp: {}", self.direction, self.lamp, self.kind)
    }
}

impl std::error::Error for WriteFailure {}

impl From<WriteFailure> for Error {
    fn from(e: WriteFailure) -> Self {
        Self::Write(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Controller-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
