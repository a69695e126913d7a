//! Controller configuration.
//!
//! All tunable parameters and the line map.  Passed into constructors
//! instead of global pin constants.  Defaults can be overridden with an
//! inline JSON object in the `TRAFFICLIGHT_CONFIG` environment variable;
//! omitted fields keep their defaults.

use embassy_time::Duration;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Environment variable holding an inline JSON override.
pub const CONFIG_ENV: &str = "TRAFFICLIGHT_CONFIG";

/// Line numbers of one head.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadPins {
    pub red: u32,
    pub yellow: u32,
    pub green: u32,
}

/// Line numbers for the whole intersection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineMap {
    pub north: HeadPins,
    pub south: HeadPins,
    pub east: HeadPins,
    pub west: HeadPins,
    /// Override button, momentary, external pull-up.
    pub button: u32,
}

impl Default for LineMap {
    fn default() -> Self {
        Self {
            north: HeadPins { red: 2, yellow: 3, green: 4 },
            south: HeadPins { red: 17, yellow: 27, green: 22 },
            east: HeadPins { red: 10, yellow: 9, green: 11 },
            west: HeadPins { red: 5, yellow: 6, green: 13 },
            button: 26,
        }
    }
}

impl LineMap {
    /// Every output line, in head order N, S, E, W and lamp order R, Y, G.
    pub fn outputs(&self) -> [u32; 12] {
        let [n, s, e, w] = [self.north, self.south, self.east, self.west];
        [
            n.red, n.yellow, n.green, s.red, s.yellow, s.green, e.red, e.yellow, e.green, w.red,
            w.yellow, w.green,
        ]
    }
}

/// Cycle timer intervals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleTiming {
    /// How long a pair holds Green.
    pub green_hold: Duration,
    /// How long the Yellow clearance frame lasts.
    pub yellow_clearance: Duration,
}

impl Default for CycleTiming {
    fn default() -> Self {
        ControllerConfig::default().timing()
    }
}

/// Core controller configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    // --- Cycle ---
    /// Green hold per phase (milliseconds)
    pub green_hold_ms: u32,
    /// Yellow clearance between phases (milliseconds)
    pub yellow_clearance_ms: u32,

    // --- Button ---
    /// Quiet window before a button level is trusted (milliseconds)
    pub settle_ms: u32,
    /// Edge sampling interval of the input adapter (milliseconds)
    pub edge_poll_ms: u32,
    /// Button reads low while pressed
    pub button_active_low: bool,

    // --- Hardware ---
    /// sysfs GPIO class directory
    pub gpio_root: String,
    /// Drive in-memory lines instead of GPIO
    pub dry_run: bool,
    pub lines: LineMap,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            // Cycle
            green_hold_ms: 5_000,
            yellow_clearance_ms: 2_000,

            // Button
            settle_ms: 100,
            edge_poll_ms: 1,
            button_active_low: true,

            // Hardware
            gpio_root: "/sys/class/gpio".into(),
            dry_run: false,
            lines: LineMap::default(),
        }
    }
}

impl ControllerConfig {
    /// Defaults, overridden by `TRAFFICLIGHT_CONFIG` when set.
    pub fn from_env() -> Result<Self> {
        match std::env::var(CONFIG_ENV) {
            Ok(json) => Self::from_json(&json),
            Err(_) => Ok(Self::default()),
        }
    }

    /// Parse a (possibly partial) JSON override.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| {
            warn!("{} rejected: {}", CONFIG_ENV, e);
            Error::Config("malformed JSON override")
        })
    }

    /// Reject values the controller cannot run safely with.
    pub fn validate(&self) -> Result<()> {
        if self.green_hold_ms == 0 {
            return Err(Error::Config("green_hold_ms must be non-zero"));
        }
        if self.yellow_clearance_ms == 0 {
            return Err(Error::Config("yellow_clearance_ms must be non-zero"));
        }
        if self.settle_ms == 0 {
            return Err(Error::Config("settle_ms must be non-zero"));
        }
        if self.edge_poll_ms == 0 || self.edge_poll_ms >= self.settle_ms {
            return Err(Error::Config("edge_poll_ms must be in 1..settle_ms"));
        }
        let mut lines = self.lines.outputs().to_vec();
        lines.push(self.lines.button);
        lines.sort_unstable();
        if lines.windows(2).any(|w| w[0] == w[1]) {
            return Err(Error::Config("line numbers must be unique"));
        }
        Ok(())
    }

    pub fn timing(&self) -> CycleTiming {
        CycleTiming {
            green_hold: Duration::from_millis(self.green_hold_ms.into()),
            yellow_clearance: Duration::from_millis(self.yellow_clearance_ms.into()),
        }
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms.into())
    }

    pub fn edge_poll(&self) -> core::time::Duration {
        core::time::Duration::from_millis(self.edge_poll_ms.into())
    }
}
