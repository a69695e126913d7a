//! Intersection: four heads in two opposing pairs.
//!
//! ```text
//!            N
//!            │
//!    W ──────┼────── E        NS pair: North + South
//!            │                EW pair: East + West
//!            S
//! ```
//!
//! Both heads of a pair are always driven together, so they always show
//! the same color.  The cycle is
//!
//! ```text
//! NsGreen ─▶ Transitioning(NS) ─▶ EwGreen ─▶ Transitioning(EW) ─▶ NsGreen
//! ```
//!
//! where `Transitioning(axis)` shows that axis Yellow and the other Red.
//! On every step the pair losing right of way is written before the pair
//! gaining it, so both pairs are never Green at the same time.

use embedded_hal::digital::OutputPin;
use log::debug;

use crate::drivers::signal_head::{Color, Direction, SignalHead};
use crate::error::WriteFailure;

/// One of the two crossing movements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    NorthSouth,
    EastWest,
}

impl Axis {
    pub const fn other(self) -> Self {
        match self {
            Self::NorthSouth => Self::EastWest,
            Self::EastWest => Self::NorthSouth,
        }
    }
}

/// Which pair currently has right of way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    NsGreen,
    /// `clearing` shows Yellow, the other axis Red.
    Transitioning { clearing: Axis },
    EwGreen,
}

impl Phase {
    pub const fn green(axis: Axis) -> Self {
        match axis {
            Axis::NorthSouth => Self::NsGreen,
            Axis::EastWest => Self::EwGreen,
        }
    }

    pub const fn is_transitioning(self) -> bool {
        matches!(self, Self::Transitioning { .. })
    }
}

/// The four heads, by position.
pub struct Heads<P> {
    pub north: SignalHead<P>,
    pub south: SignalHead<P>,
    pub east: SignalHead<P>,
    pub west: SignalHead<P>,
}

pub struct Intersection<P> {
    heads: Heads<P>,
    phase: Phase,
}

impl<P: OutputPin> Intersection<P> {
    /// Wrap the heads.  The phase is bookkeeping only until
    /// [`enter_ns_green`](Self::enter_ns_green) or
    /// [`enter_ew_green`](Self::enter_ew_green) drives the lamps.
    pub fn new(heads: Heads<P>) -> Self {
        debug_assert_eq!(heads.north.direction(), Direction::North);
        debug_assert_eq!(heads.south.direction(), Direction::South);
        debug_assert_eq!(heads.east.direction(), Direction::East);
        debug_assert_eq!(heads.west.direction(), Direction::West);
        Self {
            heads,
            phase: Phase::NsGreen,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Color shown by the pair on `axis`.
    pub fn color(&self, axis: Axis) -> Color {
        match axis {
            Axis::NorthSouth => self.heads.north.color(),
            Axis::EastWest => self.heads.east.color(),
        }
    }

    pub fn head(&self, direction: Direction) -> &SignalHead<P> {
        match direction {
            Direction::North => &self.heads.north,
            Direction::South => &self.heads.south,
            Direction::East => &self.heads.east,
            Direction::West => &self.heads.west,
        }
    }

    /// Startup/reset only: skips the clearance frame.
    pub fn enter_ns_green(&mut self) -> Result<(), WriteFailure> {
        self.enter_green(Axis::NorthSouth)
    }

    /// Startup/reset only: skips the clearance frame.
    pub fn enter_ew_green(&mut self) -> Result<(), WriteFailure> {
        self.enter_green(Axis::EastWest)
    }

    fn enter_green(&mut self, axis: Axis) -> Result<(), WriteFailure> {
        self.phase = Phase::green(axis);
        let losing = self.set_pair(axis.other(), Color::Red);
        let winning = self.set_pair(axis, Color::Green);
        losing.and(winning)
    }

    /// One step of the automatic cycle.  Supersedes any all-yellow
    /// override still on display.
    pub fn advance_phase(&mut self) -> Result<(), WriteFailure> {
        let from = self.phase;
        let result = match from {
            Phase::NsGreen => self.begin_clearance(Axis::NorthSouth),
            Phase::EwGreen => self.begin_clearance(Axis::EastWest),
            Phase::Transitioning { clearing } => self.complete_clearance(clearing),
        };
        debug!("Phase {:?} -> {:?}", from, self.phase);
        result
    }

    fn begin_clearance(&mut self, clearing: Axis) -> Result<(), WriteFailure> {
        self.phase = Phase::Transitioning { clearing };
        let held = self.set_pair(clearing.other(), Color::Red);
        let cleared = self.set_pair(clearing, Color::Yellow);
        held.and(cleared)
    }

    fn complete_clearance(&mut self, cleared: Axis) -> Result<(), WriteFailure> {
        let gaining = cleared.other();
        self.phase = Phase::green(gaining);
        // The cleared pair was Green before its Yellow frame, the other Red.
        let losing = self.set_pair_opposite(cleared, Color::Green);
        let winning = self.set_pair_opposite(gaining, Color::Red);
        losing.and(winning)
    }

    /// Show Yellow on all four heads without touching the phase, so the
    /// next [`advance_phase`](Self::advance_phase) resumes the cycle.
    pub fn emergency_all_yellow(&mut self) -> Result<(), WriteFailure> {
        let ns = self.set_pair(Axis::NorthSouth, Color::Yellow);
        let ew = self.set_pair(Axis::EastWest, Color::Yellow);
        ns.and(ew)
    }

    /// True if both pairs show Green.  Must never hold.
    pub fn is_conflicting(&self) -> bool {
        self.color(Axis::NorthSouth) == Color::Green && self.color(Axis::EastWest) == Color::Green
    }

    fn pair_mut(&mut self, axis: Axis) -> [&mut SignalHead<P>; 2] {
        match axis {
            Axis::NorthSouth => [&mut self.heads.north, &mut self.heads.south],
            Axis::EastWest => [&mut self.heads.east, &mut self.heads.west],
        }
    }

    fn set_pair(&mut self, axis: Axis, color: Color) -> Result<(), WriteFailure> {
        let [a, b] = self.pair_mut(axis);
        let first = a.set_color(color);
        let second = b.set_color(color);
        first.and(second)
    }

    fn set_pair_opposite(&mut self, axis: Axis, was: Color) -> Result<(), WriteFailure> {
        let [a, b] = self.pair_mut(axis);
        let first = a.set_to_opposite(was);
        let second = b.set_to_opposite(was);
        first.and(second)
    }
}
