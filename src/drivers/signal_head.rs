//! Signal head driver: one direction's red/yellow/green lamp trio.
//!
//! The transition table below is the only path that writes lamps:
//!
//! | From  | To     | red | yellow | green |
//! |-------|--------|-----|--------|-------|
//! | any   | Red    | on  | off    | off   |
//! | Red   | Yellow | on  | on     | off   |
//! | other | Yellow | off | on     | off   |
//! | any   | Green  | off | off    | on    |
//!
//! Leaving Red for Yellow keeps Red lit for one more frame (the
//! red+yellow pre-green frame of a real fixture).  Lines are generic
//! over [`embedded_hal::digital::OutputPin`].

use embedded_hal::digital::{Error as _, OutputPin, PinState};

use crate::error::WriteFailure;

/// Lamp color shown by a head.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Red,
    Yellow,
    Green,
}

/// Which approach a head faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

/// One physical lamp of a head.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lamp {
    Red,
    Yellow,
    Green,
}

/// Lamp levels for one head.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lamps {
    pub red: bool,
    pub yellow: bool,
    pub green: bool,
}

impl Lamps {
    /// Row of the transition table for `target`, keyed on whether the
    /// head was Red before the call.
    pub const fn for_transition(previous: Color, target: Color) -> Self {
        match target {
            Color::Red => Self { red: true, yellow: false, green: false },
            Color::Yellow => Self {
                red: matches!(previous, Color::Red),
                yellow: true,
                green: false,
            },
            Color::Green => Self { red: false, yellow: false, green: true },
        }
    }
}

/// The three output lines of one head.
pub struct HeadLines<P> {
    pub red: P,
    pub yellow: P,
    pub green: P,
}

pub struct SignalHead<P> {
    direction: Direction,
    lines: HeadLines<P>,
    color: Color,
    lamps: Lamps,
}

impl<P: OutputPin> SignalHead<P> {
    /// Bind a head to its lines.  Nothing is written until the first
    /// [`set_color`](Self::set_color); the head is assumed Red (dark
    /// lines are driven low at export time).
    pub fn new(direction: Direction, lines: HeadLines<P>) -> Self {
        Self {
            direction,
            lines,
            color: Color::Red,
            lamps: Lamps { red: false, yellow: false, green: false },
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Most recently requested color.
    pub fn color(&self) -> Color {
        self.color
    }

    /// Lamp levels last commanded through the table.
    pub fn lamps(&self) -> Lamps {
        self.lamps
    }

    /// Apply one row of the transition table.
    ///
    /// Every lamp is written even if an earlier write fails, and the
    /// logical color is updated regardless.  Returns the first failure.
    pub fn set_color(&mut self, target: Color) -> Result<(), WriteFailure> {
        let lamps = Lamps::for_transition(self.color, target);
        self.color = target;
        self.lamps = lamps;

        // Lamps going dark are written before the lamp coming on.
        let mut order = [
            (Lamp::Red, lamps.red),
            (Lamp::Yellow, lamps.yellow),
            (Lamp::Green, lamps.green),
        ];
        order.sort_by_key(|&(_, on)| on);

        let mut first_failure = None;
        for (lamp, on) in order {
            if let Err(failure) = self.write(lamp, on) {
                first_failure.get_or_insert(failure);
            }
        }
        first_failure.map_or(Ok(()), Err)
    }

    /// Flip to the opposite of the color the other phase was showing.
    /// Yellow is never stored as a previous phase, so it is a no-op.
    pub fn set_to_opposite(&mut self, other_phase_was: Color) -> Result<(), WriteFailure> {
        match other_phase_was {
            Color::Green => self.set_color(Color::Red),
            Color::Red => self.set_color(Color::Green),
            Color::Yellow => Ok(()),
        }
    }

    fn write(&mut self, lamp: Lamp, on: bool) -> Result<(), WriteFailure> {
        let line = match lamp {
            Lamp::Red => &mut self.lines.red,
            Lamp::Yellow => &mut self.lines.yellow,
            Lamp::Green => &mut self.lines.green,
        };
        line.set_state(PinState::from(on)).map_err(|e| WriteFailure {
            direction: self.direction,
            lamp,
            kind: e.kind(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryLine;

    fn head() -> (SignalHead<MemoryLine>, [MemoryLine; 3]) {
        let (r, y, g) = (MemoryLine::new(), MemoryLine::new(), MemoryLine::new());
        let observers = [r.clone(), y.clone(), g.clone()];
        let head = SignalHead::new(
            Direction::North,
            HeadLines { red: r, yellow: y, green: g },
        );
        (head, observers)
    }

    fn levels(lines: &[MemoryLine; 3]) -> (bool, bool, bool) {
        (lines[0].is_on(), lines[1].is_on(), lines[2].is_on())
    }

    #[test]
    fn table_is_total_over_all_pairs() {
        let colors = [Color::Red, Color::Yellow, Color::Green];
        for from in colors {
            for to in colors {
                let (mut head, lines) = head();
                head.set_color(from).unwrap();
                head.set_color(to).unwrap();
                assert_eq!(head.color(), to);
                let expected = Lamps::for_transition(from, to);
                assert_eq!(levels(&lines), (expected.red, expected.yellow, expected.green));
            }
        }
    }

    #[test]
    fn red_to_yellow_keeps_red_lit() {
        let (mut head, lines) = head();
        head.set_color(Color::Red).unwrap();
        head.set_color(Color::Yellow).unwrap();
        assert_eq!(levels(&lines), (true, true, false));
    }

    #[test]
    fn green_to_yellow_is_yellow_only() {
        let (mut head, lines) = head();
        head.set_color(Color::Green).unwrap();
        head.set_color(Color::Yellow).unwrap();
        assert_eq!(levels(&lines), (false, true, false));
    }

    #[test]
    fn green_forces_red_and_yellow_off_from_any_origin() {
        let (mut head, lines) = head();
        head.set_color(Color::Red).unwrap();
        head.set_color(Color::Yellow).unwrap();
        head.set_color(Color::Green).unwrap();
        assert_eq!(levels(&lines), (false, false, true));
    }

    #[test]
    fn set_to_opposite_flips_red_and_green() {
        let (mut head, _lines) = head();
        head.set_to_opposite(Color::Green).unwrap();
        assert_eq!(head.color(), Color::Red);
        head.set_to_opposite(Color::Red).unwrap();
        assert_eq!(head.color(), Color::Green);
        head.set_to_opposite(Color::Yellow).unwrap();
        assert_eq!(head.color(), Color::Green);
    }

    #[test]
    fn failed_write_still_updates_color_and_other_lamps() {
        let (mut head, lines) = head();
        lines[1].fail_writes(true);
        let err = head.set_color(Color::Green).unwrap_err();
        assert_eq!(err.lamp, Lamp::Yellow);
        assert_eq!(err.direction, Direction::North);
        assert_eq!(head.color(), Color::Green);
        assert!(lines[2].is_on());
        assert!(!lines[0].is_on());
    }
}
