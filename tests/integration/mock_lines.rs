//! Test doubles shared by the integration suites.
//!
//! `RecordingSink` keeps every controller event behind a shared handle so
//! a test can inspect the history while the coordinator still owns the
//! sink.  `intersection()` wires four heads onto one journalled bank.

use std::cell::RefCell;
use std::rc::Rc;

use trafficlight::adapters::memory::{MemoryBank, MemoryLine};
use trafficlight::app::events::ControllerEvent;
use trafficlight::app::intersection::{Heads, Intersection};
use trafficlight::app::ports::EventSink;
use trafficlight::drivers::signal_head::{Direction, HeadLines, SignalHead};

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct RecordingSink {
    events: Rc<RefCell<Vec<ControllerEvent>>>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ControllerEvent> {
        self.events.borrow().clone()
    }

    pub fn contains(&self, event: &ControllerEvent) -> bool {
        self.events.borrow().contains(event)
    }

    pub fn last(&self) -> Option<ControllerEvent> {
        self.events.borrow().last().copied()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &ControllerEvent) {
        self.events.borrow_mut().push(*event);
    }
}

// ── Intersection on memory lines ──────────────────────────────

/// Lines are allocated N, S, E, W with red/yellow/green each, so line
/// `3 * head + 2` is that head's green lamp.
pub fn intersection() -> (Intersection<MemoryLine>, MemoryBank) {
    let bank = MemoryBank::new();
    let head = |direction| {
        SignalHead::new(
            direction,
            HeadLines {
                red: bank.line(),
                yellow: bank.line(),
                green: bank.line(),
            },
        )
    };
    let heads = Heads {
        north: head(Direction::North),
        south: head(Direction::South),
        east: head(Direction::East),
        west: head(Direction::West),
    };
    (Intersection::new(heads), bank)
}

/// True if, after any single write in the journal, a North/South green
/// and an East/West green were lit together.
#[allow(dead_code)]
pub fn journal_ever_conflicts(bank: &MemoryBank) -> bool {
    let mut levels = [false; 12];
    bank.journal().into_iter().any(|(index, level)| {
        levels[index] = level;
        (levels[2] || levels[5]) && (levels[8] || levels[11])
    })
}
