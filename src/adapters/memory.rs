//! In-memory output lines.
//!
//! Implements [`OutputPin`] without touching hardware.  Every line
//! allocated from one [`MemoryBank`] shares a write journal, so callers
//! can replay the exact order in which lamps changed.  Used by the tests
//! and by the binary's `dry_run` mode.

use std::cell::RefCell;
use std::rc::Rc;

use embedded_hal::digital::{ErrorKind, ErrorType, OutputPin};
use log::trace;

/// Injected write failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryLineError;

impl embedded_hal::digital::Error for MemoryLineError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

#[derive(Default)]
struct BankState {
    levels: Vec<bool>,
    failing: Vec<bool>,
    journal: Vec<(usize, bool)>,
}

/// A group of lines sharing one journal.
#[derive(Clone, Default)]
pub struct MemoryBank {
    inner: Rc<RefCell<BankState>>,
}

impl MemoryBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a new line, initially low.
    pub fn line(&self) -> MemoryLine {
        let mut state = self.inner.borrow_mut();
        state.levels.push(false);
        state.failing.push(false);
        MemoryLine {
            bank: self.clone(),
            index: state.levels.len() - 1,
        }
    }

    /// Current level of every line, by allocation order.
    pub fn levels(&self) -> Vec<bool> {
        self.inner.borrow().levels.clone()
    }

    /// Make every following write to line `index` fail (or succeed again).
    pub fn fail_writes(&self, index: usize, fail: bool) {
        self.inner.borrow_mut().failing[index] = fail;
    }

    /// Every successful write so far as `(line index, level)`.
    pub fn journal(&self) -> Vec<(usize, bool)> {
        self.inner.borrow().journal.clone()
    }
}

/// One in-memory line.  Clones observe and drive the same line.
#[derive(Clone)]
pub struct MemoryLine {
    bank: MemoryBank,
    index: usize,
}

impl MemoryLine {
    /// A line on its own private bank.
    pub fn new() -> Self {
        MemoryBank::new().line()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_on(&self) -> bool {
        self.bank.inner.borrow().levels[self.index]
    }

    /// Make every following write fail (or succeed again).
    pub fn fail_writes(&self, fail: bool) {
        self.bank.fail_writes(self.index, fail);
    }

    fn write(&mut self, level: bool) -> Result<(), MemoryLineError> {
        let mut state = self.bank.inner.borrow_mut();
        if state.failing[self.index] {
            return Err(MemoryLineError);
        }
        trace!("memory line {} -> {}", self.index, level);
        state.levels[self.index] = level;
        state.journal.push((self.index, level));
        Ok(())
    }
}

impl Default for MemoryLine {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorType for MemoryLine {
    type Error = MemoryLineError;
}

impl OutputPin for MemoryLine {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.write(false)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.write(true)
    }
}
