//! Cross-context engine wrapper.
//!
//! `tick()` normally runs from a timer interrupt while `reset_states()`
//! is called from the application after a resume.  [`SharedEngine`] puts
//! the engine behind a critical-section mutex so both contexts can hold a
//! shared reference (typically to a `static`).
//!
//! The result queue is not part of this: consumers keep draining it
//! lock-free through their own reference.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use log::warn;

use crate::engine::Engine;
use crate::ports::{NoSink, PinReader, ResultSink};

pub struct SharedEngine<'a, 'p, R, C = NoSink> {
    inner: Mutex<CriticalSectionRawMutex, RefCell<Engine<'a, 'p, R, C>>>,
}

impl<'a, 'p, R: PinReader, C: ResultSink> SharedEngine<'a, 'p, R, C> {
    pub const fn new(engine: Engine<'a, 'p, R, C>) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(engine)),
        }
    }

    pub fn tick(&self) {
        self.with(|engine| engine.tick());
    }

    pub fn reset_states(&self) {
        self.with(|engine| engine.reset_states());
    }

    /// Run `f` on the engine inside a critical section.
    ///
    /// Returns `None` when re-entered from inside another `with` (for
    /// example from the result callback).
    pub fn with<T>(&self, f: impl FnOnce(&mut Engine<'a, 'p, R, C>) -> T) -> Option<T> {
        self.inner.lock(|cell| match cell.try_borrow_mut() {
            Ok(mut engine) => Some(f(&mut engine)),
            Err(_) => {
                warn!("shared button engine re-entered, call skipped");
                None
            }
        })
    }

    pub fn into_inner(self) -> Engine<'a, 'p, R, C> {
        self.inner.into_inner().into_inner()
    }
}
