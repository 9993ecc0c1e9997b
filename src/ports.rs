//! Port traits: the boundary between the gesture engine and the outside world.
//!
//! ```text
//!   pins ──▶ PinReader ──▶ Engine ──▶ ResultBuffer (polled)
//!                                └──▶ ResultSink   (synchronous)
//! ```
//!
//! The engine consumes these via generics, so it never touches hardware
//! directly.  Closures implement both traits, which keeps tests and small
//! applications free of adapter boilerplate.

use embedded_hal::digital::{InputPin, PinState};

use crate::events::{GestureEvent, GestureResult};
use crate::fsm::Button;

// ───────────────────────────────────────────────────────────────
// Pin reader (hardware → engine)
// ───────────────────────────────────────────────────────────────

/// Reads the raw level of one button's input.
///
/// Called once per button per tick, so it must be fast and free of side
/// effects.  A button is active when the returned level equals its
/// [`Button::active_level`].
pub trait PinReader {
    fn read_level(&mut self, button: &Button<'_>) -> PinState;
}

impl<F> PinReader for F
where
    F: FnMut(&Button<'_>) -> PinState,
{
    fn read_level(&mut self, button: &Button<'_>) -> PinState {
        self(button)
    }
}

/// Placeholder for a builder that has not been given a reader yet.
///
/// Initialization without a real reader fails, so this never reads.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoReader;

impl PinReader for NoReader {
    fn read_level(&mut self, button: &Button<'_>) -> PinState {
        !button.active_level()
    }
}

/// [`PinReader`] over `embedded-hal` input pins, keyed by button id.
///
/// Ids without a pin, and pins that fail to read, report the button's
/// inactive level.
pub struct InputPinReader<'a, P> {
    pins: &'a mut [(u16, P)],
}

impl<'a, P: InputPin> InputPinReader<'a, P> {
    pub fn new(pins: &'a mut [(u16, P)]) -> Self {
        Self { pins }
    }
}

impl<P: InputPin> PinReader for InputPinReader<'_, P> {
    fn read_level(&mut self, button: &Button<'_>) -> PinState {
        let inactive = !button.active_level();
        self.pins
            .iter_mut()
            .find(|(id, _)| *id == button.key_id())
            .and_then(|(_, pin)| pin.is_high().ok())
            .map_or(inactive, PinState::from)
    }
}

// ───────────────────────────────────────────────────────────────
// Result sink (engine → application)
// ───────────────────────────────────────────────────────────────

/// Synchronous result callback, invoked from inside `tick()`.
///
/// Receives every result regardless of the buffer filter.  Must not block.
pub trait ResultSink {
    fn on_result(&mut self, button: &Button<'_>, result: &GestureResult);
}

impl<F> ResultSink for F
where
    F: FnMut(&Button<'_>, &GestureResult),
{
    fn on_result(&mut self, button: &Button<'_>, result: &GestureResult) {
        self(button, result)
    }
}

/// No callback installed.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSink;

impl ResultSink for NoSink {
    fn on_result(&mut self, _button: &Button<'_>, _result: &GestureResult) {}
}

// ───────────────────────────────────────────────────────────────
// Buffer filter
// ───────────────────────────────────────────────────────────────

/// Decides which results are stored in the result buffer.
pub type ResultFilter = fn(&GestureResult) -> bool;

/// Stores everything except intermediate release edges.
pub fn default_result_filter(result: &GestureResult) -> bool {
    result.event != GestureEvent::Release
}

/// Stores every result.
pub fn accept_all(_result: &GestureResult) -> bool {
    true
}
