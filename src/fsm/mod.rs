//! Per-button gesture state machine.
//!
//! ```text
//!            pressed                 held > long_press_start
//!   ┌──────┐ ───────▶ ┌─────────┐ ─────────────────────────▶ ┌───────────┐
//!   │ Idle │          │ Pressed │                            │ LongPress │◀─┐ held > period
//!   └──────┘          └─────────┘                            └───────────┘──┘ (repeat)
//!      ▲  ▲                │ released                              │ released
//!      │  │                ▼                                       │
//!      │  │           ┌─────────┐ ◀────────────────────────────────┘
//!      │  │           │ Release │  (one tick: append 0, report release)
//!      │  │ pressed   └─────────┘
//!      │  │                │
//!      │  │                ▼
//!      │  │      ┌───────────────┐ idle > time_window ┌────────┐
//!      │  └──────│ ReleaseWindow │ ─────────────────▶ │ Finish │ (one tick: report,
//!      │         └───────────────┘                    └────────┘  clear signature)
//!      └──────────────────────────────────────────────────┘
//! ```
//!
//! The machine is cyclic: `Finish` always returns to `Idle` with a cleared
//! signature.  A re-press inside the release window goes back to `Idle`
//! *without* clearing, so the next press extends the same signature.
//!
//! Elapsed time is measured in ticks since the state was entered and
//! converted with [`TimingConfig::elapsed_ms`]; every threshold compare is
//! strictly greater-than.

pub mod signature;

use embedded_hal::digital::PinState;
use log::trace;

use crate::config::{ButtonParam, TimingConfig};
use crate::events::{GestureEvent, GestureResult};
use signature::{LONG_PRESS_START, StateBits};

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum ButtonState {
    #[default]
    Idle = 0,
    Pressed = 1,
    LongPress = 2,
    Release = 3,
    ReleaseWindow = 4,
    Finish = 5,
}

// ---------------------------------------------------------------------------
// Button
// ---------------------------------------------------------------------------

/// One physical button (or the virtual button embedded in a combo).
///
/// Created by the caller at configuration time, mutated only by the tick
/// context, and returned to all-zero state by [`Button::reset`].
#[derive(Debug, Clone)]
pub struct Button<'p> {
    key_id: u16,
    active_level: PinState,
    current_state: ButtonState,
    last_state: ButtonState,
    /// Tick count at which `current_state` was entered.
    state_entry_time: u32,
    state_bits: StateBits,
    long_press_period_trigger_cnt: u16,
    param: Option<&'p ButtonParam>,
}

impl<'p> Button<'p> {
    pub const fn new(key_id: u16, active_level: PinState, param: &'p ButtonParam) -> Self {
        Self::with_param(key_id, active_level, Some(param))
    }

    /// Like [`Button::new`] but allows a missing parameter set.  Such a
    /// button is rejected by engine initialization and never transitions.
    pub const fn with_param(
        key_id: u16,
        active_level: PinState,
        param: Option<&'p ButtonParam>,
    ) -> Self {
        Self {
            key_id,
            active_level,
            current_state: ButtonState::Idle,
            last_state: ButtonState::Idle,
            state_entry_time: 0,
            state_bits: 0,
            long_press_period_trigger_cnt: 0,
            param,
        }
    }

    pub fn key_id(&self) -> u16 {
        self.key_id
    }

    /// Pin level that counts as pressed.
    pub fn active_level(&self) -> PinState {
        self.active_level
    }

    pub fn state(&self) -> ButtonState {
        self.current_state
    }

    /// State observed at the end of the previous update.
    pub fn last_state(&self) -> ButtonState {
        self.last_state
    }

    pub fn state_entry_time(&self) -> u32 {
        self.state_entry_time
    }

    /// Signature accumulated so far in the current gesture.
    pub fn state_bits(&self) -> StateBits {
        self.state_bits
    }

    pub fn long_press_period_trigger_cnt(&self) -> u16 {
        self.long_press_period_trigger_cnt
    }

    pub fn param(&self) -> Option<&'p ButtonParam> {
        self.param
    }

    /// Drop any in-flight gesture and return to `Idle`.
    pub fn reset(&mut self) {
        self.current_state = ButtonState::Idle;
        self.last_state = ButtonState::Idle;
        self.state_entry_time = 0;
        self.state_bits = 0;
        self.long_press_period_trigger_cnt = 0;
    }

    /// Advance the machine by one tick.
    ///
    /// `pressed` is this tick's debounced input, `now` the engine tick
    /// count.  Returns the sub-event observed on this tick, if any.
    pub fn update(
        &mut self,
        pressed: bool,
        now: u32,
        timing: &TimingConfig,
    ) -> Option<GestureResult> {
        let param = self.param?;
        let elapsed_ms = timing.elapsed_ms(now.wrapping_sub(self.state_entry_time));
        let mut report = None;

        match self.current_state {
            ButtonState::Idle => {
                if pressed {
                    self.push_bit(true);
                    self.enter(ButtonState::Pressed, now);
                    report = Some(self.result(GestureEvent::Press));
                }
            }

            ButtonState::Pressed => {
                if elapsed_ms > u32::from(param.long_press_start_time_ms) {
                    self.push_bit(true);
                    self.enter(ButtonState::LongPress, now);
                    self.long_press_period_trigger_cnt = 0;
                    report = Some(self.result(GestureEvent::LongPress));
                } else if !pressed {
                    self.current_state = ButtonState::Release;
                }
            }

            ButtonState::LongPress => {
                if !pressed {
                    self.long_press_period_trigger_cnt = 0;
                    self.current_state = ButtonState::Release;
                } else if elapsed_ms > u32::from(param.long_press_period_trigger_ms) {
                    self.state_entry_time = now;
                    self.long_press_period_trigger_cnt =
                        self.long_press_period_trigger_cnt.saturating_add(1);

                    // Grow the signature once (0b011 -> 0b0111); later repeats
                    // only bump the counter.
                    if signature::matches_low_bits(self.state_bits, LONG_PRESS_START, 3) {
                        self.push_bit(true);
                    }

                    let mut result = self.result(GestureEvent::LongPress);
                    result.long_press_period_trigger_cnt = self.long_press_period_trigger_cnt;
                    report = Some(result);
                }
            }

            ButtonState::Release => {
                self.push_bit(false);
                report = Some(self.result(GestureEvent::Release));
                self.enter(ButtonState::ReleaseWindow, now);
            }

            ButtonState::ReleaseWindow => {
                if pressed {
                    self.enter(ButtonState::Idle, now);
                } else if elapsed_ms > u32::from(param.time_window_time_ms) {
                    self.current_state = ButtonState::Finish;
                }
            }

            ButtonState::Finish => {
                report = Some(self.result(GestureEvent::Finish));
                self.state_bits = 0;
                self.current_state = ButtonState::Idle;
            }
        }

        if self.last_state != self.current_state {
            trace!(
                "key {}: {:?} -> {:?}",
                self.key_id, self.last_state, self.current_state
            );
            self.last_state = self.current_state;
        }

        report
    }

    // ── Internal ──────────────────────────────────────────────────

    fn enter(&mut self, state: ButtonState, now: u32) {
        self.current_state = state;
        self.state_entry_time = now;
    }

    fn push_bit(&mut self, bit: bool) {
        self.state_bits = signature::append_bit(self.state_bits, bit);
    }

    fn result(&self, event: GestureEvent) -> GestureResult {
        GestureResult::new(event, self.key_id, self.state_bits)
    }
}
