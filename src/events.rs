//! Gesture results.
//!
//! A [`GestureResult`] is produced by a button state machine on the tick
//! that observes a sub-event, then copied by value into the result buffer
//! and handed to the result callback.
//!
//! ```text
//! ┌──────────────┐  GestureResult  ┌──────────────┐     ┌──────────────┐
//! │ Button FSMs  │───────────────▶│ ResultQueue  │────▶│  Consumer    │
//! │ (tick ctx)   │───┐            │ (lock-free)  │     │  (app ctx)   │
//! └──────────────┘   │            └──────────────┘     └──────────────┘
//!                    └──────────▶ ResultSink (synchronous callback)
//! ```

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::fsm::signature::{self, StateBits};

/// Sub-event reported by a state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum GestureEvent {
    /// Debounced press edge.
    Press = 1,
    /// Long-press start, or a repeat while the long press is held.
    LongPress = 2,
    /// Release edge.
    Release = 3,
    /// The post-release window closed; `key_value` is final.
    Finish = 5,
}

impl GestureEvent {
    /// Decode a raw discriminant.
    pub const fn from_u8(raw: u8) -> Option<Self> {
        match raw {
            1 => Some(Self::Press),
            2 => Some(Self::LongPress),
            3 => Some(Self::Release),
            5 => Some(Self::Finish),
            _ => None,
        }
    }
}

/// One reported gesture sub-event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GestureResult {
    pub event: GestureEvent,
    pub key_id: u16,
    /// Long-press repeat count; zero outside of [`GestureEvent::LongPress`].
    pub long_press_period_trigger_cnt: u16,
    /// Signature accumulated so far (final on [`GestureEvent::Finish`]).
    pub key_value: StateBits,
}

impl GestureResult {
    pub const fn new(event: GestureEvent, key_id: u16, key_value: StateBits) -> Self {
        Self {
            event,
            key_id,
            long_press_period_trigger_cnt: 0,
            key_value,
        }
    }

    /// True if the low `width` bits of the key value equal `target`.
    pub const fn matches(&self, target: StateBits, width: u32) -> bool {
        signature::matches_low_bits(self.key_value, target, width)
    }

    /// Click count of a finished pure multi-click gesture.
    pub const fn click_count(&self) -> Option<u8> {
        match self.event {
            GestureEvent::Finish => signature::click_count(self.key_value),
            _ => None,
        }
    }
}

impl fmt::Display for GestureResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "key {} {:?} repeats={} kv={:#b}",
            self.key_id, self.event, self.long_press_period_trigger_cnt, self.key_value
        )
    }
}
