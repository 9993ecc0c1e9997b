//! Gesture timing parameters and engine limits.
//!
//! [`ButtonParam`] is shared read-only by any number of buttons and combos;
//! [`TimingConfig`] holds the two engine-wide constants (tick cadence and
//! mask debounce).  All durations are milliseconds.

use serde::{Deserialize, Serialize};

/// Nominal interval between two `tick()` calls.
pub const TICK_INTERVAL_MS: u16 = 5;
/// Minimum stable time of the raw button mask before it is dispatched.
pub const DEBOUNCE_TIME_MS: u16 = 40;

pub const SHORT_PRESS_TIME_MS: u16 = 350;
pub const LONG_PRESS_START_TIME_MS: u16 = 1000;
pub const LONG_PRESS_PERIOD_TRIGGER_MS: u16 = 1000;
pub const TIME_WINDOW_TIME_MS: u16 = 300;

/// One bit per single button, indexed by position in the button slice.
pub type ButtonMask = u32;

/// Maximum number of single buttons (bit width of [`ButtonMask`]).
pub const MAX_BUTTONS: usize = ButtonMask::BITS as usize;

/// Maximum number of combo buttons.
pub const MAX_COMBO_BUTTONS: usize = 8;

/// Per-button gesture thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonParam {
    /// Short-press threshold.  Informational: the state machine does not
    /// branch on it, classification happens on the key value.
    pub short_press_time_ms: u16,
    /// Hold time after which a press becomes a long press.
    pub long_press_start_time_ms: u16,
    /// Repeat period while a long press is held.
    pub long_press_period_trigger_ms: u16,
    /// Post-release window in which another press continues the sequence.
    /// Zero disables multi-click aggregation.
    pub time_window_time_ms: u16,
}

impl ButtonParam {
    pub const DEFAULT: Self = Self::new(
        SHORT_PRESS_TIME_MS,
        LONG_PRESS_START_TIME_MS,
        LONG_PRESS_PERIOD_TRIGGER_MS,
        TIME_WINDOW_TIME_MS,
    );

    pub const fn new(
        short_press_time_ms: u16,
        long_press_start_time_ms: u16,
        long_press_period_trigger_ms: u16,
        time_window_time_ms: u16,
    ) -> Self {
        Self {
            short_press_time_ms,
            long_press_start_time_ms,
            long_press_period_trigger_ms,
            time_window_time_ms,
        }
    }

    /// Same thresholds with a different long-press repeat period.
    pub const fn with_long_press_period(mut self, period_ms: u16) -> Self {
        self.long_press_period_trigger_ms = period_ms;
        self
    }

    /// Same thresholds with a different post-release window.
    pub const fn with_time_window(mut self, window_ms: u16) -> Self {
        self.time_window_time_ms = window_ms;
        self
    }
}

impl Default for ButtonParam {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Engine-wide timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Interval at which the caller invokes `tick()`.
    pub tick_interval_ms: u16,
    /// Mask-level debounce threshold.
    pub debounce_time_ms: u16,
}

impl TimingConfig {
    pub const DEFAULT: Self = Self {
        tick_interval_ms: TICK_INTERVAL_MS,
        debounce_time_ms: DEBOUNCE_TIME_MS,
    };

    /// Convert a tick count into milliseconds.
    ///
    /// Saturates, so an arbitrarily long stay in one state never wraps
    /// around into a short one.
    pub fn elapsed_ms(&self, ticks: u32) -> u32 {
        ticks.saturating_mul(u32::from(self.tick_interval_ms))
    }

    /// True once `ticks` of stability satisfy the debounce threshold.
    pub fn is_debounced(&self, ticks: u32) -> bool {
        self.elapsed_ms(ticks) >= u32::from(self.debounce_time_ms)
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
