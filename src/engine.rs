//! The gesture engine.
//!
//! [`Engine`] borrows the caller's button and combo slices, reads every
//! input once per [`tick`](Engine::tick), debounces the combined mask and
//! drives the combo dispatcher followed by the unsuppressed single buttons.
//!
//! ```text
//!  PinReader ──▶ mask ──▶ debounce ──▶ ComboDispatcher ──▶ single buttons
//!                                            │                  │
//!                                            └────── report ────┘
//!                                               │          │
//!                                          ResultBuffer  ResultSink
//! ```
//!
//! The engine is built through [`EngineBuilder`]; initialization validates
//! the whole configuration before touching any of it.

use heapless::Vec;
use log::{debug, info, trace, warn};

use crate::combo::{ComboButton, ComboDispatcher, resolve_mask};
use crate::config::{ButtonMask, MAX_BUTTONS, MAX_COMBO_BUTTONS, TimingConfig};
use crate::error::{Error, Result};
use crate::events::GestureResult;
use crate::fsm::Button;
use crate::ports::{
    NoReader, NoSink, PinReader, ResultFilter, ResultSink, default_result_filter,
};
use crate::queue::ResultBuffer;

/// Result buffer shared between the tick context and the consumer.
pub type SharedBuffer<'a> = &'a (dyn ResultBuffer + Sync);

// ───────────────────────────────────────────────────────────────
// Builder
// ───────────────────────────────────────────────────────────────

/// Collects the engine configuration.  Created by [`Engine::builder`].
pub struct EngineBuilder<'a, 'p, R = NoReader, C = NoSink> {
    buttons: &'a mut [Button<'p>],
    combos: &'a mut [ComboButton<'p>],
    reader: Option<R>,
    sink: C,
    buffer: Option<SharedBuffer<'a>>,
    filter: ResultFilter,
    timing: TimingConfig,
}

impl<'a, 'p, R, C> EngineBuilder<'a, 'p, R, C> {
    pub fn combos(mut self, combos: &'a mut [ComboButton<'p>]) -> Self {
        self.combos = combos;
        self
    }

    /// Input capability.  Required.
    pub fn reader<R2: PinReader>(self, reader: R2) -> EngineBuilder<'a, 'p, R2, C> {
        EngineBuilder {
            buttons: self.buttons,
            combos: self.combos,
            reader: Some(reader),
            sink: self.sink,
            buffer: self.buffer,
            filter: self.filter,
            timing: self.timing,
        }
    }

    /// Synchronous result callback.
    pub fn on_result<C2: ResultSink>(self, sink: C2) -> EngineBuilder<'a, 'p, R, C2> {
        EngineBuilder {
            buttons: self.buttons,
            combos: self.combos,
            reader: self.reader,
            sink,
            buffer: self.buffer,
            filter: self.filter,
            timing: self.timing,
        }
    }

    /// Buffer that filtered results are pushed into.
    pub fn buffer(mut self, buffer: SharedBuffer<'a>) -> Self {
        self.buffer = Some(buffer);
        self
    }

    /// Replace [`default_result_filter`].
    pub fn filter(mut self, filter: ResultFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn timing(mut self, timing: TimingConfig) -> Self {
        self.timing = timing;
        self
    }
}

impl<'a, 'p, R: PinReader, C: ResultSink> EngineBuilder<'a, 'p, R, C> {
    /// Validate the configuration and build the engine.
    ///
    /// On error nothing has been modified.  On success every button and
    /// combo starts idle.
    pub fn init(self) -> Result<Engine<'a, 'p, R, C>> {
        let masks = self
            .validate()
            .inspect_err(|e| warn!("button engine init failed: {} ({})", e, e.code()))?;
        let reader = self.reader.ok_or(Error::InvalidArgument)?;

        for (combo, &mask) in self.combos.iter_mut().zip(masks.iter()) {
            combo.set_combo_mask(mask);
            combo.reset();
        }
        for button in self.buttons.iter_mut() {
            button.reset();
        }

        let dispatcher = ComboDispatcher::new(self.combos);
        info!(
            "button engine ready: {} buttons, {} combos",
            self.buttons.len(),
            self.combos.len()
        );

        Ok(Engine {
            buttons: self.buttons,
            combos: self.combos,
            dispatcher,
            reader,
            sink: self.sink,
            buffer: self.buffer,
            filter: self.filter,
            timing: self.timing,
            current_mask: 0,
            last_mask: 0,
            state_entry_time: 0,
            tick: 0,
        })
    }

    /// Every check, in reporting order.  Returns the resolved combo masks.
    fn validate(&self) -> Result<Vec<ButtonMask, MAX_COMBO_BUTTONS>> {
        if self.buttons.is_empty() || self.reader.is_none() {
            return Err(Error::InvalidArgument);
        }
        if self.buttons.len() > MAX_BUTTONS {
            return Err(Error::TooManyButtons);
        }
        if self.combos.len() > MAX_COMBO_BUTTONS {
            return Err(Error::TooManyCombos);
        }
        if self.buttons.iter().any(|b| b.param().is_none()) {
            return Err(Error::ButtonParamMissing);
        }

        let mut masks = Vec::new();
        for combo in self.combos.iter() {
            if combo.button().param().is_none() {
                return Err(Error::ComboParamMissing);
            }
            let mask = resolve_mask(combo.keys(), self.buttons)?;
            masks.push(mask).map_err(|_| Error::TooManyCombos)?;
        }
        Ok(masks)
    }
}

// ───────────────────────────────────────────────────────────────
// Engine
// ───────────────────────────────────────────────────────────────

/// Button gesture engine over caller-owned buttons and combos.
///
/// ```
/// use bitbutton::{Button, ButtonParam, Engine, PinState, ResultQueue};
///
/// static PARAM: ButtonParam = ButtonParam::DEFAULT;
/// static RESULTS: ResultQueue<8> = ResultQueue::new(bitbutton::OverflowPolicy::Overwrite);
///
/// let mut buttons = [Button::new(1, PinState::High, &PARAM)];
/// let mut engine = Engine::builder(&mut buttons)
///     .reader(|_: &Button<'_>| PinState::Low)
///     .buffer(&RESULTS)
///     .init()
///     .unwrap();
///
/// engine.tick();
/// assert_eq!(engine.get_result(), None);
/// ```
pub struct Engine<'a, 'p, R, C = NoSink> {
    buttons: &'a mut [Button<'p>],
    combos: &'a mut [ComboButton<'p>],
    dispatcher: ComboDispatcher,
    reader: R,
    sink: C,
    buffer: Option<SharedBuffer<'a>>,
    filter: ResultFilter,
    timing: TimingConfig,
    /// Mask read on the latest tick.
    current_mask: ButtonMask,
    /// Mask the debounce anchor belongs to.
    last_mask: ButtonMask,
    /// Tick at which the mask last changed.
    state_entry_time: u32,
    tick: u32,
}

impl<'a, 'p> Engine<'a, 'p, NoReader, NoSink> {
    /// Start configuring an engine over `buttons`.
    pub fn builder(buttons: &'a mut [Button<'p>]) -> EngineBuilder<'a, 'p> {
        EngineBuilder {
            buttons,
            combos: Default::default(),
            reader: None,
            sink: NoSink,
            buffer: None,
            filter: default_result_filter,
            timing: TimingConfig::DEFAULT,
        }
    }
}

impl<'a, 'p, R: PinReader, C: ResultSink> Engine<'a, 'p, R, C> {
    /// Advance the engine by one tick interval.
    ///
    /// Call from a single context at [`TimingConfig::tick_interval_ms`].
    pub fn tick(&mut self) {
        let now = self.tick;
        self.tick = self.tick.wrapping_add(1);

        let mut mask: ButtonMask = 0;
        for (i, button) in self.buttons.iter().enumerate() {
            if self.reader.read_level(button) == button.active_level() {
                mask |= 1 << i;
            }
        }
        self.current_mask = mask;

        if mask != self.last_mask {
            debug!("button mask {:#b}", mask);
            self.state_entry_time = now;
            self.last_mask = mask;
        }

        if !self.timing.is_debounced(now.wrapping_sub(self.state_entry_time)) {
            return;
        }

        let Self {
            buttons,
            combos,
            dispatcher,
            sink,
            buffer,
            filter,
            timing,
            tick,
            ..
        } = self;
        let now = *tick;
        let mut out = Reporter {
            buffer: *buffer,
            filter: *filter,
            sink,
        };

        let suppressed = dispatcher.dispatch(
            combos,
            mask,
            now,
            timing,
            &mut |button: &Button<'_>, result: &GestureResult| out.report(button, result),
        );

        for (i, button) in buttons.iter_mut().enumerate() {
            let bit: ButtonMask = 1 << i;
            if suppressed & bit != 0 {
                continue;
            }
            if let Some(result) = button.update(mask & bit != 0, now, timing) {
                out.report(button, &result);
            }
        }
    }

    /// Return every button and combo to idle, dropping in-flight gestures.
    ///
    /// Meant for resume after sleep, when stored tick stamps are stale.
    pub fn reset_states(&mut self) {
        for button in self.buttons.iter_mut() {
            button.reset();
        }
        for combo in self.combos.iter_mut() {
            combo.reset();
        }
    }
}

impl<'a, 'p, R, C> Engine<'a, 'p, R, C> {
    // ── Result polling ────────────────────────────────────────

    /// Take the oldest buffered result.
    pub fn get_result(&self) -> Option<GestureResult> {
        self.buffer.and_then(|b| b.pop())
    }

    /// Copy the oldest buffered result without consuming it.
    pub fn peek_result(&self) -> Option<GestureResult> {
        self.buffer.and_then(|b| b.peek())
    }

    /// Zero without a buffer.
    pub fn buffer_capacity(&self) -> usize {
        self.buffer.map_or(0, |b| b.capacity())
    }

    pub fn buffer_used_count(&self) -> usize {
        self.buffer.map_or(0, |b| b.len())
    }

    pub fn is_buffer_empty(&self) -> bool {
        self.buffer.is_none_or(|b| b.is_empty())
    }

    pub fn is_buffer_full(&self) -> bool {
        self.buffer.is_some_and(|b| b.is_full())
    }

    pub fn overwrite_count(&self) -> usize {
        self.buffer.map_or(0, |b| b.overwrite_count())
    }

    pub fn clear_buffer(&self) {
        if let Some(b) = self.buffer {
            b.clear();
        }
    }

    // ── Introspection ─────────────────────────────────────────

    /// Ticks since initialization.
    pub fn tick_count(&self) -> u32 {
        self.tick
    }

    /// Raw mask read on the latest tick (bit `i` is `buttons()[i]`).
    pub fn current_mask(&self) -> ButtonMask {
        self.current_mask
    }

    pub fn buttons(&self) -> &[Button<'p>] {
        self.buttons
    }

    pub fn combos(&self) -> &[ComboButton<'p>] {
        self.combos
    }

    /// Combo indices in priority order.
    pub fn combo_order(&self) -> &[u8] {
        self.dispatcher.order()
    }

    pub fn timing(&self) -> &TimingConfig {
        &self.timing
    }

    pub fn sink(&self) -> &C {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut C {
        &mut self.sink
    }
}

/// Fans one result out to the buffer and the callback.
struct Reporter<'r, 'a, C> {
    buffer: Option<SharedBuffer<'a>>,
    filter: ResultFilter,
    sink: &'r mut C,
}

impl<C: ResultSink> Reporter<'_, '_, C> {
    fn report(&mut self, button: &Button<'_>, result: &GestureResult) {
        trace!("{}", result);

        if let Some(buffer) = self.buffer {
            if (self.filter)(result) && !buffer.push(result) {
                debug!("result buffer full, dropped {}", result);
            }
        }

        self.sink.on_result(button, result);
    }
}
