//! Combo (chord) buttons and their dispatcher.
//!
//! A combo is a virtual button that is pressed while every one of its
//! member buttons is active.  It owns an ordinary [`Button`] state machine,
//! so combos produce the same gesture signatures as single buttons.
//!
//! ## Suppression
//!
//! A suppressing combo *claims* its members' mask bits while it is pressed
//! and for as long as its own gesture is in flight (non-zero signature).
//! Claimed bits are skipped by single-button processing for that tick.
//!
//! ## Priority
//!
//! Combos are visited in descending member count, ties in configuration
//! order, so a 3-key chord commits its claim before an overlapping 2-key
//! chord is evaluated.  Satisfaction only looks at the current mask:
//! overlapping chords that are all held are all pressed, and the claimed
//! mask is the union of their members.

use core::cmp::Reverse;

use embedded_hal::digital::PinState;
use heapless::Vec;
use log::trace;

use crate::config::{ButtonMask, ButtonParam, MAX_COMBO_BUTTONS, TimingConfig};
use crate::error::{Error, Result};
use crate::events::GestureResult;
use crate::fsm::Button;

/// A chord of single buttons acting as one virtual button.
#[derive(Debug, Clone)]
pub struct ComboButton<'p> {
    suppress: bool,
    key_single_ids: &'p [u16],
    combo_mask: ButtonMask,
    button: Button<'p>,
}

impl<'p> ComboButton<'p> {
    /// `keys` are the member key ids; `suppress` makes the combo claim its
    /// members away from single-button processing.
    pub const fn new(
        key_id: u16,
        keys: &'p [u16],
        param: &'p ButtonParam,
        suppress: bool,
    ) -> Self {
        Self::with_param(key_id, keys, Some(param), suppress)
    }

    pub const fn with_param(
        key_id: u16,
        keys: &'p [u16],
        param: Option<&'p ButtonParam>,
        suppress: bool,
    ) -> Self {
        Self {
            suppress,
            key_single_ids: keys,
            combo_mask: 0,
            // The embedded machine is fed a derived boolean, never a pin.
            button: Button::with_param(key_id, PinState::High, param),
        }
    }

    pub fn key_id(&self) -> u16 {
        self.button.key_id()
    }

    pub fn keys(&self) -> &'p [u16] {
        self.key_single_ids
    }

    pub fn member_count(&self) -> usize {
        self.key_single_ids.len()
    }

    pub fn suppress(&self) -> bool {
        self.suppress
    }

    /// Member bits over button-slice positions; zero until initialized.
    pub fn combo_mask(&self) -> ButtonMask {
        self.combo_mask
    }

    pub fn button(&self) -> &Button<'p> {
        &self.button
    }

    pub(crate) fn set_combo_mask(&mut self, mask: ButtonMask) {
        self.combo_mask = mask;
    }

    pub(crate) fn reset(&mut self) {
        self.button.reset();
    }
}

/// Position of `key_id` in the button slice.
pub(crate) fn button_index(buttons: &[Button<'_>], key_id: u16) -> Option<usize> {
    buttons.iter().position(|b| b.key_id() == key_id)
}

/// Resolve member ids into a mask over button positions.
pub(crate) fn resolve_mask(keys: &[u16], buttons: &[Button<'_>]) -> Result<ButtonMask> {
    if keys.is_empty() {
        return Err(Error::ComboKeysInvalid);
    }
    keys.iter().try_fold(0, |mask, &id| {
        let idx = button_index(buttons, id).ok_or(Error::InvalidComboId)?;
        Ok(mask | (1 << idx))
    })
}

/// Advances combos in priority order and computes the suppression mask.
#[derive(Debug, Clone, Default)]
pub struct ComboDispatcher {
    order: Vec<u8, MAX_COMBO_BUTTONS>,
}

impl ComboDispatcher {
    /// Compute the visiting order once.  Combos beyond
    /// [`MAX_COMBO_BUTTONS`] are ignored; initialization rejects them.
    pub fn new(combos: &[ComboButton<'_>]) -> Self {
        let mut order: Vec<u8, MAX_COMBO_BUTTONS> =
            (0..combos.len().min(MAX_COMBO_BUTTONS) as u8).collect();
        // Index in the key keeps the unstable sort deterministic and
        // insertion-order preserving for equal member counts.
        order.sort_unstable_by_key(|&i| (Reverse(combos[usize::from(i)].member_count()), i));
        Self { order }
    }

    /// Combo indices in visiting order.
    pub fn order(&self) -> &[u8] {
        &self.order
    }

    /// Advance every combo for this tick.
    ///
    /// `report` receives each result together with the combo's button.
    /// Returns the mask of single-button bits claimed by suppressing combos.
    pub fn dispatch<F>(
        &self,
        combos: &mut [ComboButton<'_>],
        current_mask: ButtonMask,
        now: u32,
        timing: &TimingConfig,
        report: &mut F,
    ) -> ButtonMask
    where
        F: FnMut(&Button<'_>, &GestureResult),
    {
        let mut claimed: ButtonMask = 0;

        for &idx in &self.order {
            let Some(combo) = combos.get_mut(usize::from(idx)) else {
                continue;
            };
            let mask = combo.combo_mask;
            let pressed = mask != 0 && current_mask & mask == mask;

            if let Some(result) = combo.button.update(pressed, now, timing) {
                report(&combo.button, &result);
            }

            if combo.suppress && (pressed || combo.button.state_bits() != 0) {
                if claimed & mask != mask {
                    trace!("combo {} claims {:#b}", combo.key_id(), mask);
                }
                claimed |= mask;
            }
        }

        claimed
    }
}
