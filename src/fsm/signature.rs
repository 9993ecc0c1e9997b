//! Gesture signatures.
//!
//! Every discrete sub-event of a gesture shifts one bit into an integer:
//! `1` for a press or long-press edge, `0` for a release.  The integer
//! accumulated between leaving idle and the close of the post-release
//! window is the gesture's *key value*:
//!
//! | Gesture                       | Key value    |
//! |-------------------------------|--------------|
//! | single click                  | `0b010`      |
//! | double click                  | `0b01010`    |
//! | long-press start              | `0b011`      |
//! | long-press hold (repeating)   | `0b0111`     |
//! | long-press hold, released     | `0b01110`    |
//! | click then long press         | `0b01011`    |
//! | double click then long press  | `0b0101011`  |
//!
//! Classification is a constant-time mask compare: "do the low `n` bits
//! equal `target`".

pub type StateBits = u32;

pub const NONE_PRESS: StateBits = 0;
pub const SINGLE_CLICK: StateBits = 0b010;
pub const DOUBLE_CLICK: StateBits = 0b01010;
pub const SINGLE_CLICK_THEN_LONG_PRESS: StateBits = 0b01011;
pub const DOUBLE_CLICK_THEN_LONG_PRESS: StateBits = 0b0101011;
pub const LONG_PRESS_START: StateBits = 0b011;
pub const LONG_PRESS_HOLD: StateBits = 0b0111;
pub const LONG_PRESS_HOLD_END: StateBits = 0b01110;

/// Shift one sub-event bit into the signature.
#[inline]
pub const fn append_bit(bits: StateBits, bit: bool) -> StateBits {
    (bits << 1) | bit as StateBits
}

/// True if the low `width` bits of `bits` equal `target`.
#[inline]
pub const fn matches_low_bits(bits: StateBits, target: StateBits, width: u32) -> bool {
    let mask = match (1 as StateBits).checked_shl(width) {
        Some(v) => v.wrapping_sub(1),
        None => StateBits::MAX,
    };
    bits & mask == target
}

/// Number of clicks in a pure multi-click signature (`10` repeated N
/// times), or `None` for anything else.
pub const fn click_count(bits: StateBits) -> Option<u8> {
    if bits == NONE_PRESS {
        return None;
    }
    let mut rest = bits;
    let mut count = 0u8;
    while rest != 0 {
        if rest & 0b11 != 0b10 {
            return None;
        }
        count += 1;
        rest >>= 2;
    }
    Some(count)
}
