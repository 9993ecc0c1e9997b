//! Initialization error taxonomy.
//!
//! Only [`Engine`](crate::engine::Engine) initialization can fail with an
//! error.  Ticking and queue operations degrade softly instead (a skipped
//! button, a `false`/`None` return), so everything fallible funnels into
//! this one enum.  All variants are `Copy` and carry the numeric status
//! code used by C-style callers through [`Error::code`].

use core::fmt;

// ---------------------------------------------------------------------------
// Initialization errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A combo lists a member id that no single button carries.
    InvalidComboId,
    /// The button slice is empty or no pin reader was supplied.
    InvalidArgument,
    /// More combos than [`MAX_COMBO_BUTTONS`](crate::config::MAX_COMBO_BUTTONS).
    TooManyCombos,
    /// More buttons than bits in [`ButtonMask`](crate::config::ButtonMask).
    TooManyButtons,
    /// A single button has no [`ButtonParam`](crate::config::ButtonParam).
    ButtonParamMissing,
    /// A combo button has no [`ButtonParam`](crate::config::ButtonParam).
    ComboParamMissing,
    /// A combo has an empty member list.
    ComboKeysInvalid,
}

impl Error {
    /// Signed status code: always negative, `0` is reserved for success.
    pub const fn code(self) -> i32 {
        match self {
            Self::InvalidComboId => -1,
            Self::InvalidArgument => -2,
            Self::TooManyCombos => -3,
            Self::TooManyButtons => -5,
            Self::ButtonParamMissing => -6,
            Self::ComboParamMissing => -7,
            Self::ComboKeysInvalid => -8,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidComboId => write!(f, "combo references an unknown button id"),
            Self::InvalidArgument => write!(f, "no buttons or no pin reader supplied"),
            Self::TooManyCombos => write!(f, "too many combo buttons"),
            Self::TooManyButtons => write!(f, "too many buttons for the mask width"),
            Self::ButtonParamMissing => write!(f, "button has no parameters"),
            Self::ComboParamMissing => write!(f, "combo button has no parameters"),
            Self::ComboKeysInvalid => write!(f, "combo button has no member keys"),
        }
    }
}

impl core::error::Error for Error {}

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;

/// Status code reported for a successful initialization.
pub const OK: i32 = 0;

/// Collapse an init result into the signed status code convention.
pub fn status_code<T>(result: &Result<T>) -> i32 {
    match result {
        Ok(_) => OK,
        Err(e) => e.code(),
    }
}
