//! Bit-signature button gesture engine.
//!
//! Recognises clicks, multi-clicks, long presses with periodic repeat and
//! multi-button chords on any number of debounced inputs.  Every gesture
//! is encoded as a bit pattern (see [`fsm::signature`]) and reported as a
//! [`GestureResult`] through a lock-free [`ResultQueue`] and/or a
//! synchronous callback.
//!
//! No heap and no global state: buttons, combos and the queue are owned
//! by the caller and borrowed by the [`Engine`].  The crate is `no_std`
//! outside of its own unit tests.

#![cfg_attr(not(test), no_std)]
#![deny(unused_must_use)]

pub mod combo;
pub mod config;
pub mod engine;
pub mod events;
pub mod fsm;
pub mod ports;
pub mod queue;
pub mod shared;

mod error;

pub use combo::{ComboButton, ComboDispatcher};
pub use config::{ButtonMask, ButtonParam, TimingConfig};
pub use embedded_hal::digital::PinState;
pub use engine::{Engine, EngineBuilder};
pub use error::{Error, OK, Result, status_code};
pub use events::{GestureEvent, GestureResult};
pub use fsm::{Button, ButtonState};
pub use ports::{InputPinReader, NoSink, PinReader, ResultFilter, ResultSink};
pub use queue::{OverflowPolicy, ResultBuffer, ResultQueue};
pub use shared::SharedEngine;
