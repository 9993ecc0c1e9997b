//! Fuzz target: `Engine::tick`
//!
//! Interprets the input as a stream of (pin mask, tick count) pairs and
//! drives four buttons plus two overlapping combos through it.  The engine
//! must never panic, and every reported result must name a configured key.
//!
//! cargo fuzz run fuzz_engine_ticks

#![no_main]

use std::cell::Cell;

use bitbutton::{
    Button, ButtonParam, ComboButton, Engine, GestureResult, OverflowPolicy, PinState,
    ResultQueue,
};
use libfuzzer_sys::fuzz_target;

static PARAM: ButtonParam = ButtonParam::DEFAULT;
static SHORT: ButtonParam = ButtonParam::new(50, 100, 20, 0);

const KEYS: [u16; 6] = [1, 2, 3, 4, 10, 11];

fuzz_target!(|data: &[u8]| {
    let queue: ResultQueue<8> = ResultQueue::new(OverflowPolicy::Overwrite);
    let pins = Cell::new(0u8);

    let mut buttons = [
        Button::new(1, PinState::High, &PARAM),
        Button::new(2, PinState::Low, &SHORT),
        Button::new(3, PinState::High, &PARAM),
        Button::new(4, PinState::High, &SHORT),
    ];
    let mut combos = [
        ComboButton::new(10, &[1, 2], &PARAM, true),
        ComboButton::new(11, &[1, 2, 3], &SHORT, data.first().is_some_and(|b| b & 1 == 1)),
    ];

    let mut engine = Engine::builder(&mut buttons)
        .combos(&mut combos)
        .reader(|b: &Button<'_>| PinState::from(pins.get() & (1 << (b.key_id() - 1)) != 0))
        .on_result(|_: &Button<'_>, r: &GestureResult| {
            assert!(KEYS.contains(&r.key_id), "unknown key {}", r.key_id);
        })
        .buffer(&queue)
        .init()
        .expect("fixed configuration is valid");

    for pair in data.chunks_exact(2) {
        pins.set(pair[0] & 0x0f);
        for _ in 0..pair[1] {
            engine.tick();
        }
        assert!(engine.buffer_used_count() <= engine.buffer_capacity());
    }

    while let Some(r) = engine.get_result() {
        assert!(KEYS.contains(&r.key_id));
    }
});
