//! Chord (combo button) recognition and suppression.

use crate::mock_hw::{MockPins, PARAM, RecordingSink, click, pass_ms};
use bitbutton::fsm::signature::{LONG_PRESS_START, SINGLE_CLICK};
use bitbutton::{Button, ComboButton, Engine, GestureEvent, PinState};

fn three_buttons() -> [Button<'static>; 3] {
    [
        Button::new(1, PinState::High, &PARAM),
        Button::new(2, PinState::High, &PARAM),
        Button::new(3, PinState::High, &PARAM),
    ]
}

fn engine<'a>(
    buttons: &'a mut [Button<'static>],
    combos: &'a mut [ComboButton<'static>],
    pins: &MockPins,
    sink: &RecordingSink,
) -> Engine<'a, 'static, MockPins, RecordingSink> {
    Engine::builder(buttons)
        .combos(combos)
        .reader(pins.clone())
        .on_result(sink.clone())
        .init()
        .expect("valid configuration")
}

#[test]
fn three_way_chord_reports_only_the_combo() {
    let (pins, sink) = (MockPins::new(), RecordingSink::new());
    let mut buttons = three_buttons();
    let mut combos = [ComboButton::new(100, &[1, 2, 3], &PARAM, true)];
    let mut engine = engine(&mut buttons, &mut combos, &pins, &sink);

    click(&mut engine, &pins, &[1, 2, 3], 200, 500);

    let finishes = sink.finishes(100);
    assert_eq!(finishes.len(), 1, "got {:?}", sink.all());
    assert_eq!(finishes[0].key_value, SINGLE_CLICK);
    for key in [1, 2, 3] {
        assert!(sink.for_key(key).is_empty(), "key {key} leaked: {:?}", sink.all());
    }
    assert_eq!(engine.combos()[0].combo_mask(), 0b111);
}

#[test]
fn overlapping_combos_both_finish_and_silence_members() {
    let (pins, sink) = (MockPins::new(), RecordingSink::new());
    let mut buttons = three_buttons();
    let mut combos = [
        ComboButton::new(200, &[1, 2], &PARAM, true),
        ComboButton::new(100, &[1, 2, 3], &PARAM, true),
    ];
    let mut engine = engine(&mut buttons, &mut combos, &pins, &sink);
    assert_eq!(engine.combo_order(), &[1, 0]);

    click(&mut engine, &pins, &[1, 2, 3], 200, 500);

    for key in [100, 200] {
        let finishes = sink.finishes(key);
        assert_eq!(finishes.len(), 1, "key {key}: {:?}", sink.all());
        assert_eq!(finishes[0].key_value, SINGLE_CLICK);
    }
    for key in [1, 2, 3] {
        assert!(sink.for_key(key).is_empty(), "key {key} leaked: {:?}", sink.all());
    }
}

#[test]
fn third_key_joining_does_not_release_subset_combo() {
    let (pins, sink) = (MockPins::new(), RecordingSink::new());
    let mut buttons = three_buttons();
    let mut combos = [
        ComboButton::new(200, &[1, 2], &PARAM, true),
        ComboButton::new(100, &[1, 2, 3], &PARAM, true),
    ];
    let mut engine = engine(&mut buttons, &mut combos, &pins, &sink);

    pins.press(&[1, 2]);
    pass_ms(&mut engine, 100);
    pins.press(&[3]);
    pass_ms(&mut engine, 100);

    assert_eq!(sink.events(200, GestureEvent::Press).len(), 1);
    assert!(sink.events(200, GestureEvent::Release).is_empty());
    assert_eq!(sink.events(100, GestureEvent::Press).len(), 1);

    pins.release_all();
    pass_ms(&mut engine, 500);
    assert_eq!(sink.finishes(200)[0].key_value, SINGLE_CLICK);
    assert_eq!(sink.finishes(100)[0].key_value, SINGLE_CLICK);
    for key in [1, 2, 3] {
        assert!(sink.for_key(key).is_empty(), "key {key} leaked: {:?}", sink.all());
    }
}

#[test]
fn smaller_combo_fires_when_larger_is_incomplete() {
    let (pins, sink) = (MockPins::new(), RecordingSink::new());
    let mut buttons = three_buttons();
    let mut combos = [
        ComboButton::new(200, &[1, 2], &PARAM, true),
        ComboButton::new(100, &[1, 2, 3], &PARAM, true),
    ];
    let mut engine = engine(&mut buttons, &mut combos, &pins, &sink);

    click(&mut engine, &pins, &[1, 2], 200, 500);

    assert_eq!(sink.finishes(200)[0].key_value, SINGLE_CLICK);
    assert!(sink.for_key(100).is_empty());
    assert!(sink.for_key(1).is_empty());
    assert!(sink.for_key(2).is_empty());
}

#[test]
fn non_suppressing_combo_lets_members_report() {
    let (pins, sink) = (MockPins::new(), RecordingSink::new());
    let mut buttons = three_buttons();
    let mut combos = [ComboButton::new(300, &[1, 2], &PARAM, false)];
    let mut engine = engine(&mut buttons, &mut combos, &pins, &sink);

    click(&mut engine, &pins, &[1, 2], 200, 500);

    for key in [300, 1, 2] {
        let finishes = sink.finishes(key);
        assert_eq!(finishes.len(), 1, "key {key}: {:?}", sink.all());
        assert_eq!(finishes[0].key_value, SINGLE_CLICK);
    }
}

#[test]
fn partial_chord_falls_through_to_single_button() {
    let (pins, sink) = (MockPins::new(), RecordingSink::new());
    let mut buttons = three_buttons();
    let mut combos = [ComboButton::new(10, &[1, 2], &PARAM, true)];
    let mut engine = engine(&mut buttons, &mut combos, &pins, &sink);

    click(&mut engine, &pins, &[1], 100, 500);

    assert_eq!(sink.finishes(1)[0].key_value, SINGLE_CLICK);
    assert!(sink.for_key(10).is_empty());
}

#[test]
fn staggered_presses_inside_debounce_still_form_chord() {
    let (pins, sink) = (MockPins::new(), RecordingSink::new());
    let mut buttons = three_buttons();
    let mut combos = [ComboButton::new(10, &[1, 2], &PARAM, true)];
    let mut engine = engine(&mut buttons, &mut combos, &pins, &sink);

    pins.press(&[1]);
    pass_ms(&mut engine, 20);
    pins.press(&[2]);
    pass_ms(&mut engine, 200);
    pins.release(&[2]);
    pass_ms(&mut engine, 20);
    pins.release(&[1]);
    pass_ms(&mut engine, 500);

    assert_eq!(sink.finishes(10).len(), 1, "got {:?}", sink.all());
    assert!(sink.for_key(1).is_empty());
    assert!(sink.for_key(2).is_empty());
}

#[test]
fn held_chord_reports_long_press() {
    let (pins, sink) = (MockPins::new(), RecordingSink::new());
    let mut buttons = three_buttons();
    let mut combos = [ComboButton::new(10, &[2, 3], &PARAM, true)];
    let mut engine = engine(&mut buttons, &mut combos, &pins, &sink);

    click(&mut engine, &pins, &[2, 3], 1500, 500);

    let long = sink.events(10, GestureEvent::LongPress);
    assert_eq!(long.len(), 1);
    assert_eq!(long[0].key_value, LONG_PRESS_START);
    assert!(sink.for_key(2).is_empty());
    assert!(sink.for_key(3).is_empty());
}

#[test]
fn reset_clears_combo_machines_too() {
    let (pins, sink) = (MockPins::new(), RecordingSink::new());
    let mut buttons = three_buttons();
    let mut combos = [ComboButton::new(10, &[1, 2], &PARAM, true)];
    let mut engine = engine(&mut buttons, &mut combos, &pins, &sink);

    pins.press(&[1, 2]);
    pass_ms(&mut engine, 200);
    assert_ne!(engine.combos()[0].button().state_bits(), 0);

    engine.reset_states();
    assert_eq!(engine.combos()[0].button().state_bits(), 0);
    assert_eq!(engine.combos()[0].combo_mask(), 0b011);
}
