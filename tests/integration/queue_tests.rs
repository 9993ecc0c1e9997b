//! Engine → result queue integration: filtering, overflow and a live
//! consumer on another thread.

use crate::mock_hw::{MockPins, PARAM, RecordingSink, click, pass_ms};
use bitbutton::fsm::signature::SINGLE_CLICK;
use bitbutton::ports::accept_all;
use bitbutton::{
    Button, Engine, GestureEvent, GestureResult, OverflowPolicy, PinState, ResultQueue,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

#[test]
fn default_filter_keeps_release_out_of_buffer() {
    let queue: ResultQueue<16> = ResultQueue::new(OverflowPolicy::Overwrite);
    let (pins, sink) = (MockPins::new(), RecordingSink::new());
    let mut buttons = [Button::new(1, PinState::High, &PARAM)];
    let mut engine = Engine::builder(&mut buttons)
        .reader(pins.clone())
        .on_result(sink.clone())
        .buffer(&queue)
        .init()
        .unwrap();

    click(&mut engine, &pins, &[1], 100, 400);

    assert_eq!(engine.buffer_capacity(), 15);
    assert_eq!(engine.buffer_used_count(), 2);
    assert_eq!(sink.all().len(), 3, "callback sees release too");

    let buffered: Vec<_> = std::iter::from_fn(|| engine.get_result()).collect();
    assert_eq!(buffered.len(), 2);
    assert_eq!(buffered[0].event, GestureEvent::Press);
    assert_eq!(buffered[1].event, GestureEvent::Finish);
    assert_eq!(buffered[1].key_value, SINGLE_CLICK);
    assert!(engine.is_buffer_empty());
    assert_eq!(engine.peek_result(), None);
}

#[test]
fn custom_filter_selects_what_is_stored() {
    fn finish_only(result: &GestureResult) -> bool {
        result.event == GestureEvent::Finish
    }

    let queue: ResultQueue<8> = ResultQueue::default();
    let pins = MockPins::new();
    let mut buttons = [Button::new(1, PinState::High, &PARAM)];
    let mut engine = Engine::builder(&mut buttons)
        .reader(pins.clone())
        .buffer(&queue)
        .filter(finish_only)
        .init()
        .unwrap();

    click(&mut engine, &pins, &[1], 100, 400);
    assert_eq!(queue.len(), 1);
    assert_eq!(queue.pop().map(|r| r.event), Some(GestureEvent::Finish));
}

#[test]
fn accept_all_filter_stores_release_edges() {
    let queue: ResultQueue<8> = ResultQueue::default();
    let pins = MockPins::new();
    let mut buttons = [Button::new(1, PinState::High, &PARAM)];
    let mut engine = Engine::builder(&mut buttons)
        .reader(pins.clone())
        .buffer(&queue)
        .filter(accept_all)
        .init()
        .unwrap();

    click(&mut engine, &pins, &[1], 100, 400);
    let events: Vec<_> = std::iter::from_fn(|| queue.pop()).map(|r| r.event).collect();
    assert_eq!(
        events,
        [GestureEvent::Press, GestureEvent::Release, GestureEvent::Finish]
    );
}

#[test]
fn reject_policy_keeps_oldest_results() {
    let queue: ResultQueue<3> = ResultQueue::new(OverflowPolicy::Reject);
    let pins = MockPins::new();
    let mut buttons = [Button::new(1, PinState::High, &PARAM)];
    let mut engine = Engine::builder(&mut buttons)
        .reader(pins.clone())
        .buffer(&queue)
        .init()
        .unwrap();

    for _ in 0..3 {
        click(&mut engine, &pins, &[1], 100, 500);
    }

    assert!(engine.is_buffer_full());
    assert_eq!(engine.overwrite_count(), 4);
    let first = engine.get_result().unwrap();
    let second = engine.get_result().unwrap();
    assert_eq!(first.event, GestureEvent::Press);
    assert_eq!(second.event, GestureEvent::Finish);
}

#[test]
fn overwrite_policy_keeps_newest_results() {
    let queue: ResultQueue<3> = ResultQueue::new(OverflowPolicy::Overwrite);
    let pins = MockPins::new();
    let mut buttons = [
        Button::new(1, PinState::High, &PARAM),
        Button::new(2, PinState::High, &PARAM),
    ];
    let mut engine = Engine::builder(&mut buttons)
        .reader(pins.clone())
        .buffer(&queue)
        .init()
        .unwrap();

    click(&mut engine, &pins, &[1], 100, 500);
    click(&mut engine, &pins, &[2], 100, 500);

    assert_eq!(engine.overwrite_count(), 2);
    let kept: Vec<_> = std::iter::from_fn(|| engine.get_result())
        .map(|r| (r.key_id, r.event))
        .collect();
    assert_eq!(kept, [(2, GestureEvent::Press), (2, GestureEvent::Finish)]);
}

#[test]
fn clear_buffer_discards_pending_results() {
    let queue: ResultQueue<8> = ResultQueue::default();
    let pins = MockPins::new();
    let mut buttons = [Button::new(1, PinState::High, &PARAM)];
    let mut engine = Engine::builder(&mut buttons)
        .reader(pins.clone())
        .buffer(&queue)
        .init()
        .unwrap();

    click(&mut engine, &pins, &[1], 100, 400);
    assert!(!engine.is_buffer_empty());
    engine.clear_buffer();
    assert!(engine.is_buffer_empty());
    assert_eq!(engine.buffer_used_count(), 0);

    pass_ms(&mut engine, 100);
    assert_eq!(engine.get_result(), None);
}

#[test]
fn consumer_thread_drains_while_engine_ticks() {
    static QUEUE: ResultQueue<4> = ResultQueue::new(OverflowPolicy::Reject);
    static PRESSED: AtomicBool = AtomicBool::new(false);
    const CLICKS: usize = 10;

    let consumer = thread::spawn(|| {
        let mut finishes = Vec::new();
        while finishes.len() < CLICKS {
            match QUEUE.pop() {
                Some(r) if r.event == GestureEvent::Finish => finishes.push(r),
                Some(_) => {}
                None => thread::yield_now(),
            }
        }
        finishes
    });

    let mut buttons = [Button::new(7, PinState::High, &PARAM)];
    let mut engine = Engine::builder(&mut buttons)
        .reader(|_: &Button<'_>| PinState::from(PRESSED.load(Ordering::Relaxed)))
        .buffer(&QUEUE)
        .init()
        .unwrap();

    let mut sent = 0;
    while sent < CLICKS {
        // wait for room so the reject policy never drops anything
        while QUEUE.len() > 1 {
            thread::yield_now();
        }
        PRESSED.store(true, Ordering::Relaxed);
        pass_ms(&mut engine, 100);
        PRESSED.store(false, Ordering::Relaxed);
        pass_ms(&mut engine, 500);
        sent += 1;
    }

    let finishes = consumer.join().unwrap();
    assert_eq!(finishes.len(), CLICKS);
    assert!(finishes.iter().all(|r| r.key_id == 7 && r.key_value == SINGLE_CLICK));
    assert_eq!(QUEUE.overwrite_count(), 0);
}
