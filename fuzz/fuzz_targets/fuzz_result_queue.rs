//! Fuzz target: `ResultQueue`
//!
//! Replays arbitrary push/pop/peek/clear sequences against a small queue
//! in both overflow modes and checks it against a `VecDeque` model.
//!
//! cargo fuzz run fuzz_result_queue

#![no_main]

use std::collections::VecDeque;

use bitbutton::{GestureEvent, GestureResult, OverflowPolicy, ResultQueue};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some((&mode, ops)) = data.split_first() else {
        return;
    };
    let policy = if mode & 1 == 0 {
        OverflowPolicy::Overwrite
    } else {
        OverflowPolicy::Reject
    };
    let q: ResultQueue<5> = ResultQueue::new(policy);
    let mut model: VecDeque<u16> = VecDeque::new();

    for (i, &op) in ops.iter().enumerate() {
        match op % 4 {
            0 | 1 => {
                let id = i as u16;
                let accepted = q.push(&GestureResult::new(GestureEvent::Finish, id, u32::from(op)));
                if model.len() == q.capacity() {
                    if policy == OverflowPolicy::Overwrite {
                        model.pop_front();
                        model.push_back(id);
                    }
                    assert_eq!(accepted, policy == OverflowPolicy::Overwrite);
                } else {
                    assert!(accepted);
                    model.push_back(id);
                }
            }
            2 => assert_eq!(q.pop().map(|r| r.key_id), model.pop_front()),
            _ => {
                if op == 0xff {
                    q.clear();
                    model.clear();
                } else {
                    assert_eq!(q.peek().map(|r| r.key_id), model.front().copied());
                }
            }
        }
        assert_eq!(q.len(), model.len());
        assert!(!(q.is_full() && q.is_empty()));
    }
});
