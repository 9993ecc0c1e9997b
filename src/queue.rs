//! Lock-free gesture result queue.
//!
//! Fixed-capacity ring buffer between the tick context (single producer)
//! and the application context (consumer):
//!
//! ```text
//!   tick()  ──push──▶ [ slot | slot | slot | ... | (empty) ] ──pop/peek──▶ app
//!                      ▲ read_idx                 ▲ write_idx
//! ```
//!
//! One slot is always kept empty, so `read == write` means empty and
//! `write + 1 == read` means full without a separate counter.  Usable
//! capacity is therefore `N - 1`.
//!
//! ## Ordering
//!
//! - The producer stores the payload, then publishes `write_idx` with
//!   `Release`; the consumer loads `write_idx` with `Acquire` before
//!   touching the payload.
//! - The consumer advances `read_idx` with an `AcqRel` compare-exchange;
//!   the producer loads it with `Acquire` before deciding the queue is
//!   full.
//! - Payload words are themselves atomics, so a consumer racing with an
//!   overwriting push may read a mixed slot but never a torn integer.
//!   Such a read is discarded because its compare-exchange on `read_idx`
//!   fails (the producer moved `read_idx` past the slot before reusing it).
//!   This only holds while the producer performs fewer than `N` overwrites
//!   between the consumer's slot load and its compare-exchange.  After `N`
//!   of them `read_idx` has wrapped back to the same value, the exchange
//!   succeeds and the returned result may mix two pushes.  The index carries
//!   no epoch; `Reject` mode, or a consumer that is never starved for `N`
//!   pushes, is not affected.
//!
//! Several consumers may pop concurrently: the compare-exchange hands each
//! slot to at most one of them.

use core::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

use crate::events::{GestureEvent, GestureResult};

/// What a push does when the queue is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverflowPolicy {
    /// Drop the oldest entry and accept the new one.
    #[default]
    Overwrite,
    /// Refuse the new entry.
    Reject,
}

/// Storage the engine reports results into.
///
/// [`ResultQueue`] is the stock implementation; callers may plug in their
/// own.  All methods take `&self` because producer and consumer live in
/// different execution contexts.
pub trait ResultBuffer {
    /// Store one result.  Returns `false` if it was not stored.
    fn push(&self, result: &GestureResult) -> bool;
    /// Remove and return the oldest result.
    fn pop(&self) -> Option<GestureResult>;
    /// Return the oldest result without removing it.
    fn peek(&self) -> Option<GestureResult>;
    fn is_empty(&self) -> bool;
    fn is_full(&self) -> bool;
    /// Number of stored results.
    fn len(&self) -> usize;
    /// Maximum number of stored results.
    fn capacity(&self) -> usize;
    /// Results lost to overflow since construction.
    fn overwrite_count(&self) -> usize;
    /// Drop every stored result.
    fn clear(&self);
}

// ── Slot encoding ─────────────────────────────────────────────

/// One result packed into three words:
/// `[event | key_id << 16, repeat count, key value]`.
struct Slot {
    words: [AtomicU32; 3],
}

impl Slot {
    const fn new() -> Self {
        Self {
            words: [AtomicU32::new(0), AtomicU32::new(0), AtomicU32::new(0)],
        }
    }

    fn store(&self, result: &GestureResult) {
        let head = u32::from(result.event as u8) | (u32::from(result.key_id) << 16);
        self.words[0].store(head, Ordering::Release);
        self.words[1].store(u32::from(result.long_press_period_trigger_cnt), Ordering::Release);
        self.words[2].store(result.key_value, Ordering::Release);
    }

    fn load(&self) -> Option<GestureResult> {
        let head = self.words[0].load(Ordering::Acquire);
        let cnt = self.words[1].load(Ordering::Acquire);
        let key_value = self.words[2].load(Ordering::Acquire);
        Some(GestureResult {
            event: GestureEvent::from_u8(head as u8)?,
            key_id: (head >> 16) as u16,
            long_press_period_trigger_cnt: cnt as u16,
            key_value,
        })
    }
}

// ── Queue ─────────────────────────────────────────────────────

/// Ring buffer of `N` slots holding up to `N - 1` results.
///
/// Usually placed in a `static` so both contexts can reach it:
///
/// ```
/// use bitbutton::queue::{OverflowPolicy, ResultQueue};
///
/// static RESULTS: ResultQueue<16> = ResultQueue::new(OverflowPolicy::Overwrite);
/// assert_eq!(RESULTS.capacity(), 15);
/// ```
pub struct ResultQueue<const N: usize> {
    slots: [Slot; N],
    read_idx: AtomicUsize,
    write_idx: AtomicUsize,
    overwrite_count: AtomicUsize,
    policy: OverflowPolicy,
}

impl<const N: usize> ResultQueue<N> {
    pub const fn new(policy: OverflowPolicy) -> Self {
        assert!(N >= 2, "ResultQueue needs at least two slots");
        Self {
            slots: [const { Slot::new() }; N],
            read_idx: AtomicUsize::new(0),
            write_idx: AtomicUsize::new(0),
            overwrite_count: AtomicUsize::new(0),
            policy,
        }
    }

    pub fn policy(&self) -> OverflowPolicy {
        self.policy
    }

    pub const fn capacity(&self) -> usize {
        N - 1
    }

    /// Producer side.  Only one context may push.
    pub fn push(&self, result: &GestureResult) -> bool {
        let write = self.write_idx.load(Ordering::Relaxed);
        let next = (write + 1) % N;
        let read = self.read_idx.load(Ordering::Acquire);

        if next == read {
            match self.policy {
                OverflowPolicy::Reject => {
                    self.overwrite_count.fetch_add(1, Ordering::Relaxed);
                    return false;
                }
                OverflowPolicy::Overwrite => {
                    // A failed exchange means a consumer freed the slot meanwhile.
                    if self
                        .read_idx
                        .compare_exchange(read, (read + 1) % N, Ordering::AcqRel, Ordering::Relaxed)
                        .is_ok()
                    {
                        self.overwrite_count.fetch_add(1, Ordering::Relaxed);
                    }
                }
            }
        }

        self.slots[write].store(result);
        self.write_idx.store(next, Ordering::Release);
        true
    }

    /// Consumer side: remove the oldest result.
    pub fn pop(&self) -> Option<GestureResult> {
        loop {
            let read = self.read_idx.load(Ordering::Acquire);
            let write = self.write_idx.load(Ordering::Acquire);
            if read == write {
                return None;
            }

            let value = self.slots[read].load();
            if self
                .read_idx
                .compare_exchange(read, (read + 1) % N, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                if value.is_some() {
                    return value;
                }
                // Undecodable slot: skipped, try the next one.
            }
        }
    }

    /// Consumer side: copy the oldest result without removing it.
    pub fn peek(&self) -> Option<GestureResult> {
        loop {
            let read = self.read_idx.load(Ordering::Acquire);
            let write = self.write_idx.load(Ordering::Acquire);
            if read == write {
                return None;
            }

            let value = self.slots[read].load();
            if self.read_idx.load(Ordering::Acquire) == read {
                return value;
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.read_idx.load(Ordering::Relaxed) == self.write_idx.load(Ordering::Relaxed)
    }

    pub fn is_full(&self) -> bool {
        let write = self.write_idx.load(Ordering::Relaxed);
        let read = self.read_idx.load(Ordering::Relaxed);
        (write + 1) % N == read
    }

    /// Number of stored results.
    pub fn len(&self) -> usize {
        let write = self.write_idx.load(Ordering::Relaxed);
        let read = self.read_idx.load(Ordering::Relaxed);
        if write >= read {
            write - read
        } else {
            N - read + write
        }
    }

    pub fn overwrite_count(&self) -> usize {
        self.overwrite_count.load(Ordering::Relaxed)
    }

    /// Drop every stored result.  Neither side may run concurrently.
    pub fn clear(&self) {
        self.read_idx.store(0, Ordering::Relaxed);
        self.write_idx.store(0, Ordering::Relaxed);
    }
}

impl<const N: usize> Default for ResultQueue<N> {
    fn default() -> Self {
        Self::new(OverflowPolicy::default())
    }
}

impl<const N: usize> ResultBuffer for ResultQueue<N> {
    fn push(&self, result: &GestureResult) -> bool {
        ResultQueue::push(self, result)
    }

    fn pop(&self) -> Option<GestureResult> {
        ResultQueue::pop(self)
    }

    fn peek(&self) -> Option<GestureResult> {
        ResultQueue::peek(self)
    }

    fn is_empty(&self) -> bool {
        ResultQueue::is_empty(self)
    }

    fn is_full(&self) -> bool {
        ResultQueue::is_full(self)
    }

    fn len(&self) -> usize {
        ResultQueue::len(self)
    }

    fn capacity(&self) -> usize {
        ResultQueue::capacity(self)
    }

    fn overwrite_count(&self) -> usize {
        ResultQueue::overwrite_count(self)
    }

    fn clear(&self) {
        ResultQueue::clear(self);
    }
}
