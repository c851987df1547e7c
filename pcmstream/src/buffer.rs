//! Fixed-capacity sample ring shared by the main loop and the timer interrupt.
//!
//! The ring stores `N` unsigned 8-bit samples. `head` is the next write
//! slot, `tail` the next read slot, and `empty` tells the two apart when
//! `head == tail`:
//!
//! | `empty` | `head == tail` | state   |
//! |---------|----------------|---------|
//! | true    | yes            | empty   |
//! | false   | yes            | full    |
//! | false   | no             | partial |
//!
//! Access goes through the two handles returned by [`SampleBuffer::split`]:
//! [`Producer`] writes `head` and clears `empty`, [`Consumer`] writes `tail`
//! and sets `empty`. Each side only ever moves `empty` in the direction that
//! makes the ring look more available to the other side, so a stale read
//! costs one period of wrong fullness judgement and nothing more.
//!
//! Only atomic loads and stores are used; the MSP430 has no compare-and-swap.
//! The consumer is expected to run to completion without being preempted by
//! the producer, which holds for a timer interrupt on a single core.

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

pub struct SampleBuffer<const N: usize> {
    storage: UnsafeCell<[u8; N]>,
    head: AtomicUsize,
    tail: AtomicUsize,
    empty: AtomicBool,
    split: AtomicBool,
}

// SAFETY: the storage cell is only touched through one Producer (slot at
// head) and one Consumer (slot at tail). A slot is handed over by the index
// store that follows the slot access.
unsafe impl<const N: usize> Sync for SampleBuffer<N> {}

impl<const N: usize> SampleBuffer<N> {
    const NON_ZERO: () = assert!(N > 0, "sample buffer capacity must be positive");

    pub const fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::NON_ZERO;
        Self {
            storage: UnsafeCell::new([0; N]),
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
            empty: AtomicBool::new(true),
            split: AtomicBool::new(false),
        }
    }

    #[inline(always)]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Hand out the producer and consumer halves for the lifetime of the borrow.
    pub fn split(&mut self) -> (Producer<'_, N>, Consumer<'_, N>) {
        let ring = &*self;
        (Producer { ring }, Consumer { ring })
    }

    /// Hand out both halves of a `static` ring, once.
    ///
    /// Must be called before the consumer's interrupt is enabled. Returns
    /// `None` if the halves were already handed out.
    pub fn split_static(&'static self) -> Option<(Producer<'static, N>, Consumer<'static, N>)> {
        if self.split.load(Ordering::Acquire) {
            return None;
        }
        self.split.store(true, Ordering::Release);
        Some((Producer { ring: self }, Consumer { ring: self }))
    }

    /// Number of filled slots.
    pub fn count(&self) -> usize {
        // Indices before the flag: a pop landing between the loads leaves a
        // stale tail (one too many) or a set flag (zero). Flag first could
        // pair `!empty` with `head == tail` from a pop that emptied the ring.
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Acquire);
        let empty = self.empty.load(Ordering::Acquire);
        occupancy::<N>(head, tail, empty)
    }

    /// Number of slots a push can still fill.
    #[inline]
    pub fn available_space(&self) -> usize {
        N - self.count()
    }

    #[inline(always)]
    fn slot(&self, index: usize) -> *mut u8 {
        debug_assert!(index < N);
        // SAFETY: index < N keeps the pointer inside the array.
        unsafe { self.storage.get().cast::<u8>().add(index) }
    }

    #[cfg(test)]
    pub(crate) fn raw_state(&self) -> (usize, usize, bool) {
        (
            self.head.load(Ordering::Relaxed),
            self.tail.load(Ordering::Relaxed),
            self.empty.load(Ordering::Relaxed),
        )
    }

    #[cfg(test)]
    pub(crate) fn contents(&self) -> [u8; N] {
        // SAFETY: tests inspect the ring while no push or pop is in flight.
        unsafe { *self.storage.get() }
    }
}

#[inline(always)]
fn occupancy<const N: usize>(head: usize, tail: usize, empty: bool) -> usize {
    if empty {
        0
    } else if head == tail {
        N
    } else {
        (head + N - tail) % N
    }
}

impl<const N: usize> Default for SampleBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Write half of a [`SampleBuffer`], owned by the main loop.
pub struct Producer<'a, const N: usize> {
    ring: &'a SampleBuffer<N>,
}

impl<'a, const N: usize> Producer<'a, N> {
    /// Append one sample. Returns `false` and changes nothing when the ring is full.
    pub fn push(&mut self, sample: u8) -> bool {
        let head = self.ring.head.load(Ordering::Relaxed);
        let tail = self.ring.tail.load(Ordering::Acquire);
        if !self.ring.empty.load(Ordering::Acquire) && head == tail {
            return false;
        }

        // SAFETY: the slot at head is outside the consumer's readable range.
        unsafe { self.ring.slot(head).write(sample) };

        let next = if head + 1 == N { 0 } else { head + 1 };
        self.ring.head.store(next, Ordering::Release);
        self.ring.empty.store(false, Ordering::Release);
        true
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.ring.count()
    }

    #[inline]
    pub fn available_space(&self) -> usize {
        self.ring.available_space()
    }

    #[inline(always)]
    pub const fn capacity(&self) -> usize {
        N
    }

    #[cfg(test)]
    pub(crate) fn raw_state(&self) -> (usize, usize, bool) {
        self.ring.raw_state()
    }

    #[cfg(test)]
    pub(crate) fn contents(&self) -> [u8; N] {
        self.ring.contents()
    }
}

/// Read half of a [`SampleBuffer`], owned by the timer interrupt.
pub struct Consumer<'a, const N: usize> {
    ring: &'a SampleBuffer<N>,
}

impl<'a, const N: usize> Consumer<'a, N> {
    /// Take the oldest sample, or `None` without touching any state when empty.
    pub fn pop(&mut self) -> Option<u8> {
        if self.ring.empty.load(Ordering::Acquire) {
            return None;
        }
        let tail = self.ring.tail.load(Ordering::Relaxed);

        // SAFETY: a non-empty ring has a published sample at tail.
        let sample = unsafe { self.ring.slot(tail).read() };

        let next = if tail + 1 == N { 0 } else { tail + 1 };
        self.ring.tail.store(next, Ordering::Release);
        if self.ring.head.load(Ordering::Acquire) == next {
            self.ring.empty.store(true, Ordering::Release);
        }
        Some(sample)
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.ring.count()
    }

    #[inline]
    pub fn available_space(&self) -> usize {
        self.ring.available_space()
    }

    #[cfg(test)]
    pub(crate) fn raw_state(&self) -> (usize, usize, bool) {
        self.ring.raw_state()
    }
}
