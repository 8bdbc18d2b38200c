#![forbid(unsafe_code)]

//! Per-thread delivery queue.
//!
//! Publishing does not call subscribers directly. [`enqueue`] appends one
//! delivery per subscriber to a thread-local FIFO and, unless a drain is
//! already in progress further up the stack, drains it. A `set` made from
//! inside a subscriber therefore queues its deliveries behind the ones still
//! outstanding instead of recursing.
//!
//! This makes propagation breadth-first: together with derived stores
//! forwarding invalidation, every input of a derived store that shares an
//! ancestor has been invalidated before any of them is refreshed. The
//! outermost `set` still returns only after the queue is empty.
//!
//! # Failure Modes
//!
//! - **Subscriber panics**: the panic is caught, the remaining deliveries
//!   still run, and the first panic resumes unwinding once the queue is
//!   empty. Every subscriber that was invalidated therefore still receives
//!   its value. Panics after the first are logged and dropped.
//! - **Cycles**: a subscriber that keeps setting a store it (transitively)
//!   listens to keeps the queue non-empty forever.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};

pub(crate) type Delivery = Box<dyn FnOnce()>;

thread_local! {
    static QUEUE: RefCell<VecDeque<Delivery>> = const { RefCell::new(VecDeque::new()) };
    static DRAINING: Cell<bool> = const { Cell::new(false) };
}

/// Queue `deliveries` and drain the queue unless a drain is already running.
pub(crate) fn enqueue(deliveries: impl IntoIterator<Item = Delivery>) {
    QUEUE.with(|queue| queue.borrow_mut().extend(deliveries));
    if DRAINING.with(Cell::get) {
        return;
    }
    drain();
}

/// Queue `delivery` behind the outstanding ones if a drain is running.
/// Outside a drain it is dropped unrun.
///
/// Safe to call while unwinding: it never drains.
pub(crate) fn defer(delivery: Delivery) {
    if DRAINING.with(Cell::get) {
        QUEUE.with(|queue| queue.borrow_mut().push_back(delivery));
    }
}

/// Whether a drain is running on this thread.
#[must_use]
pub fn is_propagating() -> bool {
    DRAINING.with(Cell::get)
}

fn drain() {
    DRAINING.with(|d| d.set(true));
    let mut first_panic = None;
    loop {
        let next = QUEUE.with(|queue| queue.borrow_mut().pop_front());
        let Some(delivery) = next else {
            break;
        };
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(delivery)) {
            let remaining = QUEUE.with(|queue| queue.borrow().len());
            tracing::warn!(message = "propagation.delivery_panicked", remaining);
            if first_panic.is_none() {
                first_panic = Some(payload);
            }
        }
    }
    DRAINING.with(|d| d.set(false));
    if let Some(payload) = first_panic {
        panic::resume_unwind(payload);
    }
}
