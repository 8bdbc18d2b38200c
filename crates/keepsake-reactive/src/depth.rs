#![forbid(unsafe_code)]

//! Activation depth tracking.
//!
//! Subscribing to an inactive derived store activates it, which subscribes to
//! its inputs, which may activate them in turn. That chain runs on the call
//! stack, one frame per inactive upstream store. [`PropagationGuard`] counts
//! those nested frames on the current thread and panics with a descriptive
//! message once [`MAX_PROPAGATION_DEPTH`] is exceeded, instead of letting the
//! process die from a stack overflow.

use std::cell::Cell;

/// Maximum number of nested activation frames per thread.
pub const MAX_PROPAGATION_DEPTH: usize = 256;

thread_local! {
    static DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// Current nesting depth on this thread.
#[must_use]
pub fn propagation_depth() -> usize {
    DEPTH.with(Cell::get)
}

/// RAII marker for one propagation frame.
#[derive(Debug)]
pub(crate) struct PropagationGuard(());

impl PropagationGuard {
    /// Enter a frame.
    ///
    /// # Panics
    ///
    /// Panics when the nesting depth would exceed [`MAX_PROPAGATION_DEPTH`].
    pub(crate) fn enter(site: &'static str) -> Self {
        let depth = DEPTH.with(|d| {
            let next = d.get() + 1;
            d.set(next);
            next
        });
        if depth > MAX_PROPAGATION_DEPTH {
            DEPTH.with(|d| d.set(d.get() - 1));
            tracing::error!(
                message = "propagation.depth_exceeded",
                site,
                depth,
                limit = MAX_PROPAGATION_DEPTH
            );
            panic!(
                "store activation exceeded {MAX_PROPAGATION_DEPTH} nested frames at {site}"
            );
        }
        Self(())
    }
}

impl Drop for PropagationGuard {
    fn drop(&mut self) {
        DEPTH.with(|d| d.set(d.get().saturating_sub(1)));
    }
}
