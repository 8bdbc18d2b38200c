#![forbid(unsafe_code)]

//! One-shot teardown callbacks.
//!
//! [`Cleanup`] is returned by activation callbacks (as their stop handler)
//! and by effectful aggregations (as their per-recompute cleanup). Callers
//! may return anything implementing [`IntoCleanup`]: `()` and `None` mean
//! "nothing to clean up".

use std::fmt;

/// A boxed `FnOnce()` run at most once.
pub struct Cleanup(Box<dyn FnOnce()>);

impl Cleanup {
    /// Wrap a closure.
    #[must_use]
    pub fn new(f: impl FnOnce() + 'static) -> Self {
        Self(Box::new(f))
    }

    /// Run the callback, consuming it.
    pub fn run(self) {
        (self.0)();
    }
}

impl fmt::Debug for Cleanup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Cleanup(..)")
    }
}

/// Conversion into an optional [`Cleanup`].
pub trait IntoCleanup {
    fn into_cleanup(self) -> Option<Cleanup>;
}

impl IntoCleanup for () {
    fn into_cleanup(self) -> Option<Cleanup> {
        None
    }
}

impl IntoCleanup for Cleanup {
    fn into_cleanup(self) -> Option<Cleanup> {
        Some(self)
    }
}

impl IntoCleanup for Option<Cleanup> {
    fn into_cleanup(self) -> Option<Cleanup> {
        self
    }
}
