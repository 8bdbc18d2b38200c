#![forbid(unsafe_code)]

//! Persisted reactive stores.
//!
//! This crate provides synchronous, single-threaded stores whose values are
//! mirrored into a key-value backend:
//!
//! - [`Observable`]: the subscription primitive. Shared value, synchronous
//!   change notification, activation/deactivation callbacks.
//! - [`Subscription`]: RAII guard that unsubscribes on drop.
//! - [`Writable`] / [`ReadOnly`]: persisted cells. Construction loads the
//!   stored value (or falls back to a default) and every change is written
//!   before it is published.
//! - [`derive_from_one`] / [`derive_from_many`]: stores recomputed from other
//!   stores, glitch-free across diamond-shaped dependency graphs.
//! - [`StoreFactory`]: constructors bound to one backend and codec.
//!
//! # Architecture
//!
//! Stores use `Rc` interior storage and are not `Send`. There is no
//! scheduler: the outermost `set` returns only after every downstream
//! recomputation and notification has run. Notifications triggered from
//! inside a subscriber are queued behind the ones still outstanding (see
//! [`queue`]), so propagation is breadth-first. Backends and codecs come from
//! `keepsake-storage` and are carried by each store in a [`Persistence`].
//!
//! # Invariants
//!
//! 1. A subscriber receives the current value at subscribe time, once, if a
//!    value is known.
//! 2. Subscribers are notified in registration order.
//! 3. Setting a value always publishes, even if it equals the current one.
//! 4. A persisted store writes a value to its backend before publishing it.
//! 5. A derived store recomputes only when none of its inputs is stale, and
//!    staleness is forwarded through derived stores, so diamonds are
//!    glitch-free regardless of input order.
//! 6. A panicking subscriber or aggregation does not stop the rest of the
//!    propagation; the panic resumes once every queued notification has run.

pub mod cell;
pub mod cleanup;
pub mod depth;
pub mod derived;
pub mod factory;
pub mod observable;
pub mod persist;
pub mod queue;

pub use cell::{ReadOnly, StoreValue, Writable, readable_view};
pub use cleanup::{Cleanup, IntoCleanup};
pub use depth::{MAX_PROPAGATION_DEPTH, propagation_depth};
pub use derived::{
    Aggregate, DeriveError, DeriveInputs, InputSink, PendingSet, Single, derive_from_many,
    derive_from_one,
};
pub use factory::StoreFactory;
pub use observable::{Observable, Readable, Setter, Subscription};
pub use persist::Persistence;
pub use queue::is_propagating;
