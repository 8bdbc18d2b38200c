#![forbid(unsafe_code)]

//! Input sets a derived store can synchronize over.
//!
//! [`DeriveInputs`] abstracts "N upstream readables" so the synchronizer can
//! stay generic:
//!
//! - [`Single`]: one input; the aggregation receives the bare value.
//! - tuples `(R0,)` through `(R0, .., R7)`: heterogeneous inputs; the
//!   aggregation receives a tuple of values.
//! - `Vec<R>`: any number of same-typed inputs; the aggregation receives a
//!   `Vec` of values.
//!
//! Each input keeps its latest value in a typed slot. The aggregation input
//! is only assembled once every slot holds a value.

use std::rc::Rc;

use crate::observable::{Readable, Subscription};

/// Callbacks an input uses to report into its synchronizer.
pub trait InputSink<Slots> {
    /// Input `index` announced that its value is stale.
    fn invalidate(&self, index: usize);

    /// Input `index` delivered a value; `write` stores it into its slot.
    fn deliver(&self, index: usize, write: &dyn Fn(&mut Slots));

    /// Input `index` was invalidated but settled without a new value.
    fn revalidate(&self, index: usize);
}

/// A fixed set of upstream readables.
pub trait DeriveInputs: 'static {
    /// What the aggregation receives.
    type Values: 'static;
    /// Latest value per input.
    type Slots: 'static;

    /// Number of inputs.
    fn len(&self) -> usize;

    /// Whether there are no inputs at all.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fresh, all-empty slots.
    fn empty_slots(&self) -> Self::Slots;

    /// Subscribe to every input in declared order.
    fn subscribe_all(&self, sink: &Rc<dyn InputSink<Self::Slots>>) -> Vec<Subscription>;

    /// Assemble the aggregation input, or `None` while any slot is empty.
    fn collect(slots: &Self::Slots) -> Option<Self::Values>;
}

/// Subscribe one input, wiring every callback to `sink`.
fn link<R, S>(
    input: &R,
    index: usize,
    sink: &Rc<dyn InputSink<S>>,
    store: fn(&mut S, usize, R::Value),
) -> Subscription
where
    R: Readable,
    S: 'static,
{
    let on_value = Rc::clone(sink);
    let on_invalidate = Rc::clone(sink);
    let on_revalidate = Rc::clone(sink);
    input.subscribe_tracked(
        Box::new(move |value: &R::Value| {
            on_value.deliver(index, &|slots: &mut S| store(slots, index, value.clone()));
        }),
        Box::new(move || on_invalidate.invalidate(index)),
        Box::new(move || on_revalidate.revalidate(index)),
    )
}

/// A single input whose value is passed to the aggregation unwrapped.
#[derive(Debug, Clone)]
pub struct Single<R>(pub R);

impl<R: Readable + 'static> DeriveInputs for Single<R> {
    type Values = R::Value;
    type Slots = Option<R::Value>;

    fn len(&self) -> usize {
        1
    }

    fn empty_slots(&self) -> Self::Slots {
        None
    }

    fn subscribe_all(&self, sink: &Rc<dyn InputSink<Self::Slots>>) -> Vec<Subscription> {
        vec![link(&self.0, 0, sink, |slot, _, value| *slot = Some(value))]
    }

    fn collect(slots: &Self::Slots) -> Option<Self::Values> {
        slots.clone()
    }
}

impl<R: Readable + 'static> DeriveInputs for Vec<R> {
    type Values = Vec<R::Value>;
    type Slots = Vec<Option<R::Value>>;

    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn empty_slots(&self) -> Self::Slots {
        vec![None; Vec::len(self)]
    }

    fn subscribe_all(&self, sink: &Rc<dyn InputSink<Self::Slots>>) -> Vec<Subscription> {
        self.iter()
            .enumerate()
            .map(|(index, input)| {
                link(input, index, sink, |slots, index, value| {
                    if let Some(slot) = slots.get_mut(index) {
                        *slot = Some(value);
                    }
                })
            })
            .collect()
    }

    fn collect(slots: &Self::Slots) -> Option<Self::Values> {
        slots.iter().cloned().collect()
    }
}

macro_rules! impl_tuple_inputs {
    ($len:expr; $($R:ident => $idx:tt),+) => {
        impl<$($R: Readable + 'static),+> DeriveInputs for ($($R,)+) {
            type Values = ($($R::Value,)+);
            type Slots = ($(Option<$R::Value>,)+);

            fn len(&self) -> usize {
                $len
            }

            fn empty_slots(&self) -> Self::Slots {
                ($(None::<$R::Value>,)+)
            }

            fn subscribe_all(&self, sink: &Rc<dyn InputSink<Self::Slots>>) -> Vec<Subscription> {
                vec![$(
                    link(&self.$idx, $idx, sink, |slots: &mut Self::Slots, _, value| {
                        slots.$idx = Some(value);
                    }),
                )+]
            }

            fn collect(slots: &Self::Slots) -> Option<Self::Values> {
                Some(($(slots.$idx.clone()?,)+))
            }
        }
    };
}

impl_tuple_inputs!(1; R0 => 0);
impl_tuple_inputs!(2; R0 => 0, R1 => 1);
impl_tuple_inputs!(3; R0 => 0, R1 => 1, R2 => 2);
impl_tuple_inputs!(4; R0 => 0, R1 => 1, R2 => 2, R3 => 3);
impl_tuple_inputs!(5; R0 => 0, R1 => 1, R2 => 2, R3 => 3, R4 => 4);
impl_tuple_inputs!(6; R0 => 0, R1 => 1, R2 => 2, R3 => 3, R4 => 4, R5 => 5);
impl_tuple_inputs!(7; R0 => 0, R1 => 1, R2 => 2, R3 => 3, R4 => 4, R5 => 5, R6 => 6);
impl_tuple_inputs!(8; R0 => 0, R1 => 1, R2 => 2, R3 => 3, R4 => 4, R5 => 5, R6 => 6, R7 => 7);
