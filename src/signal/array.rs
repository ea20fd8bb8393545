/*!
Fixed-length signal arrays.

An array is an ordered sequence of same-width, same-kind signals declared in
one shot; element `i` is a first-class signal named `name[i]` with its own
snapshots and pending slot. Arrays of aliases are arrays of per-element
aliases over the corresponding target elements, so `arr.at(i)` behaves
exactly like the scalar handle it wraps. Index-plus-slice access is just
`read_bits(arr.at(i), msb, lsb)`.
*/

use crate::signal::{Input, OutputReg, OutputWire, Reg, Sense, Wire};

/// Ordered, fixed-length collection of `Copy` signal handles.
#[derive(Clone, Debug)]
pub struct SignalArray<T: Sense> {
    elems: Vec<T>,
}

/// Array of declared wires.
pub type WireArray = SignalArray<Wire>;
/// Array of declared registers.
pub type RegArray = SignalArray<Reg>;
/// Array of read-only aliases.
pub type InputArray = SignalArray<Input>;
/// Array of writable wire aliases.
pub type OutputWireArray = SignalArray<OutputWire>;
/// Array of writable register aliases.
pub type OutputRegArray = SignalArray<OutputReg>;

impl<T: Sense> SignalArray<T> {
    pub(crate) fn new(elems: Vec<T>) -> Self {
        Self { elems }
    }

    /// Element count.
    #[inline]
    pub fn len(&self) -> usize {
        self.elems.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elems.is_empty()
    }

    /// Handle of element `index`. Panics when out of bounds, like slice
    /// indexing.
    #[inline]
    pub fn at(&self, index: usize) -> T {
        self.elems[index]
    }

    /// Handle of element `index`, or `None` when out of bounds.
    #[inline]
    pub fn get(&self, index: usize) -> Option<T> {
        self.elems.get(index).copied()
    }

    /// Iterate element handles in index order.
    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        self.elems.iter().copied()
    }
}
