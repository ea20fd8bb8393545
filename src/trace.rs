/*!
Trace sink interface.

The scheduler calls a registered sink once per settled half step with the
signals whose committed value changed since the previous boundary. Waveform
writers (VCD and friends) implement this trait outside the core; the core
itself never formats or persists anything.
*/

use std::cell::RefCell;
use std::rc::Rc;

/// Consumer of per-step signal changes.
pub trait TraceSink {
    /// Called after half step `step` settles. `changes` yields
    /// `(hierarchical_path, new_committed_value)` for each changed signal,
    /// in declaration order. The iterator is only valid for the duration of
    /// the call.
    fn on_step(&mut self, step: u64, changes: &mut dyn Iterator<Item = (&str, u64)>);
}

/// Sink that records every change it sees; handy for tests and debugging.
///
/// Clones share the same underlying log, so a caller can keep one clone and
/// hand the other to `Simulator::attach_trace`.
#[derive(Clone, Debug, Default)]
pub struct ChangeLog {
    entries: Rc<RefCell<Vec<(u64, String, u64)>>>,
}

impl ChangeLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded `(step, path, value)` entries.
    pub fn entries(&self) -> Vec<(u64, String, u64)> {
        self.entries.borrow().clone()
    }
}

impl TraceSink for ChangeLog {
    fn on_step(&mut self, step: u64, changes: &mut dyn Iterator<Item = (&str, u64)>) {
        let mut entries = self.entries.borrow_mut();
        for (path, value) in changes {
            entries.push((step, path.to_string(), value));
        }
    }
}
