/*!
Process records.

A process is one block of executable logic bound to a module: combinational
(re-run to a fixed point each step) or sequential (runs once per step when
one of its edge triggers fires). Testcases are the third, harness-facing kind
and are kept separately because they drive the simulator instead of running
inside it. The three kinds are disjoint, so each carries exactly its own
payload: a trigger list for sequential processes, nothing extra for
combinational ones, a simulator-driving closure for testcases.

Triggers are declared by signal name and resolved to ids during elaboration;
until then `bound` is empty.
*/

use crate::design::ModuleId;
use crate::error::SimError;
use crate::region::Scope;
use crate::signal::store::SignalStore;
use crate::signal::{Edge, SignalId};
use crate::sim::Simulator;

/// Process body: closed over whatever handles it needs, reads and writes
/// through the `Scope` it is handed.
pub type ProcessFn = Box<dyn FnMut(&mut Scope) -> Result<(), SimError>>;

/// Testcase body: drives the simulator (clock steps, drives, inspection).
pub type TestcaseFn = Box<dyn FnMut(&mut Simulator) -> Result<(), SimError>>;

/// A declared trigger, not yet resolved against the module.
#[derive(Clone, Debug)]
pub(crate) struct Trigger {
    pub edge: Edge,
    pub signal: String,
}

/// A trigger resolved to its terminal signal.
#[derive(Copy, Clone, Debug)]
pub(crate) struct BoundTrigger {
    pub edge: Edge,
    pub signal: SignalId,
}

pub(crate) enum ProcessKind {
    Comb,
    Seq {
        triggers: Vec<Trigger>,
        bound: Vec<BoundTrigger>,
    },
}

/// One bound process: identity, kind payload, and body.
pub(crate) struct ProcessRecord {
    pub name: String,
    pub path: String,
    pub module: ModuleId,
    pub kind: ProcessKind,
    pub body: ProcessFn,
}

impl ProcessRecord {
    /// Sensitivity check for sequential processes: the trigger list is a
    /// disjunction, and a pair fires when its signal moved since the current
    /// stabilization iteration's delta snapshot *and* the move is the named
    /// edge relative to the cycle snapshot. The delta gate keeps a process
    /// from re-firing on later iterations of the same half step.
    pub(crate) fn is_triggered(&self, store: &SignalStore) -> bool {
        match &self.kind {
            ProcessKind::Comb => false,
            ProcessKind::Seq { bound, .. } => bound.iter().any(|t| {
                let core = store.core(t.signal);
                core.is_delta_changed() && core.edge_matches(t.edge)
            }),
        }
    }
}

/// One named testcase declared on the testbench.
pub(crate) struct Testcase {
    pub name: String,
    pub body: TestcaseFn,
}
