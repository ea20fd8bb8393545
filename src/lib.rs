#![doc = r#"
Strobe library crate.

A cycle-accurate simulation kernel for digital logic designs. A design is a
hierarchy of modules carrying signals (combinational wires and sequential
registers) and processes (`always_comb` / `always_ff` blocks); the scheduler
evaluates them under strict two-region semantics so results are
deterministic and race-free.

Modules:
- error: typed failure taxonomy surfaced to the harness
- signal: signal store, snapshots, port aliases, arrays
- process: combinational/sequential process records and triggers
- design: declarative builder for the module tree, interfaces, modports
- arbiter: per-tick write legality and single-driver enforcement
- region: active-region fixed point and NBA evaluation/commit
- scheduler: clock stepping and the stabilization loop
- sim: the `Simulator` facade the test harness drives
- trace: per-step change notifications for waveform writers

In tests, shared testbench designs are available under `crate::test_utils`.
"#]

pub mod arbiter;
pub mod design;
pub mod error;
pub mod process;
pub mod region;
pub mod scheduler;
pub mod signal;
pub mod sim;
pub mod trace;

// Re-export commonly used types at the crate root for convenience.
pub use design::{Design, Modport, ModportSpec, ModuleBuilder, ModuleId};
pub use error::{SimError, SimResult};
pub use region::Scope;
pub use signal::array::{
    InputArray, OutputRegArray, OutputWireArray, RegArray, SignalArray, WireArray,
};
pub use signal::{
    Drive, Edge, Input, OutputReg, OutputWire, Reg, Sense, SignalId, SignalKind, SignalSpec, Wire,
};
pub use sim::{SimConfig, Simulator};
pub use trace::{ChangeLog, TraceSink};

// Shared test designs (only compiled for tests)
#[cfg(test)]
pub mod test_utils;
