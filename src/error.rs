/*!
Error taxonomy for design construction and simulation.

All failures surface as a single `SimError` enum so that harness code can
match on the kind while still getting a readable message. Every variant
carries the hierarchical path of the offending signal and, where one exists,
the path of the offending process, so a failing testcase points straight at
the declaration site.

Construction-time kinds (`SignalWidthInvalid`, `PortKindMismatch`,
`DuplicateName`, `EmptyTriggerList`, `UnknownModportSignal`,
`UnknownTriggerSignal`) are raised by the builder or the elaboration pass.
The remaining kinds are raised while a step is executing and abort the
running process; the write log is cleared on abort but the signal store is
left as-is for post-mortem inspection.
*/

use thiserror::Error;

/// Any failure raised by the simulation core.
#[derive(Debug, Error)]
pub enum SimError {
    /// A register was written from a combinational process.
    #[error("register `{signal}` written from combinational process `{process}`")]
    IllegalCombWriteToReg { signal: String, process: String },

    /// A wire (or wire-targeted alias) was written from a sequential process.
    #[error("wire `{signal}` written from sequential process `{process}`")]
    IllegalSeqWriteToWire { signal: String, process: String },

    /// A write happened outside any process on a signal that is not an
    /// externally driven testbench wire.
    #[error("signal `{signal}` written outside a process; only testbench wires accept external drives")]
    WriteOutsideProcess { signal: String },

    /// Two distinct processes drove the same signal in one tick.
    #[error("multiple drivers for `{signal}`: `{first}` and `{second}`")]
    MultipleDrivers {
        signal: String,
        first: String,
        second: String,
    },

    /// Combinational logic did not reach a fixed point within the iteration
    /// cap. The signal store reflects the last completed pass.
    #[error("signals did not stabilize after {iterations} iterations; combinational feedback loop likely")]
    DidNotConverge { iterations: usize },

    /// A bit index lies outside `[0, width)`.
    #[error("bit range {msb}:{lsb} out of bounds for `{signal}` (width {width})")]
    InvalidRange {
        signal: String,
        msb: u32,
        lsb: u32,
        width: u32,
    },

    /// An `always_ff` trigger named a signal that does not resolve on the
    /// owning module.
    #[error("trigger signal `{name}` not found for sequential process `{process}`")]
    UnknownTriggerSignal { process: String, name: String },

    /// A port alias direction does not match its target's kind (for example
    /// an output-reg alias over a wire).
    #[error("port `{port}` cannot alias `{target}`: {reason}")]
    PortKindMismatch {
        port: String,
        target: String,
        reason: &'static str,
    },

    /// Width outside `1..=64`, or a signed signal of width 1.
    #[error("invalid width {width} for signal `{signal}`: {reason}")]
    SignalWidthInvalid {
        signal: String,
        width: u32,
        reason: &'static str,
    },

    /// Two declarations in one module share a name.
    #[error("duplicate declaration `{name}` in module `{module}`")]
    DuplicateName { module: String, name: String },

    /// An `always_ff` process was declared with no triggers.
    #[error("sequential process `{process}` has an empty trigger list")]
    EmptyTriggerList { process: String },

    /// A modport named a signal its interface does not own.
    #[error("modport `{modport}` names `{name}`, which interface `{interface}` does not declare")]
    UnknownModportSignal {
        modport: String,
        interface: String,
        name: String,
    },
}

/// Crate-wide result alias.
pub type SimResult<T> = Result<T, SimError>;
