/*!
Directional port aliases.

A port alias exposes a signal owned elsewhere at a module boundary, with the
direction fixed at construction:

- `Input`       - read-only view of a wire-kind target.
- `OutputWire`  - writable view of a wire-kind target; commits as a wire.
- `OutputReg`   - writable view of a reg-kind target; commits as a register.

Aliases hold the id of the terminal signal, so chaining (an alias built over
another alias) is free: every operation lands on the terminal. The builder
checks the terminal's kind against the requested direction and refuses the
mismatched combinations (`PortKindMismatch`); the only sanctioned way to
drive a register across a module boundary is `OutputReg`.
*/

use crate::error::{SimError, SimResult};
use crate::signal::store::SignalCore;
use crate::signal::{Drive, Sense, SignalId, SignalKind};

/// Read-only alias over a wire.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Input(pub(crate) SignalId);

/// Writable alias over a wire.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct OutputWire(pub(crate) SignalId);

/// Writable alias over a register.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct OutputReg(pub(crate) SignalId);

impl Sense for Input {
    #[inline]
    fn id(&self) -> SignalId {
        self.0
    }
}

impl Sense for OutputWire {
    #[inline]
    fn id(&self) -> SignalId {
        self.0
    }
}

impl Sense for OutputReg {
    #[inline]
    fn id(&self) -> SignalId {
        self.0
    }
}

impl Drive for OutputWire {}
impl Drive for OutputReg {}

/// Direction tag used by the builder and by modport descriptions.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PortDir {
    Input,
    OutputWire,
    OutputReg,
}

impl PortDir {
    /// The terminal kind this direction is allowed to alias.
    #[inline]
    pub(crate) fn required_kind(self) -> SignalKind {
        match self {
            PortDir::Input | PortDir::OutputWire => SignalKind::Wire,
            PortDir::OutputReg => SignalKind::Reg,
        }
    }
}

/// Check a direction against the terminal signal it would alias.
pub(crate) fn check_target(dir: PortDir, port_path: &str, target: &SignalCore) -> SimResult<()> {
    if target.kind() == dir.required_kind() {
        return Ok(());
    }
    let reason = match dir {
        PortDir::Input => "inputs must be driven by wires; use an output-reg alias to expose a register",
        PortDir::OutputWire => "output-wire aliases cannot wrap a register; use an output-reg alias",
        PortDir::OutputReg => "output-reg aliases cannot wrap a wire; use an output-wire alias",
    };
    Err(SimError::PortKindMismatch {
        port: port_path.to_string(),
        target: target.path().to_string(),
        reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::SignalSpec;

    fn core(kind: SignalKind) -> SignalCore {
        SignalCore::new(kind, SignalSpec::new(4), "tb.sig".into()).unwrap()
    }

    #[test]
    fn directions_match_their_kind() {
        let w = core(SignalKind::Wire);
        let r = core(SignalKind::Reg);

        assert!(check_target(PortDir::Input, "m.p", &w).is_ok());
        assert!(check_target(PortDir::OutputWire, "m.p", &w).is_ok());
        assert!(check_target(PortDir::OutputReg, "m.p", &r).is_ok());
    }

    #[test]
    fn mismatches_are_refused() {
        let w = core(SignalKind::Wire);
        let r = core(SignalKind::Reg);

        for dir in [PortDir::Input, PortDir::OutputWire] {
            assert!(matches!(
                check_target(dir, "m.p", &r),
                Err(SimError::PortKindMismatch { .. })
            ));
        }
        assert!(matches!(
            check_target(PortDir::OutputReg, "m.p", &w),
            Err(SimError::PortKindMismatch { .. })
        ));
    }
}
