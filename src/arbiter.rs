/*!
Write arbitration: phase legality and the single-driver rule.

Every staged write funnels through `WriteArbiter::check_write` before it
touches the store. The checks run in a fixed order:

1. Writes with no executing process are only legal on signals marked
   external (testbench-declared wires driven by the harness).
2. Kind/phase legality: registers accept writes only in the NBA phase,
   wires only in the active phase.
3. Single driver: the first process to write a signal in a tick owns it;
   a second distinct process is a conflict naming both. The same process
   writing the same signal repeatedly (including across delta cycles of
   the same tick) is fine.

External writes are not drivers and stay out of the log. The log lives for
one user-visible tick; the scheduler clears it after the step settles, and
also when a step aborts so the next step starts from clean arbitration
state.
*/

use std::collections::HashMap;

use crate::error::{SimError, SimResult};
use crate::signal::store::SignalCore;
use crate::signal::{SignalId, SignalKind};

/// Execution phase of the process attempting a write.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Phase {
    /// Combinational evaluation; wire writes commit within the region.
    Active,
    /// Sequential evaluation; register writes commit at region end.
    Nba,
}

/// Identity of the writer, if any.
#[derive(Copy, Clone, Debug)]
pub(crate) enum Writer<'a> {
    /// Harness-side write (scheduler clock toggle, `Simulator::drive`).
    External,
    Process {
        index: usize,
        path: &'a str,
        phase: Phase,
    },
}

/// Per-tick write log keyed by signal.
#[derive(Debug, Default)]
pub(crate) struct WriteArbiter {
    log: HashMap<SignalId, (usize, String)>,
}

impl WriteArbiter {
    /// Validate one write attempt and record its driver.
    pub(crate) fn check_write(
        &mut self,
        id: SignalId,
        core: &SignalCore,
        writer: Writer<'_>,
    ) -> SimResult<()> {
        let (index, path, phase) = match writer {
            Writer::External => {
                if !core.is_external() {
                    return Err(SimError::WriteOutsideProcess {
                        signal: core.path().to_string(),
                    });
                }
                return Ok(());
            }
            Writer::Process { index, path, phase } => (index, path, phase),
        };

        match (core.kind(), phase) {
            (SignalKind::Reg, Phase::Active) => {
                return Err(SimError::IllegalCombWriteToReg {
                    signal: core.path().to_string(),
                    process: path.to_string(),
                });
            }
            (SignalKind::Wire, Phase::Nba) => {
                return Err(SimError::IllegalSeqWriteToWire {
                    signal: core.path().to_string(),
                    process: path.to_string(),
                });
            }
            _ => {}
        }

        if let Some((first_index, first_path)) = self.log.get(&id) {
            if *first_index != index {
                return Err(SimError::MultipleDrivers {
                    signal: core.path().to_string(),
                    first: first_path.clone(),
                    second: path.to_string(),
                });
            }
            return Ok(());
        }
        self.log.insert(id, (index, path.to_string()));
        Ok(())
    }

    /// Forget this tick's drivers.
    pub(crate) fn clear(&mut self) {
        self.log.clear();
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.log.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::store::SignalCore;
    use crate::signal::SignalSpec;

    fn wire(external: bool) -> SignalCore {
        let mut c =
            SignalCore::new(SignalKind::Wire, SignalSpec::new(1), "TestBench.w".into()).unwrap();
        if external {
            c.mark_external();
        }
        c
    }

    fn reg() -> SignalCore {
        SignalCore::new(SignalKind::Reg, SignalSpec::new(1), "TestBench.m.r".into()).unwrap()
    }

    fn proc(index: usize, path: &str, phase: Phase) -> Writer<'_> {
        Writer::Process { index, path, phase }
    }

    #[test]
    fn external_writes_need_external_signals() {
        let mut arb = WriteArbiter::default();
        let id = SignalId(0);

        assert!(arb.check_write(id, &wire(true), Writer::External).is_ok());
        assert!(matches!(
            arb.check_write(id, &wire(false), Writer::External),
            Err(SimError::WriteOutsideProcess { .. })
        ));
        // Externals never enter the driver log.
        assert!(arb.is_empty());
    }

    #[test]
    fn phase_kind_legality() {
        let mut arb = WriteArbiter::default();

        assert!(matches!(
            arb.check_write(SignalId(0), &reg(), proc(0, "TestBench.m.logic", Phase::Active)),
            Err(SimError::IllegalCombWriteToReg { .. })
        ));
        assert!(matches!(
            arb.check_write(SignalId(1), &wire(false), proc(0, "TestBench.m.tick", Phase::Nba)),
            Err(SimError::IllegalSeqWriteToWire { .. })
        ));
        assert!(arb
            .check_write(SignalId(2), &reg(), proc(0, "TestBench.m.tick", Phase::Nba))
            .is_ok());
    }

    #[test]
    fn second_distinct_driver_conflicts() {
        let mut arb = WriteArbiter::default();
        let id = SignalId(0);
        let w = wire(false);

        arb.check_write(id, &w, proc(0, "TestBench.m.a", Phase::Active))
            .unwrap();
        // Same process again: fine.
        arb.check_write(id, &w, proc(0, "TestBench.m.a", Phase::Active))
            .unwrap();

        let err = arb
            .check_write(id, &w, proc(1, "TestBench.m.b", Phase::Active))
            .unwrap_err();
        match err {
            SimError::MultipleDrivers { first, second, .. } => {
                assert_eq!(first, "TestBench.m.a");
                assert_eq!(second, "TestBench.m.b");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn clear_resets_between_ticks() {
        let mut arb = WriteArbiter::default();
        let id = SignalId(0);
        let w = wire(false);

        arb.check_write(id, &w, proc(0, "a", Phase::Active)).unwrap();
        arb.clear();
        assert!(arb
            .check_write(id, &w, proc(1, "b", Phase::Active))
            .is_ok());
    }
}
