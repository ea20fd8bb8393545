/*!
Simulator facade: the harness-facing entry points.

`Simulator::new` consumes a `Design`, runs the elaboration pass, and checks
that the designated clock is an externally drivable testbench wire. From
then on the harness advances time with `step_clock`/`step_half_clock`, pokes
external wires with `drive`, reads committed state with `inspect`, and runs
registered testcases with `run_testcase`.

Errors raised inside a step (illegal writes, driver conflicts,
non-convergence) surface at the `step_clock`/`run_testcase` call that
triggered them; nothing is swallowed or retried.
*/

use crate::arbiter::{WriteArbiter, Writer};
use crate::design::elaborate::{self, Schedule};
use crate::design::Design;
use crate::error::{SimError, SimResult};
use crate::scheduler;
use crate::signal::{Drive, Sense, SignalKind, Wire};
use crate::trace::TraceSink;

/// Simulation settings.
#[derive(Copy, Clone, Debug)]
pub struct SimConfig {
    /// Cap on combinational fixed-point passes and on outer stabilization
    /// iterations within one half step. Exceeding it is `DidNotConverge`.
    pub max_iterations: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self { max_iterations: 30 }
    }
}

/// The simulation engine for one elaborated design.
impl std::fmt::Debug for Simulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulator")
            .field("clock", &self.clock)
            .field("config", &self.config)
            .field("cycles", &self.cycles)
            .field("steps", &self.steps)
            .finish_non_exhaustive()
    }
}

pub struct Simulator {
    pub(crate) design: Design,
    pub(crate) schedule: Schedule,
    pub(crate) arbiter: WriteArbiter,
    pub(crate) clock: Wire,
    pub(crate) config: SimConfig,
    pub(crate) cycles: u64,
    pub(crate) steps: u64,
    pub(crate) trace: Option<Box<dyn TraceSink>>,
}

impl Simulator {
    /// Elaborate `design` and bind `clock` as the scheduler-driven wire.
    ///
    /// The clock must be a wire declared directly on the testbench (the
    /// scheduler drives it from outside any process); anything else is
    /// refused up front with `WriteOutsideProcess`.
    pub fn new(design: Design, clock: Wire, config: SimConfig) -> SimResult<Self> {
        let mut design = design;
        let schedule = elaborate::elaborate(&mut design)?;

        let core = design.store.core(clock.id());
        if core.kind() != SignalKind::Wire || !core.is_external() {
            return Err(SimError::WriteOutsideProcess {
                signal: core.path().to_string(),
            });
        }

        Ok(Self {
            design,
            schedule,
            arbiter: WriteArbiter::default(),
            clock,
            config,
            cycles: 0,
            steps: 0,
            trace: None,
        })
    }

    /// Register a trace sink; it will be notified at every settled half
    /// step from now on.
    pub fn attach_trace(&mut self, sink: Box<dyn TraceSink>) {
        self.trace = Some(sink);
    }

    /// Advance one full clock cycle (both edges).
    pub fn step_clock(&mut self) -> SimResult<()> {
        scheduler::full_step(self)
    }

    /// Advance one clock edge.
    pub fn step_half_clock(&mut self) -> SimResult<()> {
        scheduler::half_step(self)
    }

    /// Run the named testcase, or every registered testcase in declaration
    /// order when `name` is `None`.
    pub fn run_testcase(&mut self, name: Option<&str>) -> SimResult<()> {
        let mut cases = std::mem::take(&mut self.design.testcases);
        let result = (|| {
            for case in cases.iter_mut() {
                match name {
                    Some(wanted) if case.name != wanted => continue,
                    _ => {}
                }
                log::debug!("running testcase `{}`", case.name);
                (case.body)(self)?;
                if name.is_some() {
                    return Ok(());
                }
            }
            if let Some(wanted) = name {
                log::warn!("no testcase named `{wanted}`");
            }
            Ok(())
        })();
        self.design.testcases = cases;
        result
    }

    /// Committed value of a signal, unsigned view.
    #[inline]
    pub fn inspect<S: Sense>(&self, signal: S) -> u64 {
        self.design.store.core(signal.id()).read()
    }

    /// Committed value, sign-extended when the signal is signed.
    #[inline]
    pub fn inspect_signed<S: Sense>(&self, signal: S) -> i64 {
        self.design.store.core(signal.id()).read_signed()
    }

    /// Bits `[msb:lsb]` of a committed value; endpoints in either order.
    pub fn inspect_bits<S: Sense>(&self, signal: S, msb: u32, lsb: u32) -> SimResult<u64> {
        self.design.store.core(signal.id()).read_bits(msb, lsb)
    }

    /// Stage a value on an externally driven testbench wire. Visible from
    /// the next step on. Non-external targets are `WriteOutsideProcess`.
    pub fn drive<D: Drive>(&mut self, signal: D, value: u64) -> SimResult<()> {
        let core = self.design.store.core(signal.id());
        self.arbiter.check_write(signal.id(), core, Writer::External)?;
        self.design.store.core_mut(signal.id()).write(value);
        Ok(())
    }

    /// `drive` with a signed value; negatives store their two's-complement
    /// low bits.
    pub fn drive_signed<D: Drive>(&mut self, signal: D, value: i64) -> SimResult<()> {
        let core = self.design.store.core(signal.id());
        self.arbiter.check_write(signal.id(), core, Writer::External)?;
        self.design.store.core_mut(signal.id()).write_signed(value);
        Ok(())
    }

    /// Hierarchical name of a signal (alias-transparent: the terminal's
    /// path).
    #[inline]
    pub fn signal_path<S: Sense>(&self, signal: S) -> &str {
        self.design.store.core(signal.id()).path()
    }

    /// Width of a signal in bits.
    #[inline]
    pub fn signal_width<S: Sense>(&self, signal: S) -> u32 {
        self.design.store.core(signal.id()).width()
    }

    /// Completed full clock cycles.
    #[inline]
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Completed half steps (one per clock edge).
    #[inline]
    pub fn half_steps(&self) -> u64 {
        self.steps
    }
}
