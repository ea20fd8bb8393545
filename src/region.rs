/*!
Execution regions of one time step, and the `Scope` processes run under.

Active region: repeatedly evaluates the combinational processes, committing
staged wire values after each pass, until a pass leaves every wire unchanged
(checked against the epsilon snapshot taken at the top of the pass). Process
order within a pass is declaration order; the order is deterministic but must
not affect the fixed point, which the arbiter's single-driver rule enforces.

NBA region: classifies which sequential processes fire this iteration (see
`ProcessRecord::is_triggered`), runs them in declaration order, then commits
every staged register value at once. No sequential process observes another's
staged value in the same tick.

`Scope` is the only path from a process body to signal state. Reads always
return committed values; a process never observes its own staged write.
Writes run through the arbiter first, so phase legality and driver
uniqueness are checked at the exact offending statement.
*/

use crate::arbiter::{Phase, WriteArbiter, Writer};
use crate::error::{SimError, SimResult};
use crate::process::ProcessRecord;
use crate::signal::store::SignalStore;
use crate::signal::{Drive, Sense};

/// Signal access handed to a running process.
pub struct Scope<'a> {
    store: &'a mut SignalStore,
    arbiter: &'a mut WriteArbiter,
    index: usize,
    path: &'a str,
    phase: Phase,
}

impl<'a> Scope<'a> {
    /// Committed value, unsigned view.
    #[inline]
    pub fn read<S: Sense>(&self, signal: S) -> u64 {
        self.store.core(signal.id()).read()
    }

    /// Committed value, sign-extended when the signal is signed.
    #[inline]
    pub fn read_signed<S: Sense>(&self, signal: S) -> i64 {
        self.store.core(signal.id()).read_signed()
    }

    /// Bits `[msb:lsb]` of the committed value; endpoints in either order.
    pub fn read_bits<S: Sense>(&self, signal: S, msb: u32, lsb: u32) -> SimResult<u64> {
        self.store.core(signal.id()).read_bits(msb, lsb)
    }

    /// Single bit of the committed value.
    pub fn read_bit<S: Sense>(&self, signal: S, index: u32) -> SimResult<u64> {
        self.read_bits(signal, index, index)
    }

    fn check<D: Drive>(&mut self, signal: D) -> SimResult<()> {
        self.arbiter.check_write(
            signal.id(),
            self.store.core(signal.id()),
            Writer::Process {
                index: self.index,
                path: self.path,
                phase: self.phase,
            },
        )
    }

    /// Stage `value & mask(width)` on the signal.
    pub fn write<D: Drive>(&mut self, signal: D, value: u64) -> SimResult<()> {
        self.check(signal)?;
        self.store.core_mut(signal.id()).write(value);
        Ok(())
    }

    /// Stage a signed value; negatives store their two's-complement low bits.
    pub fn write_signed<D: Drive>(&mut self, signal: D, value: i64) -> SimResult<()> {
        self.check(signal)?;
        self.store.core_mut(signal.id()).write_signed(value);
        Ok(())
    }

    /// Merge `value` into bits `[msb:lsb]` of the staged value, leaving the
    /// other bits as previously staged (or committed when nothing is staged
    /// yet this tick).
    pub fn write_bits<D: Drive>(
        &mut self,
        signal: D,
        msb: u32,
        lsb: u32,
        value: u64,
    ) -> SimResult<()> {
        self.check(signal)?;
        self.store.core_mut(signal.id()).write_bits(msb, lsb, value)
    }

    /// Stage a single bit.
    pub fn write_bit<D: Drive>(&mut self, signal: D, index: u32, value: u64) -> SimResult<()> {
        self.write_bits(signal, index, index, value)
    }

    /// Width of the signal in bits (alias-transparent).
    #[inline]
    pub fn width<S: Sense>(&self, signal: S) -> u32 {
        self.store.core(signal.id()).width()
    }
}

fn run_process(
    store: &mut SignalStore,
    arbiter: &mut WriteArbiter,
    procs: &mut [ProcessRecord],
    index: usize,
    phase: Phase,
) -> SimResult<()> {
    let record = &mut procs[index];
    let mut scope = Scope {
        store,
        arbiter,
        index,
        path: &record.path,
        phase,
    };
    (record.body)(&mut scope)
}

/// Iterate the combinational processes to a fixed point, committing wires
/// after each pass. Exceeding `max_iterations` passes is `DidNotConverge`;
/// the store then reflects the last completed pass.
pub(crate) fn run_active(
    store: &mut SignalStore,
    arbiter: &mut WriteArbiter,
    procs: &mut [ProcessRecord],
    comb: &[usize],
    max_iterations: usize,
) -> SimResult<()> {
    for pass in 0..max_iterations {
        store.snapshot_epsilon_wires();
        for &index in comb {
            run_process(store, arbiter, procs, index, Phase::Active)?;
        }
        store.commit_wires();
        if !store.any_epsilon_changed_wire() {
            log::trace!("active region settled after {} pass(es)", pass + 1);
            return Ok(());
        }
    }
    Err(SimError::DidNotConverge {
        iterations: max_iterations,
    })
}

/// Run the sequential processes whose triggers fire this iteration, then
/// commit every register atomically.
pub(crate) fn run_nba(
    store: &mut SignalStore,
    arbiter: &mut WriteArbiter,
    procs: &mut [ProcessRecord],
    seq: &[usize],
) -> SimResult<()> {
    let fired: Vec<usize> = seq
        .iter()
        .copied()
        .filter(|&index| procs[index].is_triggered(store))
        .collect();
    for &index in &fired {
        log::trace!("sequential process `{}` fired", procs[index].path);
        run_process(store, arbiter, procs, index, Phase::Nba)?;
    }
    store.commit_regs();
    Ok(())
}
