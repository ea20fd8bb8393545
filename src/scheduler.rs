/*!
Scheduler: orchestrates one half clock step with exact ordering.

Order of operations for a half step:
1. Snapshot-cycle every signal; edge triggers for this step are judged
   against these values.
2. Toggle the clock wire (staged like any external drive; it becomes
   visible at the first wire commit inside the active region).
3. Stabilization loop, bounded by `max_iterations`:
   a. snapshot-delta every signal,
   b. run the active region to combinational quiescence,
   c. run the NBA region (fire triggered sequential processes, commit regs),
   d. exit when no signal moved since (a); otherwise loop, which is what
      propagates freshly committed registers back through combinational
      logic before the step returns.
4. Clear the write log - also done when a step aborts with an error, so the
   next step starts from clean arbitration state. The signal store is never
   rolled back; diagnostics may inspect the post-failure state.
5. Notify the trace sink with every signal whose committed value changed
   since (1).

A full clock step is two half steps, one per edge.

The process table is moved out of the design while the loop runs so process
bodies can borrow the store and arbiter mutably; it is restored before any
error propagates.
*/

use crate::error::{SimError, SimResult};
use crate::process::ProcessRecord;
use crate::region;
use crate::signal::Sense;
use crate::sim::Simulator;

/// Advance the simulation by one clock edge.
pub(crate) fn half_step(sim: &mut Simulator) -> SimResult<()> {
    let clock_id = sim.clock.id();
    sim.design.store.snapshot_cycle_all();

    let level = sim.design.store.core(clock_id).read();
    let next = u64::from(level == 0);
    sim.design.store.core_mut(clock_id).write(next);
    log::debug!("half step {}: clock {level} -> {next}", sim.steps);

    let mut procs = std::mem::take(&mut sim.design.processes);
    let result = stabilize(sim, &mut procs);
    sim.design.processes = procs;
    // One write log per user-visible tick, error or not.
    sim.arbiter.clear();
    result?;

    // A settled step leaves nothing staged anywhere.
    debug_assert!(sim.design.store.iter().all(|core| !core.has_pending()));

    sim.steps += 1;
    emit_trace(sim);
    Ok(())
}

/// Advance the simulation by one full clock: both edges, with the complete
/// scheduling sequence for each.
pub(crate) fn full_step(sim: &mut Simulator) -> SimResult<()> {
    half_step(sim)?;
    half_step(sim)?;
    sim.cycles += 1;
    Ok(())
}

fn stabilize(sim: &mut Simulator, procs: &mut [ProcessRecord]) -> SimResult<()> {
    let max_iterations = sim.config.max_iterations;
    for iteration in 0..max_iterations {
        sim.design.store.snapshot_delta_all();
        region::run_active(
            &mut sim.design.store,
            &mut sim.arbiter,
            procs,
            &sim.schedule.comb,
            max_iterations,
        )?;
        region::run_nba(
            &mut sim.design.store,
            &mut sim.arbiter,
            procs,
            &sim.schedule.seq,
        )?;
        if !sim.design.store.any_delta_changed() {
            log::debug!(
                "half step {} settled after {} iteration(s)",
                sim.steps,
                iteration + 1
            );
            return Ok(());
        }
    }
    Err(SimError::DidNotConverge {
        iterations: max_iterations,
    })
}

fn emit_trace(sim: &mut Simulator) {
    let Some(sink) = sim.trace.as_mut() else {
        return;
    };
    let store = &sim.design.store;
    let mut changes = store
        .iter()
        .filter(|core| core.is_cycle_changed())
        .map(|core| (core.path(), core.read()));
    sink.on_step(sim.steps, &mut changes);
}
