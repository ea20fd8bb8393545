/*!
Elaboration: the single pass that finalizes a design for execution.

Paths and ownership are assigned eagerly while the builder runs, so this
pass has two remaining jobs:

1. Resolve every sequential trigger's signal name against its owning module
   (dotted names reach through modports and child modules) and store the
   bound `(edge, signal)` list on the process. An unresolvable name is
   `UnknownTriggerSignal`.
2. Split the process table into the two deterministic execution orders the
   regions iterate: combinational and sequential, each in declaration order.

After this pass the design is frozen; the simulator owns it and nothing can
be added or removed.
*/

use crate::design::Design;
use crate::error::{SimError, SimResult};
use crate::process::{BoundTrigger, ProcessKind};

/// Deterministic execution orders produced by elaboration.
#[derive(Debug, Default)]
pub(crate) struct Schedule {
    pub comb: Vec<usize>,
    pub seq: Vec<usize>,
}

pub(crate) fn elaborate(design: &mut Design) -> SimResult<Schedule> {
    // Resolve trigger names first, immutably, then write the bound lists
    // back in a second sweep.
    let mut resolved: Vec<(usize, Vec<BoundTrigger>)> = Vec::new();
    let mut schedule = Schedule::default();

    for (index, process) in design.processes.iter().enumerate() {
        match &process.kind {
            ProcessKind::Comb => schedule.comb.push(index),
            ProcessKind::Seq { triggers, .. } => {
                let mut bound = Vec::with_capacity(triggers.len());
                for trigger in triggers {
                    let signal = design
                        .resolve_signal(process.module, &trigger.signal)
                        .ok_or_else(|| SimError::UnknownTriggerSignal {
                            process: process.path.clone(),
                            name: trigger.signal.clone(),
                        })?;
                    bound.push(BoundTrigger {
                        edge: trigger.edge,
                        signal,
                    });
                }
                resolved.push((index, bound));
                schedule.seq.push(index);
            }
        }
    }

    for (index, bound_triggers) in resolved {
        if let ProcessKind::Seq { bound, .. } = &mut design.processes[index].kind {
            *bound = bound_triggers;
        }
    }

    log::debug!(
        "elaborated design: {} signals, {} modules, {} comb + {} seq processes",
        design.store.iter().count(),
        design.modules.len(),
        schedule.comb.len(),
        schedule.seq.len()
    );
    Ok(schedule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::{Edge, Sense};

    #[test]
    fn processes_bucket_in_declaration_order() {
        let mut design = Design::new();
        let mut tb = design.root();
        tb.wire("clk", 1).unwrap();
        tb.always_comb("c0", |_| Ok(())).unwrap();
        tb.always_ff("s0", &[(Edge::Pos, "clk")], |_| Ok(())).unwrap();
        tb.always_comb("c1", |_| Ok(())).unwrap();

        let schedule = elaborate(&mut design).unwrap();
        assert_eq!(schedule.comb, vec![0, 2]);
        assert_eq!(schedule.seq, vec![1]);
    }

    #[test]
    fn unknown_trigger_name_fails_elaboration() {
        let mut design = Design::new();
        let mut tb = design.root();
        tb.always_ff("tick", &[(Edge::Pos, "no_such")], |_| Ok(()))
            .unwrap();

        let err = elaborate(&mut design).unwrap_err();
        match err {
            SimError::UnknownTriggerSignal { process, name } => {
                assert_eq!(process, "TestBench.tick");
                assert_eq!(name, "no_such");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn triggers_resolve_through_module_boundaries() {
        let mut design = Design::new();
        let mut tb = design.root();
        let clk = tb.wire("clk", 1).unwrap();
        let mut sub = tb.module("sub").unwrap();
        sub.input("clk", clk).unwrap();
        sub.reg("q", 1).unwrap();
        sub.always_ff("tick", &[(Edge::Pos, "clk")], |_| Ok(()))
            .unwrap();
        // A testbench-level process can also reach the child's port.
        let mut root = design.builder(crate::design::ModuleId(0));
        root.always_ff("spy", &[(Edge::Neg, "sub.clk")], |_| Ok(()))
            .unwrap();

        let schedule = elaborate(&mut design).unwrap();
        assert_eq!(schedule.seq.len(), 2);
        for &i in &schedule.seq {
            if let ProcessKind::Seq { bound, .. } = &design.processes[i].kind {
                assert_eq!(bound.len(), 1);
                assert_eq!(bound[0].signal, clk.id());
            } else {
                panic!("expected sequential process");
            }
        }
    }
}
