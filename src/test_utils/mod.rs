//! Shared testbench designs for the test suite.
//!
//! These builders de-duplicate design construction across the scheduler,
//! region, and simulator tests. Each returns the finished `Design` plus a
//! handle bundle so tests can drive and inspect the interesting signals.
//! They intentionally cover just what the suite needs: a counter with
//! enable/reset, a shift-register pipeline, a combinational oscillator, the
//! small illegal designs the arbiter scenarios poke at, and a handshake
//! interface exercising modports.

#![allow(dead_code)]

use crate::design::{Design, ModportSpec};
use crate::signal::{Edge, Reg, Wire};

/// 4-bit counter with synchronous reset and enable, mirroring the classic
/// first-design example: `count` advances on every posedge with `enable`
/// high, `count_out`/`flag_out` are combinational views.
pub struct CounterBench {
    pub clk: Wire,
    pub reset: Wire,
    pub enable: Wire,
    pub count_out: Wire,
    pub flag_out: Wire,
    pub count: Reg,
}

pub fn counter_bench() -> (Design, CounterBench) {
    let mut design = Design::new();
    let mut tb = design.root();
    let clk = tb.wire("clk", 1).unwrap();
    let reset = tb.wire("reset", 1).unwrap();
    let enable = tb.wire("enable", 1).unwrap();
    let count_out = tb.wire("count_out", 4).unwrap();
    let flag_out = tb.wire("flag_out", 1).unwrap();

    let mut counter = tb.module("counter").unwrap();
    counter.input("clk", clk).unwrap();
    let reset_in = counter.input("reset", reset).unwrap();
    let enable_in = counter.input("enable", enable).unwrap();
    let count_out_p = counter.output_wire("count_out", count_out).unwrap();
    let flag_out_p = counter.output_wire("flag_out", flag_out).unwrap();
    let count = counter.reg("count", 4).unwrap();
    let threshold = counter.wire("threshold", 4).unwrap();

    counter
        .always_ff(
            "count_logic",
            &[(Edge::Pos, "clk"), (Edge::Pos, "reset")],
            move |s| {
                if s.read(reset_in) != 0 {
                    s.write(count, 0)?;
                } else if s.read(enable_in) != 0 {
                    // Masked to 4 bits on write: wraps at 16.
                    s.write(count, s.read(count) + 1)?;
                }
                Ok(())
            },
        )
        .unwrap();
    counter
        .always_comb("output_logic", move |s| {
            s.write(threshold, 4)?;
            s.write(flag_out_p, u64::from(s.read(count) > s.read(threshold)))?;
            s.write(count_out_p, s.read(count))?;
            Ok(())
        })
        .unwrap();

    (
        design,
        CounterBench {
            clk,
            reset,
            enable,
            count_out,
            flag_out,
            count,
        },
    )
}

/// Three-stage shift register: `dout(k) = din(k-3)`.
pub struct PipelineBench {
    pub clk: Wire,
    pub din: Wire,
    pub dout: Wire,
}

pub fn pipeline_bench() -> (Design, PipelineBench) {
    let mut design = Design::new();
    let mut tb = design.root();
    let clk = tb.wire("clk", 1).unwrap();
    let din = tb.wire("din", 1).unwrap();
    let dout = tb.wire("dout", 1).unwrap();

    let mut shift = tb.module("shift").unwrap();
    shift.input("clk", clk).unwrap();
    let din_in = shift.input("din", din).unwrap();
    let dout_p = shift.output_wire("dout", dout).unwrap();
    let stage0 = shift.reg("stage0", 1).unwrap();
    let stage1 = shift.reg("stage1", 1).unwrap();
    let stage2 = shift.reg("stage2", 1).unwrap();

    shift
        .always_ff("advance", &[(Edge::Pos, "clk")], move |s| {
            // All three reads see start-of-region values: a true shift.
            s.write(stage2, s.read(stage1))?;
            s.write(stage1, s.read(stage0))?;
            s.write(stage0, s.read(din_in))?;
            Ok(())
        })
        .unwrap();
    shift
        .always_comb("drive_out", move |s| {
            s.write(dout_p, s.read(stage2))?;
            Ok(())
        })
        .unwrap();

    (design, PipelineBench { clk, din, dout })
}

/// Combinational feedback loop: `osc` inverts itself every pass and never
/// settles.
pub struct OscillatorBench {
    pub clk: Wire,
    pub osc: Wire,
}

pub fn oscillator_bench() -> (Design, OscillatorBench) {
    let mut design = Design::new();
    let mut tb = design.root();
    let clk = tb.wire("clk", 1).unwrap();

    let mut m = tb.module("loopback").unwrap();
    let osc = m.wire("osc", 1).unwrap();
    m.always_comb("invert", move |s| {
        s.write(osc, s.read(osc) ^ 1)?;
        Ok(())
    })
    .unwrap();

    (design, OscillatorBench { clk, osc })
}

/// A combinational process that illegally writes a register.
pub struct CombWritesRegBench {
    pub clk: Wire,
    pub r: Reg,
}

pub fn comb_writes_reg_bench() -> (Design, CombWritesRegBench) {
    let mut design = Design::new();
    let mut tb = design.root();
    let clk = tb.wire("clk", 1).unwrap();

    let mut m = tb.module("broken").unwrap();
    let r = m.reg("r", 1).unwrap();
    m.always_comb("logic", move |s| {
        s.write(r, 1)?;
        Ok(())
    })
    .unwrap();

    (design, CombWritesRegBench { clk, r })
}

/// A sequential process that illegally writes a wire.
pub struct SeqWritesWireBench {
    pub clk: Wire,
    pub w: Wire,
}

pub fn seq_writes_wire_bench() -> (Design, SeqWritesWireBench) {
    let mut design = Design::new();
    let mut tb = design.root();
    let clk = tb.wire("clk", 1).unwrap();

    let mut m = tb.module("broken").unwrap();
    m.input("clk", clk).unwrap();
    let w = m.wire("w", 1).unwrap();
    m.always_ff("tick", &[(Edge::Pos, "clk")], move |s| {
        s.write(w, 1)?;
        Ok(())
    })
    .unwrap();

    (design, SeqWritesWireBench { clk, w })
}

/// Two combinational processes driving the same wire with different values.
pub struct ConflictBench {
    pub clk: Wire,
    pub bus: Wire,
}

pub fn conflict_bench() -> (Design, ConflictBench) {
    let mut design = Design::new();
    let mut tb = design.root();
    let clk = tb.wire("clk", 1).unwrap();

    let mut m = tb.module("contended").unwrap();
    let bus = m.wire("bus", 4).unwrap();
    m.always_comb("drive_a", move |s| {
        s.write(bus, 1)?;
        Ok(())
    })
    .unwrap();
    m.always_comb("drive_b", move |s| {
        s.write(bus, 2)?;
        Ok(())
    })
    .unwrap();

    (design, ConflictBench { clk, bus })
}

/// Handshake master/slave pair talking over an interface with modports.
/// The slave toggles `ready` every posedge; the master advances `counter`
/// (and thus `data`) on posedges where `ready` was high.
pub struct HandshakeBench {
    pub clk: Wire,
    pub valid: Wire,
    pub ready: Wire,
    pub data: Wire,
    pub counter: Reg,
}

pub fn handshake_bench() -> (Design, HandshakeBench) {
    let mut design = Design::new();
    let mut tb = design.root();
    let clk = tb.wire("clk", 1).unwrap();

    let mut ifc = tb.interface("bus").unwrap();
    let ifc_clk = ifc.wire("clk", 1).unwrap();
    let valid = ifc.wire("valid", 1).unwrap();
    let ready = ifc.wire("ready", 1).unwrap();
    let data = ifc.wire("data", 8).unwrap();
    let ifc_id = ifc.id();

    // Forward the testbench clock onto the interface.
    tb.always_comb("clk_feed", move |s| {
        s.write(ifc_clk, s.read(clk))?;
        Ok(())
    })
    .unwrap();

    let master_view = ModportSpec::new()
        .input("clk")
        .output_wire("valid")
        .output_wire("data")
        .input("ready");
    let slave_view = ModportSpec::new()
        .input("clk")
        .input("valid")
        .input("data")
        .output_wire("ready");

    let mut master = tb.module("master").unwrap();
    let mp = master.modport("bus", ifc_id, &master_view).unwrap();
    let ready_in = mp.input("ready").unwrap();
    let valid_out = mp.output_wire("valid").unwrap();
    let data_out = mp.output_wire("data").unwrap();
    let counter = master.reg("counter", 8).unwrap();
    master
        .always_ff("advance", &[(Edge::Pos, "bus.clk")], move |s| {
            if s.read(ready_in) != 0 {
                s.write(counter, s.read(counter) + 1)?;
            }
            Ok(())
        })
        .unwrap();
    master
        .always_comb("present", move |s| {
            s.write(valid_out, 1)?;
            s.write(data_out, s.read(counter))?;
            Ok(())
        })
        .unwrap();

    let mut slave = tb.module("slave").unwrap();
    let mp = slave.modport("bus", ifc_id, &slave_view).unwrap();
    let ready_out = mp.output_wire("ready").unwrap();
    let toggle = slave.reg("toggle", 1).unwrap();
    slave
        .always_ff("state", &[(Edge::Pos, "bus.clk")], move |s| {
            s.write(toggle, s.read(toggle) ^ 1)?;
            Ok(())
        })
        .unwrap();
    slave
        .always_comb("respond", move |s| {
            s.write(ready_out, s.read(toggle))?;
            Ok(())
        })
        .unwrap();

    (
        design,
        HandshakeBench {
            clk,
            valid,
            ready,
            data,
            counter,
        },
    )
}
