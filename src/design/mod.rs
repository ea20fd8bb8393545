/*!
Design tree: declarative construction of modules, signals, and processes.

A `Design` owns everything the simulator will execute: the signal store, the
module tree, the process table, and the testcase table. Users build it
top-down through `ModuleBuilder`, which registers each declaration with its
owning module and assigns the hierarchical name on the spot; nothing is
discovered by reflection. Once a design is handed to `Simulator::new` it is
consumed and frozen; there is no way to add or remove declarations
afterwards.

Naming rules
- The root module is the testbench and its path is `"TestBench"`.
- A child module's path is `parent_path.instance_name`.
- A signal's path is `module_path.name`; array element `i` is `name[i]`.
- A modport instantiated as `bus` exposes port `clk` under `bus.clk`.

Wires declared directly on the testbench are the externally driven signals:
the harness (and the scheduler's clock toggle) may write them from outside
any process. Everything else only accepts process writes.

Interfaces are modules whose role is to own signals shared by several
consumers; a `ModportSpec` names the subset each consumer sees and the
direction it sees it with. Instantiating a modport copies it: the consumer
gets its own aliases, scoped and named under the consumer's path.
*/

pub(crate) mod elaborate;

use crate::error::{SimError, SimResult};
use crate::process::{ProcessFn, ProcessKind, ProcessRecord, Testcase, TestcaseFn, Trigger};
use crate::region::Scope;
use crate::signal::array::{
    InputArray, OutputRegArray, OutputWireArray, RegArray, SignalArray, WireArray,
};
use crate::signal::port::{self, Input, OutputReg, OutputWire, PortDir};
use crate::signal::store::{SignalCore, SignalStore};
use crate::signal::{Edge, Reg, Sense, SignalId, SignalKind, SignalSpec, Wire};
use crate::sim::Simulator;

/// Root module path tag.
pub const ROOT_PATH: &str = "TestBench";

/// Index of a module in the design tree.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ModuleId(pub(crate) u32);

/// Role of a module node.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum ModuleKind {
    TestBench,
    Module,
    Interface,
}

/// One named declaration owned by a module.
#[derive(Clone, Debug)]
pub(crate) enum Entry {
    /// A wire or register declared here.
    Signal(SignalId),
    /// A port alias; the id is the terminal signal.
    Port(SignalId),
    /// An array of signals or aliases, element ids in index order.
    Array(Vec<SignalId>),
    /// A child module.
    Child(ModuleId),
    /// A modport instantiation; its ports are registered as dotted entries.
    Modport,
}

/// Node in the design tree.
#[derive(Debug)]
pub(crate) struct ModuleNode {
    pub name: String,
    pub path: String,
    pub kind: ModuleKind,
    pub parent: Option<ModuleId>,
    pub children: Vec<ModuleId>,
    pub entries: Vec<(String, Entry)>,
}

/// A complete, declaratively built design: the input to `Simulator::new`.
pub struct Design {
    pub(crate) store: SignalStore,
    pub(crate) modules: Vec<ModuleNode>,
    pub(crate) processes: Vec<ProcessRecord>,
    pub(crate) testcases: Vec<Testcase>,
}

impl Design {
    /// Create a design containing only the root testbench module.
    pub fn new() -> Self {
        Self {
            store: SignalStore::default(),
            modules: vec![ModuleNode {
                name: ROOT_PATH.to_string(),
                path: ROOT_PATH.to_string(),
                kind: ModuleKind::TestBench,
                parent: None,
                children: Vec::new(),
                entries: Vec::new(),
            }],
            processes: Vec::new(),
            testcases: Vec::new(),
        }
    }

    /// Builder for the root testbench module.
    pub fn root(&mut self) -> ModuleBuilder<'_> {
        ModuleBuilder {
            design: self,
            module: ModuleId(0),
        }
    }

    /// Reopen a previously created module for further declarations.
    pub fn builder(&mut self, module: ModuleId) -> ModuleBuilder<'_> {
        ModuleBuilder {
            design: self,
            module,
        }
    }

    /// Register a named testcase. Testcases run in declaration order.
    pub fn testcase<F>(&mut self, name: &str, body: F) -> SimResult<()>
    where
        F: FnMut(&mut Simulator) -> Result<(), SimError> + 'static,
    {
        if self.testcases.iter().any(|t| t.name == name) {
            return Err(SimError::DuplicateName {
                module: ROOT_PATH.to_string(),
                name: name.to_string(),
            });
        }
        self.testcases.push(Testcase {
            name: name.to_string(),
            body: Box::new(body) as TestcaseFn,
        });
        Ok(())
    }

    #[inline]
    pub(crate) fn node(&self, id: ModuleId) -> &ModuleNode {
        &self.modules[id.0 as usize]
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, id: ModuleId) -> &mut ModuleNode {
        &mut self.modules[id.0 as usize]
    }

    /// Resolve a (possibly dotted) signal name against a module. Exact entry
    /// names win, which is how modport ports (`bus.clk`) resolve; otherwise
    /// the leading segment must name a child module and the rest resolves
    /// there. Aliases land on their terminal signal.
    pub(crate) fn resolve_signal(&self, module: ModuleId, name: &str) -> Option<SignalId> {
        let node = self.node(module);
        for (entry_name, entry) in &node.entries {
            if entry_name == name {
                return match entry {
                    Entry::Signal(id) | Entry::Port(id) => Some(*id),
                    Entry::Array(_) | Entry::Child(_) | Entry::Modport => None,
                };
            }
        }
        let (head, rest) = name.split_once('.')?;
        let child = node
            .children
            .iter()
            .copied()
            .find(|&child| self.node(child).name == head)?;
        self.resolve_signal(child, rest)
    }
}

impl Default for Design {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-signal directions making up a modport view of an interface.
#[derive(Clone, Debug, Default)]
pub struct ModportSpec {
    entries: Vec<(String, PortDir)>,
}

impl ModportSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expose `name` read-only.
    pub fn input(mut self, name: &str) -> Self {
        self.entries.push((name.to_string(), PortDir::Input));
        self
    }

    /// Expose `name` writable as a wire.
    pub fn output_wire(mut self, name: &str) -> Self {
        self.entries.push((name.to_string(), PortDir::OutputWire));
        self
    }

    /// Expose `name` writable as a register.
    pub fn output_reg(mut self, name: &str) -> Self {
        self.entries.push((name.to_string(), PortDir::OutputReg));
        self
    }
}

#[derive(Debug)]
struct ModportPort {
    name: String,
    dir: PortDir,
    ids: Vec<SignalId>,
    scalar: bool,
    target_path: String,
}

/// A consumer's instantiated modport: typed access to the aliases it copied.
#[derive(Debug)]
pub struct Modport {
    name: String,
    interface: String,
    ports: Vec<ModportPort>,
}

impl Modport {
    fn port(&self, name: &str, dir: PortDir, want_scalar: bool) -> SimResult<&ModportPort> {
        let p = self
            .ports
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| SimError::UnknownModportSignal {
                modport: self.name.clone(),
                interface: self.interface.clone(),
                name: name.to_string(),
            })?;
        if p.dir != dir || p.scalar != want_scalar {
            return Err(SimError::PortKindMismatch {
                port: format!("{}.{}", self.name, name),
                target: p.target_path.clone(),
                reason: "modport declares this port with a different direction",
            });
        }
        Ok(p)
    }

    pub fn input(&self, name: &str) -> SimResult<Input> {
        Ok(Input(self.port(name, PortDir::Input, true)?.ids[0]))
    }

    pub fn output_wire(&self, name: &str) -> SimResult<OutputWire> {
        Ok(OutputWire(self.port(name, PortDir::OutputWire, true)?.ids[0]))
    }

    pub fn output_reg(&self, name: &str) -> SimResult<OutputReg> {
        Ok(OutputReg(self.port(name, PortDir::OutputReg, true)?.ids[0]))
    }

    pub fn input_array(&self, name: &str) -> SimResult<InputArray> {
        let p = self.port(name, PortDir::Input, false)?;
        Ok(SignalArray::new(p.ids.iter().map(|&id| Input(id)).collect()))
    }

    pub fn output_wire_array(&self, name: &str) -> SimResult<OutputWireArray> {
        let p = self.port(name, PortDir::OutputWire, false)?;
        Ok(SignalArray::new(
            p.ids.iter().map(|&id| OutputWire(id)).collect(),
        ))
    }

    pub fn output_reg_array(&self, name: &str) -> SimResult<OutputRegArray> {
        let p = self.port(name, PortDir::OutputReg, false)?;
        Ok(SignalArray::new(
            p.ids.iter().map(|&id| OutputReg(id)).collect(),
        ))
    }
}

/// Declaration handle for one open module.
pub struct ModuleBuilder<'d> {
    design: &'d mut Design,
    module: ModuleId,
}

impl<'d> ModuleBuilder<'d> {
    /// Id of the module being built (for reopening or modport wiring).
    pub fn id(&self) -> ModuleId {
        self.module
    }

    /// Hierarchical path of the module being built.
    pub fn path(&self) -> &str {
        &self.design.node(self.module).path
    }

    fn ensure_unique(&self, name: &str) -> SimResult<()> {
        let node = self.design.node(self.module);
        let taken = node.entries.iter().any(|(n, _)| n == name)
            || self
                .design
                .processes
                .iter()
                .any(|p| p.module == self.module && p.name == name);
        if taken {
            return Err(SimError::DuplicateName {
                module: node.path.clone(),
                name: name.to_string(),
            });
        }
        Ok(())
    }

    fn add_signal(&mut self, kind: SignalKind, name: &str, spec: SignalSpec) -> SimResult<SignalId> {
        self.ensure_unique(name)?;
        let node = self.design.node(self.module);
        let path = format!("{}.{}", node.path, name);
        let external = node.kind == ModuleKind::TestBench && kind == SignalKind::Wire;
        let mut core = SignalCore::new(kind, spec, path)?;
        if external {
            core.mark_external();
        }
        let id = self.design.store.add(core);
        self.design
            .node_mut(self.module)
            .entries
            .push((name.to_string(), Entry::Signal(id)));
        Ok(id)
    }

    /// Declare an unsigned wire of `width` bits, initialized to zero.
    pub fn wire(&mut self, name: &str, width: u32) -> SimResult<Wire> {
        self.wire_spec(name, SignalSpec::new(width))
    }

    /// Declare a wire with full control over sign and initial value.
    pub fn wire_spec(&mut self, name: &str, spec: SignalSpec) -> SimResult<Wire> {
        Ok(Wire(self.add_signal(SignalKind::Wire, name, spec)?))
    }

    /// Declare an unsigned register of `width` bits, initialized to zero.
    pub fn reg(&mut self, name: &str, width: u32) -> SimResult<Reg> {
        self.reg_spec(name, SignalSpec::new(width))
    }

    /// Declare a register with full control over sign and initial value.
    pub fn reg_spec(&mut self, name: &str, spec: SignalSpec) -> SimResult<Reg> {
        Ok(Reg(self.add_signal(SignalKind::Reg, name, spec)?))
    }

    fn add_port(&mut self, dir: PortDir, name: &str, target: SignalId) -> SimResult<SignalId> {
        self.ensure_unique(name)?;
        let node = self.design.node(self.module);
        let port_path = format!("{}.{}", node.path, name);
        port::check_target(dir, &port_path, self.design.store.core(target))?;
        self.design
            .node_mut(self.module)
            .entries
            .push((name.to_string(), Entry::Port(target)));
        Ok(target)
    }

    /// Declare a read-only port over a wire-kind target.
    pub fn input(&mut self, name: &str, target: impl Sense) -> SimResult<Input> {
        Ok(Input(self.add_port(PortDir::Input, name, target.id())?))
    }

    /// Declare a writable port over a wire-kind target.
    pub fn output_wire(&mut self, name: &str, target: impl Sense) -> SimResult<OutputWire> {
        Ok(OutputWire(self.add_port(
            PortDir::OutputWire,
            name,
            target.id(),
        )?))
    }

    /// Declare a writable port over a reg-kind target.
    pub fn output_reg(&mut self, name: &str, target: impl Sense) -> SimResult<OutputReg> {
        Ok(OutputReg(self.add_port(
            PortDir::OutputReg,
            name,
            target.id(),
        )?))
    }

    fn add_array(
        &mut self,
        kind: SignalKind,
        name: &str,
        count: usize,
        spec: SignalSpec,
    ) -> SimResult<Vec<SignalId>> {
        self.ensure_unique(name)?;
        let node = self.design.node(self.module);
        let base_path = format!("{}.{}", node.path, name);
        let external = node.kind == ModuleKind::TestBench && kind == SignalKind::Wire;
        let mut ids = Vec::with_capacity(count);
        for i in 0..count {
            let mut core = SignalCore::new(kind, spec, format!("{base_path}[{i}]"))?;
            if external {
                core.mark_external();
            }
            ids.push(self.design.store.add(core));
        }
        self.design
            .node_mut(self.module)
            .entries
            .push((name.to_string(), Entry::Array(ids.clone())));
        Ok(ids)
    }

    /// Declare an array of `count` unsigned wires, each `width` bits.
    pub fn wire_array(&mut self, name: &str, count: usize, width: u32) -> SimResult<WireArray> {
        let ids = self.add_array(SignalKind::Wire, name, count, SignalSpec::new(width))?;
        Ok(SignalArray::new(ids.into_iter().map(Wire).collect()))
    }

    /// Declare an array of `count` unsigned registers, each `width` bits.
    pub fn reg_array(&mut self, name: &str, count: usize, width: u32) -> SimResult<RegArray> {
        let ids = self.add_array(SignalKind::Reg, name, count, SignalSpec::new(width))?;
        Ok(SignalArray::new(ids.into_iter().map(Reg).collect()))
    }

    fn add_alias_array<T: Sense>(
        &mut self,
        dir: PortDir,
        name: &str,
        targets: &SignalArray<T>,
    ) -> SimResult<Vec<SignalId>> {
        self.ensure_unique(name)?;
        let node = self.design.node(self.module);
        let base_path = format!("{}.{}", node.path, name);
        let mut ids = Vec::with_capacity(targets.len());
        for (i, target) in targets.iter().enumerate() {
            let port_path = format!("{base_path}[{i}]");
            port::check_target(dir, &port_path, self.design.store.core(target.id()))?;
            ids.push(target.id());
        }
        self.design
            .node_mut(self.module)
            .entries
            .push((name.to_string(), Entry::Array(ids.clone())));
        Ok(ids)
    }

    /// Declare per-element read-only aliases over a wire array.
    pub fn input_array<T: Sense>(
        &mut self,
        name: &str,
        targets: &SignalArray<T>,
    ) -> SimResult<InputArray> {
        let ids = self.add_alias_array(PortDir::Input, name, targets)?;
        Ok(SignalArray::new(ids.into_iter().map(Input).collect()))
    }

    /// Declare per-element writable aliases over a wire array.
    pub fn output_wire_array<T: Sense>(
        &mut self,
        name: &str,
        targets: &SignalArray<T>,
    ) -> SimResult<OutputWireArray> {
        let ids = self.add_alias_array(PortDir::OutputWire, name, targets)?;
        Ok(SignalArray::new(ids.into_iter().map(OutputWire).collect()))
    }

    /// Declare per-element writable aliases over a register array.
    pub fn output_reg_array<T: Sense>(
        &mut self,
        name: &str,
        targets: &SignalArray<T>,
    ) -> SimResult<OutputRegArray> {
        let ids = self.add_alias_array(PortDir::OutputReg, name, targets)?;
        Ok(SignalArray::new(ids.into_iter().map(OutputReg).collect()))
    }

    fn add_child(&mut self, kind: ModuleKind, name: &str) -> SimResult<ModuleId> {
        self.ensure_unique(name)?;
        let parent = self.module;
        let path = format!("{}.{}", self.design.node(parent).path, name);
        let id = ModuleId(self.design.modules.len() as u32);
        self.design.modules.push(ModuleNode {
            name: name.to_string(),
            path,
            kind,
            parent: Some(parent),
            children: Vec::new(),
            entries: Vec::new(),
        });
        let node = self.design.node_mut(parent);
        node.children.push(id);
        node.entries.push((name.to_string(), Entry::Child(id)));
        Ok(id)
    }

    /// Open a child module. The returned builder borrows this one; finish
    /// declaring the child before returning to the parent (or reopen either
    /// later through `Design::builder`).
    pub fn module(&mut self, name: &str) -> SimResult<ModuleBuilder<'_>> {
        let id = self.add_child(ModuleKind::Module, name)?;
        Ok(ModuleBuilder {
            design: &mut *self.design,
            module: id,
        })
    }

    /// Open a child interface: a module whose role is to own the signals a
    /// modport exposes.
    pub fn interface(&mut self, name: &str) -> SimResult<ModuleBuilder<'_>> {
        let id = self.add_child(ModuleKind::Interface, name)?;
        Ok(ModuleBuilder {
            design: &mut *self.design,
            module: id,
        })
    }

    /// Instantiate a modport view of `interface` on this module. Each port
    /// in `spec` is copied as an alias owned here, named `"<name>.<port>"`,
    /// with its direction checked against the interface signal's kind.
    pub fn modport(
        &mut self,
        name: &str,
        interface: ModuleId,
        spec: &ModportSpec,
    ) -> SimResult<Modport> {
        self.ensure_unique(name)?;
        self.design
            .node_mut(self.module)
            .entries
            .push((name.to_string(), Entry::Modport));
        let mut ports = Vec::with_capacity(spec.entries.len());
        for (port_name, dir) in &spec.entries {
            let iface = self.design.node(interface);
            let entry = iface
                .entries
                .iter()
                .find(|(n, _)| n == port_name)
                .map(|(_, e)| e.clone())
                .ok_or_else(|| SimError::UnknownModportSignal {
                    modport: format!("{}.{}", self.design.node(self.module).path, name),
                    interface: iface.path.clone(),
                    name: port_name.clone(),
                })?;
            let (ids, scalar) = match entry {
                Entry::Signal(id) | Entry::Port(id) => (vec![id], true),
                Entry::Array(ids) => (ids, false),
                Entry::Child(_) | Entry::Modport => {
                    return Err(SimError::UnknownModportSignal {
                        modport: format!("{}.{}", self.design.node(self.module).path, name),
                        interface: self.design.node(interface).path.clone(),
                        name: port_name.clone(),
                    });
                }
            };
            let full = format!("{name}.{port_name}");
            let port_path = format!("{}.{}", self.design.node(self.module).path, full);
            for id in &ids {
                port::check_target(*dir, &port_path, self.design.store.core(*id))?;
            }
            let target_path = self.design.store.core(ids[0]).path().to_string();
            let entry = if scalar {
                Entry::Port(ids[0])
            } else {
                Entry::Array(ids.clone())
            };
            self.design.node_mut(self.module).entries.push((full.clone(), entry));
            ports.push(ModportPort {
                name: port_name.clone(),
                dir: *dir,
                ids,
                scalar,
                target_path,
            });
        }
        Ok(Modport {
            name: name.to_string(),
            interface: self.design.node(interface).path.clone(),
            ports,
        })
    }

    fn add_process(&mut self, name: &str, kind: ProcessKind, body: ProcessFn) -> SimResult<()> {
        self.ensure_unique(name)?;
        let path = format!("{}.{}", self.design.node(self.module).path, name);
        self.design.processes.push(ProcessRecord {
            name: name.to_string(),
            path,
            module: self.module,
            kind,
            body,
        });
        Ok(())
    }

    /// Declare a combinational process. It runs every delta cycle of the
    /// active region and may only write wires.
    pub fn always_comb<F>(&mut self, name: &str, body: F) -> SimResult<()>
    where
        F: FnMut(&mut Scope) -> Result<(), SimError> + 'static,
    {
        self.add_process(name, ProcessKind::Comb, Box::new(body))
    }

    /// Declare a sequential process with its edge triggers, given as
    /// `(edge, signal_name)` pairs. Names resolve against this module's
    /// declarations when the simulator is built; dotted names reach through
    /// modports and child modules. It may only write registers.
    pub fn always_ff<F>(
        &mut self,
        name: &str,
        triggers: &[(Edge, &str)],
        body: F,
    ) -> SimResult<()>
    where
        F: FnMut(&mut Scope) -> Result<(), SimError> + 'static,
    {
        if triggers.is_empty() {
            return Err(SimError::EmptyTriggerList {
                process: format!("{}.{}", self.design.node(self.module).path, name),
            });
        }
        let triggers = triggers
            .iter()
            .map(|(edge, signal)| Trigger {
                edge: *edge,
                signal: (*signal).to_string(),
            })
            .collect();
        self.add_process(
            name,
            ProcessKind::Seq {
                triggers,
                bound: Vec::new(),
            },
            Box::new(body),
        )
    }
}
