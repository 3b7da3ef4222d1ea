use std::fmt;

use fxhash::{FxHashMap, FxHashSet};

use crate::network::{GateKind, GateSet};

/// Input of a mapped gate: a variable, or the output of a previous gate
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Operand {
    /// Variable of the expression
    Var(String),
    /// Index of a gate in the [`Mapping`]
    Gate(u32),
}

/// Gate of a [`Mapping`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MappedGate {
    /// Kind of gate, always one of the allowed gates
    pub kind: GateKind,
    /// Inputs of the gate, in port order
    pub operands: Vec<Operand>,
}

/// Result of technology mapping: a circuit of allowed gates
///
/// Gates are in topological order and structurally unique: a rewrite that uses an operand
/// several times, such as `NAND(x, x)`, refers to a single gate for `x`. Every gate is
/// reachable from the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mapping {
    gates: Vec<MappedGate>,
    root: Operand,
}

impl Mapping {
    /// Gates of the circuit, in topological order
    pub fn gates(&self) -> &[MappedGate] {
        &self.gates
    }

    /// Number of gates
    pub fn nb_gates(&self) -> usize {
        self.gates.len()
    }

    /// Operand computing the expression
    pub fn root(&self) -> &Operand {
        &self.root
    }

    /// Returns true if all gates are in the set
    pub fn uses_only(&self, allowed: &GateSet) -> bool {
        self.gates.iter().all(|g| allowed.contains(g.kind))
    }

    /// Variables used by the circuit, in order of first use
    pub fn variables(&self) -> Vec<String> {
        let mut seen = FxHashSet::default();
        let mut ret = Vec::new();
        let operands = self.gates.iter().flat_map(|g| &g.operands);
        for o in operands.chain(std::iter::once(&self.root)) {
            if let Operand::Var(v) = o {
                if seen.insert(v.as_str()) {
                    ret.push(v.clone());
                }
            }
        }
        ret
    }

    /// Evaluate the circuit on 64 patterns at once, one word per variable
    ///
    /// Returns None if a variable has no value.
    pub fn eval(&self, values: &FxHashMap<String, u64>) -> Option<u64> {
        let mut gate_values = Vec::with_capacity(self.gates.len());
        for g in &self.gates {
            let inputs = g
                .operands
                .iter()
                .map(|o| operand_value(o, values, &gate_values))
                .collect::<Option<Vec<u64>>>()?;
            gate_values.push(g.kind.eval(&inputs));
        }
        operand_value(&self.root, values, &gate_values)
    }

    fn fmt_operand(&self, o: &Operand, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match o {
            Operand::Var(v) => write!(f, "{v}"),
            Operand::Gate(i) => {
                let g = &self.gates[*i as usize];
                write!(f, "{}(", g.kind)?;
                for (k, c) in g.operands.iter().enumerate() {
                    if k != 0 {
                        write!(f, ", ")?;
                    }
                    self.fmt_operand(c, f)?;
                }
                write!(f, ")")
            }
        }
    }
}

fn operand_value(o: &Operand, values: &FxHashMap<String, u64>, gate_values: &[u64]) -> Option<u64> {
    match o {
        Operand::Var(v) => values.get(v).copied(),
        Operand::Gate(i) => gate_values.get(*i as usize).copied(),
    }
}

/// Show the circuit as an expression; a shared gate is written at each use
impl fmt::Display for Mapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_operand(&self.root, f)
    }
}

/// Hash-consed gate storage used while mapping
///
/// Rewrite attempts that fail may leave unused gates behind; they are removed by
/// [`Arena::finish`].
#[derive(Debug, Default)]
pub(super) struct Arena {
    gates: Vec<MappedGate>,
    index: FxHashMap<MappedGate, u32>,
}

impl Arena {
    /// Add a gate, or return the identical gate added before
    pub fn add(&mut self, kind: GateKind, operands: Vec<Operand>) -> Operand {
        let gate = MappedGate { kind, operands };
        if let Some(i) = self.index.get(&gate) {
            return Operand::Gate(*i);
        }
        let i = self.gates.len() as u32;
        self.index.insert(gate.clone(), i);
        self.gates.push(gate);
        Operand::Gate(i)
    }

    /// Number of gates added so far, including unused ones
    pub fn nb_gates(&self) -> usize {
        self.gates.len()
    }

    /// Keep the gates reachable from the root, renumbered in the same order
    pub fn finish(self, root: Operand) -> Mapping {
        let mut used = vec![false; self.gates.len()];
        if let Operand::Gate(i) = &root {
            used[*i as usize] = true;
        }
        for i in (0..self.gates.len()).rev() {
            if !used[i] {
                continue;
            }
            for o in &self.gates[i].operands {
                if let Operand::Gate(j) = o {
                    used[*j as usize] = true;
                }
            }
        }

        let mut renumbered = vec![0u32; self.gates.len()];
        let mut gates = Vec::new();
        for (i, g) in self.gates.into_iter().enumerate() {
            if !used[i] {
                continue;
            }
            renumbered[i] = gates.len() as u32;
            let operands = g.operands.iter().map(|o| renumber(o, &renumbered)).collect();
            gates.push(MappedGate {
                kind: g.kind,
                operands,
            });
        }
        let root = renumber(&root, &renumbered);
        Mapping { gates, root }
    }
}

fn renumber(o: &Operand, renumbered: &[u32]) -> Operand {
    match o {
        Operand::Var(v) => Operand::Var(v.clone()),
        Operand::Gate(i) => Operand::Gate(renumbered[*i as usize]),
    }
}
