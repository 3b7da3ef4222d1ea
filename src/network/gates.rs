use std::fmt;
use std::str::FromStr;

use itertools::Itertools;
use serde::{Deserialize, Serialize, Serializer};

/// Logic primitives available for technology mapping
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GateKind {
    /// 2-input And gate
    And,
    /// 2-input Or gate
    Or,
    /// Inverter
    Not,
    /// 2-input Nand gate
    Nand,
    /// 2-input Nor gate
    Nor,
    /// 2-input Xor gate
    Xor,
    /// 2-input Xnor gate
    Xnor,
    /// 4-input Nand gate
    Nand4,
}

impl GateKind {
    /// All gate kinds, in registry order
    pub const ALL: [GateKind; 8] = [
        GateKind::And,
        GateKind::Or,
        GateKind::Not,
        GateKind::Nand,
        GateKind::Nor,
        GateKind::Xor,
        GateKind::Xnor,
        GateKind::Nand4,
    ];

    /// Upper-case name of the gate, as used in expressions and output files
    pub fn name(&self) -> &'static str {
        use GateKind::*;
        match self {
            And => "AND",
            Or => "OR",
            Not => "NOT",
            Nand => "NAND",
            Nor => "NOR",
            Xor => "XOR",
            Xnor => "XNOR",
            Nand4 => "NAND4",
        }
    }

    /// Operator keyword in infix expressions, if any
    ///
    /// Nand4 has no keyword and is only reachable through function-call syntax.
    pub fn keyword(&self) -> Option<&'static str> {
        match self {
            GateKind::Nand4 => None,
            _ => Some(self.name()),
        }
    }

    /// Look up a gate kind by name, ignoring case
    pub fn from_name(name: &str) -> Option<GateKind> {
        GateKind::ALL
            .into_iter()
            .find(|k| k.name().eq_ignore_ascii_case(name))
    }

    /// Look up an infix operator keyword (the name must already be upper-case)
    pub fn from_keyword(word: &str) -> Option<GateKind> {
        GateKind::ALL
            .into_iter()
            .find(|k| k.keyword() == Some(word))
    }

    /// Number of input ports of the gate symbol
    pub fn nb_inputs(&self) -> usize {
        match self {
            GateKind::Not => 1,
            GateKind::Nand4 => 4,
            _ => 2,
        }
    }

    /// Returns whether nested gates of this kind can be merged or regrouped freely
    pub fn is_associative(&self) -> bool {
        matches!(self, GateKind::And | GateKind::Or | GateKind::Xor)
    }

    /// For an inverted gate, the non-inverted gate it complements
    pub fn inverted_base(&self) -> Option<GateKind> {
        match self {
            GateKind::Nand | GateKind::Nand4 => Some(GateKind::And),
            GateKind::Nor => Some(GateKind::Or),
            GateKind::Xnor => Some(GateKind::Xor),
            _ => None,
        }
    }

    /// Evaluate the gate on 64 patterns at once
    pub fn eval(&self, inputs: &[u64]) -> u64 {
        let and = || inputs.iter().fold(!0u64, |acc, v| acc & v);
        let or = || inputs.iter().fold(0u64, |acc, v| acc | v);
        let xor = || inputs.iter().fold(0u64, |acc, v| acc ^ v);
        match self {
            GateKind::And => and(),
            GateKind::Or => or(),
            GateKind::Not => !inputs[0],
            GateKind::Nand | GateKind::Nand4 => !and(),
            GateKind::Nor => !or(),
            GateKind::Xor => xor(),
            GateKind::Xnor => !xor(),
        }
    }
}

impl fmt::Display for GateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for GateKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GateKind::from_name(s.trim()).ok_or_else(|| format!("Unknown gate kind {}", s.trim()))
    }
}

/// Kind of a node in a netlist
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum NodeKind {
    /// Primary input
    Input,
    /// Primary output
    Output,
    /// Logic gate
    Gate(GateKind),
}

impl NodeKind {
    /// Upper-case name of the node kind
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Input => "INPUT",
            NodeKind::Output => "OUTPUT",
            NodeKind::Gate(g) => g.name(),
        }
    }

    /// Number of input ports
    pub fn nb_inputs(&self) -> usize {
        match self {
            NodeKind::Input => 0,
            NodeKind::Output => 1,
            NodeKind::Gate(g) => g.nb_inputs(),
        }
    }

    /// Returns whether the node drives other nodes
    pub fn has_output(&self) -> bool {
        !matches!(self, NodeKind::Output)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl Serialize for NodeKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Set of gate kinds allowed in a synthesized circuit
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Serialize, Deserialize)]
#[serde(from = "Vec<GateKind>", into = "Vec<GateKind>")]
pub struct GateSet {
    bits: u16,
}

impl GateSet {
    /// The empty set
    pub fn empty() -> GateSet {
        GateSet { bits: 0 }
    }

    /// Every gate kind
    pub fn all() -> GateSet {
        GateKind::ALL.into_iter().collect()
    }

    fn bit(kind: GateKind) -> u16 {
        1 << (kind as u16)
    }

    /// Returns whether the kind is allowed
    pub fn contains(&self, kind: GateKind) -> bool {
        self.bits & GateSet::bit(kind) != 0
    }

    /// Allow a new kind
    pub fn insert(&mut self, kind: GateKind) {
        self.bits |= GateSet::bit(kind);
    }

    /// Forbid a kind
    pub fn remove(&mut self, kind: GateKind) {
        self.bits &= !GateSet::bit(kind);
    }

    /// Returns whether no kind is allowed
    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Number of allowed kinds
    pub fn len(&self) -> usize {
        self.bits.count_ones() as usize
    }

    /// Allowed kinds, in registry order
    pub fn iter(&self) -> impl Iterator<Item = GateKind> + '_ {
        GateKind::ALL.into_iter().filter(|k| self.contains(*k))
    }
}

impl Default for GateSet {
    /// The gates enabled by default: everything except the 4-input Nand and the Xnor
    fn default() -> Self {
        use GateKind::*;
        [And, Or, Not, Nand, Nor, Xor].into_iter().collect()
    }
}

impl FromIterator<GateKind> for GateSet {
    fn from_iter<I: IntoIterator<Item = GateKind>>(iter: I) -> Self {
        let mut ret = GateSet::empty();
        for k in iter {
            ret.insert(k);
        }
        ret
    }
}

impl From<Vec<GateKind>> for GateSet {
    fn from(v: Vec<GateKind>) -> Self {
        v.into_iter().collect()
    }
}

impl From<GateSet> for Vec<GateKind> {
    fn from(s: GateSet) -> Self {
        s.iter().collect()
    }
}

impl FromStr for GateSet {
    type Err = String;

    /// Parse a comma-separated list of gate names, such as `AND,OR,NOT`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(GateKind::from_str)
            .collect()
    }
}

impl fmt::Display for GateSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.iter().join(","))
    }
}
