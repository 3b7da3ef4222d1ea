//! Compute gate statistics
//!
//! ```
//! # use gatemap::network::{Netlist, GateKind};
//! # let net = Netlist::new();
//! use gatemap::network::stats::stats;
//! let stats = stats(&net);
//!
//! // Check that there is no Xor gate
//! assert_eq!(stats.nb_gates_of(GateKind::Xor), 0);
//!
//! // Show the statistics
//! println!("{}", stats);
//! ```

use std::fmt;

use crate::network::{GateKind, Netlist, NodeKind};

/// Number of inputs, outputs, gates and wires in a netlist
#[derive(Clone, Debug)]
pub struct NetlistStats {
    /// Number of inputs
    pub nb_inputs: usize,
    /// Number of outputs
    pub nb_outputs: usize,
    /// Number of gates of each kind, in registry order
    pub nb_by_kind: Vec<(GateKind, usize)>,
    /// Number of wires
    pub nb_wires: usize,
    /// Number of gate levels between inputs and outputs
    pub depth: usize,
    /// Largest number of input ports driven by a single node
    pub max_fanout: usize,
}

impl NetlistStats {
    /// Total number of gates
    pub fn nb_gates(&self) -> usize {
        self.nb_by_kind.iter().map(|(_, nb)| nb).sum()
    }

    /// Number of gates of a given kind
    pub fn nb_gates_of(&self, kind: GateKind) -> usize {
        self.nb_by_kind
            .iter()
            .find(|(k, _)| *k == kind)
            .map_or(0, |(_, nb)| *nb)
    }
}

impl fmt::Display for NetlistStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Stats:")?;
        writeln!(f, "  Inputs: {}", self.nb_inputs)?;
        writeln!(f, "  Outputs: {}", self.nb_outputs)?;
        writeln!(f, "  Gates: {}", self.nb_gates())?;
        for (kind, nb) in &self.nb_by_kind {
            if *nb != 0 {
                writeln!(f, "      {}: {}", kind, nb)?;
            }
        }
        writeln!(f, "  Wires: {}", self.nb_wires)?;
        writeln!(f, "  Depth: {}", self.depth)?;
        writeln!(f, "  Max fanout: {}", self.max_fanout)?;
        fmt::Result::Ok(())
    }
}

/// Compute the statistics of the netlist
pub fn stats(net: &Netlist) -> NetlistStats {
    let mut nb_by_kind: Vec<(GateKind, usize)> = GateKind::ALL.iter().map(|k| (*k, 0)).collect();
    let mut fanout = vec![0usize; net.nb_nodes()];
    for n in net.nodes() {
        if let NodeKind::Gate(g) = n.kind {
            nb_by_kind[g as usize].1 += 1;
        }
    }
    for w in net.wires() {
        fanout[w.from.index()] += 1;
    }
    let depth = net
        .outputs()
        .iter()
        .flat_map(|o| net.node(*o).children.iter())
        .map(|c| net.node(*c).level)
        .max()
        .unwrap_or(0);

    NetlistStats {
        nb_inputs: net.nb_inputs(),
        nb_outputs: net.nb_outputs(),
        nb_by_kind,
        nb_wires: net.wires().len(),
        depth,
        max_fanout: fanout.into_iter().max().unwrap_or(0),
    }
}
