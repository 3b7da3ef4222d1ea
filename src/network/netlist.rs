use core::fmt;

use itertools::Itertools;
use serde::Serialize;

use crate::network::gates::NodeKind;

/// Index of a node in a netlist
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Serialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Position of the node in the netlist
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// A node of the netlist: primary input, primary output or gate
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Identifier of the node
    pub id: NodeId,
    /// Kind of the node
    pub kind: NodeKind,
    /// Nodes driving the input ports, in port order
    pub children: Vec<NodeId>,
    /// Topological level; 0 for inputs
    pub level: usize,
    /// Index of the equation the node was created for
    pub group: usize,
    /// Name, for inputs and outputs
    pub label: Option<String>,
}

/// A connection from the output port of a node to an input port of another
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Wire {
    /// Driving node
    pub from: NodeId,
    /// Output port of the driving node
    pub from_index: usize,
    /// Driven node
    pub to: NodeId,
    /// Input port of the driven node
    pub to_index: usize,
}

/// Gate-level netlist generated from logic equations
///
/// Nodes are stored in an arena and refer to each other by index, so that a node can
/// drive several others. Nodes are kept in topological order: children come first.
#[derive(Debug, Clone, Default)]
pub struct Netlist {
    nodes: Vec<Node>,
    wires: Vec<Wire>,
    inputs: Vec<NodeId>,
    outputs: Vec<NodeId>,
}

impl Netlist {
    /// Create a new netlist
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the number of primary inputs
    pub fn nb_inputs(&self) -> usize {
        self.inputs.len()
    }

    /// Return the number of primary outputs
    pub fn nb_outputs(&self) -> usize {
        self.outputs.len()
    }

    /// Return the number of nodes, including inputs and outputs
    pub fn nb_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Return the number of gates
    pub fn nb_gates(&self) -> usize {
        self.nb_nodes() - self.nb_inputs() - self.nb_outputs()
    }

    /// Get the input at index i
    pub fn input(&self, i: usize) -> &Node {
        self.node(self.inputs[i])
    }

    /// Get the output at index i
    pub fn output(&self, i: usize) -> &Node {
        self.node(self.outputs[i])
    }

    /// Get a node by id
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// All nodes, in topological order
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// All wires
    pub fn wires(&self) -> &[Wire] {
        &self.wires
    }

    /// Input nodes, in creation order
    pub fn inputs(&self) -> &[NodeId] {
        &self.inputs
    }

    /// Output nodes, in creation order
    pub fn outputs(&self) -> &[NodeId] {
        &self.outputs
    }

    /// Highest level in the netlist
    pub fn max_level(&self) -> usize {
        self.nodes.iter().map(|n| n.level).max().unwrap_or(0)
    }

    /// Add a new primary input
    pub fn add_input(&mut self, label: &str) -> NodeId {
        let id = self.push(NodeKind::Input, Vec::new(), 0, 0, Some(label.to_string()));
        self.inputs.push(id);
        id
    }

    /// Add a new gate, one level above its deepest child, and wire its inputs
    pub fn add_gate(&mut self, kind: NodeKind, children: Vec<NodeId>, group: usize) -> NodeId {
        let level = 1 + children.iter().map(|c| self.node(*c).level).max().unwrap_or(0);
        self.push(kind, children, level, group, None)
    }

    /// Add a new primary output driven by an existing node
    pub fn add_output(&mut self, driver: NodeId, label: &str, group: usize) -> NodeId {
        let level = self.node(driver).level + 1;
        let id = self.push(
            NodeKind::Output,
            vec![driver],
            level,
            group,
            Some(label.to_string()),
        );
        self.outputs.push(id);
        id
    }

    fn push(
        &mut self,
        kind: NodeKind,
        children: Vec<NodeId>,
        level: usize,
        group: usize,
        label: Option<String>,
    ) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        for (i, c) in children.iter().enumerate() {
            self.wires.push(Wire {
                from: *c,
                from_index: 0,
                to: id,
                to_index: i,
            });
        }
        self.nodes.push(Node {
            id,
            kind,
            children,
            level,
            group,
            label,
        });
        id
    }

    /// Move every output to the same level, just after the deepest gate
    ///
    /// Outputs with a shallow logic cone are deliberately pushed to the last column.
    pub fn align_outputs(&mut self) {
        let max_gate_level = self
            .nodes
            .iter()
            .filter(|n| n.kind != NodeKind::Output)
            .map(|n| n.level)
            .max()
            .unwrap_or(0);
        for o in &self.outputs {
            self.nodes[o.index()].level = max_gate_level + 1;
        }
    }

    /// Check consistency of the datastructure
    pub fn check(&self) {
        for (i, n) in self.nodes.iter().enumerate() {
            assert_eq!(n.id.index(), i, "Invalid id for node {i}");
            assert!(
                n.children.len() <= n.kind.nb_inputs(),
                "Too many inputs for {} {}",
                n.kind,
                n.id
            );
            for c in &n.children {
                assert!(c.index() < i, "Node {} is not topologically sorted", n.id);
                assert!(self.node(*c).kind.has_output(), "Node {c} has no output");
                assert!(self.node(*c).level < n.level, "Invalid level for {}", n.id);
            }
            if n.kind == NodeKind::Input {
                assert_eq!(n.level, 0, "Input {} is not at level 0", n.id);
            } else {
                assert!(!n.children.is_empty(), "Node {} has no input", n.id);
            }
        }
        let nb_edges: usize = self.nodes.iter().map(|n| n.children.len()).sum();
        assert_eq!(nb_edges, self.wires.len(), "Wires do not match the nodes");
    }
}

impl fmt::Display for Netlist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Netlist with {} inputs, {} outputs:",
            self.nb_inputs(),
            self.nb_outputs()
        )?;
        for n in &self.nodes {
            match &n.label {
                Some(l) => write!(f, "\t{} = {} {}", n.id, n.kind, l)?,
                None => write!(f, "\t{} = {}", n.id, n.kind)?,
            }
            if !n.children.is_empty() {
                write!(f, "({})", n.children.iter().join(", "))?;
            }
            writeln!(f, " @{}", n.level)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Netlist, NodeId};
    use crate::network::{GateKind, NodeKind};

    #[test]
    fn test_basic() {
        let mut net = Netlist::new();
        let a = net.add_input("A");
        let b = net.add_input("B");
        let x = net.add_gate(NodeKind::Gate(GateKind::Xor), vec![a, b], 0);
        let n = net.add_gate(NodeKind::Gate(GateKind::Not), vec![x], 0);
        let o1 = net.add_output(n, "Y1", 0);
        let o2 = net.add_output(a, "Y2", 1);
        net.align_outputs();
        net.check();

        assert_eq!(net.nb_inputs(), 2);
        assert_eq!(net.nb_outputs(), 2);
        assert_eq!(net.nb_nodes(), 6);
        assert_eq!(net.nb_gates(), 2);
        assert_eq!(net.node(x).level, 1);
        assert_eq!(net.node(n).level, 2);
        assert_eq!(net.node(o1).level, 3);
        assert_eq!(net.node(o2).level, 3);
        assert_eq!(net.max_level(), 3);
        assert_eq!(net.wires().len(), 5);
        assert_eq!(net.input(1).label.as_deref(), Some("B"));
        assert_eq!(net.output(1).children, vec![a]);
        assert_eq!(x, NodeId(2));
    }

    #[test]
    fn test_fanout() {
        let mut net = Netlist::new();
        let a = net.add_input("A");
        let g1 = net.add_gate(NodeKind::Gate(GateKind::Nand), vec![a, a], 0);
        let g2 = net.add_gate(NodeKind::Gate(GateKind::Not), vec![a], 0);
        net.add_output(g1, "Y1", 0);
        net.add_output(g2, "Y2", 0);
        net.check();
        let from_a = net.wires().iter().filter(|w| w.from == a).count();
        assert_eq!(from_a, 3);
        assert_eq!(net.wires()[1].to_index, 1);
    }

    #[test]
    #[should_panic]
    fn test_too_many_inputs() {
        let mut net = Netlist::new();
        let a = net.add_input("A");
        net.add_gate(NodeKind::Gate(GateKind::Not), vec![a, a], 0);
        net.check();
    }
}
