use fxhash::{FxHashMap, FxHashSet};
use tracing::debug;

use crate::expr::{Equation, Expr};
use crate::network::{Netlist, NodeId, NodeKind};
use crate::synth::{Operand, SynthesisError, Synthesizer};

/// Incremental construction of a netlist from equations, one per output
///
/// All inputs are created upfront, in order of first appearance across the equations,
/// so that a name used by several equations maps to a single input node.
pub struct NetlistBuilder<'a> {
    synth: &'a Synthesizer,
    netlist: Netlist,
    inputs: FxHashMap<String, NodeId>,
    roots: Vec<(NodeId, String, usize)>,
}

impl<'a> NetlistBuilder<'a> {
    /// Create the builder and the input nodes for every variable of the expressions
    pub fn new<'e, I>(synth: &'a Synthesizer, exprs: I) -> Self
    where
        I: IntoIterator<Item = &'e Expr>,
    {
        let mut names = Vec::new();
        let mut seen = FxHashSet::default();
        for e in exprs {
            e.collect_variables(&mut names, &mut seen);
        }
        let mut ret = NetlistBuilder {
            synth,
            netlist: Netlist::new(),
            inputs: FxHashMap::default(),
            roots: Vec::new(),
        };
        for name in names {
            ret.intern(&name);
        }
        ret
    }

    /// Input node for a name, created if needed
    fn intern(&mut self, name: &str) -> NodeId {
        if let Some(id) = self.inputs.get(name) {
            return *id;
        }
        let id = self.netlist.add_input(name);
        self.inputs.insert(name.to_string(), id);
        id
    }

    /// Synthesize an equation and add its gates
    ///
    /// Each gate of the mapping becomes one node, so that shared logic is built once.
    /// Returns the node driving the output. Outputs themselves are added by [`Self::finish`].
    pub fn add_equation(&mut self, eq: &Equation, group: usize) -> Result<NodeId, SynthesisError> {
        let mapped = self.synth.synthesize(&eq.expr.flatten())?;
        let mut ids = Vec::with_capacity(mapped.nb_gates());
        for g in mapped.gates() {
            let children: Vec<NodeId> = g.operands.iter().map(|o| self.resolve(o, &ids)).collect();
            ids.push(self.netlist.add_gate(NodeKind::Gate(g.kind), children, group));
        }
        let root = self.resolve(mapped.root(), &ids);
        debug!(
            output = %eq.label,
            gates = ids.len(),
            level = self.netlist.node(root).level,
            "mapped equation"
        );
        self.roots.push((root, eq.label.clone(), group));
        Ok(root)
    }

    /// Node of an operand, given the nodes created for the gates of its mapping
    fn resolve(&mut self, o: &Operand, ids: &[NodeId]) -> NodeId {
        match o {
            Operand::Var(name) => self.intern(name),
            Operand::Gate(i) => ids[*i as usize],
        }
    }

    /// Add the outputs and return the finished netlist
    pub fn finish(mut self) -> Netlist {
        for (root, label, group) in std::mem::take(&mut self.roots) {
            self.netlist.add_output(root, &label, group);
        }
        self.netlist.align_outputs();
        self.netlist.check();
        self.netlist
    }
}

/// Build a netlist from equations, mapped with the given synthesizer
pub fn build_netlist(equations: &[Equation], synth: &Synthesizer) -> Result<Netlist, SynthesisError> {
    let mut builder = NetlistBuilder::new(synth, equations.iter().map(|eq| &eq.expr));
    for (i, eq) in equations.iter().enumerate() {
        builder.add_equation(eq, i)?;
    }
    Ok(builder.finish())
}

#[cfg(test)]
mod tests {
    use super::build_netlist;
    use crate::expr::{parse_equation, Equation};
    use crate::network::{GateKind, GateSet, Netlist, NodeKind};
    use crate::sim::simulate;
    use crate::synth::{SynthesisError, Synthesizer};

    fn equations(lines: &[&str]) -> Vec<Equation> {
        lines
            .iter()
            .enumerate()
            .map(|(i, l)| parse_equation(l, i, false).unwrap())
            .collect()
    }

    fn build(lines: &[&str], allowed: &str) -> Result<Netlist, SynthesisError> {
        let synth = Synthesizer::new(allowed.parse::<GateSet>().unwrap());
        build_netlist(&equations(lines), &synth)
    }

    fn count(net: &Netlist, kind: NodeKind) -> usize {
        net.nodes().iter().filter(|n| n.kind == kind).count()
    }

    #[test]
    fn test_single_and() {
        let net = build(&["Y = A AND B"], "AND").unwrap();
        assert_eq!(net.nb_inputs(), 2);
        assert_eq!(net.nb_gates(), 1);
        assert_eq!(net.nb_outputs(), 1);
        assert_eq!(net.input(0).label.as_deref(), Some("A"));
        assert_eq!(net.input(1).label.as_deref(), Some("B"));
        let gate = &net.nodes()[2];
        assert_eq!(gate.kind, NodeKind::Gate(GateKind::And));
        assert_eq!(gate.level, 1);
        assert_eq!(net.output(0).level, 2);
        assert_eq!(net.output(0).label.as_deref(), Some("Y"));
        let into_gate = net.wires().iter().filter(|w| w.to == gate.id).count();
        let into_output = net.wires().iter().filter(|w| w.to == net.outputs()[0]).count();
        assert_eq!(into_gate, 2);
        assert_eq!(into_output, 1);
        assert_eq!(net.wires().len(), 3);
    }

    #[test]
    fn test_and_from_nand() {
        let net = build(&["Y = A AND B"], "NAND").unwrap();
        // NAND(NAND(A, B), NAND(A, B)), the inner gate driving both ports
        assert_eq!(count(&net, NodeKind::Gate(GateKind::Nand)), 2);
        assert_eq!(net.nb_gates(), 2);
        let outer = &net.nodes()[3];
        assert_eq!(outer.children, vec![net.nodes()[2].id, net.nodes()[2].id]);
        assert_eq!(net.output(0).level, 3);
        let a = 0b1100u64;
        let b = 0b1010u64;
        assert_eq!(simulate(&net, &[a, b])[0] & 0xf, 0b1000);
    }

    #[test]
    fn test_shared_inputs() {
        let net = build(&["Y1 = A AND B", "Y2 = a OR b"], "AND,OR").unwrap();
        assert_eq!(net.nb_inputs(), 2);
        assert_eq!(count(&net, NodeKind::Input), 2);
        let a = net.inputs()[0];
        let b = net.inputs()[1];
        for id in [a, b] {
            let consumers = net.wires().iter().filter(|w| w.from == id).count();
            assert_eq!(consumers, 2);
        }
        assert_eq!(net.output(1).label.as_deref(), Some("Y2"));
        assert_eq!(net.nodes()[3].group, 1);
    }

    #[test]
    fn test_input_order() {
        let net = build(&["C AND A", "B OR NAND4(D, A)"], "AND,OR,NAND4").unwrap();
        let names: Vec<_> = net
            .inputs()
            .iter()
            .map(|i| net.node(*i).label.clone().unwrap())
            .collect();
        assert_eq!(names, vec!["C", "A", "B", "D"]);
        assert_eq!(net.output(0).label.as_deref(), Some("Y1"));
        assert_eq!(net.output(1).label.as_deref(), Some("Y2"));
    }

    #[test]
    fn test_output_alignment() {
        let net = build(&["Y1 = A", "Y2 = (A XOR B) AND C"], "AND,XOR").unwrap();
        assert_eq!(net.output(0).level, 3);
        assert_eq!(net.output(1).level, 3);
        // Output wires come last
        let last = net.wires()[net.wires().len() - 2];
        assert_eq!(last.to, net.outputs()[0]);
        assert_eq!(last.from, net.inputs()[0]);
    }

    #[test]
    fn test_nand4_padding() {
        let net = build(&["NAND4(A, B, C)"], "NAND4").unwrap();
        let gate = &net.nodes()[3];
        assert_eq!(gate.kind, NodeKind::Gate(GateKind::Nand4));
        assert_eq!(gate.children, vec![net.inputs()[0], net.inputs()[1], net.inputs()[2], net.inputs()[2]]);
        let ports: Vec<_> = net
            .wires()
            .iter()
            .filter(|w| w.to == gate.id)
            .map(|w| w.to_index)
            .collect();
        assert_eq!(ports, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_polynomial_size() {
        let xor = (0..12).map(|i| format!("X{i}")).collect::<Vec<_>>().join(" XOR ");
        let and = (0..24).map(|i| format!("X{i}")).collect::<Vec<_>>().join(" AND ");
        let net = build(&[&xor, &and], "NAND").unwrap();
        assert_eq!(net.nb_inputs(), 24);
        // 9 gates per 2-input Xor, 2 per 2-input And
        assert!(net.nb_gates() <= 9 * 11 + 2 * 23, "{} gates", net.nb_gates());
        assert_eq!(net.wires().len(), net.nodes().iter().map(|n| n.children.len()).sum::<usize>());
    }

    #[test]
    fn test_failure() {
        let res = build(&["Y = A AND B", "Z = NOT A"], "AND,OR");
        assert_eq!(res.unwrap_err(), SynthesisError::Ungeneratable("NOT".into()));
    }
}
