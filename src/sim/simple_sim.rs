use crate::network::{Netlist, NodeKind};

/// Structure for simulation based directly on the netlist representation
pub struct SimpleSimulator<'a> {
    net: &'a Netlist,
    node_values: Vec<u64>,
}

impl<'a> SimpleSimulator<'a> {
    pub fn from_netlist(net: &'a Netlist) -> SimpleSimulator<'a> {
        SimpleSimulator {
            net,
            node_values: vec![0; net.nb_nodes()],
        }
    }

    /// Run on 64 patterns; one word per input, one word per output
    pub fn run(&mut self, input_values: &[u64]) -> Vec<u64> {
        assert_eq!(input_values.len(), self.net.nb_inputs());
        self.reset();
        self.copy_inputs(input_values);
        self.run_comb();
        self.get_output_values()
    }

    fn reset(&mut self) {
        self.node_values = vec![0; self.net.nb_nodes()];
    }

    fn copy_inputs(&mut self, inputs: &[u64]) {
        for (id, v) in self.net.inputs().iter().zip(inputs) {
            self.node_values[id.index()] = *v;
        }
    }

    fn run_comb(&mut self) {
        // Nodes are topologically sorted, so children are always computed first
        let mut operands = Vec::new();
        for n in self.net.nodes() {
            operands.clear();
            operands.extend(n.children.iter().map(|c| self.node_values[c.index()]));
            let val = match n.kind {
                NodeKind::Input => continue,
                NodeKind::Output => operands[0],
                NodeKind::Gate(g) => g.eval(&operands),
            };
            self.node_values[n.id.index()] = val;
        }
    }

    fn get_output_values(&self) -> Vec<u64> {
        self.net
            .outputs()
            .iter()
            .map(|o| self.node_values[o.index()])
            .collect()
    }
}
