//! IO for .bench (ISCAS) files

use std::io::{Result, Write};

use itertools::Itertools;

use crate::network::{GateKind, Netlist, NodeId, NodeKind};

/// Name of a label in .bench files, where only alphanumeric characters are safe
fn sanitize(label: &str) -> String {
    label
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

fn node_name(net: &Netlist, id: NodeId) -> String {
    let n = net.node(id);
    match (&n.kind, &n.label) {
        (NodeKind::Input, Some(l)) => sanitize(l),
        _ => id.to_string(),
    }
}

fn bench_gate(kind: GateKind) -> &'static str {
    match kind {
        GateKind::Nand4 => "NAND",
        k => k.name(),
    }
}

/// Write a netlist in .bench format, as used by the ISCAS benchmarks
///
/// Inputs and outputs keep their labels, and gates are named after their node id:
/// ```text
///     INPUT(A)
///     INPUT(B)
///     OUTPUT(Y)
///     n2 = NAND(A, B)
///     n3 = NAND(n2, n2)
///     Y = BUF(n3)
/// ```
pub fn write_bench<W: Write>(w: &mut W, net: &Netlist) -> Result<()> {
    writeln!(w, "# .bench (ISCAS) file")?;
    writeln!(w, "# Generated by gatemap")?;
    for id in net.inputs() {
        writeln!(w, "INPUT({})", node_name(net, *id))?;
    }
    writeln!(w)?;
    for i in 0..net.nb_outputs() {
        writeln!(w, "OUTPUT({})", sanitize(net.output(i).label.as_deref().unwrap_or("")))?;
    }
    writeln!(w)?;
    for n in net.nodes() {
        let deps = n.children.iter().map(|c| node_name(net, *c)).join(", ");
        match n.kind {
            NodeKind::Input => (),
            NodeKind::Gate(g) => writeln!(w, "{} = {}({})", n.id, bench_gate(g), deps)?,
            NodeKind::Output => writeln!(
                w,
                "{} = BUF({})",
                sanitize(n.label.as_deref().unwrap_or("")),
                deps
            )?,
        }
    }
    Ok(())
}
