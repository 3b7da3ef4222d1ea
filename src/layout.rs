//! Placement and routing of a netlist into a schematic
//!
//! Nodes are placed in columns by level, and wires are drawn as orthogonal paths between
//! the ports of the nodes they connect.
//!
//! ```
//! # use gatemap::expr::parse_equation;
//! # use gatemap::network::build_netlist;
//! # use gatemap::synth::Synthesizer;
//! # use gatemap::config::{LayoutConfig, RouteConfig};
//! use gatemap::layout::{layout, StandardPorts};
//! let eqs = vec![parse_equation("Y = A AND B", 0, false).unwrap()];
//! let net = build_netlist(&eqs, &Synthesizer::new("AND".parse().unwrap())).unwrap();
//! let schematic = layout(&net, &LayoutConfig::default(), &RouteConfig::default(), &StandardPorts);
//! assert_eq!(schematic.nodes.len(), 4);
//! assert_eq!(schematic.wires.len(), 3);
//! ```

mod geometry;
mod place;
mod route;

pub use geometry::{Point, PortGeometry, StandardPorts};
pub use place::place;
pub use route::{route, WirePath};

use serde::Serialize;
use tracing::debug;

use crate::config::{LayoutConfig, RouteConfig};
use crate::network::{Netlist, NodeId, NodeKind};

/// A netlist node with its position on the schematic
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionedNode {
    /// Identifier of the node in the netlist
    pub id: NodeId,
    /// Kind of the node
    pub kind: NodeKind,
    /// Topological level, which gives the column
    pub level: usize,
    /// Horizontal position of the node origin
    pub x: f64,
    /// Vertical position of the node origin
    pub y: f64,
    /// Name, for inputs and outputs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl PositionedNode {
    /// Origin of the node
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// A netlist wire with its path on the schematic
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutedWire {
    /// Position of the wire in the netlist
    pub id: usize,
    /// Driving node
    pub from: NodeId,
    /// Output port of the driving node
    pub from_index: usize,
    /// Driven node
    pub to: NodeId,
    /// Input port of the driven node
    pub to_index: usize,
    /// Orthogonal path between the two ports
    pub path: WirePath,
}

/// Positioned nodes and routed wires of a netlist
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Schematic {
    /// Nodes, indexed by node id
    pub nodes: Vec<PositionedNode>,
    /// Wires, in netlist order
    pub wires: Vec<RoutedWire>,
}

impl Schematic {
    /// Get a node by id
    pub fn node(&self, id: NodeId) -> &PositionedNode {
        &self.nodes[id.index()]
    }

    /// Bottom-right corner of the area covered by node origins and wires
    pub fn extent(&self) -> Point {
        let corners = self
            .nodes
            .iter()
            .map(|n| n.origin())
            .chain(self.wires.iter().flat_map(|w| w.path.points()));
        corners.fold(Point::default(), |acc, p| {
            Point::new(acc.x.max(p.x), acc.y.max(p.y))
        })
    }
}

/// Place the nodes of a netlist and route its wires
pub fn layout(
    net: &Netlist,
    layout_cfg: &LayoutConfig,
    route_cfg: &RouteConfig,
    ports: &dyn PortGeometry,
) -> Schematic {
    let positions = place(net, layout_cfg);
    let nodes: Vec<PositionedNode> = net
        .nodes()
        .iter()
        .map(|n| PositionedNode {
            id: n.id,
            kind: n.kind,
            level: n.level,
            x: positions[n.id.index()].x,
            y: positions[n.id.index()].y,
            label: n.label.clone(),
        })
        .collect();

    let wires: Vec<RoutedWire> = net
        .wires()
        .iter()
        .enumerate()
        .map(|(i, w)| {
            let from = &nodes[w.from.index()];
            let to = &nodes[w.to.index()];
            // Missing ports fall back to the node origin
            let start = from.origin()
                + ports
                    .output_port(from.kind, w.from_index)
                    .unwrap_or_default();
            let end = to.origin() + ports.input_port(to.kind, w.to_index).unwrap_or_default();
            RoutedWire {
                id: i,
                from: w.from,
                from_index: w.from_index,
                to: w.to,
                to_index: w.to_index,
                path: route(start, end, i, route_cfg),
            }
        })
        .collect();

    debug!(
        nodes = nodes.len(),
        wires = wires.len(),
        columns = net.max_level() + 1,
        "layout done"
    );
    Schematic { nodes, wires }
}

#[cfg(test)]
mod tests {
    use super::{layout, Point, StandardPorts};
    use crate::config::{LayoutConfig, RouteConfig};
    use crate::expr::parse_equation;
    use crate::network::{build_netlist, NodeId};
    use crate::synth::Synthesizer;

    #[test]
    fn test_layout() {
        let eqs = vec![parse_equation("Y = A AND B", 0, false).unwrap()];
        let net = build_netlist(&eqs, &Synthesizer::new("AND".parse().unwrap())).unwrap();
        let s = layout(
            &net,
            &LayoutConfig::default(),
            &RouteConfig::default(),
            &StandardPorts,
        );
        assert_eq!(s.node(NodeId(2)).origin(), Point::new(250.0, 145.0));
        assert_eq!(s.node(NodeId(3)).label.as_deref(), Some("Y"));

        // Input A output port to the first AND port
        let w = &s.wires[0];
        assert_eq!(w.path.start, Point::new(90.0, 130.0));
        assert_eq!(w.path.end, Point::new(260.0, 160.0));
        // Output wire ends on the output port
        let w = &s.wires[2];
        assert_eq!(w.from, NodeId(2));
        assert_eq!(w.to, NodeId(3));
        assert_eq!(w.path.start, Point::new(310.0, 175.0));
        assert_eq!(w.path.end, Point::new(455.0, 175.0));

        for w in &s.wires {
            let p = &w.path;
            let (left, right) = (p.start.x.min(p.end.x), p.start.x.max(p.end.x));
            assert!(p.bend_x >= left && p.bend_x <= right);
        }
        assert_eq!(s.extent(), Point::new(455.0, 220.0));
    }

    #[test]
    fn test_json() {
        let eqs = vec![parse_equation("Y = NOT A", 0, false).unwrap()];
        let net = build_netlist(&eqs, &Synthesizer::new("NOT".parse().unwrap())).unwrap();
        let s = layout(
            &net,
            &LayoutConfig::default(),
            &RouteConfig::default(),
            &StandardPorts,
        );
        let v = serde_json::to_value(&s).unwrap();
        assert_eq!(v["nodes"][0]["kind"], "INPUT");
        assert_eq!(v["nodes"][0]["label"], "A");
        assert_eq!(v["nodes"][1]["kind"], "NOT");
        assert!(v["nodes"][1].get("label").is_none());
        assert_eq!(v["wires"][1]["from"], 1);
        assert!(v["wires"][0]["path"].as_str().unwrap().starts_with("M 90 130 L"));
    }
}
