use std::fmt;
use std::ops::Add;

use serde::{Deserialize, Serialize};

use crate::network::{GateKind, NodeKind};

/// A position on the schematic; y grows downwards
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position
    pub x: f64,
    /// Vertical position
    pub y: f64,
}

impl Point {
    /// Create a point
    pub fn new(x: f64, y: f64) -> Point {
        Point { x, y }
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.x, self.y)
    }
}

/// Position of the ports of each node kind, relative to the node origin
///
/// The layout never computes symbol geometry itself: a renderer supplies its own table
/// by implementing this trait.
pub trait PortGeometry {
    /// Offset of an input port, or None if the kind has no such port
    fn input_port(&self, kind: NodeKind, index: usize) -> Option<Point>;

    /// Offset of an output port, or None if the kind has no such port
    fn output_port(&self, kind: NodeKind, index: usize) -> Option<Point>;
}

/// Port offsets of the standard gate symbols
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardPorts;

const TWO_INPUTS: [(f64, f64); 2] = [(10.0, 15.0), (10.0, 45.0)];
const CURVED_INPUTS: [(f64, f64); 2] = [(12.0, 15.0), (12.0, 45.0)];
const XOR_INPUTS: [(f64, f64); 2] = [(5.0, 15.0), (5.0, 45.0)];
const NAND4_INPUTS: [(f64, f64); 4] = [(10.0, 10.0), (10.0, 30.0), (10.0, 50.0), (10.0, 70.0)];

impl StandardPorts {
    fn inputs(kind: NodeKind) -> &'static [(f64, f64)] {
        match kind {
            NodeKind::Input => &[],
            NodeKind::Output => &[(5.0, 30.0)],
            NodeKind::Gate(g) => match g {
                GateKind::And | GateKind::Nand => &TWO_INPUTS,
                GateKind::Or | GateKind::Nor => &CURVED_INPUTS,
                GateKind::Xor | GateKind::Xnor => &XOR_INPUTS,
                GateKind::Not => &[(10.0, 30.0)],
                GateKind::Nand4 => &NAND4_INPUTS,
            },
        }
    }

    fn output(kind: NodeKind) -> Option<(f64, f64)> {
        match kind {
            NodeKind::Input => Some((40.0, 30.0)),
            NodeKind::Output => None,
            NodeKind::Gate(g) => Some(match g {
                GateKind::And | GateKind::Or | GateKind::Not => (60.0, 30.0),
                GateKind::Nand | GateKind::Nor => (70.0, 30.0),
                GateKind::Xor | GateKind::Xnor => (68.0, 30.0),
                GateKind::Nand4 => (85.0, 40.0),
            }),
        }
    }
}

impl PortGeometry for StandardPorts {
    fn input_port(&self, kind: NodeKind, index: usize) -> Option<Point> {
        Self::inputs(kind)
            .get(index)
            .map(|(x, y)| Point::new(*x, *y))
    }

    fn output_port(&self, kind: NodeKind, index: usize) -> Option<Point> {
        if index != 0 {
            return None;
        }
        Self::output(kind).map(|(x, y)| Point::new(x, y))
    }
}
