//! Representation and construction of gate-level netlists

mod builder;
mod gates;
mod netlist;
pub mod stats;

pub use builder::{build_netlist, NetlistBuilder};
pub use gates::{GateKind, GateSet, NodeKind};
pub use netlist::{Netlist, Node, NodeId, Wire};
