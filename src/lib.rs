//! Logic equations to gate-level schematics
//!
//! This crate turns boolean equations into a circuit built only from the logic gates you allow,
//! then places and routes it as a readable schematic.
//!
//! # Usage
//!
//! Gatemap takes a text file with one equation per line, such as a full adder:
//! ```text
//! S = A XOR B XOR CIN
//! COUT = (A AND B) OR (CIN AND (A XOR B))
//! ```
//! Each equation is rewritten using the allowed gates ([technology mapping](https://en.wikipedia.org/wiki/Technology_mapping)),
//! the gates are arranged in columns by logic depth, and wires are routed between their ports.
//!
//! ```bash
//! # Show available commands
//! gatemap help
//! # Generate a schematic using only NAND gates
//! gatemap generate adder.txt --gates NAND -o adder.json
//! # Also export the netlist as an ISCAS .bench file
//! gatemap generate adder.txt --bench adder.bench
//! # Show statistics about the synthesized netlist
//! gatemap show adder.txt --gates NOR
//! # Check that the netlist computes the equations
//! gatemap check adder.txt --gates NAND4
//! ```
//!
//! # Installation
//!
//! Gatemap is written in Rust, and can be installed using
//! [Cargo](https://doc.rust-lang.org/cargo/getting-started/installation.html), Rust's package manager:
//! ```bash
//! cargo install --path .
//! ```
//!
//! # Development
//!
//! ## Flow
//!
//! A generation run goes through the following steps, each in its own module:
//! * [`expr`] tokenizes and parses each line into an expression tree;
//! * [`synth`] rewrites the expression using only the allowed gates;
//! * [`network`] turns the expressions into a single `Netlist`, sharing inputs between equations;
//! * [`layout`] places the nodes by level and routes the wires.
//!
//! The run is all or nothing: any error aborts it, and [`Session`] keeps the previous
//! schematic in that case.
//!
//! ## Datastructures
//!
//! `Netlist` is an arena of nodes addressed by `NodeId`, so that a node can drive several others.
//! Nodes are kept in topological order, and each node records its level:
//! inputs are at level 0, gates one level above their deepest input, and all outputs share the last level.
//!
//! For example, here is a full adder mapped to NAND gates:
//! ```
//! # use gatemap::{generate, GenerateConfig};
//! let text = "S = A XOR B XOR CIN\nCOUT = (A AND B) OR (CIN AND (A XOR B))";
//! let cfg = GenerateConfig::with_gates("NAND".parse().unwrap());
//! let schematic = generate(text, &cfg).unwrap();
//! assert!(schematic.nodes.iter().all(|n| ["INPUT", "OUTPUT", "NAND"].contains(&n.kind.name())));
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod expr;
pub mod io;
pub mod layout;
pub mod network;
pub mod sim;
pub mod synth;

pub use config::GenerateConfig;
pub use error::{Error, Result};
pub use layout::Schematic;
pub use network::{stats, GateKind, GateSet, Netlist, NodeKind};

use tracing::debug;

use crate::expr::{equation_lines, parse_equation, Equation};
use crate::layout::StandardPorts;
use crate::network::NetlistBuilder;
use crate::synth::Synthesizer;

/// Parse every non-blank line of a text as an equation
///
/// Returns the equations with their 1-based line numbers.
pub fn parse_equations(text: &str, strict: bool) -> Result<Vec<(usize, Equation)>> {
    equation_lines(text)
        .enumerate()
        .map(|(i, (line, s))| {
            parse_equation(s, i, strict)
                .map(|eq| (line, eq))
                .map_err(|source| Error::Parse { line, source })
        })
        .collect()
}

/// Parse the equations and map them to a netlist using the allowed gates
pub fn synthesize(text: &str, cfg: &GenerateConfig) -> Result<(Vec<Equation>, Netlist)> {
    if cfg.gates.is_empty() {
        return Err(Error::EmptyGateSet);
    }
    let lines = parse_equations(text, cfg.strict)?;
    debug!(equations = lines.len(), gates = %cfg.gates, "parsed equations");

    let synth = Synthesizer::new(cfg.gates).with_max_depth(cfg.max_depth);
    let mut builder = NetlistBuilder::new(&synth, lines.iter().map(|(_, eq)| &eq.expr));
    for (group, (line, eq)) in lines.iter().enumerate() {
        builder
            .add_equation(eq, group)
            .map_err(|source| Error::Synthesis {
                line: *line,
                source,
            })?;
    }
    let net = builder.finish();
    debug!(
        inputs = net.nb_inputs(),
        gates = net.nb_gates(),
        outputs = net.nb_outputs(),
        "built netlist"
    );
    Ok((lines.into_iter().map(|(_, eq)| eq).collect(), net))
}

/// Run the whole flow: parse, synthesize, place and route
pub fn generate(text: &str, cfg: &GenerateConfig) -> Result<Schematic> {
    let (_, net) = synthesize(text, cfg)?;
    Ok(layout::layout(&net, &cfg.layout, &cfg.route, &StandardPorts))
}

/// Holds the current schematic across generation runs
///
/// A run either replaces the current schematic or, on error, leaves it untouched.
#[derive(Debug, Default)]
pub struct Session {
    config: GenerateConfig,
    current: Option<Schematic>,
}

impl Session {
    /// Create a session without any schematic
    pub fn new(config: GenerateConfig) -> Session {
        Session {
            config,
            current: None,
        }
    }

    /// Configuration used for the next runs
    pub fn config(&self) -> &GenerateConfig {
        &self.config
    }

    /// Change the configuration for the next runs; the current schematic is kept
    pub fn set_config(&mut self, config: GenerateConfig) {
        self.config = config;
    }

    /// Schematic of the last successful run
    pub fn current(&self) -> Option<&Schematic> {
        self.current.as_ref()
    }

    /// Generate a new schematic, replacing the current one on success
    pub fn generate(&mut self, text: &str) -> Result<&Schematic> {
        let schematic = generate(text, &self.config)?;
        Ok(self.current.insert(schematic))
    }
}

#[cfg(test)]
mod tests {
    use super::{generate, parse_equations, synthesize, Error, GenerateConfig, Session};
    use crate::expr::ParseError;
    use crate::network::{GateKind, GateSet, NodeKind};
    use crate::synth::SynthesisError;

    #[test]
    fn test_empty_gate_set() {
        // Checked before parsing: the text is not even valid
        let cfg = GenerateConfig::with_gates(GateSet::empty());
        assert!(matches!(generate("Y = ) (", &cfg), Err(Error::EmptyGateSet)));
        assert!(matches!(generate("", &cfg), Err(Error::EmptyGateSet)));
    }

    #[test]
    fn test_line_numbers() {
        let lines = parse_equations("A AND B\n\n  \nZ = C\n", false).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].0, 1);
        assert_eq!(lines[0].1.label, "Y1");
        assert_eq!(lines[1].0, 4);
        assert_eq!(lines[1].1.label, "Z");

        let cfg = GenerateConfig::default();
        match generate("Y = A\n\nZ = , B", &cfg) {
            Err(Error::Parse { line, source }) => {
                assert_eq!(line, 3);
                assert_eq!(source, ParseError::UnexpectedToken(",".into()));
            }
            other => panic!("unexpected result {other:?}"),
        }
        match generate("Y = A\nZ = MUX(A, B)", &cfg) {
            Err(Error::Synthesis { line, source }) => {
                assert_eq!(line, 2);
                assert_eq!(source, SynthesisError::Ungeneratable("MUX".into()));
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn test_strict() {
        let mut cfg = GenerateConfig::default();
        assert!(generate("Y = (A AND B", &cfg).is_ok());
        cfg.strict = true;
        assert!(matches!(
            generate("Y = (A AND B", &cfg),
            Err(Error::Parse {
                line: 1,
                source: ParseError::UnclosedParen
            })
        ));
    }

    #[test]
    fn test_synthesize() {
        let cfg = GenerateConfig::with_gates("NOR".parse().unwrap());
        let (eqs, net) = synthesize("Y1 = A AND B\nY2 = A OR B", &cfg).unwrap();
        assert_eq!(eqs.len(), 2);
        assert_eq!(eqs[1].label, "Y2");
        assert_eq!(net.nb_inputs(), 2);
        assert!(net
            .nodes()
            .iter()
            .all(|n| matches!(n.kind, NodeKind::Input | NodeKind::Output | NodeKind::Gate(GateKind::Nor))));
    }

    #[test]
    fn test_adder_size() {
        let text = "S = A XOR B XOR CIN\nCOUT = (A AND B) OR (CIN AND (A XOR B))";
        for gates in ["NAND", "NOR", "NAND4"] {
            let cfg = GenerateConfig::with_gates(gates.parse().unwrap());
            let schematic = generate(text, &cfg).unwrap();
            // 3 inputs, 2 outputs, at most 9 gates per Xor and 3 per And/Or
            let nb_nodes = schematic.nodes.len();
            assert!(nb_nodes <= 5 + 3 * 9 + 3 * 3, "{gates}: {nb_nodes} nodes");
        }
    }

    #[test]
    fn test_session() {
        let mut session = Session::new(GenerateConfig::with_gates("AND".parse().unwrap()));
        assert!(session.current().is_none());
        assert!(session.generate("Y = NOT A").is_err());
        assert!(session.current().is_none());

        let nb_nodes = session.generate("Y = A AND B").unwrap().nodes.len();
        assert_eq!(nb_nodes, 4);

        // A failed run keeps the previous schematic
        assert!(session.generate("Y = A OR B").is_err());
        assert_eq!(session.current().unwrap().nodes.len(), 4);

        let mut cfg = session.config().clone();
        cfg.gates.insert(GateKind::Or);
        session.set_config(cfg);
        session.generate("Y = A OR B OR C").unwrap();
        assert_eq!(session.current().unwrap().nodes.len(), 6);
    }
}
