//! Simulation of expressions and netlists. Patterns are simulated 64 at a time, one bit per pattern.

mod simple_sim;

use std::fmt;

use fxhash::FxHashMap;
use itertools::Itertools;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::expr::{Equation, Expr};
use crate::network::Netlist;
use crate::synth::Mapping;

/// Above this number of variables, checks use random patterns instead of all assignments
pub const MAX_EXHAUSTIVE_VARS: usize = 16;

/// Number of 64-pattern words used for random checks
const NB_RANDOM_WORDS: usize = 64;

/// Values of the first 6 variables that enumerate all assignments within a word
const VAR_MASKS: [u64; 6] = [
    0xAAAA_AAAA_AAAA_AAAA,
    0xCCCC_CCCC_CCCC_CCCC,
    0xF0F0_F0F0_F0F0_F0F0,
    0xFF00_FF00_FF00_FF00,
    0xFFFF_0000_FFFF_0000,
    0xFFFF_FFFF_0000_0000,
];

/// Simulate a netlist on 64 patterns; one word per input, one word per output
pub fn simulate(net: &Netlist, input_values: &[u64]) -> Vec<u64> {
    use simple_sim::SimpleSimulator;
    let mut sim = SimpleSimulator::from_netlist(net);
    sim.run(input_values)
}

/// Simulate a netlist on a single pattern
pub fn simulate_single(net: &Netlist, input_values: &[bool]) -> Vec<bool> {
    let words: Vec<u64> = input_values.iter().map(|b| if *b { !0 } else { 0 }).collect();
    simulate(net, &words).iter().map(|w| w & 1 != 0).collect()
}

/// Input words covering every assignment of the variables
///
/// Each entry holds one word per variable. With fewer than 6 variables, assignments
/// repeat within the word.
pub fn exhaustive_patterns(nb_vars: usize) -> Vec<Vec<u64>> {
    let nb_words = 1usize << nb_vars.saturating_sub(6);
    (0..nb_words)
        .map(|w| {
            (0..nb_vars)
                .map(|i| {
                    if i < 6 {
                        VAR_MASKS[i]
                    } else if (w >> (i - 6)) & 1 != 0 {
                        !0
                    } else {
                        0
                    }
                })
                .collect()
        })
        .collect()
}

/// Random input words
pub fn random_patterns(nb_vars: usize, nb_words: usize, seed: u64) -> Vec<Vec<u64>> {
    let mut rng = SmallRng::seed_from_u64(seed);
    (0..nb_words)
        .map(|_| (0..nb_vars).map(|_| rng.gen::<u64>()).collect())
        .collect()
}

fn patterns(nb_vars: usize, seed: u64) -> Vec<Vec<u64>> {
    if nb_vars <= MAX_EXHAUSTIVE_VARS {
        exhaustive_patterns(nb_vars)
    } else {
        random_patterns(nb_vars, NB_RANDOM_WORDS, seed)
    }
}

fn bind(names: &[String], word: &[u64]) -> FxHashMap<String, u64> {
    names.iter().cloned().zip(word.iter().copied()).collect()
}

/// Whether two functions of the named variables agree on every pattern
///
/// Exhaustive up to [`MAX_EXHAUSTIVE_VARS`] variables; a function that cannot be
/// evaluated never agrees.
fn same_function<F, G>(names: &[String], f: F, g: G) -> bool
where
    F: Fn(&FxHashMap<String, u64>) -> Option<u64>,
    G: Fn(&FxHashMap<String, u64>) -> Option<u64>,
{
    patterns(names.len(), 1).iter().all(|word| {
        let values = bind(names, word);
        match (f(&values), g(&values)) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        }
    })
}

fn merge_names(mut names: Vec<String>, other: Vec<String>) -> Vec<String> {
    for v in other {
        if !names.contains(&v) {
            names.push(v);
        }
    }
    names
}

/// Check whether two expressions compute the same function of their variables
///
/// Exhaustive up to [`MAX_EXHAUSTIVE_VARS`] variables; expressions that cannot be
/// evaluated are never equivalent.
pub fn exprs_equivalent(a: &Expr, b: &Expr) -> bool {
    let names = merge_names(a.variables(), b.variables());
    same_function(&names, |v| a.eval(v), |v| b.eval(v))
}

/// Check whether a mapped circuit computes the same function as an expression
pub fn mapping_equivalent(e: &Expr, m: &Mapping) -> bool {
    let names = merge_names(e.variables(), m.variables());
    same_function(&names, |v| e.eval(v), |v| m.eval(v))
}

/// An assignment of the inputs where a netlist output differs from its equation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Counterexample {
    /// Label of the failing output
    pub output: String,
    /// Value of each input
    pub assignment: Vec<(String, bool)>,
}

impl fmt::Display for Counterexample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "output {} differs", self.output)?;
        if !self.assignment.is_empty() {
            let values = self
                .assignment
                .iter()
                .map(|(n, v)| format!("{}={}", n, u8::from(*v)))
                .join(" ");
            write!(f, " for {}", values)?;
        }
        Ok(())
    }
}

/// Check that each output of the netlist computes the function of its equation
///
/// Equations and outputs are matched by position.
pub fn check_equivalence(
    equations: &[Equation],
    net: &Netlist,
    seed: u64,
) -> Result<(), Counterexample> {
    let names: Vec<String> = (0..net.nb_inputs())
        .map(|i| net.input(i).label.clone().unwrap_or_default())
        .collect();
    if equations.len() != net.nb_outputs() {
        let missing = equations
            .get(net.nb_outputs())
            .map(|eq| eq.label.clone())
            .unwrap_or_else(|| net.output(equations.len()).label.clone().unwrap_or_default());
        return Err(Counterexample {
            output: missing,
            assignment: Vec::new(),
        });
    }
    for word in patterns(names.len(), seed) {
        let values = bind(&names, &word);
        let outputs = simulate(net, &word);
        for (eq, actual) in equations.iter().zip(outputs) {
            let diff = match eq.expr.eval(&values) {
                Some(expected) => expected ^ actual,
                None => !0,
            };
            if diff != 0 {
                let bit = diff.trailing_zeros();
                let assignment = names
                    .iter()
                    .zip(&word)
                    .map(|(n, w)| (n.clone(), (w >> bit) & 1 != 0))
                    .collect();
                return Err(Counterexample {
                    output: eq.label.clone(),
                    assignment,
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{
        check_equivalence, exhaustive_patterns, exprs_equivalent, mapping_equivalent,
        simulate_single,
    };
    use crate::expr::{parse_equation, parse_expr, Equation};
    use crate::network::{build_netlist, GateKind, Netlist, NodeKind};
    use crate::synth::Synthesizer;

    #[test]
    fn test_patterns() {
        let p = exhaustive_patterns(2);
        assert_eq!(p.len(), 1);
        assert_eq!(p[0][0] & 0xf, 0b1010);
        assert_eq!(p[0][1] & 0xf, 0b1100);

        let p = exhaustive_patterns(8);
        assert_eq!(p.len(), 4);
        assert_eq!(p[1][6], !0);
        assert_eq!(p[1][7], 0);
        assert_eq!(p[3][7], !0);
    }

    #[test]
    fn test_basic() {
        let mut net = Netlist::new();
        let a = net.add_input("A");
        let b = net.add_input("B");
        let x = net.add_gate(NodeKind::Gate(GateKind::Nor), vec![a, b], 0);
        net.add_output(x, "Y", 0);
        net.align_outputs();
        assert_eq!(simulate_single(&net, &[false, false]), vec![true]);
        assert_eq!(simulate_single(&net, &[true, false]), vec![false]);
        assert_eq!(simulate_single(&net, &[false, true]), vec![false]);
        assert_eq!(simulate_single(&net, &[true, true]), vec![false]);
    }

    #[test]
    fn test_exprs_equivalent() {
        let a = parse_expr("NOT (A AND B)", false).unwrap();
        let b = parse_expr("NOT A OR NOT B", false).unwrap();
        let c = parse_expr("NOT A AND NOT B", false).unwrap();
        assert!(exprs_equivalent(&a, &b));
        assert!(!exprs_equivalent(&a, &c));
        let d = parse_expr("MUX(A, B)", false).unwrap();
        assert!(!exprs_equivalent(&d, &d));
    }

    #[test]
    fn test_mapping_equivalent() {
        let e = parse_expr("A XOR B XOR C", false).unwrap().flatten();
        let m = Synthesizer::new("NAND".parse().unwrap()).synthesize(&e).unwrap();
        assert!(mapping_equivalent(&e, &m));
        let other = parse_expr("A XNOR B XOR C", false).unwrap();
        assert!(!mapping_equivalent(&other, &m));
        let wider = parse_expr("A XOR B XOR C XOR D", false).unwrap();
        assert!(!mapping_equivalent(&wider, &m));
    }

    fn equations(lines: &[&str]) -> Vec<Equation> {
        lines
            .iter()
            .enumerate()
            .map(|(i, l)| parse_equation(l, i, false).unwrap())
            .collect()
    }

    #[test]
    fn test_check_equivalence() {
        let eqs = equations(&[
            "S = A XOR B XOR CIN",
            "COUT = (A AND B) OR (CIN AND (A XOR B))",
        ]);
        for gates in ["NAND", "NOR", "AND,OR,NOT", "NAND4", "XOR,AND,OR"] {
            let net = build_netlist(&eqs, &Synthesizer::new(gates.parse().unwrap())).unwrap();
            assert_eq!(check_equivalence(&eqs, &net, 1), Ok(()), "{gates}");
        }
    }

    #[test]
    fn test_check_mismatch() {
        let eqs = equations(&["Y = A AND B"]);
        let other = equations(&["Y = A OR B"]);
        let net = build_netlist(&other, &Synthesizer::new("OR".parse().unwrap())).unwrap();
        let err = check_equivalence(&eqs, &net, 1).unwrap_err();
        assert_eq!(err.output, "Y");
        assert_eq!(
            err.assignment,
            vec![("A".to_string(), true), ("B".to_string(), false)]
        );
        assert_eq!(err.to_string(), "output Y differs for A=1 B=0");
    }

    #[test]
    fn test_wide_random() {
        let names: Vec<String> = (0..20).map(|i| format!("X{i}")).collect();
        let line = format!("Y = {}", names.join(" AND "));
        let eqs = equations(&[&line]);
        let net = build_netlist(&eqs, &Synthesizer::new("NAND".parse().unwrap()).with_max_depth(60))
            .unwrap();
        assert_eq!(net.nb_inputs(), 20);
        assert_eq!(check_equivalence(&eqs, &net, 42), Ok(()));
    }

    #[test]
    fn test_wide_parity() {
        let names: Vec<String> = (0..16).map(|i| format!("X{i}")).collect();
        let line = format!("Y = {}", names.join(" XOR "));
        let eqs = equations(&[&line]);
        for gates in ["NAND", "NOR"] {
            let net = build_netlist(&eqs, &Synthesizer::new(gates.parse().unwrap())).unwrap();
            assert!(net.nb_gates() <= 9 * 15, "{gates}: {} gates", net.nb_gates());
            assert_eq!(check_equivalence(&eqs, &net, 1), Ok(()), "{gates}");
        }
    }
}
