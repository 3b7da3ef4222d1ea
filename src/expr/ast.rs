use std::fmt;

use fxhash::{FxHashMap, FxHashSet};
use itertools::Itertools;

use crate::network::GateKind;

/// Operator of an expression node
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub enum Op {
    /// One of the supported logic gates
    Gate(GateKind),
    /// Function-call syntax with a name that is not a known gate
    Call(String),
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Op::Gate(g) => write!(f, "{g}"),
            Op::Call(name) => write!(f, "{name}"),
        }
    }
}

/// Logic expression tree
///
/// Variables are leaves; operators always have at least one child.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub enum Expr {
    /// Named variable, already upper-cased
    Var(String),
    /// Operator applied to an ordered list of operands
    Op(Op, Vec<Expr>),
}

impl Expr {
    /// Create a variable
    pub fn var(name: &str) -> Expr {
        Expr::Var(name.to_uppercase())
    }

    /// Create a gate node
    pub fn gate(kind: GateKind, children: Vec<Expr>) -> Expr {
        debug_assert!(!children.is_empty());
        Expr::Op(Op::Gate(kind), children)
    }

    /// Create an inverter
    pub fn not(e: Expr) -> Expr {
        Expr::gate(GateKind::Not, vec![e])
    }

    /// Gate kind of the node, if it is a gate
    pub fn gate_kind(&self) -> Option<GateKind> {
        match self {
            Expr::Op(Op::Gate(g), _) => Some(*g),
            _ => None,
        }
    }

    /// Operands of the node; empty for a variable
    pub fn children(&self) -> &[Expr] {
        match self {
            Expr::Var(_) => &[],
            Expr::Op(_, c) => c,
        }
    }

    /// Merge nested And/Or nodes of the same kind into a single n-ary node
    ///
    /// Operands are spliced in left-to-right order. Other operators are left untouched.
    pub fn flatten(&self) -> Expr {
        match self {
            Expr::Var(_) => self.clone(),
            Expr::Op(op, children) => {
                let children = children.iter().map(Expr::flatten);
                let ret = match op {
                    Op::Gate(g @ (GateKind::And | GateKind::Or)) => {
                        let mut flat = Vec::new();
                        for c in children {
                            match c {
                                Expr::Op(Op::Gate(cg), grandchildren) if cg == *g => {
                                    flat.extend(grandchildren)
                                }
                                c => flat.push(c),
                            }
                        }
                        flat
                    }
                    _ => children.collect(),
                };
                Expr::Op(op.clone(), ret)
            }
        }
    }

    /// Distinct variable names, in order of first appearance
    pub fn variables(&self) -> Vec<String> {
        let mut ret = Vec::new();
        let mut seen = FxHashSet::default();
        self.collect_variables(&mut ret, &mut seen);
        ret
    }

    pub(crate) fn collect_variables(&self, ret: &mut Vec<String>, seen: &mut FxHashSet<String>) {
        match self {
            Expr::Var(v) => {
                if seen.insert(v.clone()) {
                    ret.push(v.clone());
                }
            }
            Expr::Op(_, children) => {
                for c in children {
                    c.collect_variables(ret, seen);
                }
            }
        }
    }

    /// Number of operator nodes in the tree
    pub fn nb_ops(&self) -> usize {
        match self {
            Expr::Var(_) => 0,
            Expr::Op(_, children) => 1 + children.iter().map(Expr::nb_ops).sum::<usize>(),
        }
    }

    /// Evaluate the expression on 64 patterns at once
    ///
    /// Returns None if a variable is unbound or a custom function is used.
    pub fn eval(&self, values: &FxHashMap<String, u64>) -> Option<u64> {
        match self {
            Expr::Var(v) => values.get(v).copied(),
            Expr::Op(Op::Gate(g), children) => {
                let inputs = children
                    .iter()
                    .map(|c| c.eval(values))
                    .collect::<Option<Vec<u64>>>()?;
                Some(g.eval(&inputs))
            }
            Expr::Op(Op::Call(_), _) => None,
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Var(v) => write!(f, "{v}"),
            Expr::Op(op, children) => write!(f, "{}({})", op, children.iter().join(", ")),
        }
    }
}
