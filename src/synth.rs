//! Technology mapping of expressions onto a restricted gate library
//!
//! Expressions are rewritten with De Morgan and universal gate identities until only the
//! allowed gates remain. Mapping is rule-driven: the result is equivalent, but not minimal.
//!
//! The result is a [`Mapping`], where identical gates are shared. Identities that use an
//! operand twice, such as `NOT(x) = NAND(x, x)`, do not duplicate the logic computing `x`,
//! so the number of gates grows linearly with the size of the expression.
//!
//! ```
//! # use gatemap::expr::parse_expr;
//! # use gatemap::synth::Synthesizer;
//! # use gatemap::network::GateSet;
//! let e = parse_expr("A AND B", false).unwrap().flatten();
//! let s = Synthesizer::new("NAND".parse::<GateSet>().unwrap());
//! let mapped = s.synthesize(&e).unwrap();
//! assert_eq!(mapped.to_string(), "NAND(NAND(A, B), NAND(A, B))");
//! assert_eq!(mapped.nb_gates(), 2);
//! ```

mod mapping;

use thiserror::Error;
use tracing::trace;

use crate::expr::{Expr, Op};
use crate::network::{GateKind, GateSet};

use mapping::Arena;
pub use mapping::{MappedGate, Mapping, Operand};

/// Maximum nesting of rewrites before giving up
pub const MAX_DEPTH: usize = 30;

/// Error during technology mapping
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum SynthesisError {
    /// The rewriting nested more than the allowed depth
    #[error("logic conversion nested deeper than {0} levels")]
    DepthExceeded(usize),
    /// The operator cannot be expressed with the allowed gates
    #[error("cannot generate gate {0} with the allowed gates")]
    Ungeneratable(String),
}

/// Rewrites expressions to use only an allowed set of gates
#[derive(Debug, Clone)]
pub struct Synthesizer {
    allowed: GateSet,
    max_depth: usize,
}

/// Repeat the last element until the vector reaches the given size
fn pad<T: Clone>(mut v: Vec<T>, size: usize) -> Vec<T> {
    while v.len() < size {
        match v.last().cloned() {
            Some(last) => v.push(last),
            None => break,
        }
    }
    v
}

type Lowered = Result<Option<Operand>, SynthesisError>;

impl Synthesizer {
    /// Create a synthesizer for a set of allowed gates
    pub fn new(allowed: GateSet) -> Synthesizer {
        Synthesizer {
            allowed,
            max_depth: MAX_DEPTH,
        }
    }

    /// Change the maximum rewriting depth
    pub fn with_max_depth(mut self, max_depth: usize) -> Synthesizer {
        self.max_depth = max_depth;
        self
    }

    /// Gates allowed in the result
    pub fn allowed(&self) -> GateSet {
        self.allowed
    }

    fn allows(&self, kind: GateKind) -> bool {
        self.allowed.contains(kind)
    }

    /// Whether an inverter can be built without relying on the Nand gate
    fn can_invert_without_nand(&self) -> bool {
        use GateKind::*;
        self.allows(Not) || self.allows(Nand4) || self.allows(Nor)
    }

    fn check_depth(&self, depth: usize) -> Result<(), SynthesisError> {
        if depth > self.max_depth {
            Err(SynthesisError::DepthExceeded(self.max_depth))
        } else {
            Ok(())
        }
    }

    /// Rewrite an expression using only the allowed gates
    ///
    /// The expression should be flattened first, so that wide And/Or gates are recognized.
    pub fn synthesize(&self, e: &Expr) -> Result<Mapping, SynthesisError> {
        let mut arena = Arena::default();
        let root = self.map(&mut arena, e, 0)?;
        trace!(gates = arena.nb_gates(), "mapped expression");
        Ok(arena.finish(root))
    }

    fn map_all(
        &self,
        arena: &mut Arena,
        children: &[Expr],
        depth: usize,
    ) -> Result<Vec<Operand>, SynthesisError> {
        children.iter().map(|c| self.map(arena, c, depth)).collect()
    }

    fn map(&self, arena: &mut Arena, e: &Expr, depth: usize) -> Result<Operand, SynthesisError> {
        use GateKind::*;
        self.check_depth(depth)?;
        let (kind, children) = match e {
            Expr::Var(v) => return Ok(Operand::Var(v.clone())),
            Expr::Op(Op::Call(name), _) => {
                return Err(SynthesisError::Ungeneratable(name.clone()))
            }
            Expr::Op(Op::Gate(kind), children) => (*kind, children),
        };
        let n = children.len();

        if kind == Nand4 {
            if self.allows(Nand4) && n <= 4 {
                let ops = self.map_all(arena, children, depth + 1)?;
                return Ok(arena.add(Nand4, pad(ops, 4)));
            }
            let rewritten = Expr::not(Expr::gate(And, children.clone()));
            return self.map(arena, &rewritten, depth + 1);
        }

        if self.allows(kind) && n <= 2 {
            let ops = self.map_all(arena, children, depth + 1)?;
            return Ok(arena.add(kind, ops));
        }

        // Wide And as a single inverted Nand4 rather than a tree of 2-input gates
        if kind == And && n > 2 && n <= 4 && self.allows(Nand4) && self.allows(Not) {
            let ops = self.map_all(arena, children, depth + 1)?;
            let nand = arena.add(Nand4, pad(ops, 4));
            return Ok(arena.add(Not, vec![nand]));
        }

        if n > 2 {
            if kind.is_associative() {
                let folded = children[1..].iter().fold(children[0].clone(), |acc, c| {
                    Expr::gate(kind, vec![acc, c.clone()])
                });
                return self.map(arena, &folded, depth);
            }
            return match kind.inverted_base() {
                Some(base) => {
                    let rewritten = Expr::not(Expr::gate(base, children.clone()));
                    self.map(arena, &rewritten, depth + 1)
                }
                None => Err(SynthesisError::Ungeneratable(kind.to_string())),
            };
        }

        if n == 1 && kind != Not {
            let reduced = if kind.is_associative() {
                children[0].clone()
            } else {
                Expr::not(children[0].clone())
            };
            return self.map(arena, &reduced, depth + 1);
        }

        let ops = self.map_all(arena, children, depth + 1)?;
        self.lower(arena, kind, ops, depth + 1)
    }

    fn not(&self, arena: &mut Arena, x: Operand, depth: usize) -> Result<Operand, SynthesisError> {
        self.lower(arena, GateKind::Not, vec![x], depth + 1)
    }

    /// Build a gate over operands that are already mapped
    ///
    /// Only rewrites count towards the depth: an allowed gate is added directly.
    fn lower(
        &self,
        arena: &mut Arena,
        kind: GateKind,
        ops: Vec<Operand>,
        depth: usize,
    ) -> Result<Operand, SynthesisError> {
        if self.allows(kind) {
            return Ok(arena.add(kind, ops));
        }
        self.check_depth(depth)?;
        trace!(gate = %kind, depth, "lowering");
        let res = match self.lower_direct(arena, kind, &ops, depth) {
            Ok(None) | Err(SynthesisError::Ungeneratable(_)) => {
                self.lower_composed(arena, kind, &ops, depth)
            }
            res => res,
        };
        match res {
            Ok(Some(o)) => Ok(o),
            Err(SynthesisError::DepthExceeded(d)) => Err(SynthesisError::DepthExceeded(d)),
            _ => Err(SynthesisError::Ungeneratable(kind.to_string())),
        }
    }

    /// Universal gate identities
    fn lower_direct(
        &self,
        arena: &mut Arena,
        kind: GateKind,
        ops: &[Operand],
        depth: usize,
    ) -> Lowered {
        use GateKind::*;
        let ret = match (kind, ops) {
            (Not, [x]) => {
                if self.allows(Nand) {
                    Some(arena.add(Nand, vec![x.clone(), x.clone()]))
                } else if self.allows(Nand4) {
                    Some(arena.add(Nand4, vec![x.clone(); 4]))
                } else if self.allows(Nor) {
                    Some(arena.add(Nor, vec![x.clone(), x.clone()]))
                } else {
                    None
                }
            }
            (And, [a, b]) => {
                if self.allows(Nand) {
                    let nand = arena.add(Nand, vec![a.clone(), b.clone()]);
                    Some(self.not(arena, nand, depth)?)
                } else if self.allows(Nor) {
                    let na = self.not(arena, a.clone(), depth)?;
                    let nb = self.not(arena, b.clone(), depth)?;
                    Some(arena.add(Nor, vec![na, nb]))
                } else {
                    None
                }
            }
            (Or, [a, b]) => {
                if self.allows(Nor) {
                    let nor = arena.add(Nor, vec![a.clone(), b.clone()]);
                    Some(self.not(arena, nor, depth)?)
                } else if self.allows(Nand) {
                    let na = self.not(arena, a.clone(), depth)?;
                    let nb = self.not(arena, b.clone(), depth)?;
                    Some(arena.add(Nand, vec![na, nb]))
                } else {
                    None
                }
            }
            (Nand, [a, b]) => {
                if self.allows(And) && self.can_invert_without_nand() {
                    let and = arena.add(And, vec![a.clone(), b.clone()]);
                    Some(self.not(arena, and, depth)?)
                } else if self.allows(Nand4) {
                    Some(arena.add(Nand4, vec![a.clone(), b.clone(), a.clone(), b.clone()]))
                } else {
                    None
                }
            }
            (Xnor, [a, b]) if self.allows(Xor) => {
                let xor = arena.add(Xor, vec![a.clone(), b.clone()]);
                Some(self.not(arena, xor, depth)?)
            }
            _ => None,
        };
        Ok(ret)
    }

    /// Less direct identities, through the other gates
    fn lower_composed(
        &self,
        arena: &mut Arena,
        kind: GateKind,
        ops: &[Operand],
        depth: usize,
    ) -> Lowered {
        use GateKind::*;
        let ret = match (kind, ops) {
            (And, [a, b]) if self.allows(Nand4) => {
                let nand = arena.add(Nand4, vec![a.clone(), b.clone(), a.clone(), b.clone()]);
                Some(self.not(arena, nand, depth)?)
            }
            (And, [a, b]) if self.allows(Or) => {
                let na = self.not(arena, a.clone(), depth)?;
                let nb = self.not(arena, b.clone(), depth)?;
                let or = arena.add(Or, vec![na, nb]);
                Some(self.not(arena, or, depth)?)
            }
            (Or, [a, b]) if self.allows(Nand4) => {
                let na = self.not(arena, a.clone(), depth)?;
                let nb = self.not(arena, b.clone(), depth)?;
                Some(arena.add(Nand4, vec![na.clone(), nb.clone(), na, nb]))
            }
            (Or, [a, b]) if self.allows(And) => {
                let na = self.not(arena, a.clone(), depth)?;
                let nb = self.not(arena, b.clone(), depth)?;
                let and = arena.add(And, vec![na, nb]);
                Some(self.not(arena, and, depth)?)
            }
            (Nand, [a, b]) => {
                let and = self.lower(arena, And, vec![a.clone(), b.clone()], depth + 1)?;
                Some(self.not(arena, and, depth)?)
            }
            (Nor, [a, b]) => {
                let or = self.lower(arena, Or, vec![a.clone(), b.clone()], depth + 1)?;
                Some(self.not(arena, or, depth)?)
            }
            (Xor, [a, b]) => {
                let nb = self.not(arena, b.clone(), depth)?;
                let left = self.lower(arena, And, vec![a.clone(), nb], depth + 1)?;
                let na = self.not(arena, a.clone(), depth)?;
                let right = self.lower(arena, And, vec![na, b.clone()], depth + 1)?;
                Some(self.lower(arena, Or, vec![left, right], depth + 1)?)
            }
            (Xnor, [a, b]) => {
                let xor = self.lower(arena, Xor, vec![a.clone(), b.clone()], depth + 1)?;
                Some(self.not(arena, xor, depth)?)
            }
            _ => None,
        };
        Ok(ret)
    }
}
