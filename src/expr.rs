//! Parsing of logic equations into expression trees
//!
//! ```
//! # use gatemap::expr::parse_equation;
//! let eq = parse_equation("Carry = (A AND B) OR (C AND (A XOR B))", 0, false).unwrap();
//! assert_eq!(eq.label, "Carry");
//! assert_eq!(eq.expr.variables(), vec!["A", "B", "C"]);
//! ```

mod ast;
mod lexer;
mod parser;

pub use ast::{Expr, Op};
pub use lexer::{tokenize, Token};
pub use parser::{equation_lines, parse_equation, parse_expr, Equation, ParseError, Parser};
