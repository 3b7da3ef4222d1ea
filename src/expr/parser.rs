use itertools::Itertools;
use thiserror::Error;
use tracing::warn;

use super::ast::{Expr, Op};
use super::lexer::{tokenize, Token};
use crate::network::GateKind;

/// Error while parsing an expression
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ParseError {
    /// An operand was expected but the expression ended
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    /// A token that cannot start an operand
    #[error("unexpected token {0}")]
    UnexpectedToken(String),
    /// A parenthesis was opened but never closed (strict mode only)
    #[error("missing closing parenthesis")]
    UnclosedParen,
    /// Tokens left after a complete expression (strict mode only)
    #[error("unexpected trailing tokens: {0}")]
    TrailingTokens(String),
}

/// A named output and the expression driving it
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Equation {
    /// Output label
    pub label: String,
    /// Driving expression
    pub expr: Expr,
}

/// Recursive descent parser for logic expressions
///
/// Precedence, from lowest to highest:
/// ```text
///     Expression := Term (("OR" | "NOR" | "XOR" | "XNOR") Term)*
///     Term       := Factor (("AND" | "NAND") Factor)*
///     Factor     := "NOT" Factor | "(" Expression ")" | Name ["(" Expression ("," Expression)* ")"]
/// ```
/// Operators of the same precedence are chained left to right into binary nodes.
///
/// By default the parser is lenient: a missing `)` or trailing tokens just stop the
/// parse, and a keyword used as an operand is read as a name. In strict mode these are errors.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    strict: bool,
}

impl Parser {
    /// Create a parser for a token stream
    pub fn new(tokens: Vec<Token>, strict: bool) -> Parser {
        Parser {
            tokens,
            pos: 0,
            strict,
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn consume(&mut self) -> Result<Token, ParseError> {
        let t = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        t.ok_or(ParseError::UnexpectedEnd)
    }

    /// Parse a complete expression
    pub fn parse(&mut self) -> Result<Expr, ParseError> {
        let e = self.parse_expression()?;
        if self.pos < self.tokens.len() {
            let rest = self.tokens[self.pos..].iter().join(" ");
            if self.strict {
                return Err(ParseError::TrailingTokens(rest));
            }
            warn!(ignored = %rest, "ignoring trailing tokens");
        }
        Ok(e)
    }

    fn peek_keyword(&self, kinds: &[GateKind]) -> Option<GateKind> {
        match self.peek() {
            Some(Token::Keyword(k)) if kinds.contains(k) => Some(*k),
            _ => None,
        }
    }

    fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        use GateKind::*;
        let mut left = self.parse_term()?;
        while let Some(k) = self.peek_keyword(&[Or, Nor, Xor, Xnor]) {
            self.pos += 1;
            let right = self.parse_term()?;
            left = Expr::gate(k, vec![left, right]);
        }
        Ok(left)
    }

    fn parse_term(&mut self) -> Result<Expr, ParseError> {
        use GateKind::*;
        let mut left = self.parse_factor()?;
        while let Some(k) = self.peek_keyword(&[And, Nand]) {
            self.pos += 1;
            let right = self.parse_factor()?;
            left = Expr::gate(k, vec![left, right]);
        }
        Ok(left)
    }

    fn parse_factor(&mut self) -> Result<Expr, ParseError> {
        match self.consume()? {
            Token::Keyword(GateKind::Not) => Ok(Expr::not(self.parse_factor()?)),
            Token::LParen => {
                let e = self.parse_expression()?;
                self.close_paren()?;
                Ok(e)
            }
            Token::Ident(name) => {
                if self.peek() == Some(&Token::LParen) {
                    let op = match GateKind::from_name(&name) {
                        Some(k) => Op::Gate(k),
                        None => Op::Call(name),
                    };
                    self.parse_call(op)
                } else {
                    Ok(Expr::Var(name))
                }
            }
            Token::Keyword(k) => {
                if self.peek() == Some(&Token::LParen) {
                    self.parse_call(Op::Gate(k))
                } else if self.strict {
                    Err(ParseError::UnexpectedToken(k.to_string()))
                } else {
                    warn!(keyword = %k, "keyword used as a variable name");
                    Ok(Expr::Var(k.to_string()))
                }
            }
            t => Err(ParseError::UnexpectedToken(t.to_string())),
        }
    }

    /// Argument list of a function call, starting at the opening parenthesis
    fn parse_call(&mut self, op: Op) -> Result<Expr, ParseError> {
        self.pos += 1;
        let mut args = vec![self.parse_expression()?];
        while self.peek() == Some(&Token::Comma) {
            self.pos += 1;
            args.push(self.parse_expression()?);
        }
        self.close_paren()?;
        Ok(Expr::Op(op, args))
    }

    fn close_paren(&mut self) -> Result<(), ParseError> {
        if self.peek() == Some(&Token::RParen) {
            self.pos += 1;
        } else if self.strict {
            return Err(ParseError::UnclosedParen);
        } else {
            warn!("missing closing parenthesis");
        }
        Ok(())
    }
}

/// Parse a single expression
pub fn parse_expr(text: &str, strict: bool) -> Result<Expr, ParseError> {
    Parser::new(tokenize(text), strict).parse()
}

/// Parse one equation line, `LABEL = EXPRESSION` or a bare `EXPRESSION`
///
/// `index` is the 0-based index of the line among non-blank lines, used for the default label.
pub fn parse_equation(line: &str, index: usize, strict: bool) -> Result<Equation, ParseError> {
    let (label, text) = match line.split_once('=') {
        Some((l, r)) => (l.trim(), r),
        None => ("", line),
    };
    let label = if label.is_empty() {
        format!("Y{}", index + 1)
    } else {
        label.to_string()
    };
    Ok(Equation {
        label,
        expr: parse_expr(text, strict)?,
    })
}

/// Iterate over the non-blank lines of a text, with their 1-based line number
pub fn equation_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .filter(|(_, l)| !l.trim().is_empty())
        .map(|(i, l)| (i + 1, l))
}

#[cfg(test)]
mod tests {
    use super::{parse_equation, parse_expr, ParseError};
    use crate::expr::{Expr, Op};
    use crate::network::GateKind::*;

    fn v(name: &str) -> Expr {
        Expr::var(name)
    }

    #[test]
    fn test_precedence() {
        let e = parse_expr("A OR B AND NOT C", false).unwrap();
        assert_eq!(
            e,
            Expr::gate(
                Or,
                vec![v("A"), Expr::gate(And, vec![v("B"), Expr::not(v("C"))])]
            )
        );
    }

    #[test]
    fn test_left_chain() {
        let e = parse_expr("a xor b xnor c nor d", false).unwrap();
        let ab = Expr::gate(Xor, vec![v("A"), v("B")]);
        let abc = Expr::gate(Xnor, vec![ab, v("C")]);
        assert_eq!(e, Expr::gate(Nor, vec![abc, v("D")]));

        let e = parse_expr("A AND B NAND C", false).unwrap();
        let ab = Expr::gate(And, vec![v("A"), v("B")]);
        assert_eq!(e, Expr::gate(Nand, vec![ab, v("C")]));
    }

    #[test]
    fn test_parens() {
        let e = parse_expr("(A OR B) AND C", false).unwrap();
        let ab = Expr::gate(Or, vec![v("A"), v("B")]);
        assert_eq!(e, Expr::gate(And, vec![ab, v("C")]));
        let e = parse_expr("NOT NOT (A)", false).unwrap();
        assert_eq!(e, Expr::not(Expr::not(v("A"))));
    }

    #[test]
    fn test_calls() {
        let e = parse_expr("NAND4(A, B, C)", false).unwrap();
        assert_eq!(e, Expr::gate(Nand4, vec![v("A"), v("B"), v("C")]));
        let e = parse_expr("and(A, B OR C, D)", false).unwrap();
        assert_eq!(
            e,
            Expr::gate(And, vec![v("A"), Expr::gate(Or, vec![v("B"), v("C")]), v("D")])
        );
        let e = parse_expr("MUX(S, A, B)", false).unwrap();
        assert_eq!(e, Expr::Op(Op::Call("MUX".into()), vec![v("S"), v("A"), v("B")]));
    }

    #[test]
    fn test_lenient() {
        // Missing parenthesis and trailing garbage are silently dropped
        let e = parse_expr("(A AND B", false).unwrap();
        assert_eq!(e, Expr::gate(And, vec![v("A"), v("B")]));
        let e = parse_expr("A B C", false).unwrap();
        assert_eq!(e, v("A"));
        let e = parse_expr("A) OR B", false).unwrap();
        assert_eq!(e, v("A"));
        let e = parse_expr("OR", false).unwrap();
        assert_eq!(e, v("OR"));
    }

    #[test]
    fn test_strict() {
        assert_eq!(parse_expr("(A AND B", true), Err(ParseError::UnclosedParen));
        assert_eq!(
            parse_expr("A B C", true),
            Err(ParseError::TrailingTokens("B C".into()))
        );
        assert_eq!(
            parse_expr("A AND OR", true),
            Err(ParseError::UnexpectedToken("OR".into()))
        );
        assert!(parse_expr("NAND4(A, B)", true).is_ok());
    }

    #[test]
    fn test_errors() {
        assert_eq!(parse_expr("", false), Err(ParseError::UnexpectedEnd));
        assert_eq!(parse_expr("A AND", false), Err(ParseError::UnexpectedEnd));
        assert_eq!(parse_expr("NOT", false), Err(ParseError::UnexpectedEnd));
        assert_eq!(
            parse_expr("F()", false),
            Err(ParseError::UnexpectedToken(")".into()))
        );
        assert_eq!(
            parse_expr("A AND , B", false),
            Err(ParseError::UnexpectedToken(",".into()))
        );
    }

    #[test]
    fn test_equation() {
        let eq = parse_equation("Sum = a xor b", 0, false).unwrap();
        assert_eq!(eq.label, "Sum");
        assert_eq!(eq.expr, Expr::gate(Xor, vec![v("A"), v("B")]));
        let eq = parse_equation("a and b", 2, false).unwrap();
        assert_eq!(eq.label, "Y3");
        let eq = parse_equation(" = a", 0, false).unwrap();
        assert_eq!(eq.label, "Y1");
        assert_eq!(
            parse_equation("Y = ", 0, false),
            Err(ParseError::UnexpectedEnd)
        );
    }

    #[test]
    fn test_lines() {
        let lines: Vec<_> = super::equation_lines("A\n\n  \nB\n").collect();
        assert_eq!(lines, vec![(1, "A"), (4, "B")]);
    }
}
