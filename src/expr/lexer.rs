use std::fmt;

use crate::network::GateKind;

/// Lexeme of an expression
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Token {
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `,`
    Comma,
    /// `=`
    Equal,
    /// Infix operator keyword (AND, OR, NOT, NAND, NOR, XOR, XNOR)
    Keyword(GateKind),
    /// Any other word, upper-cased
    Ident(String),
}

impl Token {
    fn from_word(word: &str) -> Token {
        match word {
            "(" => Token::LParen,
            ")" => Token::RParen,
            "," => Token::Comma,
            "=" => Token::Equal,
            _ => match GateKind::from_keyword(word) {
                Some(k) => Token::Keyword(k),
                None => Token::Ident(word.to_string()),
            },
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::Comma => write!(f, ","),
            Token::Equal => write!(f, "="),
            Token::Keyword(k) => write!(f, "{k}"),
            Token::Ident(s) => write!(f, "{s}"),
        }
    }
}

/// Split an expression into tokens
///
/// Separators are inserted around punctuation, everything is upper-cased, and the
/// text is split on whitespace. Identifiers that only differ by case are the same.
pub fn tokenize(text: &str) -> Vec<Token> {
    let mut spaced = String::with_capacity(text.len() * 2);
    for c in text.chars() {
        if matches!(c, '(' | ')' | ',' | '=') {
            spaced.push(' ');
            spaced.push(c);
            spaced.push(' ');
        } else {
            spaced.push(c);
        }
    }
    spaced
        .to_uppercase()
        .split_whitespace()
        .map(Token::from_word)
        .collect()
}
