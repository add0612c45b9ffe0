//! Tokenizer for the source grammar.
//!
//! `inf` and `NaN` are ordinary identifiers here; the value builder turns
//! them into doubles where a value is expected.

use crate::error::{ConfigError, Result};
use crate::types::strings;
use logos::{Logos, Span};
use std::fmt;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum Token {
    #[regex(r"#[^\n]*", logos::skip, allow_greedy = true)]
    Comment,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*", |lex| lex.slice().to_string())]
    Ident(String),

    /// Unescaped body of a single- or double-quoted literal.
    #[regex(r#"'([^'\\]|\\.)*'"#, |lex| unquote(lex.slice()))]
    #[regex(r#""([^"\\]|\\.)*""#, |lex| unquote(lex.slice()))]
    Str(String),

    #[regex(r"-?[0-9]+", |lex| lex.slice().parse::<i128>().ok())]
    Int(i128),

    #[regex(r"-?([0-9]+\.[0-9]*|\.[0-9]+)([eE][+-]?[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    #[regex(r"-?[0-9]+[eE][+-]?[0-9]+", |lex| lex.slice().parse::<f64>().ok())]
    Float(f64),

    #[token(".")]
    Dot,
    #[token(",")]
    Comma,
    #[token("=")]
    Equals,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("*")]
    Star,
    #[token("+")]
    Plus,
    #[token("~")]
    Tilde,
    #[token("-")]
    Minus,
}

fn unquote(literal: &str) -> Option<String> {
    strings::unescape(&literal[1..literal.len() - 1]).ok()
}

impl Token {
    pub fn describe(&self) -> String {
        match self {
            Token::Comment => "comment".to_string(),
            Token::Ident(s) => format!("identifier {s}"),
            Token::Str(s) => format!("string {}", strings::quote(s)),
            Token::Int(v) => format!("integer {v}"),
            Token::Float(v) => format!("number {v:?}"),
            Token::Dot => "'.'".to_string(),
            Token::Comma => "','".to_string(),
            Token::Equals => "'='".to_string(),
            Token::LParen => "'('".to_string(),
            Token::RParen => "')'".to_string(),
            Token::Star => "'*'".to_string(),
            Token::Plus => "'+'".to_string(),
            Token::Tilde => "'~'".to_string(),
            Token::Minus => "'-'".to_string(),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

/// Token plus its byte range in the input.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub span: Span,
}

pub fn tokenize(text: &str) -> Result<Vec<Spanned>> {
    let mut lexer = Token::lexer(text);
    let mut tokens = Vec::new();
    while let Some(result) = lexer.next() {
        match result {
            Ok(Token::Comment) => {}
            Ok(token) => tokens.push(Spanned {
                token,
                span: lexer.span(),
            }),
            Err(()) => {
                return Err(ConfigError::parse(
                    lexer.span().start,
                    format!("unexpected input '{}'", lexer.slice()),
                ));
            }
        }
    }
    Ok(tokens)
}
