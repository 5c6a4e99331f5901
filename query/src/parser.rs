//! Query parser.
//!
//! Grammar:
//!
//! ```text
//! query     := resource [ "where" predicate ]
//! resource  := "entities" | "components"
//! predicate := path op literal
//! path      := ident ( "." ident )*
//! op        := "==" | "!=" | ">" | "<" | ">=" | "<=" | "contains"
//! literal   := "true" | "false" | number | string
//! ```
//!
//! A predicate is a single comparison; there are no conjunctions.

use crate::{Lexer, ParseError, ParseResult, Token, TokenKind};

/// What a query selects over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    /// Scene entities, optionally filtered by a predicate.
    Entities,
    /// The distinct component names attached across the scene.
    Components,
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    NotEq,
    Gt,
    Lt,
    GtEq,
    LtEq,
    Contains,
}

/// A literal on the right-hand side of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Bool(bool),
    Number(f64),
    Str(String),
}

/// A single-comparison filter: `<path> <op> <literal>`.
#[derive(Debug, Clone)]
pub struct Predicate {
    /// Dotted path segments (`door.locked` is `["door", "locked"]`).
    pub path: Vec<String>,
    pub op: CompareOp,
    pub literal: Literal,
}

/// A parsed query.
#[derive(Debug, Clone)]
pub struct Query {
    pub resource: Resource,
    pub predicate: Option<Predicate>,
}

/// Parse a query string.
pub fn parse(text: &str) -> ParseResult<Query> {
    let tokens = Lexer::new(text).tokenize()?;
    Parser { tokens, pos: 0 }.parse_query()
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn current(&self) -> &Token {
        // tokenize() always ends with Eof, so pos stays in range.
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn parse_query(mut self) -> ParseResult<Query> {
        let resource = self.parse_resource()?;

        let predicate = match &self.current().kind {
            TokenKind::Where => {
                let where_token = self.advance();
                if resource == Resource::Components {
                    return Err(ParseError::new(
                        "'components' queries take no predicate",
                        where_token.span,
                    ));
                }
                Some(self.parse_predicate()?)
            }
            _ => None,
        };

        let trailing = self.current();
        if !matches!(trailing.kind, TokenKind::Eof) {
            return Err(ParseError::unexpected_token(
                trailing.span,
                "end of input",
                trailing.kind.name(),
            ));
        }

        Ok(Query {
            resource,
            predicate,
        })
    }

    fn parse_resource(&mut self) -> ParseResult<Resource> {
        let token = self.advance();
        match &token.kind {
            TokenKind::Ident(name) if name == "entities" => Ok(Resource::Entities),
            TokenKind::Ident(name) if name == "components" => Ok(Resource::Components),
            other => Err(ParseError::unexpected_token(
                token.span,
                "'entities' or 'components'",
                other.name(),
            )
            .with_expected(vec!["entities".into(), "components".into()])),
        }
    }

    fn parse_predicate(&mut self) -> ParseResult<Predicate> {
        let path = self.parse_path()?;
        let op = self.parse_op()?;
        let literal = self.parse_literal()?;
        Ok(Predicate { path, op, literal })
    }

    fn parse_path(&mut self) -> ParseResult<Vec<String>> {
        let mut segments = vec![self.expect_ident()?];
        while matches!(self.current().kind, TokenKind::Dot) {
            self.advance();
            segments.push(self.expect_ident()?);
        }
        Ok(segments)
    }

    fn expect_ident(&mut self) -> ParseResult<String> {
        let token = self.advance();
        match token.kind {
            TokenKind::Ident(name) => Ok(name),
            other => Err(ParseError::unexpected_token(
                token.span,
                "identifier",
                other.name(),
            )),
        }
    }

    fn parse_op(&mut self) -> ParseResult<CompareOp> {
        let token = self.advance();
        let op = match token.kind {
            TokenKind::Eq => CompareOp::Eq,
            TokenKind::NotEq => CompareOp::NotEq,
            TokenKind::Gt => CompareOp::Gt,
            TokenKind::Lt => CompareOp::Lt,
            TokenKind::GtEq => CompareOp::GtEq,
            TokenKind::LtEq => CompareOp::LtEq,
            TokenKind::Contains => CompareOp::Contains,
            other => {
                return Err(ParseError::unexpected_token(
                    token.span,
                    "comparison operator",
                    other.name(),
                )
                .with_expected(
                    ["==", "!=", ">", "<", ">=", "<=", "contains"]
                        .iter()
                        .map(|s| s.to_string())
                        .collect(),
                ));
            }
        };
        Ok(op)
    }

    fn parse_literal(&mut self) -> ParseResult<Literal> {
        let token = self.advance();
        match token.kind {
            TokenKind::True => Ok(Literal::Bool(true)),
            TokenKind::False => Ok(Literal::Bool(false)),
            TokenKind::Number(n) => Ok(Literal::Number(n)),
            TokenKind::String(s) => Ok(Literal::Str(s)),
            other => Err(ParseError::unexpected_token(
                token.span,
                "literal",
                other.name(),
            )
            .with_expected(vec![
                "boolean".into(),
                "number".into(),
                "string".into(),
            ])),
        }
    }
}
