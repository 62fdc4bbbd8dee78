//! `allow_if` expression parser.
//!
//! Parses access-control expressions into an AST and checks that they only
//! use known functions and variables.

use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

use super::ast::{BinaryOp, Expression, Literal, UnaryOp};

/// Variables an access-control expression may reference.
pub const ALLOWED_VARIABLES: [&str; 6] = ["token", "user", "object", "roles", "request", "trust_resolver"];

/// Functions an access-control expression may call.
pub const FUNCTIONS: [&str; 6] = [
    "is_anonymous",
    "is_authenticated",
    "is_fully_authenticated",
    "is_remember_me",
    "has_role",
    "is_granted",
];

/// Error type for expression parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Unexpected end of input
    UnexpectedEof,
    /// Unexpected character
    UnexpectedChar(char),
    /// Unexpected token
    UnexpectedToken(String),
    /// Unclosed parenthesis or bracket
    UnclosedParen,
    /// Unclosed string
    UnclosedString,
    /// Empty expression
    EmptyExpression,
    /// Call to a function that does not exist
    UnknownFunction(String),
    /// Reference to a variable that is not available
    UnknownVariable(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::UnexpectedEof => write!(f, "unexpected end of expression"),
            ParseError::UnexpectedChar(c) => write!(f, "unexpected character: '{}'", c),
            ParseError::UnexpectedToken(t) => write!(f, "unexpected token: '{}'", t),
            ParseError::UnclosedParen => write!(f, "unclosed parenthesis"),
            ParseError::UnclosedString => write!(f, "unclosed string literal"),
            ParseError::EmptyExpression => write!(f, "empty expression"),
            ParseError::UnknownFunction(name) => write!(f, "unknown function: '{}'", name),
            ParseError::UnknownVariable(name) => write!(f, "unknown variable: '{}'", name),
        }
    }
}

impl std::error::Error for ParseError {}

/// Token types for the lexer.
#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    String(String),
    Number(f64),
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Dot,
    And,
    Or,
    Not,
    True,
    False,
    Null,
    In,
    Matches,
    /// Comparison operator
    Compare(BinaryOp),
}

/// A parsed access-control expression.
///
/// # Example
/// ```
/// use actix_security_config::http::security::expression::SecurityExpression;
///
/// let expr = SecurityExpression::parse("is_granted('ROLE_ADMIN') or request.client_ip() == '127.0.0.1'").unwrap();
/// assert_eq!(expr.ast().variables(), ["request"]);
///
/// assert!(SecurityExpression::parse("session.get('admin')").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct SecurityExpression {
    source: String,
    ast: Expression,
}

impl SecurityExpression {
    /// Parses an expression that may reference [`ALLOWED_VARIABLES`].
    pub fn parse(expr: &str) -> Result<Self, ParseError> {
        Self::parse_with_variables(expr, &ALLOWED_VARIABLES)
    }

    /// Parses an expression that may reference only `variables`.
    pub fn parse_with_variables(expr: &str, variables: &[&str]) -> Result<Self, ParseError> {
        let tokens = tokenize(expr)?;
        if tokens.is_empty() {
            return Err(ParseError::EmptyExpression);
        }

        let ast = Parser::new(tokens).parse()?;
        if let Some(unknown) = ast.variables().into_iter().find(|v| !variables.contains(v)) {
            return Err(ParseError::UnknownVariable(unknown.to_string()));
        }

        Ok(SecurityExpression {
            source: expr.to_string(),
            ast,
        })
    }

    /// Returns the original expression string.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns a reference to the parsed AST.
    pub fn ast(&self) -> &Expression {
        &self.ast
    }

    /// Consumes self and returns the AST.
    pub fn into_ast(self) -> Expression {
        self.ast
    }
}

/// Tokenizes an expression string into tokens.
fn tokenize(expr: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut chars = expr.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            ' ' | '\t' | '\n' | '\r' => {
                chars.next();
            }

            '(' | ')' | '[' | ']' | ',' | '.' => {
                chars.next();
                tokens.push(match c {
                    '(' => Token::LParen,
                    ')' => Token::RParen,
                    '[' => Token::LBracket,
                    ']' => Token::RBracket,
                    ',' => Token::Comma,
                    _ => Token::Dot,
                });
            }

            '\'' | '"' => {
                chars.next();
                tokens.push(parse_string(&mut chars, c)?);
            }

            '&' | '|' => {
                chars.next();
                if chars.peek() != Some(&c) {
                    return Err(ParseError::UnexpectedChar(c));
                }
                chars.next();
                tokens.push(if c == '&' { Token::And } else { Token::Or });
            }

            '!' => {
                chars.next();
                if chars.next_if_eq(&'=').is_some() {
                    tokens.push(Token::Compare(BinaryOp::NotEq));
                } else {
                    tokens.push(Token::Not);
                }
            }
            '=' => {
                chars.next();
                if chars.next_if_eq(&'=').is_none() {
                    return Err(ParseError::UnexpectedChar('='));
                }
                tokens.push(Token::Compare(BinaryOp::Eq));
            }
            '<' | '>' => {
                chars.next();
                let or_equal = chars.next_if_eq(&'=').is_some();
                tokens.push(Token::Compare(match (c, or_equal) {
                    ('<', false) => BinaryOp::Lt,
                    ('<', true) => BinaryOp::LtEq,
                    (_, false) => BinaryOp::Gt,
                    (_, true) => BinaryOp::GtEq,
                }));
            }

            '0'..='9' => {
                tokens.push(parse_number(&mut chars)?);
            }

            'a'..='z' | 'A'..='Z' | '_' => {
                tokens.push(parse_identifier(&mut chars));
            }

            _ => {
                return Err(ParseError::UnexpectedChar(c));
            }
        }
    }

    Ok(tokens)
}

/// Parses a string literal; the opening quote is already consumed.
fn parse_string(chars: &mut Peekable<Chars>, quote: char) -> Result<Token, ParseError> {
    let mut value = String::new();

    loop {
        match chars.next() {
            Some(c) if c == quote => return Ok(Token::String(value)),
            Some('\\') => match chars.next() {
                Some(escaped) => value.push(escaped),
                None => return Err(ParseError::UnclosedString),
            },
            Some(c) => value.push(c),
            None => return Err(ParseError::UnclosedString),
        }
    }
}

fn parse_number(chars: &mut Peekable<Chars>) -> Result<Token, ParseError> {
    let mut literal = String::new();
    while let Some(c) = chars.next_if(|c| c.is_ascii_digit() || *c == '.') {
        literal.push(c);
    }
    literal
        .parse()
        .map(Token::Number)
        .map_err(|_| ParseError::UnexpectedToken(literal))
}

/// Parses an identifier or keyword.
fn parse_identifier(chars: &mut Peekable<Chars>) -> Token {
    let mut ident = String::new();
    while let Some(c) = chars.next_if(|c| c.is_alphanumeric() || *c == '_') {
        ident.push(c);
    }

    match ident.as_str() {
        "and" => Token::And,
        "or" => Token::Or,
        "not" => Token::Not,
        "true" => Token::True,
        "false" => Token::False,
        "null" => Token::Null,
        "in" => Token::In,
        "matches" => Token::Matches,
        _ => Token::Ident(ident),
    }
}

/// Recursive descent parser.
struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Parser { tokens, pos: 0 }
    }

    fn parse(&mut self) -> Result<Expression, ParseError> {
        let expr = self.parse_or()?;

        if let Some(token) = self.peek() {
            return Err(ParseError::UnexpectedToken(format!("{:?}", token)));
        }

        Ok(expr)
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_second(&self) -> Option<&Token> {
        self.tokens.get(self.pos + 1)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn expect(&mut self, expected: Token) -> Result<(), ParseError> {
        match self.advance() {
            Some(token) if token == expected => Ok(()),
            Some(_) | None => Err(ParseError::UnclosedParen),
        }
    }

    /// Parse OR expressions (lowest precedence)
    fn parse_or(&mut self) -> Result<Expression, ParseError> {
        let mut left = self.parse_and()?;

        while matches!(self.peek(), Some(Token::Or)) {
            self.advance();
            let right = self.parse_and()?;
            left = Expression::or(left, right);
        }

        Ok(left)
    }

    /// Parse AND expressions (higher precedence than OR)
    fn parse_and(&mut self) -> Result<Expression, ParseError> {
        let mut left = self.parse_comparison()?;

        while matches!(self.peek(), Some(Token::And)) {
            self.advance();
            let right = self.parse_comparison()?;
            left = Expression::and(left, right);
        }

        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<Expression, ParseError> {
        let mut left = self.parse_unary()?;

        loop {
            let (op, width) = match (self.peek(), self.peek_second()) {
                (Some(Token::Compare(op)), _) => (*op, 1),
                (Some(Token::In), _) => (BinaryOp::In, 1),
                (Some(Token::Matches), _) => (BinaryOp::Matches, 1),
                (Some(Token::Not), Some(Token::In)) => (BinaryOp::NotIn, 2),
                _ => break,
            };
            self.pos += width;
            let right = self.parse_unary()?;
            left = Expression::binary(left, op, right);
        }

        Ok(left)
    }

    /// Parse unary expressions (NOT)
    fn parse_unary(&mut self) -> Result<Expression, ParseError> {
        if matches!(self.peek(), Some(Token::Not)) {
            self.advance();
            let expr = self.parse_unary()?;
            return Ok(Expression::Unary {
                op: UnaryOp::Not,
                expr: Box::new(expr),
            });
        }

        self.parse_postfix()
    }

    /// Member access and method calls
    fn parse_postfix(&mut self) -> Result<Expression, ParseError> {
        let mut expr = self.parse_primary()?;

        while matches!(self.peek(), Some(Token::Dot)) {
            self.advance();
            let name = match self.advance() {
                Some(Token::Ident(name)) => name,
                Some(token) => return Err(ParseError::UnexpectedToken(format!("{:?}", token))),
                None => return Err(ParseError::UnexpectedEof),
            };
            let args = if matches!(self.peek(), Some(Token::LParen)) {
                self.advance();
                Some(self.parse_list(Token::RParen)?)
            } else {
                None
            };
            expr = Expression::Member {
                object: Box::new(expr),
                name,
                args,
            };
        }

        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expression, ParseError> {
        match self.advance() {
            Some(Token::True) => Ok(Expression::Literal(Literal::Boolean(true))),
            Some(Token::False) => Ok(Expression::Literal(Literal::Boolean(false))),
            Some(Token::Null) => Ok(Expression::Literal(Literal::Null)),
            Some(Token::Number(n)) => Ok(Expression::Literal(Literal::Number(n))),
            Some(Token::String(s)) => Ok(Expression::string(s)),
            Some(Token::LParen) => {
                let expr = self.parse_or()?;
                self.expect(Token::RParen)?;
                Ok(Expression::Group(Box::new(expr)))
            }
            Some(Token::LBracket) => Ok(Expression::Array(self.parse_list(Token::RBracket)?)),
            Some(Token::Ident(name)) => {
                if !matches!(self.peek(), Some(Token::LParen)) {
                    return Ok(Expression::Variable(name));
                }
                if !FUNCTIONS.contains(&name.as_str()) {
                    return Err(ParseError::UnknownFunction(name));
                }
                self.advance();
                let args = self.parse_list(Token::RParen)?;
                Ok(Expression::Function { name, args })
            }
            Some(token) => Err(ParseError::UnexpectedToken(format!("{:?}", token))),
            None => Err(ParseError::UnexpectedEof),
        }
    }

    /// Comma-separated expressions up to `close`; the opener is consumed.
    fn parse_list(&mut self, close: Token) -> Result<Vec<Expression>, ParseError> {
        let mut items = Vec::new();

        if self.peek() == Some(&close) {
            self.advance();
            return Ok(items);
        }

        loop {
            items.push(self.parse_or()?);
            match self.advance() {
                Some(Token::Comma) => {}
                Some(token) if token == close => return Ok(items),
                Some(token) => return Err(ParseError::UnexpectedToken(format!("{:?}", token))),
                None => return Err(ParseError::UnclosedParen),
            }
        }
    }
}
