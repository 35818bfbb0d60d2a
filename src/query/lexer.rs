//! Tokenizer for XPath expressions.
//!
//! The lexical rules of XPath 1.0 section 3.7 depend on context: `*` and
//! the names `and`, `or`, `div` and `mod` are operators only when they
//! follow something that ends an operand, and a name is a function name,
//! node type or axis depending on what comes after it. The lexer settles
//! this as it goes, so the parser never has to look back.

use crate::error::Error;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    Dot,
    DotDot,
    At,
    Comma,
    ColonColon,
    Slash,
    DoubleSlash,
    Pipe,
    Plus,
    Minus,
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
    And,
    Or,
    Mod,
    Div,
    /// `*` used as multiplication.
    Multiply,
    Number(f64),
    Literal(String),
    /// A name test: `*`, `prefix:*`, `local` or `prefix:local`.
    Name(String),
    FunctionName(String),
    NodeType(String),
    AxisName(String),
}

const NODE_TYPES: [&str; 4] = ["comment", "text", "processing-instruction", "node"];

pub(crate) fn syntax_error(message: impl Into<String>, position: usize) -> Error {
    Error::XPathSyntax {
        message: message.into(),
        position,
    }
}

pub(crate) struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    tokens: Vec<(Token, usize)>,
}

impl<'a> Lexer<'a> {
    pub(crate) fn new(input: &'a str) -> Self {
        Lexer {
            input,
            pos: 0,
            tokens: Vec::new(),
        }
    }

    /// Tokenize the whole input. Each token comes with its byte offset.
    pub(crate) fn tokenize(mut self) -> Result<Vec<(Token, usize)>, Error> {
        loop {
            self.skip_whitespace();
            let start = self.pos;
            let Some(c) = self.peek() else {
                break;
            };
            let token = match c {
                '(' => self.single(Token::LeftParen),
                ')' => self.single(Token::RightParen),
                '[' => self.single(Token::LeftBracket),
                ']' => self.single(Token::RightBracket),
                '@' => self.single(Token::At),
                ',' => self.single(Token::Comma),
                '|' => self.single(Token::Pipe),
                '+' => self.single(Token::Plus),
                '-' => self.single(Token::Minus),
                '=' => self.single(Token::Eq),
                '/' => {
                    self.pos += 1;
                    if self.eat('/') {
                        Token::DoubleSlash
                    } else {
                        Token::Slash
                    }
                }
                '!' => {
                    self.pos += 1;
                    if !self.eat('=') {
                        return Err(syntax_error("expected '=' after '!'", start));
                    }
                    Token::Neq
                }
                '<' => {
                    self.pos += 1;
                    if self.eat('=') {
                        Token::Lte
                    } else {
                        Token::Lt
                    }
                }
                '>' => {
                    self.pos += 1;
                    if self.eat('=') {
                        Token::Gte
                    } else {
                        Token::Gt
                    }
                }
                ':' => {
                    self.pos += 1;
                    if !self.eat(':') {
                        return Err(syntax_error("unexpected ':'", start));
                    }
                    Token::ColonColon
                }
                '.' => {
                    if self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
                        self.number()
                    } else {
                        self.pos += 1;
                        if self.eat('.') {
                            Token::DotDot
                        } else {
                            Token::Dot
                        }
                    }
                }
                '"' | '\'' => self.literal(c, start)?,
                '$' => return Err(syntax_error("variables are not supported", start)),
                '*' => {
                    self.pos += 1;
                    if self.after_operand() {
                        Token::Multiply
                    } else {
                        Token::Name("*".to_string())
                    }
                }
                c if c.is_ascii_digit() => self.number(),
                c if is_name_start_char(c) => self.name(start)?,
                c => return Err(syntax_error(format!("unexpected character {:?}", c), start)),
            };
            self.tokens.push((token, start));
        }
        Ok(self.tokens)
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(offset)
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn single(&mut self, token: Token) -> Token {
        self.pos += 1;
        token
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_ascii_whitespace() {
                break;
            }
            self.pos += 1;
        }
    }

    fn take_while(&mut self, f: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !f(c) {
                break;
            }
            self.pos += c.len_utf8();
        }
        &self.input[start..self.pos]
    }

    /// The previous token ends an operand, so what follows is an operator.
    fn after_operand(&self) -> bool {
        match self.tokens.last() {
            None => false,
            Some((token, _)) => !matches!(
                token,
                Token::At
                    | Token::ColonColon
                    | Token::LeftParen
                    | Token::LeftBracket
                    | Token::Comma
                    | Token::Slash
                    | Token::DoubleSlash
                    | Token::Pipe
                    | Token::Plus
                    | Token::Minus
                    | Token::Eq
                    | Token::Neq
                    | Token::Lt
                    | Token::Lte
                    | Token::Gt
                    | Token::Gte
                    | Token::And
                    | Token::Or
                    | Token::Mod
                    | Token::Div
                    | Token::Multiply
            ),
        }
    }

    fn number(&mut self) -> Token {
        let text = self.take_while(|c| c.is_ascii_digit() || c == '.');
        Token::Number(text.parse().unwrap_or(f64::NAN))
    }

    fn literal(&mut self, quote: char, start: usize) -> Result<Token, Error> {
        self.pos += 1;
        let text = self.take_while(|c| c != quote);
        if !self.eat(quote) {
            return Err(syntax_error("unterminated string literal", start));
        }
        Ok(Token::Literal(text.to_string()))
    }

    fn name(&mut self, start: usize) -> Result<Token, Error> {
        let first = self.take_while(is_name_char);
        if self.after_operand() {
            return match first {
                "and" => Ok(Token::And),
                "or" => Ok(Token::Or),
                "mod" => Ok(Token::Mod),
                "div" => Ok(Token::Div),
                _ => Err(syntax_error(format!("expected an operator, found {:?}", first), start)),
            };
        }
        // prefix:local or prefix:*, but not an axis separator
        let mut name = first.to_string();
        if self.peek() == Some(':') && self.peek_at(1) != Some(':') {
            self.pos += 1;
            if self.eat('*') {
                name.push_str(":*");
                return Ok(Token::Name(name));
            }
            match self.peek() {
                Some(c) if is_name_start_char(c) => {
                    let local = self.take_while(is_name_char);
                    name.push(':');
                    name.push_str(local);
                }
                _ => return Err(syntax_error("expected a local name after ':'", self.pos)),
            }
        }
        let rest = self.input[self.pos..].trim_start();
        if rest.starts_with('(') {
            if NODE_TYPES.contains(&name.as_str()) {
                Ok(Token::NodeType(name))
            } else {
                Ok(Token::FunctionName(name))
            }
        } else if rest.starts_with("::") {
            Ok(Token::AxisName(name))
        } else {
            Ok(Token::Name(name))
        }
    }
}

fn is_name_start_char(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-' || c == '.'
}
