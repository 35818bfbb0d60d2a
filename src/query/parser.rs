//! Recursive descent parser for XPath 1.0 expressions.

use crate::error::Error;

use super::ast::{Axis, BinaryOp, Expr, NodeTest, PathStart, Step};
use super::lexer::{syntax_error, Lexer, Token};

/// Parse an expression into its syntax tree.
pub(crate) fn parse(input: &str) -> Result<Expr, Error> {
    let tokens = Lexer::new(input).tokenize()?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        end: input.len(),
    };
    let expr = parser.expr()?;
    match parser.tokens.get(parser.pos) {
        None => Ok(expr),
        Some((token, position)) => Err(syntax_error(
            format!("unexpected {:?} after expression", token),
            *position,
        )),
    }
}

struct Parser {
    tokens: Vec<(Token, usize)>,
    pos: usize,
    end: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(token, _)| token)
    }

    fn position(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map(|(_, position)| *position)
            .unwrap_or(self.end)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|(token, _)| token.clone());
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: Token) -> Result<(), Error> {
        if self.eat(&expected) {
            Ok(())
        } else {
            Err(self.unexpected(&format!("{:?}", expected)))
        }
    }

    fn unexpected(&self, wanted: &str) -> Error {
        match self.peek() {
            Some(token) => syntax_error(
                format!("expected {}, found {:?}", wanted, token),
                self.position(),
            ),
            None => syntax_error(
                format!("expected {}, found end of expression", wanted),
                self.end,
            ),
        }
    }

    fn expr(&mut self) -> Result<Expr, Error> {
        self.or_expr()
    }

    fn binary(
        &mut self,
        operand: fn(&mut Self) -> Result<Expr, Error>,
        operator: fn(&Token) -> Option<BinaryOp>,
    ) -> Result<Expr, Error> {
        let mut left = operand(self)?;
        while let Some(op) = self.peek().and_then(operator) {
            self.pos += 1;
            let right = operand(self)?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn or_expr(&mut self) -> Result<Expr, Error> {
        self.binary(Self::and_expr, |token| match token {
            Token::Or => Some(BinaryOp::Or),
            _ => None,
        })
    }

    fn and_expr(&mut self) -> Result<Expr, Error> {
        self.binary(Self::equality_expr, |token| match token {
            Token::And => Some(BinaryOp::And),
            _ => None,
        })
    }

    fn equality_expr(&mut self) -> Result<Expr, Error> {
        self.binary(Self::relational_expr, |token| match token {
            Token::Eq => Some(BinaryOp::Eq),
            Token::Neq => Some(BinaryOp::Neq),
            _ => None,
        })
    }

    fn relational_expr(&mut self) -> Result<Expr, Error> {
        self.binary(Self::additive_expr, |token| match token {
            Token::Lt => Some(BinaryOp::Lt),
            Token::Lte => Some(BinaryOp::Lte),
            Token::Gt => Some(BinaryOp::Gt),
            Token::Gte => Some(BinaryOp::Gte),
            _ => None,
        })
    }

    fn additive_expr(&mut self) -> Result<Expr, Error> {
        self.binary(Self::multiplicative_expr, |token| match token {
            Token::Plus => Some(BinaryOp::Add),
            Token::Minus => Some(BinaryOp::Sub),
            _ => None,
        })
    }

    fn multiplicative_expr(&mut self) -> Result<Expr, Error> {
        self.binary(Self::unary_expr, |token| match token {
            Token::Multiply => Some(BinaryOp::Mul),
            Token::Div => Some(BinaryOp::Div),
            Token::Mod => Some(BinaryOp::Mod),
            _ => None,
        })
    }

    fn unary_expr(&mut self) -> Result<Expr, Error> {
        if self.eat(&Token::Minus) {
            let operand = self.unary_expr()?;
            return Ok(Expr::Negate(Box::new(operand)));
        }
        self.union_expr()
    }

    fn union_expr(&mut self) -> Result<Expr, Error> {
        let mut left = self.path_expr()?;
        while self.eat(&Token::Pipe) {
            let right = self.path_expr()?;
            left = Expr::Union(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn path_expr(&mut self) -> Result<Expr, Error> {
        match self.peek() {
            Some(Token::Slash) => {
                self.pos += 1;
                let steps = if self.starts_step() {
                    self.relative_path()?
                } else {
                    Vec::new()
                };
                Ok(Expr::Path {
                    start: PathStart::Root,
                    steps,
                })
            }
            Some(Token::DoubleSlash) => {
                self.pos += 1;
                let mut steps = vec![descendant_or_self()];
                steps.extend(self.relative_path()?);
                Ok(Expr::Path {
                    start: PathStart::Root,
                    steps,
                })
            }
            Some(
                Token::LeftParen | Token::Literal(_) | Token::Number(_) | Token::FunctionName(_),
            ) => {
                let filter = self.filter_expr()?;
                let mut steps = Vec::new();
                match self.peek() {
                    Some(Token::Slash) => {
                        self.pos += 1;
                    }
                    Some(Token::DoubleSlash) => {
                        self.pos += 1;
                        steps.push(descendant_or_self());
                    }
                    _ => return Ok(filter),
                }
                steps.extend(self.relative_path()?);
                Ok(Expr::Path {
                    start: PathStart::Expr(Box::new(filter)),
                    steps,
                })
            }
            _ => Ok(Expr::Path {
                start: PathStart::Context,
                steps: self.relative_path()?,
            }),
        }
    }

    fn filter_expr(&mut self) -> Result<Expr, Error> {
        let primary = self.primary_expr()?;
        let predicates = self.predicates()?;
        if predicates.is_empty() {
            Ok(primary)
        } else {
            Ok(Expr::Filter {
                expr: Box::new(primary),
                predicates,
            })
        }
    }

    fn primary_expr(&mut self) -> Result<Expr, Error> {
        match self.next() {
            Some(Token::LeftParen) => {
                let expr = self.expr()?;
                self.expect(Token::RightParen)?;
                Ok(expr)
            }
            Some(Token::Literal(text)) => Ok(Expr::Literal(text)),
            Some(Token::Number(number)) => Ok(Expr::Number(number)),
            Some(Token::FunctionName(name)) => {
                self.expect(Token::LeftParen)?;
                let mut args = Vec::new();
                if !self.eat(&Token::RightParen) {
                    loop {
                        args.push(self.expr()?);
                        if self.eat(&Token::RightParen) {
                            break;
                        }
                        self.expect(Token::Comma)?;
                    }
                }
                Ok(Expr::Function { name, args })
            }
            other => {
                if other.is_some() {
                    self.pos -= 1;
                }
                Err(self.unexpected("an expression"))
            }
        }
    }

    fn predicates(&mut self) -> Result<Vec<Expr>, Error> {
        let mut predicates = Vec::new();
        while self.eat(&Token::LeftBracket) {
            predicates.push(self.expr()?);
            self.expect(Token::RightBracket)?;
        }
        Ok(predicates)
    }

    fn starts_step(&self) -> bool {
        matches!(
            self.peek(),
            Some(
                Token::Name(_)
                    | Token::NodeType(_)
                    | Token::AxisName(_)
                    | Token::At
                    | Token::Dot
                    | Token::DotDot
            )
        )
    }

    fn relative_path(&mut self) -> Result<Vec<Step>, Error> {
        let mut steps = vec![self.step()?];
        loop {
            match self.peek() {
                Some(Token::Slash) => {
                    self.pos += 1;
                }
                Some(Token::DoubleSlash) => {
                    self.pos += 1;
                    steps.push(descendant_or_self());
                }
                _ => return Ok(steps),
            }
            steps.push(self.step()?);
        }
    }

    fn step(&mut self) -> Result<Step, Error> {
        if self.eat(&Token::Dot) {
            return Ok(Step::new(Axis::SelfAxis, NodeTest::Node));
        }
        if self.eat(&Token::DotDot) {
            return Ok(Step::new(Axis::Parent, NodeTest::Node));
        }
        let axis = match self.peek() {
            Some(Token::At) => {
                self.pos += 1;
                Axis::Attribute
            }
            Some(Token::AxisName(name)) => {
                let position = self.position();
                let axis = match Axis::parse(name) {
                    Some(axis) => axis,
                    None if name == "namespace" => {
                        return Err(syntax_error("the namespace axis is not supported", position))
                    }
                    None => return Err(syntax_error(format!("unknown axis {:?}", name), position)),
                };
                self.pos += 1;
                self.expect(Token::ColonColon)?;
                axis
            }
            _ => Axis::Child,
        };
        let test = self.node_test()?;
        let predicates = self.predicates()?;
        Ok(Step {
            axis,
            test,
            predicates,
        })
    }

    fn node_test(&mut self) -> Result<NodeTest, Error> {
        match self.next() {
            Some(Token::Name(name)) => Ok(name_test(name)),
            Some(Token::NodeType(node_type)) => {
                self.expect(Token::LeftParen)?;
                let test = match node_type.as_str() {
                    "node" => NodeTest::Node,
                    "text" => NodeTest::Text,
                    "comment" => NodeTest::Comment,
                    _ => match self.peek() {
                        Some(Token::Literal(target)) => {
                            let target = target.clone();
                            self.pos += 1;
                            NodeTest::ProcessingInstruction(Some(target))
                        }
                        _ => NodeTest::ProcessingInstruction(None),
                    },
                };
                self.expect(Token::RightParen)?;
                Ok(test)
            }
            other => {
                if other.is_some() {
                    self.pos -= 1;
                }
                Err(self.unexpected("a node test"))
            }
        }
    }
}

fn descendant_or_self() -> Step {
    Step::new(Axis::DescendantOrSelf, NodeTest::Node)
}

fn name_test(name: String) -> NodeTest {
    if name == "*" {
        return NodeTest::Wildcard;
    }
    match name.split_once(':') {
        Some((prefix, "*")) => NodeTest::PrefixWildcard(prefix.to_string()),
        Some((prefix, local)) => NodeTest::Name {
            prefix: Some(prefix.to_string()),
            local: local.to_string(),
        },
        None => NodeTest::Name {
            prefix: None,
            local: name,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(local: &str) -> NodeTest {
        NodeTest::Name {
            prefix: None,
            local: local.to_string(),
        }
    }

    #[test]
    fn test_abbreviated_descendant() {
        let expr = parse(".//pb").unwrap();
        assert_eq!(
            expr,
            Expr::Path {
                start: PathStart::Context,
                steps: vec![
                    Step::new(Axis::SelfAxis, NodeTest::Node),
                    Step::new(Axis::DescendantOrSelf, NodeTest::Node),
                    Step::new(Axis::Child, name("pb")),
                ]
            }
        );
    }

    #[test]
    fn test_predicate_and_attribute() {
        let expr = parse(r#"pb[@n="I"]"#).unwrap();
        let Expr::Path { steps, .. } = expr else {
            panic!("expected a path");
        };
        assert_eq!(steps.len(), 1);
        assert_eq!(
            steps[0].predicates,
            vec![Expr::Binary {
                op: BinaryOp::Eq,
                left: Box::new(Expr::Path {
                    start: PathStart::Context,
                    steps: vec![Step::new(Axis::Attribute, name("n"))],
                }),
                right: Box::new(Expr::Literal("I".to_string())),
            }]
        );
    }

    #[test]
    fn test_precedence() {
        let expr = parse("1 + 2 * 3").unwrap();
        assert_eq!(
            expr,
            Expr::Binary {
                op: BinaryOp::Add,
                left: Box::new(Expr::Number(1.0)),
                right: Box::new(Expr::Binary {
                    op: BinaryOp::Mul,
                    left: Box::new(Expr::Number(2.0)),
                    right: Box::new(Expr::Number(3.0)),
                }),
            }
        );
    }

    #[test]
    fn test_root_only() {
        assert_eq!(
            parse("/").unwrap(),
            Expr::Path {
                start: PathStart::Root,
                steps: vec![]
            }
        );
    }

    #[test]
    fn test_syntax_errors() {
        assert!(matches!(parse("a["), Err(Error::XPathSyntax { .. })));
        assert!(matches!(parse("a b"), Err(Error::XPathSyntax { .. })));
        assert!(matches!(
            parse("namespace::x"),
            Err(Error::XPathSyntax { position: 0, .. })
        ));
        assert!(matches!(parse(""), Err(Error::XPathSyntax { .. })));
    }
}
