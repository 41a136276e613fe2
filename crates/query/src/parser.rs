//! Recursive-descent parser for path expressions
//!
//! ```text
//! expr     := literal | path
//! path     := '/' relpath? | '//' relpath | relpath
//! relpath  := step (('/' | '//') step)*
//! step     := '.' | '..' | '@' (name | '*') pred? | test pred?
//! test     := name | '*' | kind '(' ')'
//! pred     := '[' integer ']'
//! ```

use crate::error::{QueryError, Result};
use crate::lexer::{tokenize, Spanned, Token};

/// Parsed expression
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Expr {
    Integer(i64),
    Str(String),
    Path(PathExpr),
}

/// Location path as written, before lowering
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PathExpr {
    pub absolute: bool,
    pub steps: Vec<RawStep>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RawStep {
    /// Step was introduced by `//`
    pub deep: bool,
    pub axis: Axis,
    pub test: NodeTest,
    pub position: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Axis {
    Child,
    Descendant,
    DescendantOrSelf,
    Attribute,
    SelfNode,
    Parent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum NodeTest {
    Name(String),
    Any,
    Node,
    Text,
    Comment,
    ProcessingInstruction,
}

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
    end: usize,
}

pub(crate) fn parse(text: &str) -> Result<Expr> {
    let tokens = tokenize(text)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        end: text.len(),
    };
    let expr = parser.expr()?;
    if let Some((token, offset)) = parser.tokens.get(parser.pos) {
        return Err(QueryError::Compile {
            message: format!("unexpected {:?}", token),
            offset: *offset,
        });
    }
    Ok(expr)
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn offset(&self) -> usize {
        self.tokens.get(self.pos).map(|(_, o)| *o).unwrap_or(self.end)
    }

    fn bump(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|(t, _)| t.clone());
        self.pos += 1;
        token
    }

    fn error<T>(&self, message: impl Into<String>) -> Result<T> {
        Err(QueryError::Compile {
            message: message.into(),
            offset: self.offset(),
        })
    }

    fn expect(&mut self, token: Token) -> Result<()> {
        if self.peek() == Some(&token) {
            self.pos += 1;
            Ok(())
        } else {
            self.error(format!("expected {:?}", token))
        }
    }

    fn expr(&mut self) -> Result<Expr> {
        match self.peek() {
            None => self.error("empty query"),
            Some(Token::Integer(i)) => {
                let i = *i;
                self.pos += 1;
                Ok(Expr::Integer(i))
            }
            Some(Token::Str(s)) => {
                let s = s.clone();
                self.pos += 1;
                Ok(Expr::Str(s))
            }
            Some(_) => self.path().map(Expr::Path),
        }
    }

    fn path(&mut self) -> Result<PathExpr> {
        let mut steps = Vec::new();
        let absolute = match self.peek() {
            Some(Token::Slash) => {
                self.pos += 1;
                if self.at_step_start() {
                    steps.push(self.step(false)?);
                }
                true
            }
            Some(Token::DoubleSlash) => {
                self.pos += 1;
                steps.push(self.step(true)?);
                true
            }
            _ => {
                steps.push(self.step(false)?);
                false
            }
        };

        if absolute && steps.is_empty() {
            return Ok(PathExpr { absolute, steps });
        }

        loop {
            let deep = match self.peek() {
                Some(Token::Slash) => false,
                Some(Token::DoubleSlash) => true,
                _ => break,
            };
            self.pos += 1;
            steps.push(self.step(deep)?);
        }
        Ok(PathExpr { absolute, steps })
    }

    fn at_step_start(&self) -> bool {
        matches!(
            self.peek(),
            Some(Token::Dot | Token::DotDot | Token::At | Token::Star | Token::Name(_))
        )
    }

    fn step(&mut self, deep: bool) -> Result<RawStep> {
        let (axis, test) = match self.peek() {
            Some(Token::Dot) => {
                self.pos += 1;
                (Axis::SelfNode, NodeTest::Node)
            }
            Some(Token::DotDot) => {
                self.pos += 1;
                (Axis::Parent, NodeTest::Node)
            }
            Some(Token::At) => {
                self.pos += 1;
                let test = match self.bump() {
                    Some(Token::Star) => NodeTest::Any,
                    Some(Token::Name(n)) => NodeTest::Name(n),
                    _ => {
                        self.pos -= 1;
                        return self.error("expected attribute name after '@'");
                    }
                };
                (Axis::Attribute, test)
            }
            Some(Token::Star) => {
                self.pos += 1;
                (Axis::Child, NodeTest::Any)
            }
            Some(Token::Name(_)) => (Axis::Child, self.name_test()?),
            _ => return self.error("expected a path step"),
        };

        let position = if self.peek() == Some(&Token::LBracket) {
            self.pos += 1;
            let position = match self.bump() {
                Some(Token::Integer(n)) if n >= 1 => n as usize,
                _ => {
                    self.pos -= 1;
                    return self.error("expected a positive integer predicate");
                }
            };
            self.expect(Token::RBracket)?;
            Some(position)
        } else {
            None
        };

        Ok(RawStep {
            deep,
            axis,
            test,
            position,
        })
    }

    fn name_test(&mut self) -> Result<NodeTest> {
        let Some(Token::Name(name)) = self.bump() else {
            self.pos -= 1;
            return self.error("expected a name");
        };
        if self.peek() != Some(&Token::LParen) {
            return Ok(NodeTest::Name(name));
        }
        let test = match name.as_str() {
            "node" => NodeTest::Node,
            "text" => NodeTest::Text,
            "comment" => NodeTest::Comment,
            "processing-instruction" => NodeTest::ProcessingInstruction,
            other => return self.error(format!("unknown function {}()", other)),
        };
        self.expect(Token::LParen)?;
        self.expect(Token::RParen)?;
        Ok(test)
    }
}
