//! Platform predicate grammar for conditional build configuration
//!
//! Conditional `[[when]]` blocks in `yaje.build.toml` carry a predicate
//! expression evaluated against the build target, e.g.
//! `platform == "windows" && arch != "i686"`. The grammar:
//!
//! ```text
//! expr   := or
//! or     := and ("||" and)*
//! and    := unary ("&&" unary)*
//! unary  := "!" unary | "(" expr ")" | clause
//! clause := field ("==" | "!=") string
//! field  := "arch" | "vendor" | "platform" | "abi"
//! string := '"' ... '"'
//! ```

use crate::core::triple::TargetTriple;
use crate::error::ConfigError;

/// Triple field a clause tests against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Arch,
    Vendor,
    Platform,
    Abi,
}

impl Field {
    fn value<'a>(self, target: &'a TargetTriple) -> &'a str {
        match self {
            Field::Arch => &target.arch,
            Field::Vendor => &target.vendor,
            Field::Platform => &target.platform,
            Field::Abi => &target.abi,
        }
    }
}

/// Parsed predicate expression
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `field == "value"` or `field != "value"`
    Clause {
        field: Field,
        negated: bool,
        value: String,
    },
    /// `!inner`
    Not(Box<Predicate>),
    /// `a && b && …`
    All(Vec<Predicate>),
    /// `a || b || …`
    Any(Vec<Predicate>),
}

impl Predicate {
    /// Parse a predicate expression
    pub fn parse(expression: &str) -> Result<Self, ConfigError> {
        let tokens = tokenize(expression)
            .map_err(|message| ConfigError::Predicate {
                expression: expression.to_string(),
                message,
            })?;

        let mut parser = Parser { tokens, pos: 0 };
        let predicate = parser.or_expr().map_err(|message| ConfigError::Predicate {
            expression: expression.to_string(),
            message,
        })?;

        if parser.pos != parser.tokens.len() {
            return Err(ConfigError::Predicate {
                expression: expression.to_string(),
                message: "trailing input after expression".to_string(),
            });
        }

        Ok(predicate)
    }

    /// Evaluate the predicate against a target
    pub fn eval(&self, target: &TargetTriple) -> bool {
        match self {
            Predicate::Clause {
                field,
                negated,
                value,
            } => (field.value(target) == value) != *negated,
            Predicate::Not(inner) => !inner.eval(target),
            Predicate::All(items) => items.iter().all(|p| p.eval(target)),
            Predicate::Any(items) => items.iter().any(|p| p.eval(target)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Str(String),
    Eq,
    Ne,
    And,
    Or,
    Bang,
    LParen,
    RParen,
}

fn tokenize(input: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            ' ' | '\t' => {
                chars.next();
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            '"' => {
                chars.next();
                let mut s = String::new();
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some(ch) => s.push(ch),
                        None => return Err("unterminated string literal".to_string()),
                    }
                }
                tokens.push(Token::Str(s));
            }
            '=' => {
                chars.next();
                if chars.next() == Some('=') {
                    tokens.push(Token::Eq);
                } else {
                    return Err("expected '=='".to_string());
                }
            }
            '!' => {
                chars.next();
                if chars.peek() == Some(&'=') {
                    chars.next();
                    tokens.push(Token::Ne);
                } else {
                    tokens.push(Token::Bang);
                }
            }
            '&' => {
                chars.next();
                if chars.next() == Some('&') {
                    tokens.push(Token::And);
                } else {
                    return Err("expected '&&'".to_string());
                }
            }
            '|' => {
                chars.next();
                if chars.next() == Some('|') {
                    tokens.push(Token::Or);
                } else {
                    return Err("expected '||'".to_string());
                }
            }
            c if c.is_ascii_alphabetic() => {
                let mut ident = String::new();
                while let Some(&ch) = chars.peek() {
                    if ch.is_ascii_alphanumeric() || ch == '_' {
                        ident.push(ch);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(ident));
            }
            other => return Err(format!("unexpected character '{other}'")),
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn or_expr(&mut self) -> Result<Predicate, String> {
        let mut items = vec![self.and_expr()?];
        while self.peek() == Some(&Token::Or) {
            self.next();
            items.push(self.and_expr()?);
        }
        if items.len() == 1 {
            Ok(items.pop().expect("non-empty"))
        } else {
            Ok(Predicate::Any(items))
        }
    }

    fn and_expr(&mut self) -> Result<Predicate, String> {
        let mut items = vec![self.unary()?];
        while self.peek() == Some(&Token::And) {
            self.next();
            items.push(self.unary()?);
        }
        if items.len() == 1 {
            Ok(items.pop().expect("non-empty"))
        } else {
            Ok(Predicate::All(items))
        }
    }

    fn unary(&mut self) -> Result<Predicate, String> {
        match self.peek() {
            Some(Token::Bang) => {
                self.next();
                Ok(Predicate::Not(Box::new(self.unary()?)))
            }
            Some(Token::LParen) => {
                self.next();
                let inner = self.or_expr()?;
                match self.next() {
                    Some(Token::RParen) => Ok(inner),
                    _ => Err("expected ')'".to_string()),
                }
            }
            _ => self.clause(),
        }
    }

    fn clause(&mut self) -> Result<Predicate, String> {
        let field = match self.next() {
            Some(Token::Ident(name)) => match name.as_str() {
                "arch" => Field::Arch,
                "vendor" => Field::Vendor,
                "platform" => Field::Platform,
                "abi" => Field::Abi,
                other => return Err(format!("unknown field '{other}'")),
            },
            _ => return Err("expected a field name".to_string()),
        };

        let negated = match self.next() {
            Some(Token::Eq) => false,
            Some(Token::Ne) => true,
            _ => return Err("expected '==' or '!='".to_string()),
        };

        let value = match self.next() {
            Some(Token::Str(s)) => s,
            _ => return Err("expected a quoted string".to_string()),
        };

        Ok(Predicate::Clause {
            field,
            negated,
            value,
        })
    }
}
