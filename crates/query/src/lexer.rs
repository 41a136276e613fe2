//! Tokenizer for path expressions

use crate::error::{QueryError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    Slash,
    DoubleSlash,
    Dot,
    DotDot,
    At,
    Star,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Integer(i64),
    Str(String),
    Name(String),
}

/// Token plus its byte offset
pub(crate) type Spanned = (Token, usize);

fn is_name_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | ':')
}

pub(crate) fn tokenize(text: &str) -> Result<Vec<Spanned>> {
    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some(&(pos, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }
        let token = match c {
            '/' => {
                chars.next();
                if matches!(chars.peek(), Some((_, '/'))) {
                    chars.next();
                    Token::DoubleSlash
                } else {
                    Token::Slash
                }
            }
            '.' => {
                chars.next();
                if matches!(chars.peek(), Some((_, '.'))) {
                    chars.next();
                    Token::DotDot
                } else {
                    Token::Dot
                }
            }
            '@' => single(&mut chars, Token::At),
            '*' => single(&mut chars, Token::Star),
            '(' => single(&mut chars, Token::LParen),
            ')' => single(&mut chars, Token::RParen),
            '[' => single(&mut chars, Token::LBracket),
            ']' => single(&mut chars, Token::RBracket),
            '"' | '\'' => {
                chars.next();
                let mut value = String::new();
                let mut closed = false;
                for (_, d) in chars.by_ref() {
                    if d == c {
                        closed = true;
                        break;
                    }
                    value.push(d);
                }
                if !closed {
                    return Err(QueryError::Compile {
                        message: "unterminated string literal".to_string(),
                        offset: pos,
                    });
                }
                Token::Str(value)
            }
            d if d.is_ascii_digit() => {
                let mut digits = String::new();
                while let Some(&(_, d)) = chars.peek() {
                    if !d.is_ascii_digit() {
                        break;
                    }
                    digits.push(d);
                    chars.next();
                }
                let value = digits.parse::<i64>().map_err(|_| QueryError::Compile {
                    message: format!("integer out of range: {}", digits),
                    offset: pos,
                })?;
                Token::Integer(value)
            }
            n if is_name_start(n) => {
                let mut name = String::new();
                while let Some(&(_, d)) = chars.peek() {
                    if !is_name_char(d) {
                        break;
                    }
                    name.push(d);
                    chars.next();
                }
                Token::Name(name)
            }
            other => {
                return Err(QueryError::Compile {
                    message: format!("unexpected character '{}'", other),
                    offset: pos,
                })
            }
        };
        tokens.push((token, pos));
    }

    Ok(tokens)
}

fn single<I: Iterator<Item = (usize, char)>>(
    chars: &mut std::iter::Peekable<I>,
    token: Token,
) -> Token {
    chars.next();
    token
}
