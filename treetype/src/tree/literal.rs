//! Reader for the tree literal syntax: `nil` and `<left.right>`.

use std::fmt;
use std::ops::Range;

use crate::parser::error::ParseError;
use crate::tree::BinaryTree;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lit {
    Nil,
    Open,
    Dot,
    Close,
}

impl fmt::Display for Lit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Lit::Nil => "nil",
            Lit::Open => "<",
            Lit::Dot => ".",
            Lit::Close => ">",
        })
    }
}

fn tokenize(source: &str) -> Result<Vec<(Lit, Range<usize>)>, ParseError> {
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < source.len() {
        let rest = &source[pos..];
        let trimmed = rest.trim_start();
        pos += rest.len() - trimmed.len();

        let (lit, len) = if trimmed.is_empty() {
            break;
        } else if trimmed.starts_with("nil") {
            (Lit::Nil, 3)
        } else if trimmed.starts_with('<') {
            (Lit::Open, 1)
        } else if trimmed.starts_with('.') {
            (Lit::Dot, 1)
        } else if trimmed.starts_with('>') {
            (Lit::Close, 1)
        } else {
            let width = trimmed.chars().next().map_or(1, char::len_utf8);
            return Err(ParseError::error(
                format!("Unrecognised token at position {}", pos),
                pos..pos + width,
            ));
        };

        tokens.push((lit, pos..pos + len));
        pos += len;
    }

    Ok(tokens)
}

// A pending `<`: still waiting for its left side, or holding it.
enum Frame {
    Left,
    Right(BinaryTree),
}

/// Read a tree literal. Empty (or all-whitespace) input is `nil`.
///
/// Nesting is tracked on an explicit stack, so arbitrarily deep literals
/// are fine.
pub fn parse_tree(source: &str) -> Result<BinaryTree, ParseError> {
    let tokens = tokenize(source)?;
    if tokens.is_empty() {
        return Ok(BinaryTree::Nil);
    }

    let end = source.len()..source.len();
    let mut tokens = tokens.into_iter().peekable();
    let mut stack: Vec<Frame> = Vec::new();

    loop {
        let mut value = match tokens.next() {
            Some((Lit::Nil, _)) => BinaryTree::Nil,
            Some((Lit::Open, _)) => {
                stack.push(Frame::Left);
                continue;
            }
            Some((other, span)) => return Err(ParseError::unexpected_token(&other, &[], span)),
            None => return Err(ParseError::unexpected_end(&[], end)),
        };

        // Close every frame the finished value completes.
        loop {
            match stack.pop() {
                None => {
                    return match tokens.next() {
                        None => Ok(value),
                        Some((extra, span)) => Err(ParseError::trailing_token(&extra, span)),
                    };
                }
                Some(Frame::Left) => {
                    expect(tokens.next(), Lit::Dot, &end)?;
                    stack.push(Frame::Right(value));
                    break;
                }
                Some(Frame::Right(left)) => {
                    expect(tokens.next(), Lit::Close, &end)?;
                    value = BinaryTree::node(left, value);
                }
            }
        }
    }
}

fn expect(
    token: Option<(Lit, Range<usize>)>,
    wanted: Lit,
    end: &Range<usize>,
) -> Result<(), ParseError> {
    let expected = [wanted.to_string()];
    match token {
        Some((lit, _)) if lit == wanted => Ok(()),
        Some((lit, span)) => Err(ParseError::unexpected_token(&lit, &expected, span)),
        None => Err(ParseError::unexpected_end(&expected, end.clone())),
    }
}
