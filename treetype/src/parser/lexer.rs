use std::fmt;
use std::ops::Range;

use crate::parser::error::LexError;

// ---------------------------------------------------------------------------
// Token types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    // Symbols
    TreeOpen,   // <
    TreeClose,  // >
    ListOpen,   // [
    ListClose,  // ]
    ParenOpen,  // (
    ParenClose, // )
    Bar,        // |
    Dot,        // .
    Dots,       // ...
    Comma,      // ,
    Colon,      // :

    // Literals
    Integer(u64),
    Identifier(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Byte range of the token in the description string.
    pub span: Range<usize>,
}

impl TokenKind {
    /// Name used in "expected ..." listings.
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Integer(_) => "integer".to_string(),
            TokenKind::Identifier(_) => "identifier".to_string(),
            symbol => symbol.to_string(),
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::TreeOpen => f.write_str("<"),
            TokenKind::TreeClose => f.write_str(">"),
            TokenKind::ListOpen => f.write_str("["),
            TokenKind::ListClose => f.write_str("]"),
            TokenKind::ParenOpen => f.write_str("("),
            TokenKind::ParenClose => f.write_str(")"),
            TokenKind::Bar => f.write_str("|"),
            TokenKind::Dot => f.write_str("."),
            TokenKind::Dots => f.write_str("..."),
            TokenKind::Comma => f.write_str(","),
            TokenKind::Colon => f.write_str(":"),
            TokenKind::Integer(n) => write!(f, "{}", n),
            TokenKind::Identifier(name) => f.write_str(name),
        }
    }
}

// Longest first: `...` has to win over `.`.
const SYMBOLS: &[&str] = &["...", ".", ":", ",", "|", "<", ">", "[", "]", "(", ")"];

fn symbol_kind(symbol: &str) -> Option<TokenKind> {
    let kind = match symbol {
        "..." => TokenKind::Dots,
        "." => TokenKind::Dot,
        ":" => TokenKind::Colon,
        "," => TokenKind::Comma,
        "|" => TokenKind::Bar,
        "<" => TokenKind::TreeOpen,
        ">" => TokenKind::TreeClose,
        "[" => TokenKind::ListOpen,
        "]" => TokenKind::ListClose,
        "(" => TokenKind::ParenOpen,
        ")" => TokenKind::ParenClose,
        _ => return None,
    };
    Some(kind)
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Split a description string into tokens.
///
/// Whitespace separates tokens and is otherwise ignored. At each position the
/// symbols are tried first, then an unsigned integer, then an identifier
/// (ASCII letters, digits and `_`). Positions in errors are byte offsets.
pub fn lex(source: &str) -> Result<Vec<Token>, LexError> {
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < source.len() {
        let rest = &source[pos..];
        let trimmed = rest.trim_start();
        pos += rest.len() - trimmed.len();

        let Some(first) = trimmed.chars().next() else {
            break;
        };

        if let Some((kind, len)) = symbol_at(trimmed) {
            tokens.push(Token {
                kind,
                span: pos..pos + len,
            });
            pos += len;
            continue;
        }

        let digits = run_length(trimmed, |c| c.is_ascii_digit());
        if digits > 0 {
            let text = &trimmed[..digits];
            let value = text.parse::<u64>().map_err(|_| {
                LexError::new(first, pos)
                    .with_note(format!("integer literal '{}' does not fit in 64 bits", text))
            })?;
            tokens.push(Token {
                kind: TokenKind::Integer(value),
                span: pos..pos + digits,
            });
            pos += digits;
            continue;
        }

        let ident = run_length(trimmed, |c| c.is_ascii_alphanumeric() || c == '_');
        if ident > 0 {
            tokens.push(Token {
                kind: TokenKind::Identifier(trimmed[..ident].to_string()),
                span: pos..pos + ident,
            });
            pos += ident;
            continue;
        }

        return Err(LexError::new(first, pos));
    }

    Ok(tokens)
}

fn symbol_at(text: &str) -> Option<(TokenKind, usize)> {
    let symbol = SYMBOLS.iter().find(|symbol| text.starts_with(**symbol))?;
    Some((symbol_kind(symbol)?, symbol.len()))
}

/// Byte length of the longest prefix whose characters all satisfy `accept`.
fn run_length(text: &str, accept: impl Fn(char) -> bool) -> usize {
    text.char_indices()
        .find(|&(_, c)| !accept(c))
        .map_or(text.len(), |(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dots_win_over_dot() {
        let kinds: Vec<TokenKind> = lex("....").unwrap().into_iter().map(|t| t.kind).collect();
        assert_eq!(kinds, vec![TokenKind::Dots, TokenKind::Dot]);
    }

    #[test]
    fn run_length_stops_at_first_rejected_char() {
        assert_eq!(run_length("abc1_ def", |c| c.is_ascii_alphanumeric() || c == '_'), 5);
        assert_eq!(run_length("123", |c| c.is_ascii_digit()), 3);
        assert_eq!(run_length("", |c| c.is_ascii_digit()), 0);
    }
}
